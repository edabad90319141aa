//! Minimal markup tree. Inputs render into `Node`s; `Display` writes HTML.
use std::borrow::Cow;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
    Fragment(Vec<Node>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: &'static str,
    /// `None` values are boolean attributes (`checked`, `selected`)
    pub attrs: Vec<(&'static str, Option<String>)>,
    pub children: Vec<Node>,
}

const VOID_TAGS: &[&str] = &["input", "br", "hr", "img"];

impl Element {
    pub fn new(tag: &'static str) -> Self {
        Self { tag, attrs: Vec::new(), children: Vec::new() }
    }
    pub fn attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.attrs.push((name, Some(value.into())));
        self
    }
    pub fn opt_attr(self, name: &'static str, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(v) => self.attr(name, v),
            None => self,
        }
    }
    pub fn flag(mut self, name: &'static str, on: bool) -> Self {
        if on {
            self.attrs.push((name, None));
        }
        self
    }
    pub fn class(self, classes: impl Into<String>) -> Self {
        self.attr("class", classes)
    }
    pub fn child(mut self, node: impl Into<Node>) -> Self {
        self.children.push(node.into());
        self
    }
    pub fn opt_child(self, node: Option<Node>) -> Self {
        match node {
            Some(n) => self.child(n),
            None => self,
        }
    }
    pub fn children(mut self, nodes: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(nodes);
        self
    }
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs.iter().find(|(n, _)| *n == name).and_then(|(_, v)| v.as_deref())
    }
}

impl From<Element> for Node {
    fn from(e: Element) -> Self {
        Node::Element(e)
    }
}

impl Node {
    pub fn text(s: impl Into<String>) -> Self {
        Node::Text(s.into())
    }

    /// Depth-first search for elements satisfying `pred`.
    pub fn find_all<'a>(&'a self, pred: &dyn Fn(&Element) -> bool) -> Vec<&'a Element> {
        let mut out = Vec::new();
        self.collect(pred, &mut out);
        out
    }

    fn collect<'a>(&'a self, pred: &dyn Fn(&Element) -> bool, out: &mut Vec<&'a Element>) {
        match self {
            Node::Element(e) => {
                if pred(e) {
                    out.push(e);
                }
                for c in &e.children {
                    c.collect(pred, out);
                }
            }
            Node::Fragment(nodes) => nodes.iter().for_each(|c| c.collect(pred, out)),
            Node::Text(_) => {}
        }
    }

    pub fn to_html(&self) -> String {
        self.to_string()
    }
}

/// `cx`-style class list: the names whose flag is set, then `extra`.
pub fn class_names(flags: &[(&str, bool)], extra: &[String]) -> String {
    flags
        .iter()
        .filter(|(_, on)| *on)
        .map(|(name, _)| *name)
        .chain(extra.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}

fn escape(s: &str) -> Cow<'_, str> {
    if !s.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Text(s) => f.write_str(&escape(s)),
            Node::Fragment(nodes) => nodes.iter().try_for_each(|n| write!(f, "{n}")),
            Node::Element(e) => {
                write!(f, "<{}", e.tag)?;
                for (name, value) in &e.attrs {
                    match value {
                        Some(v) => write!(f, " {name}=\"{}\"", escape(v))?,
                        None => write!(f, " {name}")?,
                    }
                }
                f.write_str(">")?;
                if VOID_TAGS.contains(&e.tag) {
                    return Ok(());
                }
                for c in &e.children {
                    write!(f, "{c}")?;
                }
                write!(f, "</{}>", e.tag)
            }
        }
    }
}
