//! Typed construction options.
//!
//! `Options` carries what every input understands; `KindOptions` carries the
//! per-input extras. Composers merge computed defaults into a user-supplied
//! `Options` field by field, never by overwriting what the user set.
use serde_json::Value;

use crate::form::FormOpts;
use crate::html::{Element, Node};
use crate::input::{radio::RadioOpts, select::SelectOpts, textbox::TextboxOpts};
use crate::list::ListOpts;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub text: String,
    /// e.g. " (optional)", rendered muted after the text
    pub decoration: Option<String>,
}

impl Label {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), decoration: None }
    }
    pub fn decorated(text: impl Into<String>, decoration: &str) -> Self {
        Self {
            text: text.into(),
            decoration: (!decoration.is_empty()).then(|| decoration.to_string()),
        }
    }

    pub(crate) fn content(&self) -> Node {
        let span = Element::new("span").child(Node::text(&self.text));
        match &self.decoration {
            Some(d) => span.child(Element::new("small").class("text-muted").child(Node::text(d))).into(),
            None => span.into(),
        }
    }

    pub(crate) fn render(label: Option<&Label>) -> Option<Node> {
        label.map(|l| Element::new("label").class("control-label").child(l.content()).into())
    }
}

impl From<&str> for Label {
    fn from(s: &str) -> Self {
        Label::new(s)
    }
}

impl From<String> for Label {
    fn from(s: String) -> Self {
        Label::new(s)
    }
}

pub(crate) fn render_help(help: Option<&str>) -> Option<Node> {
    help.map(|h| Element::new("span").class("help-block").child(Node::text(h)).into())
}

#[derive(Debug, Clone, Default)]
pub struct Options {
    /// initial value
    pub value: Option<Value>,
    pub label: Option<Label>,
    pub help: Option<String>,
    /// extra classes on the outer `form-group`
    pub group_classes: Vec<String>,
    pub kind: KindOptions,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }
    pub fn label(mut self, label: impl Into<Label>) -> Self {
        self.label = Some(label.into());
        self
    }
    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
    pub fn group_class(mut self, class: impl Into<String>) -> Self {
        self.group_classes.push(class.into());
        self
    }
    pub fn kind(mut self, kind: KindOptions) -> Self {
        self.kind = kind;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub enum KindOptions {
    /// the input's own defaults
    #[default]
    Unset,
    Textbox(TextboxOpts),
    Select(SelectOpts),
    Radio(RadioOpts),
    Checkbox,
    Form(FormOpts),
    List(ListOpts),
}

impl KindOptions {
    pub fn name(&self) -> &'static str {
        match self {
            KindOptions::Unset => "default",
            KindOptions::Textbox(_) => "textbox",
            KindOptions::Select(_) => "select",
            KindOptions::Radio(_) => "radio",
            KindOptions::Checkbox => "checkbox",
            KindOptions::Form(_) => "form",
            KindOptions::List(_) => "list",
        }
    }

    // `*_mut` accessors materialize defaults for `Unset`, and return `None`
    // when the options belong to another input.

    pub(crate) fn textbox_mut(&mut self) -> Option<&mut TextboxOpts> {
        if matches!(self, KindOptions::Unset) {
            *self = KindOptions::Textbox(TextboxOpts::default());
        }
        match self {
            KindOptions::Textbox(o) => Some(o),
            _ => None,
        }
    }
    pub(crate) fn select_mut(&mut self) -> Option<&mut SelectOpts> {
        if matches!(self, KindOptions::Unset) {
            *self = KindOptions::Select(SelectOpts::default());
        }
        match self {
            KindOptions::Select(o) => Some(o),
            _ => None,
        }
    }
    pub(crate) fn form_mut(&mut self) -> Option<&mut FormOpts> {
        if matches!(self, KindOptions::Unset) {
            *self = KindOptions::Form(FormOpts::default());
        }
        match self {
            KindOptions::Form(o) => Some(o),
            _ => None,
        }
    }
}

/// Take the kind-specific options an input expects; `Unset` yields the defaults.
macro_rules! expect_kind {
    ($kind:expr, $variant:ident, $input:expr) => {
        match $kind {
            $crate::options::KindOptions::Unset => Default::default(),
            $crate::options::KindOptions::$variant(o) => o,
            other => {
                return Err($crate::error::FormError::OptionsMismatch {
                    input: $input.to_string(),
                    options: other.name(),
                })
            }
        }
    };
}
pub(crate) use expect_kind;
