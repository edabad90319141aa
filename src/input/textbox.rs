//! Free-text input.
use std::fmt;
use std::sync::Arc;
use serde_json::{Number, Value};

use super::{group_classes, validate_leaf, Blueprint, Class, Entry, Input, Outcome};
use crate::error::FormError;
use crate::html::{Element, Node};
use crate::options::{expect_kind, render_help, Label, Options};
use crate::ty::Ty;

/// `type` attribute of the `<input>`; `Textarea` renders a `<textarea>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextType {
    #[default]
    Text,
    Textarea,
    Password,
    Color,
    Date,
    Datetime,
    DatetimeLocal,
    Email,
    Month,
    Number,
    Range,
    Search,
    Tel,
    Time,
    Url,
    Week,
}

impl TextType {
    pub fn as_str(self) -> &'static str {
        match self {
            TextType::Text => "text",
            TextType::Textarea => "textarea",
            TextType::Password => "password",
            TextType::Color => "color",
            TextType::Date => "date",
            TextType::Datetime => "datetime",
            TextType::DatetimeLocal => "datetime-local",
            TextType::Email => "email",
            TextType::Month => "month",
            TextType::Number => "number",
            TextType::Range => "range",
            TextType::Search => "search",
            TextType::Tel => "tel",
            TextType::Time => "time",
            TextType::Url => "url",
            TextType::Week => "week",
        }
    }
}

/// Converts between domain values and the text shown in the control.
#[derive(Clone)]
pub struct I17n {
    format: Arc<dyn Fn(&Value) -> String + Send + Sync>,
    parse: Arc<dyn Fn(&str) -> Value + Send + Sync>,
}

impl I17n {
    pub fn new(
        format: impl Fn(&Value) -> String + Send + Sync + 'static,
        parse: impl Fn(&str) -> Value + Send + Sync + 'static,
    ) -> Self {
        Self { format: Arc::new(format), parse: Arc::new(parse) }
    }

    pub fn text() -> Self {
        Self::new(display, |s| Value::String(s.to_string()))
    }

    /// Numeric text parses to a JSON number; anything else stays a string
    /// so validation can report it.
    pub fn number() -> Self {
        Self::new(display, |s| {
            if let Ok(i) = s.parse::<i64>() {
                return Value::Number(i.into());
            }
            match s.parse::<f64>().ok().and_then(Number::from_f64) {
                Some(n) => Value::Number(n),
                None => Value::String(s.to_string()),
            }
        })
    }

    /// Numbers for `Num`/`Int` primitives, text otherwise.
    pub fn for_type(ty: &Ty) -> Self {
        match ty.strip_wrappers() {
            Ty::Primitive { name, .. } if name == "Num" || name == "Int" => Self::number(),
            _ => Self::text(),
        }
    }

    pub fn format(&self, value: &Value) -> String {
        (self.format)(value)
    }
    pub fn parse(&self, text: &str) -> Value {
        (self.parse)(text)
    }
}

impl fmt::Debug for I17n {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("I17n { .. }")
    }
}

fn display(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, Default)]
pub struct TextboxOpts {
    pub type_attr: Option<TextType>,
    pub placeholder: Option<String>,
    pub i17n: Option<I17n>,
}

#[derive(Debug)]
struct TextboxSpec {
    ty: Ty,
    type_attr: TextType,
    placeholder: Option<String>,
    i17n: I17n,
    label: Option<Label>,
    help: Option<String>,
    group_classes: Vec<String>,
    default_value: Option<Value>,
}

#[derive(Debug)]
struct TextboxClass(Arc<TextboxSpec>);

/// Textbox factory. Accepts any type.
pub fn textbox(ty: &Ty, options: Options) -> Result<Class, FormError> {
    let Options { value, label, help, group_classes, kind } = options;
    let opts: TextboxOpts = expect_kind!(kind, Textbox, "textbox");
    Ok(Arc::new(TextboxClass(Arc::new(TextboxSpec {
        ty: ty.clone(),
        type_attr: opts.type_attr.unwrap_or_default(),
        placeholder: opts.placeholder,
        i17n: opts.i17n.unwrap_or_else(|| I17n::for_type(ty)),
        label,
        help,
        group_classes,
        default_value: value,
    }))))
}

impl Blueprint for TextboxClass {
    fn ty(&self) -> &Ty {
        &self.0.ty
    }
    fn mount(&self, initial: Option<&Value>) -> Box<dyn Input> {
        let spec = Arc::clone(&self.0);
        let text = initial
            .or(spec.default_value.as_ref())
            .map(|v| spec.i17n.format(v))
            .unwrap_or_default();
        Box::new(Textbox { spec, text, has_error: false })
    }
}

#[derive(Debug)]
pub struct Textbox {
    spec: Arc<TextboxSpec>,
    text: String,
    has_error: bool,
}

impl Textbox {
    pub fn text(&self) -> &str {
        &self.text
    }
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }
}

impl Input for Textbox {
    fn ty(&self) -> &Ty {
        &self.spec.ty
    }
    fn has_error(&self) -> bool {
        self.has_error
    }

    fn raw_value(&self) -> Value {
        let text = self.text.trim();
        if text.is_empty() { Value::Null } else { self.spec.i17n.parse(text) }
    }

    fn get_value(&mut self, _depth: usize) -> Outcome {
        let raw = self.raw_value();
        validate_leaf(&self.spec.ty, &raw, &mut self.has_error)
    }

    fn enter(&mut self, entry: Entry) -> Result<(), FormError> {
        match entry {
            Entry::Text(text) => {
                self.set_text(text);
                Ok(())
            }
            other => Err(FormError::EntryMismatch { input: "textbox", entry: other.name() }),
        }
    }

    fn render(&self) -> Node {
        let spec = &self.spec;
        let control = if spec.type_attr == TextType::Textarea {
            Element::new("textarea")
                .class("form-control")
                .opt_attr("placeholder", spec.placeholder.clone())
                .child(Node::text(&self.text))
        } else {
            Element::new("input")
                .class("form-control")
                .attr("type", spec.type_attr.as_str())
                .attr("value", &self.text)
                .opt_attr("placeholder", spec.placeholder.clone())
        };
        Element::new("div")
            .class(group_classes(self.has_error, &spec.group_classes))
            .opt_child(Label::render(spec.label.as_ref()))
            .child(control)
            .opt_child(render_help(spec.help.as_deref()))
            .into()
    }
}
