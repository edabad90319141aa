//! Radio group over an enumeration.
use std::sync::Arc;
use serde_json::Value;
use uuid::Uuid;

use super::{expect_enumeration, group_classes, validate_leaf, Blueprint, Class, Entry, Input, Outcome};
use crate::error::FormError;
use crate::html::{Element, Node};
use crate::options::{expect_kind, render_help, Label, Options};
use crate::ty::Ty;
use crate::util::{choices, Choice, ChoiceOrder};

#[derive(Debug, Clone, Default)]
pub struct RadioOpts {
    pub order: Option<ChoiceOrder>,
}

#[derive(Debug)]
struct RadioSpec {
    ty: Ty,
    /// shared `name` of the group's buttons
    name: String,
    choices: Vec<Choice>,
    label: Option<Label>,
    help: Option<String>,
    group_classes: Vec<String>,
    default_value: Option<Value>,
}

#[derive(Debug)]
struct RadioClass(Arc<RadioSpec>);

/// Radio factory. Only enumerations, possibly wrapped.
pub fn radio(ty: &Ty, options: Options) -> Result<Class, FormError> {
    let values = expect_enumeration(ty, "radio")?;
    let Options { value, label, help, group_classes, kind } = options;
    let opts: RadioOpts = expect_kind!(kind, Radio, "radio");
    Ok(Arc::new(RadioClass(Arc::new(RadioSpec {
        ty: ty.clone(),
        name: Uuid::new_v4().to_string(),
        choices: choices(values, opts.order, None),
        label,
        help,
        group_classes,
        default_value: value,
    }))))
}

impl Blueprint for RadioClass {
    fn ty(&self) -> &Ty {
        &self.0.ty
    }
    fn mount(&self, initial: Option<&Value>) -> Box<dyn Input> {
        let spec = Arc::clone(&self.0);
        let checked = initial
            .or(spec.default_value.as_ref())
            .and_then(Value::as_str)
            .filter(|v| spec.choices.iter().any(|c| c.value == *v))
            .map(str::to_string);
        Box::new(Radio { spec, checked, has_error: false })
    }
}

#[derive(Debug)]
pub struct Radio {
    spec: Arc<RadioSpec>,
    checked: Option<String>,
    has_error: bool,
}

impl Radio {
    pub fn checked(&self) -> Option<&str> {
        self.checked.as_deref()
    }
    pub fn group_name(&self) -> &str {
        &self.spec.name
    }
}

impl Input for Radio {
    fn ty(&self) -> &Ty {
        &self.spec.ty
    }
    fn has_error(&self) -> bool {
        self.has_error
    }

    fn raw_value(&self) -> Value {
        self.checked.clone().map(Value::String).unwrap_or(Value::Null)
    }

    fn get_value(&mut self, _depth: usize) -> Outcome {
        let raw = self.raw_value();
        validate_leaf(&self.spec.ty, &raw, &mut self.has_error)
    }

    fn enter(&mut self, entry: Entry) -> Result<(), FormError> {
        match entry {
            Entry::Choice(None) => {
                self.checked = None;
                Ok(())
            }
            Entry::Choice(Some(v)) if self.spec.choices.iter().any(|c| c.value == v) => {
                self.checked = Some(v);
                Ok(())
            }
            Entry::Choice(Some(v)) => Err(FormError::UnknownChoice { ty: self.spec.ty.name(), value: v }),
            other => Err(FormError::EntryMismatch { input: "radio", entry: other.name() }),
        }
    }

    fn render(&self) -> Node {
        let spec = &self.spec;
        let radios = spec.choices.iter().map(|c| {
            let button = Element::new("input")
                .attr("type", "radio")
                .attr("name", &spec.name)
                .attr("value", &c.value)
                .flag("checked", self.checked.as_deref() == Some(c.value.as_str()));
            Element::new("div")
                .class("radio")
                .child(Element::new("label").child(button).child(Node::text(&c.text)))
                .into()
        });
        Element::new("div")
            .class(group_classes(self.has_error, &spec.group_classes))
            .opt_child(Label::render(spec.label.as_ref()))
            .children(radios)
            .opt_child(render_help(spec.help.as_deref()))
            .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn size() -> Ty {
        Ty::enumeration("Size", [("s", "Small"), ("m", "Medium"), ("l", "Large")])
    }

    #[test]
    fn nothing_checked_reads_as_null() {
        let mut input = radio(&size(), Options::new()).unwrap().mount(None);
        assert_eq!(input.raw_value(), Value::Null);
        assert!(matches!(input.get_value(2), Outcome::Invalid(_)));
        input.enter(Entry::Choice(Some("m".into()))).unwrap();
        assert_eq!(input.value(), Some(json!("m")));
        assert!(!input.has_error());
    }

    #[test]
    fn buttons_share_one_group_name() {
        let input = radio(&size(), Options::new().value(json!("l"))).unwrap().mount(None);
        let node = input.render();
        let buttons = node.find_all(&|e| e.tag == "input");
        assert_eq!(buttons.len(), 3);
        let name = buttons[0].get_attr("name").unwrap();
        assert!(buttons.iter().all(|b| b.get_attr("name") == Some(name)));
        assert!(node.to_html().contains(r#"value="l" checked"#));
    }

    #[test]
    fn classes_get_distinct_group_names() {
        let a = radio(&size(), Options::new()).unwrap().mount(None);
        let b = radio(&size(), Options::new()).unwrap().mount(None);
        let name = |n: &Node| n.find_all(&|e| e.tag == "input")[0].get_attr("name").map(str::to_string);
        assert_ne!(name(&a.render()), name(&b.render()));
    }

    #[test]
    fn non_enumeration_is_a_construction_error() {
        assert!(radio(&Ty::bool(), Options::new()).is_err());
    }
}
