//! Drop-down over an enumeration.
use std::sync::Arc;
use serde_json::Value;

use super::{expect_enumeration, group_classes, validate_leaf, Blueprint, Class, Entry, Input, Outcome};
use crate::error::FormError;
use crate::html::{Element, Node};
use crate::options::{expect_kind, render_help, Label, Options};
use crate::ty::Ty;
use crate::util::{choices, Choice, ChoiceOrder};

#[derive(Debug, Clone, Default)]
pub struct SelectOpts {
    /// first option; selecting it reads as `null`
    pub empty_option: Option<Choice>,
    pub order: Option<ChoiceOrder>,
}

#[derive(Debug)]
struct SelectSpec {
    ty: Ty,
    choices: Vec<Choice>,
    empty_value: Option<String>,
    label: Option<Label>,
    help: Option<String>,
    group_classes: Vec<String>,
    default_value: Option<Value>,
}

#[derive(Debug)]
struct SelectClass(Arc<SelectSpec>);

/// Select factory. Only enumerations, possibly wrapped.
pub fn select(ty: &Ty, options: Options) -> Result<Class, FormError> {
    let values = expect_enumeration(ty, "select")?;
    let Options { value, label, help, group_classes, kind } = options;
    let opts: SelectOpts = expect_kind!(kind, Select, "select");
    Ok(Arc::new(SelectClass(Arc::new(SelectSpec {
        ty: ty.clone(),
        choices: choices(values, opts.order, opts.empty_option.as_ref()),
        empty_value: opts.empty_option.map(|c| c.value),
        label,
        help,
        group_classes,
        default_value: value,
    }))))
}

impl SelectSpec {
    fn has_choice(&self, value: &str) -> bool {
        self.choices.iter().any(|c| c.value == value)
    }
}

impl Blueprint for SelectClass {
    fn ty(&self) -> &Ty {
        &self.0.ty
    }
    fn mount(&self, initial: Option<&Value>) -> Box<dyn Input> {
        let spec = Arc::clone(&self.0);
        // like a browser: an unknown or missing value selects the first option
        let selected = initial
            .or(spec.default_value.as_ref())
            .and_then(Value::as_str)
            .filter(|v| spec.has_choice(v))
            .map(str::to_string)
            .or_else(|| spec.empty_value.clone())
            .or_else(|| spec.choices.first().map(|c| c.value.clone()));
        Box::new(Select { spec, selected, has_error: false })
    }
}

#[derive(Debug)]
pub struct Select {
    spec: Arc<SelectSpec>,
    selected: Option<String>,
    has_error: bool,
}

impl Select {
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }
}

impl Input for Select {
    fn ty(&self) -> &Ty {
        &self.spec.ty
    }
    fn has_error(&self) -> bool {
        self.has_error
    }

    fn raw_value(&self) -> Value {
        match &self.selected {
            Some(v) if Some(v) != self.spec.empty_value.as_ref() => Value::String(v.clone()),
            _ => Value::Null,
        }
    }

    fn get_value(&mut self, _depth: usize) -> Outcome {
        let raw = self.raw_value();
        validate_leaf(&self.spec.ty, &raw, &mut self.has_error)
    }

    fn enter(&mut self, entry: Entry) -> Result<(), FormError> {
        match entry {
            Entry::Choice(Some(v)) if self.spec.has_choice(&v) => {
                self.selected = Some(v);
                Ok(())
            }
            Entry::Choice(None) if self.spec.empty_value.is_some() => {
                self.selected = self.spec.empty_value.clone();
                Ok(())
            }
            Entry::Choice(v) => Err(FormError::UnknownChoice {
                ty: self.spec.ty.name(),
                value: v.unwrap_or_default(),
            }),
            other => Err(FormError::EntryMismatch { input: "select", entry: other.name() }),
        }
    }

    fn render(&self) -> Node {
        let spec = &self.spec;
        let options = spec.choices.iter().map(|c| {
            Element::new("option")
                .attr("value", &c.value)
                .flag("selected", self.selected.as_deref() == Some(c.value.as_str()))
                .child(Node::text(&c.text))
                .into()
        });
        Element::new("div")
            .class(group_classes(self.has_error, &spec.group_classes))
            .opt_child(Label::render(spec.label.as_ref()))
            .child(Element::new("select").class("form-control").children(options))
            .opt_child(render_help(spec.help.as_deref()))
            .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::KindOptions;
    use serde_json::json;

    fn country() -> Ty {
        Ty::enumeration("Country", [("US", "United States"), ("IT", "Italy")])
    }

    fn with_empty() -> Options {
        Options::new().kind(KindOptions::Select(SelectOpts {
            empty_option: Some(Choice::new("", "-")),
            order: Some(ChoiceOrder::Asc),
        }))
    }

    #[test]
    fn empty_option_reads_as_null() {
        let mut input = select(&Ty::optional(country()), with_empty()).unwrap().mount(None);
        assert_eq!(input.raw_value(), Value::Null);
        assert_eq!(input.value(), Some(Value::Null));
        input.enter(Entry::Choice(Some("IT".into()))).unwrap();
        assert_eq!(input.value(), Some(json!("IT")));
    }

    #[test]
    fn required_enumeration_rejects_the_empty_option() {
        let mut input = select(&country(), with_empty()).unwrap().mount(None);
        assert!(matches!(input.get_value(0), Outcome::Invalid(_)));
        assert!(input.has_error());
    }

    #[test]
    fn without_empty_option_the_first_choice_is_selected() {
        let mut input = select(&country(), Options::new()).unwrap().mount(None);
        assert_eq!(input.value(), Some(json!("US")));
        let input = select(&country(), Options::new().value(json!("IT"))).unwrap().mount(None);
        assert!(input.render().to_html().contains(r#"<option value="IT" selected>Italy</option>"#));
    }

    #[test]
    fn non_enumeration_is_a_construction_error() {
        let err = select(&Ty::str(), Options::new()).unwrap_err();
        assert!(matches!(err, FormError::InvalidType { input: "select", .. }));
    }

    #[test]
    fn unknown_choice_is_refused() {
        let mut input = select(&country(), Options::new()).unwrap().mount(None);
        assert!(matches!(input.enter(Entry::Choice(Some("FR".into()))), Err(FormError::UnknownChoice { .. })));
        assert!(input.enter(Entry::Choice(None)).is_err());
    }
}
