//! Boolean toggle.
use std::sync::Arc;
use serde_json::Value;

use super::{group_classes, validate_leaf, Blueprint, Class, Entry, Input, Outcome};
use crate::error::FormError;
use crate::html::{Element, Node};
use crate::options::{render_help, KindOptions, Label, Options};
use crate::ty::Ty;

#[derive(Debug)]
struct CheckboxSpec {
    ty: Ty,
    label: Option<Label>,
    help: Option<String>,
    group_classes: Vec<String>,
    default_value: Option<Value>,
}

#[derive(Debug)]
struct CheckboxClass(Arc<CheckboxSpec>);

/// Checkbox factory. Only `Bool` or refinements of it: a checkbox is never
/// empty, so an optional type is rejected.
pub fn checkbox(ty: &Ty, options: Options) -> Result<Class, FormError> {
    let is_bool = matches!(ty.strip_refinements(), Ty::Primitive { name, .. } if name == "Bool");
    if !is_bool {
        return Err(FormError::InvalidType { input: "checkbox", expected: "Bool", actual: ty.name() });
    }
    let Options { value, label, help, group_classes, kind } = options;
    match kind {
        KindOptions::Unset | KindOptions::Checkbox => {}
        other => return Err(FormError::OptionsMismatch { input: "checkbox".into(), options: other.name() }),
    }
    Ok(Arc::new(CheckboxClass(Arc::new(CheckboxSpec {
        ty: ty.clone(),
        label,
        help,
        group_classes,
        default_value: value,
    }))))
}

impl Blueprint for CheckboxClass {
    fn ty(&self) -> &Ty {
        &self.0.ty
    }
    fn mount(&self, initial: Option<&Value>) -> Box<dyn Input> {
        let spec = Arc::clone(&self.0);
        let checked = initial
            .or(spec.default_value.as_ref())
            .and_then(Value::as_bool)
            .unwrap_or(false);
        Box::new(Checkbox { spec, checked, has_error: false })
    }
}

#[derive(Debug)]
pub struct Checkbox {
    spec: Arc<CheckboxSpec>,
    checked: bool,
    has_error: bool,
}

impl Checkbox {
    pub fn checked(&self) -> bool {
        self.checked
    }
}

impl Input for Checkbox {
    fn ty(&self) -> &Ty {
        &self.spec.ty
    }
    fn has_error(&self) -> bool {
        self.has_error
    }

    fn raw_value(&self) -> Value {
        Value::Bool(self.checked)
    }

    fn get_value(&mut self, _depth: usize) -> Outcome {
        let raw = self.raw_value();
        validate_leaf(&self.spec.ty, &raw, &mut self.has_error)
    }

    fn enter(&mut self, entry: Entry) -> Result<(), FormError> {
        match entry {
            Entry::Toggle(on) => {
                self.checked = on;
                Ok(())
            }
            other => Err(FormError::EntryMismatch { input: "checkbox", entry: other.name() }),
        }
    }

    fn render(&self) -> Node {
        let spec = &self.spec;
        let control = Element::new("input").attr("type", "checkbox").flag("checked", self.checked);
        let mut label = Element::new("label").child(control).child(Node::text(" "));
        if let Some(l) = &spec.label {
            label = label.child(l.content());
        }
        Element::new("div")
            .class(group_classes(self.has_error, &spec.group_classes))
            .child(Element::new("div").class("checkbox").child(label))
            .opt_child(render_help(spec.help.as_deref()))
            .into()
    }
}
