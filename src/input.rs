//! The input protocol shared by leaves and composites.
//!
//! A factory builds a `Class` once (options resolved, children built); a
//! `Class` mounts any number of live `Input`s. Composites only ever call
//! `get_value(depth + 1)` on their children, so leaves and composites nest
//! freely.
pub mod checkbox;
pub mod radio;
pub mod select;
pub mod textbox;

use std::fmt;
use std::sync::Arc;
use serde_json::Value;
use tracing::trace;

use crate::error::FormError;
use crate::html::Node;
use crate::list::ListAction;
use crate::ty::Ty;
use crate::validate::{validate, Errors, Validation};

pub use checkbox::checkbox;
pub use radio::radio;
pub use select::select;
pub use textbox::textbox;

/// Built, immutable input description. Mount it to get a live input.
pub trait Blueprint: fmt::Debug + Send + Sync {
    fn ty(&self) -> &Ty;
    /// `initial` overrides the class's default value; `Some(&Value::Null)`
    /// mounts an empty input.
    fn mount(&self, initial: Option<&Value>) -> Box<dyn Input>;
}

pub type Class = Arc<dyn Blueprint>;

/// What `get_value` hands back.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Valid(Value),
    Invalid(Errors),
    /// root (depth 0) failure of a composite
    Absent,
}

impl Outcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, Outcome::Valid(_))
    }
    pub fn into_value(self) -> Option<Value> {
        match self {
            Outcome::Valid(v) => Some(v),
            _ => None,
        }
    }
    pub fn errors(&self) -> Option<&Errors> {
        match self {
            Outcome::Invalid(e) => Some(e),
            _ => None,
        }
    }

    /// Composite failure: only the root swallows the errors.
    pub(crate) fn failed(errors: Errors, depth: usize) -> Self {
        if depth == 0 { Outcome::Absent } else { Outcome::Invalid(errors) }
    }

    pub(crate) fn settle(validation: Validation, depth: usize) -> Self {
        match validation {
            Validation::Valid(v) => Outcome::Valid(v),
            Validation::Invalid(e) => Outcome::failed(e, depth),
        }
    }
}

impl From<Validation> for Outcome {
    fn from(v: Validation) -> Self {
        match v {
            Validation::Valid(v) => Outcome::Valid(v),
            Validation::Invalid(e) => Outcome::Invalid(e),
        }
    }
}

/// A user edit, as a browser control would receive it.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    Text(String),
    Choice(Option<String>),
    Toggle(bool),
}

impl Entry {
    pub fn name(&self) -> &'static str {
        match self {
            Entry::Text(_) => "text",
            Entry::Choice(_) => "choice",
            Entry::Toggle(_) => "toggle",
        }
    }
}

pub trait Input: fmt::Debug {
    fn ty(&self) -> &Ty;
    fn has_error(&self) -> bool;

    /// Current entry, not validated. Empty reads as `null`.
    fn raw_value(&self) -> Value;

    fn get_value(&mut self, depth: usize) -> Outcome;

    fn render(&self) -> Node;

    fn enter(&mut self, entry: Entry) -> Result<(), FormError> {
        Err(FormError::EntryMismatch { input: "composite", entry: entry.name() })
    }

    /// Mounted child by field name or row index.
    fn child_mut(&mut self, _segment: &str) -> Option<&mut (dyn Input + 'static)> {
        None
    }

    /// Structural list mutation; `Ok(false)` when gated off.
    fn act(&mut self, _action: ListAction) -> Result<bool, FormError> {
        Err(FormError::NotAList(self.ty().name()))
    }

    /// Root call.
    fn value(&mut self) -> Option<Value> {
        self.get_value(0).into_value()
    }
}

/// Walk `path` (field names / row indices) down from `root`.
pub fn at_mut<'a>(root: &'a mut (dyn Input + 'static), path: &[&str]) -> Option<&'a mut (dyn Input + 'static)> {
    let mut current = root;
    for segment in path {
        current = current.child_mut(segment)?;
    }
    Some(current)
}

/// Leaf `get_value`: validate the raw entry and flag it, at any depth.
pub(crate) fn validate_leaf(ty: &Ty, raw: &Value, has_error: &mut bool) -> Outcome {
    let validation = validate(raw, ty);
    *has_error = !validation.is_valid();
    trace!(ty = %ty.name(), valid = !*has_error, "leaf validated");
    validation.into()
}

/// Enumeration behind `ty`, or a construction error naming `input`.
pub(crate) fn expect_enumeration<'t>(
    ty: &'t Ty,
    input: &'static str,
) -> Result<&'t indexmap::IndexMap<String, String>, FormError> {
    ty.enum_values().ok_or_else(|| FormError::InvalidType {
        input,
        expected: "an enumeration",
        actual: ty.name(),
    })
}

pub(crate) fn group_classes(has_error: bool, extra: &[String]) -> String {
    crate::html::class_names(&[("form-group", true), ("has-error", has_error)], extra)
}
