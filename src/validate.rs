//! Validation of JSON values against `Ty` descriptors.
//!
//! Validation never fails with `Err`: the outcome is data, either the
//! normalized value or every violation found, in traversal order.
use std::fmt;
use serde_json::{Map, Value};

use crate::ty::Ty;

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub message: String,
    /// the offending value
    pub actual: Value,
    /// name of the type it failed against
    pub expected: String,
    /// field names / indices from the validated root
    pub path: Vec<String>,
}

impl ValidationError {
    fn new(actual: &Value, ty: &Ty, path: &[String]) -> Self {
        let expected = ty.name();
        let message = message(actual, &expected, path);
        Self { message, actual: actual.clone(), expected, path: path.to_vec() }
    }

    /// JSON-pointer style rendering of `path` (`/` for the root).
    pub fn pointer(&self) -> String {
        pointer(&self.path)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

fn message(actual: &Value, expected: &str, path: &[String]) -> String {
    format!("invalid value {actual} supplied to {}, expected {expected}", pointer(path))
}

fn pointer(path: &[String]) -> String {
    if path.is_empty() {
        return "/".to_string();
    }
    path.iter().map(|p| format!("/{p}")).collect()
}

/// Ordered sequence of violations.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Errors(Vec<ValidationError>);

impl Errors {
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
    pub fn len(&self) -> usize { self.0.len() }
    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> { self.0.iter() }
    pub fn as_slice(&self) -> &[ValidationError] { &self.0 }
    pub fn into_vec(self) -> Vec<ValidationError> { self.0 }

    pub fn push(&mut self, error: ValidationError) {
        self.0.push(error);
    }
    pub fn extend(&mut self, other: Errors) {
        self.0.extend(other.0);
    }

    /// Re-root every path under `segment`. Composites call this on child errors.
    pub fn within(mut self, segment: impl Into<String>) -> Self {
        let segment = segment.into();
        for error in &mut self.0 {
            error.path.insert(0, segment.clone());
            error.message = message(&error.actual, &error.expected, &error.path);
        }
        self
    }

    pub fn paths(&self) -> Vec<String> {
        self.0.iter().map(ValidationError::pointer).collect()
    }
}

impl From<Vec<ValidationError>> for Errors {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self(errors)
    }
}

impl IntoIterator for Errors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl fmt::Display for Errors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Validation {
    Valid(Value),
    Invalid(Errors),
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        matches!(self, Validation::Valid(_))
    }
    pub fn into_result(self) -> Result<Value, Errors> {
        match self {
            Validation::Valid(v) => Ok(v),
            Validation::Invalid(e) => Err(e),
        }
    }
}

// ------------------------------ Validate --------------------------------- //

/// Validate `value` against `ty`. Products come back with exactly their
/// declared fields (absent ones as `null`), in declaration order.
pub fn validate(value: &Value, ty: &Ty) -> Validation {
    let mut path = Vec::new();
    let mut errors = Vec::new();
    let out = check(value, ty, &mut path, &mut errors);
    if errors.is_empty() {
        Validation::Valid(out)
    } else {
        Validation::Invalid(Errors(errors))
    }
}

fn check(value: &Value, ty: &Ty, path: &mut Vec<String>, errors: &mut Vec<ValidationError>) -> Value {
    match ty {
        Ty::Primitive { predicate, .. } => {
            if !predicate.test(value) {
                errors.push(ValidationError::new(value, ty, path));
            }
            value.clone()
        }
        Ty::Optional(of) => {
            if value.is_null() { Value::Null } else { check(value, of, path, errors) }
        }
        Ty::Refinement { of, predicate, .. } => {
            let before = errors.len();
            let out = check(value, of, path, errors);
            // the predicate only sees values of the right shape
            if errors.len() == before && !predicate.test(&out) {
                errors.push(ValidationError::new(value, ty, path));
            }
            out
        }
        Ty::Enumeration { values, .. } => {
            if !value.as_str().is_some_and(|s| values.contains_key(s)) {
                errors.push(ValidationError::new(value, ty, path));
            }
            value.clone()
        }
        Ty::Product { fields, .. } => {
            let Some(object) = value.as_object() else {
                errors.push(ValidationError::new(value, ty, path));
                return value.clone();
            };
            let mut out = Map::with_capacity(fields.len());
            for (name, field_ty) in fields {
                let field_value = object.get(name).unwrap_or(&Value::Null);
                path.push(name.clone());
                let checked = check(field_value, field_ty, path, errors);
                path.pop();
                out.insert(name.clone(), checked);
            }
            Value::Object(out)
        }
        Ty::Sequence { of, .. } => {
            let Some(items) = value.as_array() else {
                errors.push(ValidationError::new(value, ty, path));
                return value.clone();
            };
            let mut out = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                path.push(i.to_string());
                out.push(check(item, of, path, errors));
                path.pop();
            }
            Value::Array(out)
        }
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn person() -> Ty {
        Ty::product("Person", [
            ("name", Ty::str()),
            ("age", Ty::optional(Ty::int())),
            ("tags", Ty::sequence(Ty::str())),
        ])
    }

    #[test]
    fn product_normalizes_missing_optional_fields() {
        let v = validate(&json!({"name": "Ada", "tags": []}), &person());
        assert_eq!(v, Validation::Valid(json!({"name": "Ada", "age": null, "tags": []})));
    }

    #[test]
    fn errors_follow_traversal_order_with_paths() {
        let v = validate(&json!({"name": 1, "age": "x", "tags": ["ok", 2]}), &person());
        let Validation::Invalid(errors) = v else { panic!("expected errors") };
        assert_eq!(errors.paths(), vec!["/name", "/age", "/tags/1"]);
        assert_eq!(errors.as_slice()[0].expected, "Str");
        assert_eq!(errors.as_slice()[1].expected, "Int");
        assert_eq!(errors.as_slice()[2].actual, json!(2));
    }

    #[test]
    fn refinement_runs_after_the_inner_type() {
        let even = Ty::refinement("Even", Ty::int(), |v| v.as_i64().is_some_and(|n| n % 2 == 0));
        assert!(validate(&json!(4), &even).is_valid());
        let Validation::Invalid(errors) = validate(&json!(3), &even) else { panic!() };
        assert_eq!(errors.as_slice()[0].expected, "Even");
        // wrong shape reports the inner type only
        let Validation::Invalid(errors) = validate(&json!("x"), &even) else { panic!() };
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.as_slice()[0].expected, "Int");
    }

    #[test]
    fn enumeration_checks_keys_not_labels() {
        let country = Ty::enumeration("Country", [("IT", "Italy"), ("US", "United States")]);
        assert!(validate(&json!("IT"), &country).is_valid());
        assert!(!validate(&json!("Italy"), &country).is_valid());
        assert!(!validate(&Value::Null, &country).is_valid());
    }

    #[test]
    fn within_prefixes_paths() {
        let Validation::Invalid(errors) = validate(&json!(1), &Ty::str()) else { panic!() };
        let errors = errors.within("name").within("0");
        assert_eq!(errors.paths(), vec!["/0/name"]);
        assert_eq!(errors.as_slice()[0].message, "invalid value 1 supplied to /0/name, expected Str");
        assert_eq!(errors.to_string(), errors.as_slice()[0].message);
    }
}
