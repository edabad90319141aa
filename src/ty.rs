//! Structural type descriptors.
//!
//! Every `Ty` classifies into exactly one `Kind`. `Optional` and `Refinement`
//! are wrappers: transparent for input dispatch, but kept on the wrapping
//! descriptor so validation still sees them.
use std::fmt;
use std::sync::Arc;
use indexmap::IndexMap;
use serde_json::Value;

// ------------------------------- Kinds ----------------------------------- //

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kind {
    Primitive,
    Optional,
    Refinement,
    Enumeration,
    Product,
    Sequence,
}

impl Kind {
    /// Wrapper kinds never drive dispatch on their own.
    pub fn is_wrapper(self) -> bool {
        matches!(self, Kind::Optional | Kind::Refinement)
    }
    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Primitive => "primitive",
            Kind::Optional => "optional",
            Kind::Refinement => "refinement",
            Kind::Enumeration => "enumeration",
            Kind::Product => "product",
            Kind::Sequence => "sequence",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ----------------------------- Predicates -------------------------------- //

/// Shared, thread-safe value test used by primitives and refinements.
#[derive(Clone)]
pub struct Predicate(Arc<dyn Fn(&Value) -> bool + Send + Sync>);

impl Predicate {
    pub fn new(test: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(test))
    }
    pub fn test(&self, value: &Value) -> bool {
        (self.0)(value)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate(..)")
    }
}

// ----------------------------- Descriptors ------------------------------- //

#[derive(Debug, Clone)]
pub enum Ty {
    Primitive { name: String, predicate: Predicate },
    Optional(Box<Ty>),
    Refinement { name: String, of: Box<Ty>, predicate: Predicate },
    /// value → display label, in declaration order
    Enumeration { name: String, values: IndexMap<String, String> },
    /// field name → descriptor, in declaration order
    Product { name: String, fields: IndexMap<String, Ty> },
    Sequence { name: Option<String>, of: Box<Ty> },
}

impl Ty {
    pub fn primitive(
        name: impl Into<String>,
        test: impl Fn(&Value) -> bool + Send + Sync + 'static,
    ) -> Self {
        Ty::Primitive { name: name.into(), predicate: Predicate::new(test) }
    }
    pub fn str() -> Self { Self::primitive("Str", Value::is_string) }
    pub fn num() -> Self { Self::primitive("Num", Value::is_number) }
    pub fn int() -> Self {
        Self::primitive("Int", |v| {
            v.is_i64() || v.is_u64() || v.as_f64().is_some_and(|n| n.is_finite() && n.fract() == 0.0)
        })
    }
    pub fn bool() -> Self { Self::primitive("Bool", Value::is_boolean) }

    /// Built-in primitives by registered name.
    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            "Str" => Some(Self::str()),
            "Num" => Some(Self::num()),
            "Int" => Some(Self::int()),
            "Bool" => Some(Self::bool()),
            _ => None,
        }
    }

    pub fn optional(of: Ty) -> Self {
        Ty::Optional(Box::new(of))
    }
    pub fn refinement(
        name: impl Into<String>,
        of: Ty,
        test: impl Fn(&Value) -> bool + Send + Sync + 'static,
    ) -> Self {
        Ty::Refinement { name: name.into(), of: Box::new(of), predicate: Predicate::new(test) }
    }
    pub fn enumeration<K, L>(name: impl Into<String>, values: impl IntoIterator<Item = (K, L)>) -> Self
    where
        K: Into<String>,
        L: Into<String>,
    {
        Ty::Enumeration {
            name: name.into(),
            values: values.into_iter().map(|(k, l)| (k.into(), l.into())).collect(),
        }
    }
    pub fn product<K: Into<String>>(name: impl Into<String>, fields: impl IntoIterator<Item = (K, Ty)>) -> Self {
        Ty::Product {
            name: name.into(),
            fields: fields.into_iter().map(|(k, t)| (k.into(), t)).collect(),
        }
    }
    pub fn sequence(of: Ty) -> Self {
        Ty::Sequence { name: None, of: Box::new(of) }
    }

    pub fn kind(&self) -> Kind {
        match self {
            Ty::Primitive { .. } => Kind::Primitive,
            Ty::Optional(_) => Kind::Optional,
            Ty::Refinement { .. } => Kind::Refinement,
            Ty::Enumeration { .. } => Kind::Enumeration,
            Ty::Product { .. } => Kind::Product,
            Ty::Sequence { .. } => Kind::Sequence,
        }
    }

    /// First non-wrapper descriptor. Borrows; `self` keeps its wrappers.
    pub fn strip_wrappers(&self) -> &Ty {
        match self {
            Ty::Optional(of) | Ty::Refinement { of, .. } => of.strip_wrappers(),
            other => other,
        }
    }

    /// Like `strip_wrappers`, but stops at an `Optional`.
    pub fn strip_refinements(&self) -> &Ty {
        match self {
            Ty::Refinement { of, .. } => of.strip_refinements(),
            other => other,
        }
    }

    pub fn name(&self) -> String {
        match self {
            Ty::Primitive { name, .. }
            | Ty::Refinement { name, .. }
            | Ty::Enumeration { name, .. }
            | Ty::Product { name, .. } => name.clone(),
            Ty::Optional(of) => format!("{}?", of.name()),
            Ty::Sequence { name: Some(name), .. } => name.clone(),
            Ty::Sequence { name: None, of } => format!("List<{}>", of.name()),
        }
    }

    pub fn fields(&self) -> Option<&IndexMap<String, Ty>> {
        match self.strip_wrappers() {
            Ty::Product { fields, .. } => Some(fields),
            _ => None,
        }
    }
    pub fn enum_values(&self) -> Option<&IndexMap<String, String>> {
        match self.strip_wrappers() {
            Ty::Enumeration { values, .. } => Some(values),
            _ => None,
        }
    }
    pub fn item(&self) -> Option<&Ty> {
        match self.strip_wrappers() {
            Ty::Sequence { of, .. } => Some(of),
            _ => None,
        }
    }

    /// Shorthand for a successful `validate`.
    pub fn is(&self, value: &Value) -> bool {
        crate::validate::validate(value, self).is_valid()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn positive() -> Ty {
        Ty::refinement("Positive", Ty::num(), |v| v.as_f64().is_some_and(|n| n > 0.0))
    }

    #[test]
    fn wrappers_are_distinct_kinds() {
        assert_eq!(Ty::optional(Ty::str()).kind(), Kind::Optional);
        assert_eq!(positive().kind(), Kind::Refinement);
        assert!(Kind::Optional.is_wrapper() && Kind::Refinement.is_wrapper());
        assert!(!Kind::Product.is_wrapper());
    }

    #[test]
    fn strip_reaches_the_structural_type_and_keeps_the_wrappers() {
        let wrapped = Ty::optional(positive());
        let bare = wrapped.strip_wrappers();
        assert_eq!(bare.kind(), Kind::Primitive);
        assert_eq!(bare.name(), "Num");
        // wrapped type untouched
        assert_eq!(wrapped.kind(), Kind::Optional);
        assert!(wrapped.is(&Value::Null));
        assert!(!wrapped.is(&json!(-1)));
        assert!(!bare.is(&Value::Null));
    }

    #[test]
    fn names() {
        assert_eq!(Ty::optional(Ty::str()).name(), "Str?");
        assert_eq!(Ty::sequence(Ty::int()).name(), "List<Int>");
        let named = Ty::Sequence { name: Some("Tags".into()), of: Box::new(Ty::str()) };
        assert_eq!(named.name(), "Tags");
    }

    #[test]
    fn structural_accessors_see_through_wrappers() {
        let person = Ty::product("Person", [("name", Ty::str())]);
        let wrapped = Ty::optional(Ty::refinement("P", person, |_| true));
        assert!(wrapped.fields().is_some_and(|f| f.contains_key("name")));
        assert!(wrapped.item().is_none());
    }

    #[test]
    fn int_accepts_integral_floats() {
        assert!(Ty::int().is(&json!(3)));
        assert!(Ty::int().is(&json!(3.0)));
        assert!(!Ty::int().is(&json!(3.5)));
    }
}
