//! JSON descriptor documents → `Ty`.
//!
//! ```json
//! { "kind": "product", "name": "Person", "fields": {
//!     "name": "Str",
//!     "age":  { "kind": "optional", "of": { "kind": "refinement", "of": "Int", "rules": [{ "minimum": 0 }] } },
//!     "tags": { "kind": "sequence", "of": "Str" }
//! } }
//! ```
//! A bare string names a built-in primitive (`Str`, `Num`, `Int`, `Bool`).
use std::path::Path;
use indexmap::IndexMap;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use crate::error::FormError;
use crate::ty::{Predicate, Ty};

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TypeDoc {
    Name(String),
    Node(NodeDoc),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeDoc {
    Primitive {
        name: String,
    },
    Optional {
        of: Box<TypeDoc>,
    },
    Refinement {
        #[serde(default)]
        name: Option<String>,
        of: Box<TypeDoc>,
        #[serde(default)]
        rules: Vec<Rule>,
    },
    Enumeration {
        #[serde(default)]
        name: Option<String>,
        values: IndexMap<String, String>,
    },
    Product {
        #[serde(default)]
        name: Option<String>,
        fields: IndexMap<String, TypeDoc>,
    },
    Sequence {
        #[serde(default)]
        name: Option<String>,
        of: Box<TypeDoc>,
    },
}

/// Declarative refinement rules. All rules of a refinement must hold.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    Minimum(f64),
    Maximum(f64),
    MinLength(usize),
    MaxLength(usize),
    Pattern(String),
    MinItems(usize),
    MaxItems(usize),
}

// compiled form of `Rule`
enum Check {
    Minimum(f64),
    Maximum(f64),
    MinLength(usize),
    MaxLength(usize),
    Pattern(Regex),
    MinItems(usize),
    MaxItems(usize),
}

impl Check {
    fn holds(&self, value: &Value) -> bool {
        let chars = || value.as_str().map(|s| s.chars().count());
        let items = || value.as_array().map(Vec::len);
        match self {
            Check::Minimum(m) => value.as_f64().is_some_and(|n| n >= *m),
            Check::Maximum(m) => value.as_f64().is_some_and(|n| n <= *m),
            Check::MinLength(m) => chars().is_some_and(|n| n >= *m),
            Check::MaxLength(m) => chars().is_some_and(|n| n <= *m),
            Check::Pattern(rx) => value.as_str().is_some_and(|s| rx.is_match(s)),
            Check::MinItems(m) => items().is_some_and(|n| n >= *m),
            Check::MaxItems(m) => items().is_some_and(|n| n <= *m),
        }
    }
}

fn compile(rules: &[Rule]) -> Result<Predicate, FormError> {
    let checks = rules
        .iter()
        .map(|rule| {
            Ok(match rule {
                Rule::Minimum(m) => Check::Minimum(*m),
                Rule::Maximum(m) => Check::Maximum(*m),
                Rule::MinLength(m) => Check::MinLength(*m),
                Rule::MaxLength(m) => Check::MaxLength(*m),
                Rule::MinItems(m) => Check::MinItems(*m),
                Rule::MaxItems(m) => Check::MaxItems(*m),
                Rule::Pattern(p) => Check::Pattern(Regex::new(p).map_err(|source| FormError::Pattern {
                    pattern: p.clone(),
                    source,
                })?),
            })
        })
        .collect::<Result<Vec<_>, FormError>>()?;
    Ok(Predicate::new(move |v| checks.iter().all(|c| c.holds(v))))
}

impl TypeDoc {
    pub fn into_ty(self) -> Result<Ty, FormError> {
        match self {
            TypeDoc::Name(name) => primitive(&name),
            TypeDoc::Node(node) => node.into_ty(),
        }
    }
}

fn primitive(name: &str) -> Result<Ty, FormError> {
    Ty::builtin(name).ok_or_else(|| FormError::UnknownPrimitive(name.to_string()))
}

impl NodeDoc {
    pub fn into_ty(self) -> Result<Ty, FormError> {
        Ok(match self {
            NodeDoc::Primitive { name } => primitive(&name)?,
            NodeDoc::Optional { of } => Ty::Optional(Box::new(of.into_ty()?)),
            NodeDoc::Refinement { name, of, rules } => {
                let of = of.into_ty()?;
                let name = name.unwrap_or_else(|| format!("Refinement<{}>", of.name()));
                Ty::Refinement { name, of: Box::new(of), predicate: compile(&rules)? }
            }
            NodeDoc::Enumeration { name, values } => Ty::Enumeration {
                name: name.unwrap_or_else(|| "Enums".to_string()),
                values,
            },
            NodeDoc::Product { name, fields } => Ty::Product {
                name: name.unwrap_or_else(|| "Struct".to_string()),
                fields: fields
                    .into_iter()
                    .map(|(k, t)| Ok((k, t.into_ty()?)))
                    .collect::<Result<IndexMap<_, _>, FormError>>()?,
            },
            NodeDoc::Sequence { name, of } => Ty::Sequence { name, of: Box::new(of.into_ty()?) },
        })
    }
}

pub fn from_json_str(src: &str) -> Result<Ty, FormError> {
    crate::path_de::from_str_with_path::<TypeDoc>(src)?.into_ty()
}

pub fn from_value(value: Value) -> Result<Ty, FormError> {
    crate::path_de::from_value_with_path::<TypeDoc>(value)?.into_ty()
}

pub fn load(path: &Path) -> Result<Ty, FormError> {
    let source = std::fs::read_to_string(path)?;
    from_json_str(&source)
}
