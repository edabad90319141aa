//! Structural kind → input factory.
//!
//! Resolution strips wrappers first, then looks the kind up; a by-name entry
//! narrows further by the stripped type's name. Anything unmatched gets a
//! textbox, so every type can be rendered even with a partial registry.
use std::fmt;
use std::sync::Arc;
use indexmap::IndexMap;
use tracing::debug;

use crate::error::FormError;
use crate::input::{checkbox, radio, select, textbox, Class};
use crate::options::Options;
use crate::settings::Settings;
use crate::ty::{Kind, Ty};

/// User-supplied input factory.
pub trait CustomFactory: Send + Sync {
    fn name(&self) -> &str;
    fn build(&self, ty: &Ty, options: Options, settings: &Settings) -> Result<Class, FormError>;
}

#[derive(Clone)]
pub enum Factory {
    Textbox,
    Select,
    Radio,
    Checkbox,
    Form,
    List,
    Custom(Arc<dyn CustomFactory>),
}

impl Factory {
    pub fn build(&self, ty: &Ty, options: Options, settings: &Settings) -> Result<Class, FormError> {
        match self {
            Factory::Textbox => textbox(ty, options),
            Factory::Select => select(ty, options),
            Factory::Radio => radio(ty, options),
            Factory::Checkbox => checkbox(ty, options),
            Factory::Form => crate::form::create_form(ty, options, settings),
            Factory::List => crate::list::create_list(ty, options, settings),
            Factory::Custom(custom) => custom.build(ty, options, settings),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Factory::Textbox => "textbox",
            Factory::Select => "select",
            Factory::Radio => "radio",
            Factory::Checkbox => "checkbox",
            Factory::Form => "form",
            Factory::List => "list",
            Factory::Custom(custom) => custom.name(),
        }
    }

    pub fn custom(factory: impl CustomFactory + 'static) -> Self {
        Factory::Custom(Arc::new(factory))
    }
}

impl PartialEq for Factory {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Factory::Custom(a), Factory::Custom(b)) => Arc::ptr_eq(a, b),
            (Factory::Custom(_), _) | (_, Factory::Custom(_)) => false,
            (a, b) => std::mem::discriminant(a) == std::mem::discriminant(b),
        }
    }
}

impl fmt::Debug for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Factory::Custom(custom) => write!(f, "Custom({})", custom.name()),
            other => f.write_str(other.name()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    Factory(Factory),
    /// keyed by the stripped type's name; misses fall back to the textbox
    ByName(IndexMap<String, Factory>),
}

#[derive(Debug, Clone)]
pub struct Registry {
    entries: IndexMap<Kind, Entry>,
}

impl Default for Registry {
    fn default() -> Self {
        let mut entries = IndexMap::new();
        entries.insert(
            Kind::Primitive,
            Entry::ByName(IndexMap::from([("Bool".to_string(), Factory::Checkbox)])),
        );
        entries.insert(Kind::Enumeration, Entry::Factory(Factory::Select));
        entries.insert(Kind::Product, Entry::Factory(Factory::Form));
        entries.insert(Kind::Sequence, Entry::Factory(Factory::List));
        Self { entries }
    }
}

impl Registry {
    /// No entries at all: everything resolves to the textbox.
    pub fn empty() -> Self {
        Self { entries: IndexMap::new() }
    }

    pub fn register(&mut self, kind: Kind, entry: Entry) -> Result<&mut Self, FormError> {
        if kind.is_wrapper() {
            return Err(FormError::WrapperKind(kind));
        }
        self.entries.insert(kind, entry);
        Ok(self)
    }

    /// Add one by-name factory. A single-factory entry for `kind` is replaced
    /// by a by-name map.
    pub fn register_named(&mut self, kind: Kind, name: impl Into<String>, factory: Factory) -> Result<&mut Self, FormError> {
        if kind.is_wrapper() {
            return Err(FormError::WrapperKind(kind));
        }
        let entry = self.entries.entry(kind).or_insert_with(|| Entry::ByName(IndexMap::new()));
        if let Entry::Factory(_) = entry {
            *entry = Entry::ByName(IndexMap::new());
        }
        if let Entry::ByName(map) = entry {
            map.insert(name.into(), factory);
        }
        Ok(self)
    }

    pub fn entry(&self, kind: Kind) -> Option<&Entry> {
        self.entries.get(&kind)
    }

    pub fn resolve(&self, ty: &Ty) -> Factory {
        let stripped = ty.strip_wrappers();
        let kind = stripped.kind();
        let factory = match self.entries.get(&kind) {
            Some(Entry::Factory(f)) => Some(f.clone()),
            Some(Entry::ByName(map)) => map.get(&stripped.name()).cloned(),
            None => None,
        };
        match factory {
            Some(f) => {
                debug!(ty = %ty.name(), %kind, input = f.name(), "resolved input");
                f
            }
            None => {
                debug!(ty = %ty.name(), %kind, "no registry entry, falling back to textbox");
                Factory::Textbox
            }
        }
    }
}
