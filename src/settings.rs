//! Composition settings: the input registry plus presentation defaults.
//!
//! Built in code, or loaded from JSON:
//!
//! ```json
//! { "optional_text": " (opt)",
//!   "inputs": { "enumeration": "radio", "primitive": { "Bool": "checkbox", "Int": "textbox" } } }
//! ```
//! Kinds missing from `inputs` keep their defaults.
use std::path::Path;
use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::FormError;
use crate::registry::{Entry, Factory, Registry};
use crate::ty::Kind;

pub const DEFAULT_OPTIONAL_TEXT: &str = " (optional)";

#[derive(Debug, Clone)]
pub struct Settings {
    /// appended to labels/placeholders of optional fields
    pub optional_text: String,
    pub inputs: Registry,
}

impl Default for Settings {
    fn default() -> Self {
        Self { optional_text: DEFAULT_OPTIONAL_TEXT.to_string(), inputs: Registry::default() }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsDoc {
    #[serde(default)]
    optional_text: Option<String>,
    #[serde(default)]
    inputs: InputsDoc,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct InputsDoc {
    primitive: Option<EntryDoc>,
    enumeration: Option<EntryDoc>,
    product: Option<EntryDoc>,
    sequence: Option<EntryDoc>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EntryDoc {
    Factory(Builtin),
    ByName(IndexMap<String, Builtin>),
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Builtin {
    Textbox,
    Select,
    Radio,
    Checkbox,
    Form,
    List,
}

impl From<Builtin> for Factory {
    fn from(b: Builtin) -> Self {
        match b {
            Builtin::Textbox => Factory::Textbox,
            Builtin::Select => Factory::Select,
            Builtin::Radio => Factory::Radio,
            Builtin::Checkbox => Factory::Checkbox,
            Builtin::Form => Factory::Form,
            Builtin::List => Factory::List,
        }
    }
}

impl From<EntryDoc> for Entry {
    fn from(doc: EntryDoc) -> Self {
        match doc {
            EntryDoc::Factory(b) => Entry::Factory(b.into()),
            EntryDoc::ByName(map) => Entry::ByName(map.into_iter().map(|(k, b)| (k, b.into())).collect()),
        }
    }
}

impl Settings {
    pub fn from_json_str(src: &str) -> Result<Self, FormError> {
        let doc: SettingsDoc = crate::path_de::from_str_with_path(src)?;
        let mut settings = Settings::default();
        if let Some(text) = doc.optional_text {
            settings.optional_text = text;
        }
        let InputsDoc { primitive, enumeration, product, sequence } = doc.inputs;
        for (kind, entry) in [
            (Kind::Primitive, primitive),
            (Kind::Enumeration, enumeration),
            (Kind::Product, product),
            (Kind::Sequence, sequence),
        ] {
            if let Some(entry) = entry {
                settings.inputs.register(kind, entry.into())?;
            }
        }
        Ok(settings)
    }

    pub fn load(path: &Path) -> Result<Self, FormError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_json_str(&source)
    }
}
