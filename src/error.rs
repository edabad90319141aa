//! Construction-time errors.
//!
//! Anything that goes wrong while building an input (bad options, a type the
//! input cannot handle, a malformed descriptor document) is a `FormError`.
//! Validation failures are never errors; see `validate::Errors`.
use thiserror::Error;

use crate::ty::Kind;

#[derive(Debug, Error)]
pub enum FormError {
    #[error("invalid type `{actual}` supplied to {input}, expected {expected}")]
    InvalidType {
        input: &'static str,
        expected: &'static str,
        actual: String,
    },

    #[error("invalid `order` {order:?} supplied to form of `{ty}`, all fields {fields:?} must be listed exactly once")]
    InvalidOrder {
        ty: String,
        order: Vec<String>,
        fields: Vec<String>,
    },

    #[error("unknown field `{field}` in options for `{ty}`")]
    UnknownField { ty: String, field: String },

    #[error("{input} does not accept {options} options")]
    OptionsMismatch { input: String, options: &'static str },

    #[error("invalid options for {input}: {reason}")]
    InvalidOptions { input: &'static str, reason: String },

    #[error("cannot register an input for wrapper kind `{0}`")]
    WrapperKind(Kind),

    #[error("{input} does not accept {entry} entries")]
    EntryMismatch { input: &'static str, entry: &'static str },

    #[error("`{value}` is not a choice of `{ty}`")]
    UnknownChoice { ty: String, value: String },

    #[error("input for `{0}` is not a list")]
    NotAList(String),

    #[error("unknown primitive type `{0}`")]
    UnknownPrimitive(String),

    #[error("invalid pattern `{pattern}`: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("at JSON path {path} → {message}")]
    Document { path: String, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
