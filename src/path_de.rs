use serde::de::DeserializeOwned;

use crate::error::FormError;

/// Deserialize with JSON-path context in error messages.
pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T, FormError> {
    let de = &mut serde_json::Deserializer::from_str(src);
    match serde_path_to_error::deserialize::<_, T>(de) {
        Ok(v) => Ok(v),
        Err(err) => {
            let path = err.path().to_string();
            Err(FormError::Document { path, message: err.into_inner().to_string() })
        }
    }
}

/// Same, for an already parsed `serde_json::Value` (e.g. one member of a
/// larger document).
pub fn from_value_with_path<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, FormError> {
    match serde_path_to_error::deserialize::<_, T>(value) {
        Ok(v) => Ok(v),
        Err(err) => {
            let path = err.path().to_string();
            Err(FormError::Document { path, message: err.into_inner().to_string() })
        }
    }
}
