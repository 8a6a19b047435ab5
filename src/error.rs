//! Error types.
//!
//! The layout, kinship and calendar cores are infallible over well-shaped
//! input: dangling references and malformed links are tolerated, not
//! reported. Errors only arise when a configuration is unusable or when a
//! JavaScript value cannot be read into the data model.

use wasm_bindgen::{JsError, JsValue};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid layout config: `{field}` must be finite and non-negative, got {value}")]
    InvalidConfig { field: &'static str, value: f32 },
    #[error("invalid date `{0}`, expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("invalid input: {0}")]
    Input(#[from] serde_wasm_bindgen::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<Error> for JsValue {
    fn from(err: Error) -> Self {
        JsError::new(&err.to_string()).into()
    }
}
