/// Error types for Post Organizer
use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtensionError {
    #[error("JavaScript error: {0}")]
    Js(String),

    #[error("DOM error: {message}")]
    Dom { message: String },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Request failed with status {status}")]
    Http { status: u16 },
}

impl ExtensionError {
    pub fn dom(message: impl Into<String>) -> Self {
        ExtensionError::Dom {
            message: message.into(),
        }
    }
}

impl From<JsValue> for ExtensionError {
    fn from(value: JsValue) -> Self {
        let message = value
            .as_string()
            .unwrap_or_else(|| format!("{:?}", value));
        ExtensionError::Js(message)
    }
}

impl From<serde_wasm_bindgen::Error> for ExtensionError {
    fn from(err: serde_wasm_bindgen::Error) -> Self {
        ExtensionError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for ExtensionError {
    fn from(err: serde_json::Error) -> Self {
        ExtensionError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ExtensionError>;
