//! JSON encoding for values kept in durable storage.
//!
//! Every stored key holds one JSON document. These helpers keep the error
//! type uniform so the storage layer can treat any decode failure as
//! "absent".

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Error type for codec encode/decode operations.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The value could not be serialized.
    #[error("encode error: {0}")]
    Encode(String),
    /// The stored text is not a valid document for the requested type.
    #[error("decode error: {0}")]
    Decode(String),
}

/// Encodes a value as a JSON string.
///
/// # Errors
///
/// Returns `CodecError::Encode` if the value cannot be serialized (for
/// example a map with non-string keys).
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<String, CodecError> {
    serde_json::to_string(value).map_err(|e| CodecError::Encode(e.to_string()))
}

/// Decodes a value from a JSON string.
///
/// # Errors
///
/// Returns `CodecError::Decode` if the text is not valid JSON or does not
/// match the shape of `T`.
pub fn decode<T: DeserializeOwned>(text: &str) -> Result<T, CodecError> {
    serde_json::from_str(text).map_err(|e| CodecError::Decode(e.to_string()))
}
