//! Codec trait and the JSON implementation.
//!
//! The connection handler doesn't care how envelopes become text; it
//! programs against [`Codec`] and the server picks an implementation.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Encodes values to wire text and decodes wire text back.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into a text frame.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError>;

    /// Deserializes a text frame into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the frame is malformed or does
    /// not match the expected shape.
    fn decode<T: DeserializeOwned>(&self, text: &str) -> Result<T, ProtocolError>;
}

/// A [`Codec`] that uses JSON via `serde_json`.
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError> {
        serde_json::to_string(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, text: &str) -> Result<T, ProtocolError> {
        serde_json::from_str(text).map_err(ProtocolError::Decode)
    }
}
