//! Error types for the protocol layer.

/// Errors that can occur while decoding, encoding, or cleaning input.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed.
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed JSON, a missing required field,
    /// or a wrong-typed value. Fails closed: nothing downstream runs.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// A field decoded but failed validation (empty after cleaning,
    /// malformed room code, and so on).
    #[error("invalid input: {0}")]
    Validation(String),
}
