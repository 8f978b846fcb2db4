//! Unified error type and the wire taxonomy.

use parlor_protocol::{Envelope, ProtocolError};
use parlor_room::RoomError;
use parlor_session::SessionError;
use parlor_store::StoreError;
use parlor_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attributes let `?` convert sub-crate errors
/// automatically, so the controller reads as straight-line code.
#[derive(Debug, thiserror::Error)]
pub enum ParlorError {
    /// A transport-level error (accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (decode, encode, validation).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session-level error (credentials, binding capacity).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A room-level error (lookup, transition, persistence).
    #[error(transparent)]
    Room(#[from] RoomError),
}

impl ParlorError {
    /// The wire taxonomy class for this error.
    ///
    /// Everything a requester can see maps onto exactly four classes:
    /// `ValidationError` (malformed/missing input), `Unauthorized`
    /// (credential or room mismatch), `NotFound` (room/player absent),
    /// and `DataUnavailable` (persistence failure or timeout). The
    /// benign-race outcomes never reach this function; they are not
    /// errors.
    pub fn class(&self) -> &'static str {
        match self {
            Self::Protocol(_) => "ValidationError",
            Self::Session(SessionError::Unauthorized) => "Unauthorized",
            Self::Session(SessionError::NotFound(_)) => "NotFound",
            Self::Session(SessionError::CapacityExceeded) => "DataUnavailable",
            Self::Session(SessionError::Store(_)) => "DataUnavailable",
            Self::Room(RoomError::NotFound(_)) => "NotFound",
            Self::Room(RoomError::PlayerGone(_)) => "NotFound",
            Self::Room(RoomError::NoActivePlayers(_)) => "ValidationError",
            Self::Room(_) => "DataUnavailable",
            Self::Transport(_) => "DataUnavailable",
        }
    }

    /// The error envelope sent back to the originating requester.
    pub fn to_envelope(&self) -> Envelope {
        Envelope::err(format!("{}: {}", self.class(), self))
    }
}

// Store errors surface through the session or room layers in normal
// operation; this impl covers direct use in tests and tools.
impl From<StoreError> for ParlorError {
    fn from(e: StoreError) -> Self {
        Self::Room(e.into())
    }
}
