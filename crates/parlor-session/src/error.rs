//! Error types for the session layer.

use parlor_protocol::PlayerKey;
use parlor_store::StoreError;

/// Errors that can occur during verification or binding.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The presented secret (or room) does not match the player row.
    #[error("player credential mismatch")]
    Unauthorized,

    /// No player row exists for the key: never created, or removed by an
    /// explicit leave.
    #[error("no player found for key {0}")]
    NotFound(PlayerKey),

    /// The binding table is at capacity.
    #[error("session binding table is full")]
    CapacityExceeded,

    /// The roster could not be read.
    #[error(transparent)]
    Store(#[from] StoreError),
}
