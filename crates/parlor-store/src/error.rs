//! Error types for the persistence boundary.

use parlor_protocol::RoomCode;

/// Errors that can occur during store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The room code is already taken. This is the uniqueness constraint
    /// acting as final arbiter for concurrent code allocation; callers
    /// re-roll and retry.
    #[error("room code {0} already exists")]
    CodeCollision(RoomCode),

    /// An update targeted a row that does not exist.
    #[error("row not found: {0}")]
    MissingRow(String),

    /// The backing store failed or is unreachable.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
