//! Error types for the room layer.

use parlor_protocol::{CardId, PlayerKey, RoomCode};
use parlor_store::StoreError;

/// Errors that can occur during room operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The room does not exist.
    #[error("room {0} not found")]
    NotFound(RoomCode),

    /// The player row vanished between authorization and the transition
    /// (an explicit leave won the race).
    #[error("player {0} no longer exists")]
    PlayerGone(PlayerKey),

    /// A transition needs an actor but the room has no active players.
    #[error("room {0} has no active players")]
    NoActivePlayers(RoomCode),

    /// No card is eligible to draw (content set empty or fully excluded).
    #[error("no cards available to draw")]
    DeckExhausted,

    /// A drawn card has no questions. Static content is broken.
    #[error("card {0} has no questions")]
    EmptyCard(CardId),

    /// A persistence call failed or timed out. The transition was aborted
    /// and nothing was broadcast.
    #[error("persistence unavailable: {0}")]
    DataUnavailable(String),

    /// The room's actor is gone (command channel closed).
    #[error("room {0} is unavailable")]
    Unavailable(RoomCode),
}

impl From<StoreError> for RoomError {
    fn from(e: StoreError) -> Self {
        // Collisions are handled where rooms are created; any that leak
        // here are a store fault like the rest.
        RoomError::DataUnavailable(e.to_string())
    }
}
