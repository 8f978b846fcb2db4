//! Core protocol types shared by every layer.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Durable unique identifier for a player.
///
/// Assigned by the store when the player row is created, never reused.
/// Survives disconnects; only an explicit leave retires it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerKey(pub u64);

impl fmt::Display for PlayerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// A room's identity: five uppercase ASCII letters, immutable for the
/// room's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomCode(String);

/// Length of a room code in letters.
pub const ROOM_CODE_LEN: usize = 5;

impl RoomCode {
    /// Parses a cleaned input string as a room code.
    ///
    /// Uppercases the input; anything other than exactly five ASCII
    /// letters is rejected.
    pub fn parse(raw: &str) -> Result<Self, ProtocolError> {
        let code: String = raw.trim().to_ascii_uppercase();
        if code.len() != ROOM_CODE_LEN || !code.bytes().all(|b| b.is_ascii_uppercase()) {
            return Err(ProtocolError::Validation(format!(
                "malformed room code {raw:?}"
            )));
        }
        Ok(Self(code))
    }

    /// Wraps an already-valid code without re-checking.
    ///
    /// For use by the code generator, which only produces uppercase
    /// letters by construction.
    pub fn from_generated(code: String) -> Self {
        debug_assert!(Self::parse(&code).is_ok());
        Self(code)
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The durable half of a player's credential pair.
///
/// Issued once at player creation and returned only to the owning
/// connection. `Debug` is redacted so a secret can never leak through
/// logging.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    /// Wraps a sanitized secret string.
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Returns the secret as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(<redacted>)")
    }
}

/// Identifier for a content card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(pub u32);

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "card-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Round phase
// ---------------------------------------------------------------------------

/// The phase of a room's current round.
///
/// Derived from the stored fields by exactly one rule ([`RoundPhase::of`]);
/// nothing else in the codebase is allowed to infer phase from raw fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RoundPhase {
    /// No active card; players gather and the game has not started.
    Lobby,
    /// A card is live and hidden; guesses are being collected.
    Acting,
    /// The answer is shown and scored; awaiting advance.
    Revealed,
}

impl RoundPhase {
    /// Derives the phase: Lobby iff no active card; Acting iff a card is
    /// active and not revealed; Revealed otherwise.
    pub fn of(card: Option<CardId>, revealed: bool) -> Self {
        match (card, revealed) {
            (None, _) => Self::Lobby,
            (Some(_), false) => Self::Acting,
            (Some(_), true) => Self::Revealed,
        }
    }
}

impl fmt::Display for RoundPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lobby => write!(f, "Lobby"),
            Self::Acting => write!(f, "Acting"),
            Self::Revealed => write!(f, "Revealed"),
        }
    }
}

// ---------------------------------------------------------------------------
// Recipient — who should receive a broadcast?
// ---------------------------------------------------------------------------

/// Specifies who in a room receives a [`ServerEvent`](crate::ServerEvent).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    /// Every player currently bound to the room.
    All,
    /// One specific player.
    Player(PlayerKey),
    /// Everyone except the specified player. Used for "someone else
    /// joined/left" notices where the subject gets a direct reply instead.
    AllExcept(PlayerKey),
}

// ---------------------------------------------------------------------------
// Snapshot shapes
// ---------------------------------------------------------------------------

/// One player's public roster entry. Never carries the secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    pub key: PlayerKey,
    pub name: String,
    pub turn_index: u32,
    pub choice: Option<u32>,
    pub score: u32,
    pub active: bool,
}

/// A question as shown to clients: its stable 1-based index on the card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionView {
    pub index: u32,
    pub text: String,
}

/// The active card with its candidate answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardView {
    pub id: CardId,
    pub prompt: String,
    pub questions: Vec<QuestionView>,
}

/// Full room snapshot broadcast with state-changing events.
///
/// `card` and `answer_index` are populated once a round is live, so
/// mid-round joiners can render immediately. The display layer decides
/// what to show whom; the roster never includes secrets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    pub code: RoomCode,
    pub phase: RoundPhase,
    pub current_turn: u32,
    pub answer_index: Option<u32>,
    pub card: Option<CardView>,
}

// =========================================================================
// Tests
// =========================================================================
