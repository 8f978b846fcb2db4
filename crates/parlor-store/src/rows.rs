//! Persisted row shapes.
//!
//! These are storage records, not wire types; the protocol layer has its
//! own snapshot/roster shapes, assembled by the room layer with secrets
//! stripped.

use std::time::SystemTime;

use parlor_protocol::{CardId, PlayerKey, RoomCode, RoundPhase, Secret};

/// One room's persisted state.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomRow {
    /// Immutable five-letter identity.
    pub code: RoomCode,
    /// The turn pointer: the turn index of the current actor.
    pub current_turn: u32,
    /// The active card. `None` ⇔ the room is in the lobby.
    pub card: Option<CardId>,
    /// 1-based index of the designated question on the active card.
    pub answer_index: Option<u32>,
    /// Whether the current round's answer has been shown.
    pub revealed: bool,
    /// Touched on every transition; read only by external retention.
    pub last_action: SystemTime,
}

impl RoomRow {
    /// A freshly created lobby room.
    pub fn new(code: RoomCode) -> Self {
        Self {
            code,
            current_turn: 1,
            card: None,
            answer_index: None,
            revealed: false,
            last_action: SystemTime::now(),
        }
    }

    /// The room's round phase, by the single derivation rule.
    pub fn phase(&self) -> RoundPhase {
        RoundPhase::of(self.card, self.revealed)
    }

    /// Records that a transition happened now.
    pub fn touch(&mut self) {
        self.last_action = SystemTime::now();
    }
}

/// One player's persisted state.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerRow {
    /// Durable key, allocated by the store, never reused.
    pub key: PlayerKey,
    /// The other half of the credential pair. Immutable.
    pub secret: Secret,
    /// The room this player belongs to.
    pub room: RoomCode,
    /// Sanitized display name, at most 12 characters.
    pub name: String,
    /// Position in the turn order, unique within the room, from 1.
    pub turn_index: u32,
    /// The player's current guess; reset to `None` each round.
    pub choice: Option<u32>,
    /// Total score. Non-negative and never decreased.
    pub score: u32,
    /// False while the player's connection is down. Never deletes the row.
    pub active: bool,
}

/// The caller-supplied part of a new player row; the store fills in the
/// key, and the row starts active with no choice and zero score.
#[derive(Debug, Clone)]
pub struct NewPlayer {
    pub room: RoomCode,
    pub name: String,
    pub secret: Secret,
    pub turn_index: u32,
}

/// A content card: one prompt with several candidate-answer questions.
#[derive(Debug, Clone, PartialEq)]
pub struct CardRow {
    pub id: CardId,
    pub prompt: String,
}

/// One candidate answer, owned by a card, with a stable 1-based index.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionRow {
    pub card: CardId,
    pub index: u32,
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use parlor_protocol::RoundPhase;

    fn code() -> RoomCode {
        RoomCode::parse("ABCDE").unwrap()
    }

    #[test]
    fn test_new_room_is_lobby() {
        let room = RoomRow::new(code());
        assert_eq!(room.phase(), RoundPhase::Lobby);
        assert_eq!(room.current_turn, 1);
        assert!(room.card.is_none());
        assert!(!room.revealed);
    }

    #[test]
    fn test_room_phase_follows_card_and_reveal() {
        let mut room = RoomRow::new(code());
        room.card = Some(CardId(4));
        assert_eq!(room.phase(), RoundPhase::Acting);
        room.revealed = true;
        assert_eq!(room.phase(), RoundPhase::Revealed);
    }

    #[test]
    fn test_touch_advances_last_action() {
        let mut room = RoomRow::new(code());
        let before = room.last_action;
        room.touch();
        assert!(room.last_action >= before);
    }
}
