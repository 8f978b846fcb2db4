//! Outbound events and the reply envelope.
//!
//! Every message the server emits is an [`Envelope`]: `{success, error?}`
//! plus the event payload flattened alongside. Direct replies go only to
//! the requester; broadcasts carry the same envelope shape with
//! `success: true`. Error envelopes are never broadcast.

use serde::{Deserialize, Serialize};

use crate::{PlayerKey, RoomSnapshot, RosterEntry, Secret};

/// A server-to-client event, tagged by event name.
///
/// The credential-bearing variants (`gameCreated`, `gameJoined`) exist
/// only as direct replies to the owning connection; every broadcast
/// variant carries at most the public roster and room snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerEvent {
    /// Reply to `createGame`: the new room plus the creator's credentials.
    #[serde(rename_all = "camelCase")]
    GameCreated {
        player_key: PlayerKey,
        player_secret: Secret,
        room: RoomSnapshot,
        roster: Vec<RosterEntry>,
    },

    /// Reply to `joinGame` for a brand-new player (credentials included).
    #[serde(rename_all = "camelCase")]
    GameJoined {
        player_key: PlayerKey,
        player_secret: Secret,
        room: RoomSnapshot,
        roster: Vec<RosterEntry>,
    },

    /// Broadcast to the rest of the room when someone joins or rejoins.
    #[serde(rename_all = "camelCase")]
    PlayerJoined {
        player_key: PlayerKey,
        room: RoomSnapshot,
        roster: Vec<RosterEntry>,
    },

    /// Reply to `rejoinGame`: same shape as a join, no secret echoed.
    #[serde(rename_all = "camelCase")]
    GameRejoined {
        player_key: PlayerKey,
        room: RoomSnapshot,
        roster: Vec<RosterEntry>,
    },

    /// Reply to `leaveGame`, confirming the row is gone.
    #[serde(rename_all = "camelCase")]
    GameLeft {
        player_key: PlayerKey,
        roster: Vec<RosterEntry>,
    },

    /// Broadcast to the rest of the room after an explicit leave.
    #[serde(rename_all = "camelCase")]
    PlayerLeft {
        player_key: PlayerKey,
        roster: Vec<RosterEntry>,
    },

    /// Broadcast to the whole room when the first round begins.
    #[serde(rename_all = "camelCase")]
    GameStarted {
        room: RoomSnapshot,
        roster: Vec<RosterEntry>,
    },

    /// Broadcast to the whole room when any guess lands or is retracted.
    #[serde(rename_all = "camelCase")]
    GuessMade { roster: Vec<RosterEntry> },

    /// Broadcast to the whole room with the scored outcome.
    #[serde(rename_all = "camelCase")]
    AnswerRevealed {
        room: RoomSnapshot,
        roster: Vec<RosterEntry>,
    },

    /// Broadcast to the whole room when the round advances.
    #[serde(rename_all = "camelCase")]
    QuestionsProgressed {
        room: RoomSnapshot,
        roster: Vec<RosterEntry>,
    },

    /// Broadcast to the rest of the room when a connection drops.
    #[serde(rename_all = "camelCase")]
    PlayerDisconnected {
        player_key: PlayerKey,
        roster: Vec<RosterEntry>,
    },
}

/// The wire envelope: `{success, error?, ...event fields}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub success: bool,

    /// Populated only on error replies. A `success: false` envelope with
    /// no error is the benign-race outcome: the request was overtaken and
    /// silently dropped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(flatten, default, skip_serializing_if = "Option::is_none")]
    pub event: Option<ServerEvent>,
}

impl Envelope {
    /// A successful reply or broadcast carrying an event.
    pub fn ok(event: ServerEvent) -> Self {
        Self {
            success: true,
            error: None,
            event: Some(event),
        }
    }

    /// A bare success acknowledgement. Used where the real payload goes
    /// out as a room-wide broadcast the requester also receives, so the
    /// direct reply carries no duplicate event.
    pub fn ack() -> Self {
        Self {
            success: true,
            error: None,
            event: None,
        }
    }

    /// An error reply. Only ever sent to the originating requester.
    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
            event: None,
        }
    }

    /// The benign-race outcome: no error, no event, no broadcast.
    pub fn dropped() -> Self {
        Self {
            success: false,
            error: None,
            event: None,
        }
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RoomCode, RoundPhase};

    fn snapshot() -> RoomSnapshot {
        RoomSnapshot {
            code: RoomCode::parse("ABCDE").unwrap(),
            phase: RoundPhase::Lobby,
            current_turn: 1,
            answer_index: None,
            card: None,
        }
    }

    fn roster() -> Vec<RosterEntry> {
        vec![RosterEntry {
            key: PlayerKey(1),
            name: "Ada".into(),
            turn_index: 1,
            choice: None,
            score: 0,
            active: true,
        }]
    }

    #[test]
    fn test_ok_envelope_flattens_event_fields() {
        let envelope = Envelope::ok(ServerEvent::GameCreated {
            player_key: PlayerKey(1),
            player_secret: Secret::new("cafe01"),
            room: snapshot(),
            roster: roster(),
        });
        let json: serde_json::Value = serde_json::to_value(&envelope).unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["type"], "gameCreated");
        assert_eq!(json["playerKey"], 1);
        assert_eq!(json["playerSecret"], "cafe01");
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_err_envelope_has_no_event() {
        let envelope = Envelope::err("Unauthorized: credential mismatch");
        let json: serde_json::Value = serde_json::to_value(&envelope).unwrap();

        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Unauthorized: credential mismatch");
        assert!(json.get("type").is_none());
    }

    #[test]
    fn test_ack_envelope_is_bare_success() {
        let json: serde_json::Value = serde_json::to_value(Envelope::ack()).unwrap();
        assert_eq!(json["success"], true);
        assert!(json.get("error").is_none());
        assert!(json.get("type").is_none());
    }

    #[test]
    fn test_dropped_envelope_is_bare_failure() {
        let json: serde_json::Value =
            serde_json::to_value(Envelope::dropped()).unwrap();
        assert_eq!(json["success"], false);
        assert!(json.get("error").is_none());
        assert!(json.get("type").is_none());
    }

    #[test]
    fn test_envelope_round_trip() {
        let envelope = Envelope::ok(ServerEvent::GuessMade { roster: roster() });
        let json = serde_json::to_string(&envelope).unwrap();
        let decoded: Envelope = serde_json::from_str(&json).unwrap();
        assert_eq!(envelope, decoded);
    }

    #[test]
    fn test_broadcast_variants_carry_no_secret() {
        // The secret only appears in gameCreated/gameJoined direct replies.
        let envelope = Envelope::ok(ServerEvent::PlayerJoined {
            player_key: PlayerKey(2),
            room: snapshot(),
            roster: roster(),
        });
        let json = serde_json::to_string(&envelope).unwrap();
        assert!(!json.contains("playerSecret"));
    }
}
