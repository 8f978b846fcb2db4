//! Inbound actions: everything a client may ask the server to do.

use serde::{Deserialize, Serialize};

use crate::PlayerKey;

/// A client request, tagged by action name.
///
/// String fields arrive raw and must pass through [`sanitize`](crate::sanitize)
/// before any further use. Unknown JSON fields are ignored (not errors);
/// a missing required field or a wrong-typed value fails decoding, which
/// the caller surfaces as a validation error without touching any state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientAction {
    /// Create a fresh room and become its first player.
    #[serde(rename_all = "camelCase")]
    CreateGame { player_name: String },

    /// Join an existing room by code. A valid credential pair routes the
    /// request to the rejoin path instead of minting a new player.
    #[serde(rename_all = "camelCase")]
    JoinGame {
        player_name: String,
        room_code: String,
        #[serde(default)]
        player_key: Option<PlayerKey>,
        #[serde(default)]
        player_secret: Option<String>,
    },

    /// Resume a durable identity; the room is resolved from the credentials.
    #[serde(rename_all = "camelCase")]
    RejoinGame {
        player_key: PlayerKey,
        player_secret: String,
    },

    /// Permanently leave: deletes the player row.
    #[serde(rename_all = "camelCase")]
    LeaveGame {
        player_key: PlayerKey,
        player_secret: String,
    },

    /// Start the first round. Duplicate taps are benign; the loser of the
    /// race is silently dropped.
    #[serde(rename_all = "camelCase")]
    StartGame {
        room_code: String,
        player_key: PlayerKey,
        player_secret: String,
    },

    /// Record (or with `answerIndex: null`, retract) the caller's guess.
    #[serde(rename_all = "camelCase")]
    SendGuess {
        player_key: PlayerKey,
        player_secret: String,
        #[serde(default)]
        room_code: Option<String>,
        #[serde(default)]
        answer_index: Option<u32>,
    },

    /// Reveal the designated answer and score the round.
    #[serde(rename_all = "camelCase")]
    RevealAnswer {
        player_key: PlayerKey,
        player_secret: String,
        room_code: String,
    },

    /// Rotate the actor and deal the next card.
    #[serde(rename_all = "camelCase")]
    ProgressQuestions {
        player_key: PlayerKey,
        player_secret: String,
        room_code: String,
    },
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_game_decodes_from_camel_case() {
        let json = r#"{"type": "createGame", "playerName": "Ada"}"#;
        let action: ClientAction = serde_json::from_str(json).unwrap();
        assert_eq!(
            action,
            ClientAction::CreateGame {
                player_name: "Ada".into()
            }
        );
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        // Only the allow-listed fields are processed; extras are dropped
        // silently rather than rejected.
        let json = r#"{
            "type": "createGame",
            "playerName": "Ada",
            "isAdmin": true,
            "score": 9999
        }"#;
        let action: ClientAction = serde_json::from_str(json).unwrap();
        assert!(matches!(action, ClientAction::CreateGame { .. }));
    }

    #[test]
    fn test_missing_required_field_fails_decoding() {
        let json = r#"{"type": "startGame", "roomCode": "ABCDE"}"#;
        let result: Result<ClientAction, _> = serde_json::from_str(json);
        assert!(result.is_err(), "missing credentials must fail closed");
    }

    #[test]
    fn test_wrong_typed_field_fails_decoding() {
        let json = r#"{"type": "rejoinGame", "playerKey": "seven", "playerSecret": "s"}"#;
        let result: Result<ClientAction, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_join_game_credentials_are_optional() {
        let json = r#"{"type": "joinGame", "playerName": "Bo", "roomCode": "ABCDE"}"#;
        let action: ClientAction = serde_json::from_str(json).unwrap();
        match action {
            ClientAction::JoinGame {
                player_key,
                player_secret,
                ..
            } => {
                assert!(player_key.is_none());
                assert!(player_secret.is_none());
            }
            other => panic!("expected JoinGame, got {other:?}"),
        }
    }

    #[test]
    fn test_send_guess_null_answer_means_retraction() {
        let json = r#"{
            "type": "sendGuess",
            "playerKey": 4,
            "playerSecret": "abc",
            "roomCode": "ABCDE",
            "answerIndex": null
        }"#;
        let action: ClientAction = serde_json::from_str(json).unwrap();
        match action {
            ClientAction::SendGuess { answer_index, .. } => {
                assert_eq!(answer_index, None);
            }
            other => panic!("expected SendGuess, got {other:?}"),
        }
    }

    #[test]
    fn test_send_guess_room_code_is_optional() {
        let json = r#"{"type": "sendGuess", "playerKey": 4, "playerSecret": "abc", "answerIndex": 2}"#;
        let action: ClientAction = serde_json::from_str(json).unwrap();
        match action {
            ClientAction::SendGuess {
                room_code,
                answer_index,
                ..
            } => {
                assert!(room_code.is_none());
                assert_eq!(answer_index, Some(2));
            }
            other => panic!("expected SendGuess, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_action_type_fails_decoding() {
        let json = r#"{"type": "deleteEverything"}"#;
        let result: Result<ClientAction, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }
}
