//! Inbound input cleaning.
//!
//! Every string that arrives from a client passes through here before any
//! further use. The rules are deliberately blunt: keep only
//! `[A-Za-z0-9_ ]`, cap the length, and let required-field checks fail
//! closed at the call site. Unrecognized fields never reach this layer;
//! the action decoder simply ignores them.

use crate::{ProtocolError, RoomCode, Secret};

/// Maximum length of any inbound string field after cleaning.
pub const FIELD_MAX: usize = 20;

/// Maximum length of a player name after cleaning.
pub const NAME_MAX: usize = 12;

/// Strips everything outside `[A-Za-z0-9_ ]` and truncates to
/// [`FIELD_MAX`] characters.
pub fn clean(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == ' ')
        .take(FIELD_MAX)
        .collect()
}

/// Cleans a player name. Names get the general cleaning plus the tighter
/// [`NAME_MAX`] cap; an empty result is rejected.
pub fn player_name(raw: &str) -> Result<String, ProtocolError> {
    let name: String = clean(raw).chars().take(NAME_MAX).collect();
    if name.trim().is_empty() {
        return Err(ProtocolError::Validation("missing playerName".into()));
    }
    Ok(name)
}

/// Cleans and parses a room code.
pub fn room_code(raw: &str) -> Result<RoomCode, ProtocolError> {
    RoomCode::parse(&clean(raw))
}

/// Cleans a secret: alphanumeric only, capped at [`FIELD_MAX`].
///
/// Issued secrets are alphanumeric and shorter than the cap, so a
/// legitimate secret always survives this unchanged.
pub fn secret(raw: &str) -> Result<Secret, ProtocolError> {
    let cleaned: String = raw
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(FIELD_MAX)
        .collect();
    if cleaned.is_empty() {
        return Err(ProtocolError::Validation("missing playerSecret".into()));
    }
    Ok(Secret::new(cleaned))
}

// =========================================================================
// Tests
// =========================================================================
