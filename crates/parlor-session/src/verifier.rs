//! Credential verification against the durable roster.

use parlor_protocol::{PlayerKey, RoomCode, Secret};
use parlor_store::{PlayerRow, Store};
use rand::Rng;

use crate::SessionError;

/// Verifies `(playerKey, secret[, roomCode])` credentials.
///
/// Stateless: every check reads the player row fresh, so a leave that
/// deleted the row is visible immediately. Returns the row on success,
/// which also resolves the player's room for actions that did not supply
/// a code.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityVerifier;

impl IdentityVerifier {
    pub fn new() -> Self {
        Self
    }

    /// Checks a credential pair, and the room membership when a code is
    /// supplied.
    ///
    /// # Errors
    /// - [`SessionError::NotFound`] — no row exists for the key (the
    ///   player never existed or explicitly left)
    /// - [`SessionError::Unauthorized`] — the secret or room does not match
    pub async fn verify<S: Store>(
        &self,
        store: &S,
        key: PlayerKey,
        secret: &Secret,
        room: Option<&RoomCode>,
    ) -> Result<PlayerRow, SessionError> {
        let row = store
            .player(key)
            .await?
            .ok_or(SessionError::NotFound(key))?;

        if &row.secret != secret {
            tracing::debug!(player = %key, "secret mismatch");
            return Err(SessionError::Unauthorized);
        }
        if let Some(code) = room {
            if &row.room != code {
                tracing::debug!(player = %key, room = %code, "room mismatch");
                return Err(SessionError::Unauthorized);
            }
        }
        Ok(row)
    }
}

/// Generates a fresh player secret: 16 lowercase hex characters
/// (64 bits of randomness).
///
/// The alphabet and length are chosen to survive inbound sanitization
/// untouched: alphanumeric only, under the 20-character field cap.
pub fn generate_secret() -> Secret {
    let mut rng = rand::rng();
    let bytes: [u8; 8] = rng.random();
    Secret::new(bytes.iter().map(|b| format!("{b:02x}")).collect::<String>())
}

// =========================================================================
// Tests
// =========================================================================
