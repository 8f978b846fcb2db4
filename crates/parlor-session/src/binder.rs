//! The connection→identity table.

use std::collections::HashMap;

use parlor_protocol::{PlayerKey, Secret};
use parlor_transport::ConnectionId;

use crate::SessionError;

/// Configuration for the binder.
#[derive(Debug, Clone)]
pub struct BinderConfig {
    /// Hard cap on concurrent bindings. One binding per live connection,
    /// so this bounds the table to roughly the connection count.
    pub max_bindings: usize,
}

impl Default for BinderConfig {
    fn default() -> Self {
        Self {
            max_bindings: 10_000,
        }
    }
}

/// One connection's claim to a durable identity.
///
/// This is a weak association, not ownership: it lives only as long as the
/// connection, is recreated freely on reconnect, and is never persisted.
#[derive(Debug, Clone)]
pub struct Binding {
    pub connection: ConnectionId,
    pub key: PlayerKey,
    pub secret: Secret,
}

/// Maps live connections to durable identities.
///
/// Not thread-safe by itself; it is owned by the controller and accessed
/// through a mutex at that level, the same way the room registry is.
///
/// At most one binding exists per player: binding a key that is already
/// bound elsewhere moves the identity to the new connection, so a stale
/// socket's later disconnect cannot knock out a player who has already
/// reconnected.
pub struct SessionBinder {
    bindings: HashMap<ConnectionId, Binding>,
    config: BinderConfig,
}

impl SessionBinder {
    /// Creates an empty binder with the given config.
    pub fn new(config: BinderConfig) -> Self {
        Self {
            bindings: HashMap::new(),
            config,
        }
    }

    /// Binds a connection to an identity, displacing any previous binding
    /// for the same player.
    ///
    /// # Errors
    /// [`SessionError::CapacityExceeded`] if the table is full and this
    /// would add a new entry.
    pub fn bind(
        &mut self,
        connection: ConnectionId,
        key: PlayerKey,
        secret: Secret,
    ) -> Result<(), SessionError> {
        // Displace any binding the player holds on another connection.
        self.bindings
            .retain(|conn, b| b.key != key || *conn == connection);

        if !self.bindings.contains_key(&connection)
            && self.bindings.len() >= self.config.max_bindings
        {
            return Err(SessionError::CapacityExceeded);
        }

        tracing::debug!(%connection, player = %key, "connection bound");
        self.bindings.insert(
            connection,
            Binding {
                connection,
                key,
                secret,
            },
        );
        Ok(())
    }

    /// Looks up the identity bound to a connection, if any.
    pub fn identity(&self, connection: ConnectionId) -> Option<&Binding> {
        self.bindings.get(&connection)
    }

    /// Removes a connection's binding, returning it if one existed.
    ///
    /// A connection with no binding is not an error; the caller treats
    /// the disconnect as a no-op.
    pub fn unbind(&mut self, connection: ConnectionId) -> Option<Binding> {
        let binding = self.bindings.remove(&connection);
        if let Some(b) = &binding {
            tracing::debug!(%connection, player = %b.key, "connection unbound");
        }
        binding
    }

    /// Removes every binding for a player (used on explicit leave).
    pub fn unbind_player(&mut self, key: PlayerKey) {
        self.bindings.retain(|_, b| b.key != key);
    }

    /// Returns the number of live bindings.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns `true` if no bindings exist.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

// =========================================================================
// Tests
// =========================================================================
