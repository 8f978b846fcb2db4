//! Room registry: allocates room codes and routes to room actors.

use std::collections::HashMap;
use std::sync::Arc;

use parlor_protocol::{ROOM_CODE_LEN, RoomCode};
use parlor_store::{RoomRow, Store, StoreError};
use rand::Rng;

use crate::room::spawn_room;
use crate::round::bounded;
use crate::{RoomConfig, RoomError, RoomHandle};

/// Creates and looks up rooms, holding one actor handle per live code.
///
/// Rooms are durable (their rows outlive this process); actors are
/// transient. `find` lazily spawns an actor for any room that exists in
/// the store but has none running yet, so a rejoin works even after the
/// registry lost its in-memory handles.
pub struct RoomRegistry<S> {
    store: Arc<S>,
    config: RoomConfig,
    rooms: HashMap<RoomCode, RoomHandle>,
}

impl<S: Store> RoomRegistry<S> {
    /// Creates an empty registry over the given store.
    pub fn new(store: Arc<S>, config: RoomConfig) -> Self {
        Self {
            store,
            config,
            rooms: HashMap::new(),
        }
    }

    /// Creates a new room under a freshly allocated unique code.
    ///
    /// Codes are drawn uniformly from the 26^5 space and re-rolled on
    /// collision. The pre-read is only an optimization; the store's
    /// uniqueness constraint is the final arbiter, and a lost insert race
    /// ([`StoreError::CodeCollision`]) also re-rolls.
    pub async fn create(&mut self) -> Result<(RoomCode, RoomHandle), RoomError> {
        loop {
            let code = generate_code();
            if bounded(self.config.store_timeout, self.store.room(&code))
                .await?
                .is_some()
            {
                tracing::debug!(room = %code, "room code taken, re-rolling");
                continue;
            }

            match tokio::time::timeout(
                self.config.store_timeout,
                self.store.insert_room(RoomRow::new(code.clone())),
            )
            .await
            {
                Ok(Ok(())) => {
                    let handle = self.spawn(code.clone());
                    tracing::info!(room = %code, "room created");
                    return Ok((code, handle));
                }
                Ok(Err(StoreError::CodeCollision(_))) => {
                    tracing::debug!(room = %code, "lost code allocation race, re-rolling");
                    continue;
                }
                Ok(Err(e)) => return Err(e.into()),
                Err(_) => {
                    return Err(RoomError::DataUnavailable(
                        "store call timed out".into(),
                    ));
                }
            }
        }
    }

    /// Returns the handle for a room, spawning its actor if needed.
    ///
    /// # Errors
    /// [`RoomError::NotFound`] if no such room exists in the store.
    pub async fn find(&mut self, code: &RoomCode) -> Result<RoomHandle, RoomError> {
        if let Some(handle) = self.rooms.get(code) {
            return Ok(handle.clone());
        }

        match bounded(self.config.store_timeout, self.store.room(code)).await? {
            Some(_) => Ok(self.spawn(code.clone())),
            None => Err(RoomError::NotFound(code.clone())),
        }
    }

    fn spawn(&mut self, code: RoomCode) -> RoomHandle {
        let handle = spawn_room(code.clone(), Arc::clone(&self.store), self.config.clone());
        self.rooms.insert(code, handle.clone());
        handle
    }

    /// Returns the number of rooms with a live actor.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}

/// Draws a room code: five letters, each uniform over A–Z.
fn generate_code() -> RoomCode {
    let mut rng = rand::rng();
    let code: String = (0..ROOM_CODE_LEN)
        .map(|_| char::from(b'A' + rng.random_range(0..26u8)))
        .collect();
    RoomCode::from_generated(code)
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use parlor_store::MemoryStore;

    fn registry() -> RoomRegistry<MemoryStore> {
        RoomRegistry::new(Arc::new(MemoryStore::new()), RoomConfig::default())
    }

    #[test]
    fn test_generate_code_is_five_uppercase_letters() {
        for _ in 0..100 {
            let code = generate_code();
            assert_eq!(code.as_str().len(), 5);
            assert!(code.as_str().bytes().all(|b| b.is_ascii_uppercase()));
        }
    }

    #[tokio::test]
    async fn test_create_persists_a_lobby_room() {
        let store = Arc::new(MemoryStore::new());
        let mut registry = RoomRegistry::new(Arc::clone(&store), RoomConfig::default());

        let (code, handle) = registry.create().await.unwrap();
        assert_eq!(handle.code(), &code);

        let row = store.room(&code).await.unwrap().expect("room row persisted");
        assert!(row.card.is_none());
        assert_eq!(row.current_turn, 1);
    }

    #[tokio::test]
    async fn test_create_many_rooms_all_unique() {
        let mut registry = registry();
        let mut codes = std::collections::HashSet::new();
        for _ in 0..50 {
            let (code, _) = registry.create().await.unwrap();
            assert!(codes.insert(code), "duplicate room code allocated");
        }
        assert_eq!(registry.room_count(), 50);
    }

    #[tokio::test]
    async fn test_find_unknown_code_is_not_found() {
        let mut registry = registry();
        let code = RoomCode::parse("QQQQQ").unwrap();
        let result = registry.find(&code).await;
        assert!(matches!(result, Err(RoomError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_find_returns_cached_handle() {
        let mut registry = registry();
        let (code, _) = registry.create().await.unwrap();

        let handle = registry.find(&code).await.unwrap();
        assert_eq!(handle.code(), &code);
        assert_eq!(registry.room_count(), 1);
    }

    #[tokio::test]
    async fn test_find_respawns_actor_for_durable_room() {
        // A room row that exists in the store but has no live actor
        // (fresh registry) gets one spawned on demand.
        let store = Arc::new(MemoryStore::new());
        let code = RoomCode::parse("ABCDE").unwrap();
        store.insert_room(RoomRow::new(code.clone())).await.unwrap();

        let mut registry = RoomRegistry::new(store, RoomConfig::default());
        let handle = registry.find(&code).await.unwrap();
        assert_eq!(handle.code(), &code);
        assert_eq!(registry.room_count(), 1);
    }
}
