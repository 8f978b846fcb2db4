//! In-memory [`Store`] implementation.
//!
//! A process-local map behind a synchronous mutex. No operation awaits
//! while holding the lock, so the async trait methods are effectively
//! instantaneous; the row-level contract (no cross-call atomicity) is the
//! same one a real database would offer.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use parlor_protocol::{CardId, PlayerKey, RoomCode};

use crate::{CardRow, NewPlayer, PlayerRow, QuestionRow, RoomRow, Store, StoreError};

/// A process-local store for single-node deployments and tests.
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

struct Inner {
    rooms: HashMap<RoomCode, RoomRow>,
    /// BTreeMap keeps iteration deterministic for tests and debugging.
    players: BTreeMap<PlayerKey, PlayerRow>,
    /// Next player key to allocate. Only ever increments; deleting a
    /// player must not allow its key to be reissued.
    next_key: u64,
    cards: BTreeMap<CardId, CardRow>,
    questions: Vec<QuestionRow>,
}

impl MemoryStore {
    /// An empty store with no content cards.
    pub fn new() -> Self {
        Self::with_deck(Vec::new(), Vec::new())
    }

    /// A store preloaded with the given content set.
    pub fn with_deck(cards: Vec<CardRow>, questions: Vec<QuestionRow>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                rooms: HashMap::new(),
                players: BTreeMap::new(),
                next_key: 1,
                cards: cards.into_iter().map(|c| (c.id, c)).collect(),
                questions,
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A poisoned lock means a writer panicked mid-operation; the data
        // is still structurally valid rows, so keep serving.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Store for MemoryStore {
    async fn insert_room(&self, room: RoomRow) -> Result<(), StoreError> {
        let mut inner = self.lock();
        if inner.rooms.contains_key(&room.code) {
            return Err(StoreError::CodeCollision(room.code));
        }
        tracing::debug!(room = %room.code, "room row inserted");
        inner.rooms.insert(room.code.clone(), room);
        Ok(())
    }

    async fn room(&self, code: &RoomCode) -> Result<Option<RoomRow>, StoreError> {
        Ok(self.lock().rooms.get(code).cloned())
    }

    async fn update_room(&self, room: &RoomRow) -> Result<(), StoreError> {
        let mut inner = self.lock();
        match inner.rooms.get_mut(&room.code) {
            Some(row) => {
                *row = room.clone();
                Ok(())
            }
            None => Err(StoreError::MissingRow(format!("room {}", room.code))),
        }
    }

    async fn insert_player(&self, player: NewPlayer) -> Result<PlayerRow, StoreError> {
        let mut inner = self.lock();
        let key = PlayerKey(inner.next_key);
        inner.next_key += 1;

        let row = PlayerRow {
            key,
            secret: player.secret,
            room: player.room,
            name: player.name,
            turn_index: player.turn_index,
            choice: None,
            score: 0,
            active: true,
        };
        inner.players.insert(key, row.clone());
        tracing::debug!(player = %key, room = %row.room, "player row inserted");
        Ok(row)
    }

    async fn player(&self, key: PlayerKey) -> Result<Option<PlayerRow>, StoreError> {
        Ok(self.lock().players.get(&key).cloned())
    }

    async fn update_player(&self, player: &PlayerRow) -> Result<(), StoreError> {
        let mut inner = self.lock();
        match inner.players.get_mut(&player.key) {
            Some(row) => {
                *row = player.clone();
                Ok(())
            }
            None => Err(StoreError::MissingRow(format!("player {}", player.key))),
        }
    }

    async fn delete_player(&self, key: PlayerKey) -> Result<(), StoreError> {
        self.lock().players.remove(&key);
        Ok(())
    }

    async fn room_players(&self, code: &RoomCode) -> Result<Vec<PlayerRow>, StoreError> {
        let mut players: Vec<PlayerRow> = self
            .lock()
            .players
            .values()
            .filter(|p| &p.room == code)
            .cloned()
            .collect();
        players.sort_by_key(|p| p.turn_index);
        Ok(players)
    }

    async fn card_ids(&self) -> Result<Vec<CardId>, StoreError> {
        Ok(self.lock().cards.keys().copied().collect())
    }

    async fn card(&self, id: CardId) -> Result<Option<CardRow>, StoreError> {
        Ok(self.lock().cards.get(&id).cloned())
    }

    async fn questions(&self, card: CardId) -> Result<Vec<QuestionRow>, StoreError> {
        let mut questions: Vec<QuestionRow> = self
            .lock()
            .questions
            .iter()
            .filter(|q| q.card == card)
            .cloned()
            .collect();
        questions.sort_by_key(|q| q.index);
        Ok(questions)
    }
}

// =========================================================================
// Tests
// =========================================================================
