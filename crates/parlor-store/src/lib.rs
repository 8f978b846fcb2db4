//! Persistence boundary for Parlor.
//!
//! The game core never talks to a database directly; it programs against
//! the [`Store`] trait: plain row-level reads and writes, keyed by room
//! code and player key, with **no atomicity across calls**. Whatever
//! consistency the game needs across multiple rows is the caller's problem
//! (the room layer solves it by serializing every transition through a
//! per-room actor).
//!
//! Two guarantees the trait does make:
//!
//! - room codes are unique: inserting a duplicate fails with
//!   [`StoreError::CodeCollision`], making the store the final arbiter for
//!   concurrent code allocation across processes;
//! - player keys are allocated by the store and never reused, even after
//!   the row is deleted.
//!
//! [`MemoryStore`] is the bundled implementation: a process-local map,
//! suitable for single-node deployments and tests.

mod error;
mod memory;
mod rows;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use rows::{CardRow, NewPlayer, PlayerRow, QuestionRow, RoomRow};

use std::future::Future;

use parlor_protocol::{CardId, PlayerKey, RoomCode};

/// Row-level CRUD over rooms, players, and static content.
pub trait Store: Send + Sync + 'static {
    /// Inserts a freshly created room.
    ///
    /// # Errors
    /// [`StoreError::CodeCollision`] if a room with this code already
    /// exists; the caller re-rolls and retries.
    fn insert_room(&self, room: RoomRow) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Reads a room row by code. `Ok(None)` if it does not exist.
    fn room(
        &self,
        code: &RoomCode,
    ) -> impl Future<Output = Result<Option<RoomRow>, StoreError>> + Send;

    /// Overwrites a room row.
    ///
    /// # Errors
    /// [`StoreError::MissingRow`] if the room does not exist.
    fn update_room(&self, room: &RoomRow) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Creates a player row, allocating a fresh key.
    fn insert_player(
        &self,
        player: NewPlayer,
    ) -> impl Future<Output = Result<PlayerRow, StoreError>> + Send;

    /// Reads a player row by key. `Ok(None)` if it does not exist.
    fn player(
        &self,
        key: PlayerKey,
    ) -> impl Future<Output = Result<Option<PlayerRow>, StoreError>> + Send;

    /// Overwrites a player row.
    ///
    /// # Errors
    /// [`StoreError::MissingRow`] if the player does not exist.
    fn update_player(
        &self,
        player: &PlayerRow,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Deletes a player row. Deleting an absent row is a no-op; the key
    /// is never handed out again either way.
    fn delete_player(&self, key: PlayerKey)
    -> impl Future<Output = Result<(), StoreError>> + Send;

    /// All players in a room, ordered by turn index.
    fn room_players(
        &self,
        code: &RoomCode,
    ) -> impl Future<Output = Result<Vec<PlayerRow>, StoreError>> + Send;

    /// Every card id in the content set, including reserved ones; the
    /// draw-time exclusion is the round engine's job.
    fn card_ids(&self) -> impl Future<Output = Result<Vec<CardId>, StoreError>> + Send;

    /// Reads a card row. `Ok(None)` if it does not exist.
    fn card(
        &self,
        id: CardId,
    ) -> impl Future<Output = Result<Option<CardRow>, StoreError>> + Send;

    /// A card's questions, ordered by their stable per-card index.
    fn questions(
        &self,
        card: CardId,
    ) -> impl Future<Output = Result<Vec<QuestionRow>, StoreError>> + Send;
}
