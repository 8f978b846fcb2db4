//! Room lifecycle for Parlor.
//!
//! Each room runs as an isolated Tokio task (actor model) owning every
//! mutating transition for its room code: joins, leaves, disconnects,
//! start, guesses, reveal, and advance are totally ordered through the
//! actor's command channel. That single-actor boundary is the per-room
//! atomicity the store itself does not provide; rooms never block each
//! other, and a duplicate "start" is resolved inside the actor where the
//! race actually lands.
//!
//! # Key types
//!
//! - [`RoomRegistry`] — allocates collision-free room codes, finds rooms,
//!   spawns and caches actors
//! - [`RoomHandle`] — send commands to a running room actor
//! - [`turns`] — turn-order placement and advancement rules
//! - [`RoomConfig`] — reserved cards, store timeout, channel sizing

mod config;
mod error;
mod registry;
mod room;
mod round;
pub mod turns;

pub use config::RoomConfig;
pub use error::RoomError;
pub use registry::RoomRegistry;
pub use room::{EventSender, JoinOutcome, RoomHandle, RoundOutcome};
