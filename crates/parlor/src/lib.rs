//! # Parlor
//!
//! Server backend for a turn-based party guessing game: players gather in
//! a five-letter-coded room, one of them (the actor) is dealt a hidden
//! card, everyone else guesses which of the card's questions is the
//! designated one, the reveal scores the round, and the turn rotates.
//!
//! The stack, bottom up:
//!
//! - `parlor-transport` — text-frame delivery (WebSocket by default)
//! - `parlor-protocol` — actions, events, envelopes, input sanitizer
//! - `parlor-store` — row-level persistence boundary
//! - `parlor-session` — credential verification and connection binding
//! - `parlor-room` — per-room actors, turn order, round engine
//! - this crate — the [`GameController`] orchestrating an action end to
//!   end, the per-connection handler, and the [`ParlorServer`] loop
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use parlor::prelude::*;
//! use parlor_store::MemoryStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ParlorError> {
//!     let (cards, questions) = parlor::deck::demo_deck();
//!     let server = ParlorServerBuilder::new()
//!         .bind("0.0.0.0:3080")
//!         .build(MemoryStore::with_deck(cards, questions))
//!         .await?;
//!     server.run().await
//! }
//! ```

mod controller;
pub mod deck;
mod error;
mod handler;
mod server;

pub use controller::GameController;
pub use error::ParlorError;
pub use server::{ParlorServer, ParlorServerBuilder};

/// One-stop imports for building and running a server.
pub mod prelude {
    pub use crate::{GameController, ParlorError, ParlorServer, ParlorServerBuilder};
    pub use parlor_protocol::{
        ClientAction, Envelope, PlayerKey, RoomCode, RoomSnapshot, RosterEntry, RoundPhase,
        Secret, ServerEvent,
    };
    pub use parlor_room::RoomConfig;
    pub use parlor_session::BinderConfig;
    pub use parlor_store::Store;
}
