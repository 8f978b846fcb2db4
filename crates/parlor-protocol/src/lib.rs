//! Wire protocol for Parlor.
//!
//! This crate defines the language clients and server speak:
//!
//! - **Identity types** ([`PlayerKey`], [`RoomCode`], [`Secret`], [`CardId`])
//! - **Actions** ([`ClientAction`]) — everything a client may request
//! - **Events** ([`ServerEvent`], [`Envelope`]) — replies and broadcasts
//! - **Sanitizer** ([`sanitize`]) — the allow-listed input cleaning every
//!   inbound string passes through before any further use
//! - **Codec** ([`Codec`], [`JsonCodec`]) — byte-level encode/decode
//!
//! The protocol layer knows nothing about rooms, sessions, or storage;
//! it only defines shapes and how they serialize.

mod action;
mod codec;
mod error;
mod event;
pub mod sanitize;
mod types;

pub use action::ClientAction;
pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use event::{Envelope, ServerEvent};
pub use types::{
    CardId, CardView, PlayerKey, QuestionView, ROOM_CODE_LEN, Recipient, RoomCode,
    RoomSnapshot, RosterEntry, RoundPhase, Secret,
};
