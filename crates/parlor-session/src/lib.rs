//! Player identity for Parlor.
//!
//! Two concerns live here, and the distinction matters:
//!
//! 1. **Durable identity** — the `(playerKey, secret)` credential pair,
//!    persisted on the player row. [`IdentityVerifier`] checks a presented
//!    pair against the roster; it is the sole authorization primitive and
//!    every credentialed action calls it before mutating anything.
//! 2. **Transient association** — which live connection currently speaks
//!    for which identity. [`SessionBinder`] owns that map. It is bounded,
//!    process-local, never persisted, and deliberately weak: a binding is
//!    recreated freely on reconnect and its loss proves nothing about the
//!    player.

mod binder;
mod error;
mod verifier;

pub use binder::{BinderConfig, Binding, SessionBinder};
pub use error::SessionError;
pub use verifier::{IdentityVerifier, generate_secret};
