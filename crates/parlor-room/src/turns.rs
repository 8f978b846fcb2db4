//! Turn-order rules: where a joining player lands and who acts next.
//!
//! Pure functions over player rows. The actor applies the results; these
//! functions never touch the store.
//!
//! Placement follows join order with one deliberate exception: a new
//! player is always placed next-to-last in line, never imminently due to
//! act. While the pointer still sits on the first actor, joiners append.
//! Once the rotation has moved past the first actor, everyone at or past
//! the pointer shifts up one, the pointer follows, and the joiner takes
//! the vacated slot, last in line again.

use parlor_store::PlayerRow;

/// Where a joining player is slotted into the turn order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Take the next index after the current maximum. The pointer does
    /// not move.
    Append { turn_index: u32 },

    /// Shift every player with `turn_index >= pointer` up by one, move
    /// the pointer to `next_pointer`, and take the vacated `turn_index`.
    Splice { turn_index: u32, next_pointer: u32 },
}

/// Computes the placement for a player joining a room whose turn pointer
/// is `pointer`.
pub fn placement(pointer: u32, players: &[PlayerRow]) -> Placement {
    let max = players.iter().map(|p| p.turn_index).max().unwrap_or(0);
    match players.iter().map(|p| p.turn_index).min() {
        // Rotation has moved past the first actor: splice in at the
        // pointer so the joiner is last in line to act.
        Some(min) if pointer > min => Placement::Splice {
            turn_index: pointer,
            next_pointer: pointer + 1,
        },
        // Empty room, or the rotation has not moved past the first
        // actor (the pointer can trail the minimum index if the room's
        // creator left the lobby).
        _ => Placement::Append {
            turn_index: max + 1,
        },
    }
}

/// The first actor of a game: the minimum turn index among active players.
///
/// Usually 1, but higher if the room's creator left the lobby before the
/// game started.
pub fn first_actor(players: &[PlayerRow]) -> Option<u32> {
    players
        .iter()
        .filter(|p| p.active)
        .map(|p| p.turn_index)
        .min()
}

/// The next actor after `pointer`: the smallest active turn index
/// strictly greater than the pointer, wrapping to the smallest active
/// index if none exists.
///
/// Inactive players keep their slot and are skipped, not removed, so a
/// reconnect before the rotation passes them preserves their place.
pub fn next_actor(pointer: u32, players: &[PlayerRow]) -> Option<u32> {
    let mut actives: Vec<u32> = players
        .iter()
        .filter(|p| p.active)
        .map(|p| p.turn_index)
        .collect();
    actives.sort_unstable();

    actives
        .iter()
        .copied()
        .find(|i| *i > pointer)
        .or_else(|| actives.first().copied())
}

// =========================================================================
// Tests
// =========================================================================
