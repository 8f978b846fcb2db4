//! Room layer configuration.

use std::collections::HashSet;
use std::time::Duration;

use parlor_protocol::CardId;

/// Settings shared by every room actor a registry spawns.
#[derive(Debug, Clone)]
pub struct RoomConfig {
    /// Card ids excluded from random draws (kept out of rotation by the
    /// content set, e.g. tutorial or seasonal cards).
    pub reserved_cards: HashSet<CardId>,

    /// Upper bound on any single persistence call. An elapsed timeout
    /// surfaces as `DataUnavailable` instead of wedging the room actor.
    pub store_timeout: Duration,

    /// Command channel capacity per room actor; senders queue when full.
    pub channel_size: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            reserved_cards: HashSet::new(),
            store_timeout: Duration::from_secs(5),
            channel_size: 64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_config_default() {
        let config = RoomConfig::default();
        assert!(config.reserved_cards.is_empty());
        assert_eq!(config.store_timeout, Duration::from_secs(5));
        assert_eq!(config.channel_size, 64);
    }
}
