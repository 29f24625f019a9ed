//! One account seen in a status "sample". Player records are never
//! auto-deleted; only an operator (via the TUI) removes one.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{clock::now_unix, tristate::Tristate};

/// Normalizes a uuid to canonical dashed-hex form when it parses as a valid
/// uuid; falls back to the raw string otherwise, since some servers
/// advertise offline-mode placeholder ids that don't parse cleanly.
pub fn canonicalize_uuid(raw: &str) -> String {
    Uuid::parse_str(raw)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| raw.to_string())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub uuid: String,
    pub active: bool,
    pub last_seen: i64,
    pub play_time: f64,
    pub last_verified: i64,
    pub premium_name: Tristate,
    pub premium_uuid: Tristate,
}

impl Player {
    pub fn new(name: String, uuid: String) -> Self {
        Player {
            name,
            uuid,
            active: false,
            last_seen: 0,
            play_time: 0.0,
            last_verified: 0,
            premium_name: Tristate::Unknown,
            premium_uuid: Tristate::Unknown,
        }
    }

    /// The only writer of `play_time`. If the player was already marked
    /// active, the elapsed wall time since `last_seen` is folded into
    /// `play_time` before `last_seen` is advanced.
    pub fn update_last_seen(&mut self) {
        let now = now_unix();
        if self.active {
            self.play_time += (now - self.last_seen).max(0) as f64;
        }
        self.last_seen = now;
        self.active = true;
    }

    pub fn mark_inactive(&mut self) {
        self.active = false;
    }

    /// TTL a player's premium-verification cache; see
    /// `crate::verifier::PREMIUM_VERIFY_TTL_SECS`.
    pub fn needs_verification(&self, ttl_secs: i64) -> bool {
        now_unix() - self.last_verified > ttl_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonicalizes_undashed_uuid_to_dashed_form() {
        let dashed = canonicalize_uuid("11111111111111111111111111111111");
        assert_eq!(dashed, "11111111-1111-1111-1111-111111111111");
    }

    #[test]
    fn leaves_unparseable_uuid_untouched() {
        assert_eq!(canonicalize_uuid("not-a-uuid"), "not-a-uuid");
    }

    #[test]
    fn update_last_seen_accumulates_play_time_only_while_active() {
        let mut player = Player::new("Alice".into(), "uuid-a".into());
        player.update_last_seen();
        assert!(player.active);
        assert_eq!(player.play_time, 0.0);

        // simulate elapsed time by rewinding last_seen
        player.last_seen -= 10;
        player.update_last_seen();
        assert!(player.play_time >= 10.0);
    }

    #[test]
    fn mark_inactive_does_not_touch_last_seen_or_play_time() {
        let mut player = Player::new("Alice".into(), "uuid-a".into());
        player.update_last_seen();
        let last_seen = player.last_seen;
        let play_time = player.play_time;
        player.mark_inactive();
        assert!(!player.active);
        assert_eq!(player.last_seen, last_seen);
        assert_eq!(player.play_time, play_time);
    }
}
