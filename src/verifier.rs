//! Rate-limited HTTP probes against Mojang's account APIs, with a TTL
//! cache kept on each Player. Verifier errors never propagate to invalidate
//! a successful status poll — they're swallowed and retried next cycle.

use std::time::Duration;

use tracing::debug;

use crate::model::{clock::now_unix, player::Player, Tristate};

/// `216000 * 12` seconds, as the source writes it — an intentional cheap
/// approximation of 30 days, not a precise calendar calculation.
pub const PREMIUM_VERIFY_TTL_SECS: i64 = 216_000 * 12;

pub const HTTP_TIMEOUT: Duration = Duration::from_secs(5);

const SESSION_SERVER_URL: &str = "https://sessionserver.mojang.com/session/minecraft/profile";
const PROFILE_LOOKUP_URL: &str = "https://api.mojang.com/users/profiles/minecraft";

pub fn build_http_client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder().timeout(HTTP_TIMEOUT).build()
}

#[derive(Debug, Clone, Copy)]
pub struct VerificationResult {
    pub premium_uuid: Tristate,
    pub premium_name: Tristate,
    pub verified_at: i64,
}

/// Runs both Mojang probes for the given uuid/name pair. Returns `None` on
/// any network failure, in which case the caller must leave the player's
/// existing verification state untouched so the TTL retries next cycle.
/// Deliberately takes owned strings rather than `&Player` so callers don't
/// need to hold a lock on the model graph across the awaited HTTP calls.
pub async fn verify(client: &reqwest::Client, uuid: &str, name: &str) -> Option<VerificationResult> {
    let uuid_check = client
        .get(format!("{SESSION_SERVER_URL}/{uuid}"))
        .send()
        .await;
    let name_check = client
        .get(format!("{PROFILE_LOOKUP_URL}/{name}"))
        .send()
        .await;

    let (uuid_check, name_check) = match (uuid_check, name_check) {
        (Ok(a), Ok(b)) => (a, b),
        _ => {
            debug!(%name, "premium verification probe failed, will retry next cycle");
            return None;
        }
    };

    Some(VerificationResult {
        premium_uuid: Tristate::from_bool(uuid_check.status().is_success()),
        premium_name: Tristate::from_bool(name_check.status().is_success()),
        verified_at: now_unix(),
    })
}

pub fn apply_verification(player: &mut Player, result: VerificationResult) {
    player.premium_uuid = result.premium_uuid;
    player.premium_name = result.premium_name;
    player.last_verified = result.verified_at;
}
