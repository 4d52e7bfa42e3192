//! Deterministic actor bucketing for percentage-of-actors rollouts.
//!
//! The bucket is part of the storage contract, not an implementation detail:
//! any implementation sharing an adapter must compute the same value.
//!
//! ```text
//! input  = "{feature}.{actor_id}"            (UTF-8)
//! digest = SHA-1(input), lowercase hex
//! bucket = u64::from_str_radix(digest[..15], 16) % 100
//! ```

use sha1::{Digest, Sha1};

/// Number of buckets an actor can land in.
pub const BUCKETS: u64 = 100;

/// Maps an actor to a stable bucket in `0..100` for the given feature.
pub fn bucket(feature: &str, actor_id: &str) -> u8 {
    let input = format!("{}.{}", feature, actor_id);

    let mut hasher = Sha1::new();
    hasher.update(input.as_bytes());
    let hash = hasher.finalize();
    let hex = format!("{:x}", hash);

    let substr = &hex[..15];
    let value = u64::from_str_radix(substr, 16).unwrap_or(0);
    (value % BUCKETS) as u8
}

/// Whether an actor falls inside a rollout of `percentage` percent.
pub fn in_rollout(feature: &str, actor_id: &str, percentage: u8) -> bool {
    percentage > 0 && bucket(feature, actor_id) < percentage
}
