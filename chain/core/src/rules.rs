//! Name rules: validation, hashing and rollout schedule.

use sha3::{Digest, Sha3_256};

use crate::hash::Hash;
use crate::params::Params;

pub const MAX_NAME_SIZE: usize = 63;

/// A valid name is 1..=63 chars of `a-z`, `0-9`, `-` or `_`, with no leading
/// or trailing hyphen.
pub fn verify_name(name: &str) -> bool {
    if name.is_empty() || name.len() > MAX_NAME_SIZE {
        return false;
    }
    if name.starts_with('-') || name.ends_with('-') {
        return false;
    }
    name.bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-' || b == b'_')
}

/// SHA3-256 of the raw name bytes, the key every name record hangs off.
pub fn hash_name(name: &str) -> Hash {
    let digest = Sha3_256::digest(name.as_bytes());
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&digest);
    Hash::new(bytes)
}

/// Rollout week for a name hash: names unlock over the first 52 weeks.
pub fn rollout_week(name_hash: &Hash) -> u32 {
    u32::from(name_hash.as_bytes()[0]) % 52
}

/// First height at which a name may be opened.
pub fn rollout_height(name_hash: &Hash, params: &Params) -> u32 {
    (rollout_week(name_hash) + 1) * params.rollout_interval
}
