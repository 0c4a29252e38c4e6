//! Record ID generation
//!
//! IDs need no coordination: a time-derived prefix followed by a random
//! suffix. Collisions are not checked.

use sha2::{Digest, Sha256};
use uuid::Uuid;

const RANDOM_LEN: usize = 10;
const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Generate a unique record ID
///
/// The millisecond clock in base36, then 10 lowercase Crockford base32 chars
/// of a hash over a fresh UUID and the nanosecond clock.
pub fn generate_id() -> String {
    let now = chrono::Utc::now();
    let millis = u64::try_from(now.timestamp_millis()).unwrap_or(0);
    let nanos = now.timestamp_nanos_opt().unwrap_or(0);

    let mut hasher = Sha256::new();
    hasher.update(Uuid::new_v4().as_bytes());
    hasher.update(nanos.to_le_bytes());
    let hash = hasher.finalize();

    let random = base32::encode(base32::Alphabet::Crockford, &hash[..8])
        .to_lowercase()
        .chars()
        .take(RANDOM_LEN)
        .collect::<String>();

    format!("{}{}", to_base36(millis), random)
}

fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}
