//! Rotating caller key.
//!
//! The valid key for a day is the CRC-32 (IEEE) of `"YYYY-MM-DD" + seed`,
//! little-endian, encoded as unpadded URL-safe base64 (always 6 characters).

use std::fmt;
use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::NaiveDate;

use crate::auth::clock::{Clock, SystemClock};

/// Derive the key valid on `date` for `seed`.
pub fn derive_key(date: NaiveDate, seed: &str) -> String {
    let material = format!("{}{}", date.format("%Y-%m-%d"), seed);
    let checksum = crc32fast::hash(material.as_bytes());
    URL_SAFE_NO_PAD.encode(checksum.to_le_bytes())
}

/// True only when `candidate` is exactly the key for `date` and `seed`.
pub fn validate_key(candidate: &str, seed: &str, date: NaiveDate) -> bool {
    candidate == derive_key(date, seed)
}

/// Validates caller keys against a fixed seed and a clock.
#[derive(Clone)]
pub struct KeyValidator {
    seed: String,
    clock: Arc<dyn Clock>,
}

impl KeyValidator {
    /// Validator on the system clock.
    pub fn new(seed: impl Into<String>) -> Self {
        Self::with_clock(seed, SystemClock)
    }

    pub fn with_clock(seed: impl Into<String>, clock: impl Clock) -> Self {
        Self {
            seed: seed.into(),
            clock: Arc::new(clock),
        }
    }

    /// Check a caller-supplied key against today's key.
    pub fn validate(&self, candidate: &str) -> bool {
        validate_key(candidate, &self.seed, self.clock.today())
    }

    /// The key currently accepted.
    pub fn current_key(&self) -> String {
        derive_key(self.clock.today(), &self.seed)
    }
}

impl fmt::Debug for KeyValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyValidator").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::clock::FixedClock;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn known_vectors() {
        assert_eq!(derive_key(date(2024, 1, 1), "abc"), "aMngDQ");
        assert_eq!(derive_key(date(2024, 1, 2), "abc"), "hmZVHw");
        assert_eq!(derive_key(date(2024, 2, 29), "abc"), "eqh8gw");
        assert_eq!(derive_key(date(2024, 1, 1), ""), "MP3w1g");
    }

    #[test]
    fn encoding_is_url_safe_and_unpadded() {
        // Standard base64 would give "+Mt+Mw==".
        let key = derive_key(date(2024, 1, 1), "seed3");
        assert_eq!(key, "-Mt-Mw");
        assert_eq!(key.len(), 6);
    }

    #[test]
    fn exact_match_only() {
        let today = date(2024, 1, 1);
        assert!(validate_key("aMngDQ", "abc", today));
        assert!(!validate_key("aMngDQ==", "abc", today));
        assert!(!validate_key("amngdq", "abc", today));
        assert!(!validate_key("", "abc", today));
        assert!(!validate_key("aMngDQ", "abd", today));
    }

    #[test]
    fn any_single_bit_flip_is_rejected() {
        let today = date(2024, 1, 1);
        let key = derive_key(today, "abc");
        for (i, _) in key.bytes().enumerate() {
            for bit in 0..8 {
                let mut bytes = key.clone().into_bytes();
                bytes[i] ^= 1 << bit;
                if let Ok(mutated) = String::from_utf8(bytes) {
                    assert!(!validate_key(&mutated, "abc", today), "{mutated:?}");
                }
            }
        }
    }

    #[test]
    fn yesterdays_key_is_rejected_today() {
        let yesterday = date(2024, 1, 1);
        let today = date(2024, 1, 2);
        let old_key = derive_key(yesterday, "abc");

        let validator = KeyValidator::with_clock("abc", FixedClock(today));
        assert!(!validator.validate(&old_key));
        assert!(validator.validate(&derive_key(today, "abc")));
    }

    #[test]
    fn validator_tracks_its_clock() {
        let validator = KeyValidator::with_clock("abc", FixedClock(date(2024, 1, 1)));
        assert_eq!(validator.current_key(), "aMngDQ");
        assert!(validator.validate("aMngDQ"));
        assert!(!validator.validate("wrong"));
    }

    #[test]
    fn debug_output_hides_seed() {
        let validator = KeyValidator::with_clock("very-private-seed", FixedClock(date(2024, 1, 1)));
        assert!(!format!("{validator:?}").contains("very-private-seed"));
    }
}
