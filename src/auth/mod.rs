//! Caller authorization.
//!
//! # Data Flow
//! ```text
//! X-Request-Key header
//!     → key.rs (derive today's token from seed + UTC date, compare)
//!     → clock.rs supplies the UTC calendar day
//! ```
//!
//! # Design Decisions
//! - Token is recomputed per call, never cached: rotation at UTC midnight needs no timer
//! - Clock is injectable so rotation is testable
//! - CRC-32 checksum, not a MAC: intended for non-adversarial, pre-provisioned clients

pub mod clock;
pub mod key;

pub use clock::{Clock, FixedClock, SystemClock};
pub use key::{derive_key, validate_key, KeyValidator};
