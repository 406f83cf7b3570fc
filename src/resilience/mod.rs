//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to upstream:
//!     → timeouts.rs (enforce connect/request timeout)
//!     → On failure: surfaced once to the caller, never retried
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - Single attempt per forward: callers own any retry policy

pub mod timeouts;
