//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → limits.rs (refuse oversized bodies)
//!     → auth (rotating key check inside the gate)
//! ```

pub mod limits;
