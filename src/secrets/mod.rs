//! Server-held secrets referenced by opaque key IDs.
//!
//! # Data Flow
//! ```text
//! secrets file (JSON object, KeyID -> SecretValue)
//!     → store.rs (parse once at startup)
//!     → SecretStore (immutable, Arc-shared)
//!     → forward::headers (exact key-ID lookups only)
//! ```
//!
//! # Design Decisions
//! - Populated once, never mutated afterwards: concurrent reads need no locking
//! - Values never appear in Debug output or logs

pub mod store;

pub use store::{SecretStore, SecretsError};
