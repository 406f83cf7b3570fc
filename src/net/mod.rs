//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     → tls.rs (load certificate + key when HTTPS is on)
//!     → http::server (plain or rustls-wrapped listener)
//! ```
//!
//! TLS is optional; the accept loop itself belongs to axum / axum-server.

pub mod tls;

pub use tls::{load_tls_config, TlsError};
