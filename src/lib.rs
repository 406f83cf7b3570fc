//! Forwarding gateway library.
//!
//! One endpoint, `POST /v1/forward`: the caller names an upstream method and URL
//! in headers, proves itself with a daily rotating key, and refers to
//! server-held secrets by key ID. The gateway substitutes the secrets, performs
//! the outbound call, and relays the upstream body and content type.

pub mod auth;
pub mod config;
pub mod forward;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod resilience;
pub mod secrets;
pub mod security;

pub use config::schema::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::{Shutdown, StartupError};
pub use secrets::SecretStore;
