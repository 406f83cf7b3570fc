//! Timeout enforcement.
//!
//! # Responsibilities
//! - Bound connect time and total request/response time on every outbound call
//! - Build the single pooled client shared by all forwards
//!
//! # Design Decisions
//! - Timeouts are enforced by the client itself, so a hung upstream releases its
//!   connection without help from the inbound side
//! - Timeout errors stay distinguishable (`reqwest::Error::is_timeout`)

use std::time::Duration;

use crate::config::TimeoutConfig;

/// Connect timeout as a `Duration`.
pub fn connect_timeout(config: &TimeoutConfig) -> Duration {
    Duration::from_secs(config.connect_secs)
}

/// Total request timeout as a `Duration`.
pub fn request_timeout(config: &TimeoutConfig) -> Duration {
    Duration::from_secs(config.request_secs)
}

/// Build the outbound client with the configured deadlines.
pub fn build_client(config: &TimeoutConfig) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .connect_timeout(connect_timeout(config))
        .timeout(request_timeout(config))
        .build()
}
