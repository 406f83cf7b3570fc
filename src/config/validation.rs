//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (port window, timeouts > 0)
//! - Reject a validation seed that is present but empty
//! - Check header prefix and default content type are usable on the wire
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::{HeaderName, HeaderValue};
use thiserror::Error;
use url::Host;

use crate::config::schema::GatewayConfig;

/// Lowest port the gateway may bind.
pub const MIN_PORT: u16 = 1024;
/// Highest port the gateway may bind.
pub const MAX_PORT: u16 = 9999;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("port {0} outside allowed range 1024-9999")]
    PortOutOfRange(u16),

    #[error("key validation enabled with an empty seed")]
    EmptySeed,

    #[error("timeout `{0}` must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("header prefix {0:?} is not a valid header name")]
    InvalidHeaderPrefix(String),

    #[error("default content type {0:?} is not a valid header value")]
    InvalidContentType(String),

    #[error("max_body_size must be greater than zero")]
    ZeroBodyLimit,

    #[error("listener host {0:?} is neither an IP address nor a hostname")]
    InvalidHost(String),

    #[error("metrics address {0:?} is not a socket address")]
    InvalidMetricsAddress(String),
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let port = config.listener.port;
    if !(MIN_PORT..=MAX_PORT).contains(&port) {
        errors.push(ValidationError::PortOutOfRange(port));
    }
    // IP literals and hostnames both bind; IPv6 needs brackets to join with the port.
    if Host::parse(&config.listener.host).is_err() {
        errors.push(ValidationError::InvalidHost(config.listener.host.clone()));
    }

    if let Some(seed) = &config.validation.seed {
        if seed.is_empty() {
            errors.push(ValidationError::EmptySeed);
        }
    }

    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("connect_secs"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("request_secs"));
    }

    let prefix = &config.forwarding.header_prefix;
    if prefix.is_empty() || HeaderName::from_bytes(prefix.as_bytes()).is_err() {
        errors.push(ValidationError::InvalidHeaderPrefix(prefix.clone()));
    }

    let content_type = &config.forwarding.default_content_type;
    if content_type.is_empty() || HeaderValue::from_str(content_type).is_err() {
        errors.push(ValidationError::InvalidContentType(content_type.clone()));
    }

    if config.forwarding.max_body_size == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
