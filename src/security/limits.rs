//! Request body limits.
//!
//! # Responsibilities
//! - Enforce the maximum forward body size before the handler runs
//!
//! # Design Decisions
//! - Oversized bodies are answered with `413 Payload Too Large`; the gate never
//!   sees them and no upstream call is made
//! - Axum's own 2 MiB default is disabled so the configured limit is the only one

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;

use crate::config::ForwardingConfig;

/// Wrap `router` so request bodies above `max_body_size` are refused.
pub fn with_body_limit(router: Router, config: &ForwardingConfig) -> Router {
    router
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(config.max_body_size))
}
