//! Outbound HTTP transaction.
//!
//! # Responsibilities
//! - Build the outbound request from method, URL, resolved headers and body
//! - Dispatch once over the shared connection pool
//! - Drain the upstream body and capture status and content type
//!
//! # Design Decisions
//! - Bodies are buffered both ways; content type must be known before any byte
//!   is written back to the caller
//! - A non-2xx upstream status is a response, not an error
//! - `Executor` is a trait so the gate can run against a stub

use std::future::Future;

use axum::body::Bytes;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, StatusCode};
use thiserror::Error;
use url::Url;

use crate::config::TimeoutConfig;
use crate::forward::headers::ResolvedHeaders;
use crate::forward::request::AllowedMethod;
use crate::resilience::timeouts::build_client;

/// Everything needed to perform one forward.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: AllowedMethod,
    pub url: String,
    pub headers: ResolvedHeaders,
    pub body: Bytes,
}

/// Upstream reply, fully buffered.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    /// Upstream `Content-Type` exactly as received.
    pub content_type: Option<HeaderValue>,
    pub body: Bytes,
}

/// Errors raised while forwarding.
#[derive(Debug, Error)]
pub enum ForwardError {
    /// The outbound request could not be constructed (e.g. unparseable URL).
    #[error("invalid outbound request: {0}")]
    InvalidRequest(String),

    /// Connect, write or read failure, including timeouts.
    #[error("upstream request failed: {0}")]
    Upstream(#[source] reqwest::Error),

    #[error("failed to read upstream body: {0}")]
    Body(#[source] reqwest::Error),

    /// The forwarding task ended without producing a result.
    #[error("forwarding task aborted: {0}")]
    Aborted(String),
}

impl ForwardError {
    pub fn is_timeout(&self) -> bool {
        match self {
            ForwardError::Upstream(e) | ForwardError::Body(e) => e.is_timeout(),
            _ => false,
        }
    }
}

/// Performs outbound requests.
pub trait Executor: Send + Sync + 'static {
    fn execute(
        &self,
        request: OutboundRequest,
    ) -> impl Future<Output = Result<UpstreamResponse, ForwardError>> + Send;
}

/// Production executor backed by one pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpExecutor {
    client: reqwest::Client,
}

impl HttpExecutor {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Executor whose client enforces the configured timeouts.
    pub fn from_config(config: &TimeoutConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_client(config)?))
    }
}

impl Executor for HttpExecutor {
    async fn execute(&self, request: OutboundRequest) -> Result<UpstreamResponse, ForwardError> {
        let url = parse_target(&request.url)?;

        let response = self
            .client
            .request(request.method.into(), url)
            .headers(request.headers.into_header_map())
            .body(request.body)
            .send()
            .await
            .map_err(ForwardError::Upstream)?;

        let status = response.status();
        let content_type = response.headers().get(CONTENT_TYPE).cloned();

        // Consumes the response; the connection goes back to the pool (or is
        // closed) whether or not the read succeeds.
        let body = response.bytes().await.map_err(ForwardError::Body)?;

        Ok(UpstreamResponse {
            status,
            content_type,
            body,
        })
    }
}

/// Parse the caller's target into an absolute http(s) URL.
fn parse_target(target: &str) -> Result<Url, ForwardError> {
    let url = Url::parse(target)
        .map_err(|e| ForwardError::InvalidRequest(format!("{target:?}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ForwardError::InvalidRequest(format!(
            "unsupported scheme {other:?}"
        ))),
    }
}
