//! Request gate: the per-request forwarding pipeline.
//!
//! ```text
//! Received → Validated → MethodChecked → UrlChecked → HeadersResolved → Forwarded
//!     │           │             │              │                            │
//!     └───────────┴─────────────┴──────────────┴──── Rejected ◀── (failure) ┘
//! ```
//!
//! Each call walks the stages once, in order. The first failing check ends
//! the call with a [`Rejection`]; nothing after it runs.

use std::fmt;
use std::sync::Arc;

use axum::body::Bytes;
use axum::http::header::InvalidHeaderValue;
use axum::http::{HeaderValue, StatusCode};
use thiserror::Error;

use crate::auth::KeyValidator;
use crate::config::GatewayConfig;
use crate::forward::executor::{Executor, ForwardError, OutboundRequest};
use crate::forward::headers::HeaderResolver;
use crate::forward::request::{is_valid_url, AllowedMethod, ForwardRequest};
use crate::secrets::SecretStore;

/// Pipeline position of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    Validated,
    MethodChecked,
    UrlChecked,
    HeadersResolved,
    Forwarded,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Received => "received",
            Stage::Validated => "validated",
            Stage::MethodChecked => "method_checked",
            Stage::UrlChecked => "url_checked",
            Stage::HeadersResolved => "headers_resolved",
            Stage::Forwarded => "forwarded",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a request was not relayed.
#[derive(Debug, Error)]
pub enum Rejection {
    #[error("invalid key")]
    InvalidKey,

    #[error("invalid method")]
    InvalidMethod,

    #[error("invalid url")]
    InvalidUrl,

    #[error("forward failed")]
    Forward(#[source] ForwardError),
}

impl Rejection {
    /// Caller-visible reason.
    pub fn reason(&self) -> &'static str {
        match self {
            Rejection::InvalidKey => "invalid key",
            Rejection::InvalidMethod => "invalid method",
            Rejection::InvalidUrl => "invalid url",
            Rejection::Forward(_) => "forward failed",
        }
    }

    /// Last stage reached before the rejection.
    pub fn stage(&self) -> Stage {
        match self {
            Rejection::InvalidKey => Stage::Received,
            Rejection::InvalidMethod => Stage::Validated,
            Rejection::InvalidUrl => Stage::MethodChecked,
            Rejection::Forward(_) => Stage::HeadersResolved,
        }
    }

    /// Short label for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Rejection::InvalidKey => "invalid_key",
            Rejection::InvalidMethod => "invalid_method",
            Rejection::InvalidUrl => "invalid_url",
            Rejection::Forward(ForwardError::InvalidRequest(_)) => "invalid_request",
            Rejection::Forward(_) => "upstream_error",
        }
    }
}

/// Successful forward, ready to relay.
#[derive(Debug, Clone, PartialEq)]
pub struct Relayed {
    pub status: StatusCode,
    /// Upstream content type, byte for byte; `None` when the upstream sent none.
    pub content_type: Option<HeaderValue>,
    pub body: Bytes,
}

/// Sequences validation, policy, header resolution and forwarding.
pub struct Gate<E> {
    validator: Option<KeyValidator>,
    resolver: HeaderResolver,
    executor: Arc<E>,
    mirror_upstream_status: bool,
}

impl<E: Executor> Gate<E> {
    /// `validator: None` disables key validation: every caller is authorized.
    pub fn new(validator: Option<KeyValidator>, resolver: HeaderResolver, executor: E) -> Self {
        Self {
            validator,
            resolver,
            executor: Arc::new(executor),
            mirror_upstream_status: false,
        }
    }

    /// Build from validated configuration.
    pub fn from_config(
        config: &GatewayConfig,
        store: SecretStore,
        executor: E,
    ) -> Result<Self, InvalidHeaderValue> {
        let validator = config.validation.seed.as_deref().map(KeyValidator::new);
        let resolver = HeaderResolver::from_config(&config.forwarding, store)?;
        Ok(Self::new(validator, resolver, executor)
            .with_mirror_upstream_status(config.forwarding.mirror_upstream_status))
    }

    /// Relay the upstream status instead of always answering 200.
    pub fn with_mirror_upstream_status(mut self, mirror: bool) -> Self {
        self.mirror_upstream_status = mirror;
        self
    }

    pub fn validation_enabled(&self) -> bool {
        self.validator.is_some()
    }

    pub fn resolver(&self) -> &HeaderResolver {
        &self.resolver
    }

    /// Run one request through the pipeline.
    pub async fn handle(&self, request: ForwardRequest) -> Result<Relayed, Rejection> {
        if let Some(validator) = &self.validator {
            if !validator.validate(&request.caller_key) {
                return Err(Rejection::InvalidKey);
            }
        }
        trace_stage(Stage::Validated);

        let method = AllowedMethod::parse(&request.method).ok_or(Rejection::InvalidMethod)?;
        trace_stage(Stage::MethodChecked);

        if !is_valid_url(&request.url) {
            return Err(Rejection::InvalidUrl);
        }
        trace_stage(Stage::UrlChecked);

        let headers = self.resolver.resolve(&request.indirect);
        trace_stage(Stage::HeadersResolved);

        let outbound = OutboundRequest {
            method,
            url: request.url,
            headers,
            body: request.body,
        };

        // Runs on its own task: a caller hanging up does not cancel the
        // outbound call, which ends on completion or its own timeout.
        let executor = Arc::clone(&self.executor);
        let upstream = tokio::spawn(async move { executor.execute(outbound).await })
            .await
            .map_err(|e| Rejection::Forward(ForwardError::Aborted(e.to_string())))?
            .map_err(Rejection::Forward)?;
        trace_stage(Stage::Forwarded);

        let status = if self.mirror_upstream_status {
            upstream.status
        } else {
            StatusCode::OK
        };

        Ok(Relayed {
            status,
            content_type: upstream.content_type,
            body: upstream.body,
        })
    }
}

impl<E> fmt::Debug for Gate<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gate")
            .field("validation", &self.validator.is_some())
            .field("resolver", &self.resolver)
            .field("mirror_upstream_status", &self.mirror_upstream_status)
            .finish_non_exhaustive()
    }
}

fn trace_stage(stage: Stage) {
    tracing::trace!(stage = %stage, "Gate transition");
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use chrono::NaiveDate;

    use crate::auth::FixedClock;
    use crate::forward::executor::UpstreamResponse;
    use crate::forward::request::IndirectHeader;

    /// Executor double recording every outbound request.
    #[derive(Clone)]
    pub(crate) struct StubExecutor {
        calls: Arc<AtomicUsize>,
        seen: Arc<Mutex<Vec<OutboundRequest>>>,
        reply: Arc<dyn Fn() -> Result<UpstreamResponse, ForwardError> + Send + Sync>,
    }

    impl StubExecutor {
        pub(crate) fn replying(status: u16, content_type: &str, body: &'static str) -> Self {
            let content_type =
                (!content_type.is_empty()).then(|| HeaderValue::from_str(content_type).unwrap());
            Self::with(move || {
                Ok(UpstreamResponse {
                    status: StatusCode::from_u16(status).unwrap(),
                    content_type: content_type.clone(),
                    body: Bytes::from_static(body.as_bytes()),
                })
            })
        }

        pub(crate) fn failing() -> Self {
            Self::with(|| Err(ForwardError::Aborted("connection reset".to_string())))
        }

        fn with(
            reply: impl Fn() -> Result<UpstreamResponse, ForwardError> + Send + Sync + 'static,
        ) -> Self {
            Self {
                calls: Arc::new(AtomicUsize::new(0)),
                seen: Arc::new(Mutex::new(Vec::new())),
                reply: Arc::new(reply),
            }
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub(crate) fn last_request(&self) -> Option<OutboundRequest> {
            self.seen.lock().unwrap().last().cloned()
        }
    }

    impl Executor for StubExecutor {
        async fn execute(&self, request: OutboundRequest) -> Result<UpstreamResponse, ForwardError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(request);
            (self.reply)()
        }
    }

    pub(crate) fn jan_first() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    pub(crate) fn gate_with(stub: &StubExecutor, store: SecretStore) -> Gate<StubExecutor> {
        let validator = KeyValidator::with_clock("abc", FixedClock(jan_first()));
        let resolver = HeaderResolver::new(
            "X-Request-Key-",
            HeaderValue::from_static("application/json"),
            store,
        );
        Gate::new(Some(validator), resolver, stub.clone())
    }

    fn request(key: &str, method: &str, url: &str) -> ForwardRequest {
        ForwardRequest {
            method: method.to_string(),
            url: url.to_string(),
            caller_key: key.to_string(),
            indirect: Vec::new(),
            body: Bytes::new(),
        }
    }

    #[tokio::test]
    async fn valid_request_is_forwarded_and_relayed() {
        let stub = StubExecutor::replying(200, "text/plain", "hello");
        let gate = gate_with(&stub, SecretStore::empty());

        let relayed = gate
            .handle(request("aMngDQ", "GET", "http://example.test/x"))
            .await
            .unwrap();

        assert_eq!(relayed.status, StatusCode::OK);
        assert_eq!(relayed.content_type, Some(HeaderValue::from_static("text/plain")));
        assert_eq!(&relayed.body[..], b"hello");

        assert_eq!(stub.calls(), 1);
        let outbound = stub.last_request().unwrap();
        assert_eq!(outbound.method, AllowedMethod::Get);
        assert_eq!(outbound.url, "http://example.test/x");
        assert_eq!(outbound.headers.len(), 1);
        assert_eq!(outbound.headers.get("content-type"), Some("application/json"));
    }

    #[tokio::test]
    async fn wrong_key_short_circuits_before_upstream() {
        let stub = StubExecutor::replying(200, "text/plain", "hello");
        let gate = gate_with(&stub, SecretStore::empty());

        let err = gate
            .handle(request("wrong", "GET", "http://example.test/x"))
            .await
            .unwrap_err();

        assert!(matches!(err, Rejection::InvalidKey));
        assert_eq!(err.reason(), "invalid key");
        assert_eq!(err.stage(), Stage::Received);
        assert_eq!(stub.calls(), 0);
    }

    #[tokio::test]
    async fn key_checked_before_method_and_url() {
        let stub = StubExecutor::replying(200, "", "");
        let gate = gate_with(&stub, SecretStore::empty());

        let err = gate.handle(request("wrong", "DELETE", "")).await.unwrap_err();
        assert!(matches!(err, Rejection::InvalidKey));
    }

    #[tokio::test]
    async fn delete_is_rejected_for_every_url() {
        let stub = StubExecutor::replying(200, "", "");
        let gate = gate_with(&stub, SecretStore::empty());

        for url in ["http://example.test/x", "https://other.test/", "", "junk"] {
            let err = gate.handle(request("aMngDQ", "DELETE", url)).await.unwrap_err();
            assert!(matches!(err, Rejection::InvalidMethod), "{url}");
        }
        assert_eq!(stub.calls(), 0);
    }

    #[tokio::test]
    async fn empty_url_is_rejected_before_upstream() {
        let stub = StubExecutor::replying(200, "", "");
        let gate = gate_with(&stub, SecretStore::empty());

        let err = gate.handle(request("aMngDQ", "POST", "")).await.unwrap_err();
        assert!(matches!(err, Rejection::InvalidUrl));
        assert_eq!(err.stage(), Stage::MethodChecked);
        assert_eq!(stub.calls(), 0);
    }

    #[tokio::test]
    async fn disabled_validation_accepts_any_key() {
        let stub = StubExecutor::replying(200, "text/plain", "ok");
        let resolver = HeaderResolver::new(
            "X-Request-Key-",
            HeaderValue::from_static("application/json"),
            SecretStore::empty(),
        );
        let gate = Gate::new(None, resolver, stub.clone());
        assert!(!gate.validation_enabled());

        gate.handle(request("", "PUT", "http://example.test/x"))
            .await
            .unwrap();
        assert_eq!(stub.calls(), 1);
    }

    #[tokio::test]
    async fn indirection_headers_reach_upstream_resolved() {
        let stub = StubExecutor::replying(200, "application/json", "{}");
        let store: SecretStore = [("kid1", "Bearer xyz")].into_iter().collect();
        let gate = gate_with(&stub, store);

        let mut req = request("aMngDQ", "POST", "http://example.test/x");
        req.indirect = vec![
            IndirectHeader {
                name: "authorization".to_string(),
                key_id: "kid1".to_string(),
            },
            IndirectHeader {
                name: "x-missing".to_string(),
                key_id: "unknown".to_string(),
            },
        ];
        req.body = Bytes::from_static(b"{\"a\":1}");
        gate.handle(req).await.unwrap();

        let outbound = stub.last_request().unwrap();
        assert_eq!(outbound.headers.get("authorization"), Some("Bearer xyz"));
        assert!(!outbound.headers.contains("x-missing"));
        assert_eq!(&outbound.body[..], b"{\"a\":1}");
    }

    #[tokio::test]
    async fn upstream_status_relayed_as_ok_by_default() {
        let stub = StubExecutor::replying(503, "text/plain", "down");
        let gate = gate_with(&stub, SecretStore::empty());

        let relayed = gate
            .handle(request("aMngDQ", "GET", "http://example.test/x"))
            .await
            .unwrap();
        assert_eq!(relayed.status, StatusCode::OK);
        assert_eq!(&relayed.body[..], b"down");
    }

    #[tokio::test]
    async fn upstream_status_mirrored_when_configured() {
        let stub = StubExecutor::replying(404, "text/plain", "missing");
        let gate = gate_with(&stub, SecretStore::empty()).with_mirror_upstream_status(true);

        let relayed = gate
            .handle(request("aMngDQ", "GET", "http://example.test/x"))
            .await
            .unwrap();
        assert_eq!(relayed.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn executor_failure_becomes_forward_rejection() {
        let stub = StubExecutor::failing();
        let gate = gate_with(&stub, SecretStore::empty());

        let err = gate
            .handle(request("aMngDQ", "GET", "http://example.test/x"))
            .await
            .unwrap_err();
        assert!(matches!(err, Rejection::Forward(_)));
        assert_eq!(err.reason(), "forward failed");
        assert_eq!(err.label(), "upstream_error");
        assert_eq!(stub.calls(), 1);
    }

    #[test]
    fn from_config_enables_validation_only_with_seed() {
        let stub = StubExecutor::replying(200, "", "");
        let mut config = GatewayConfig::default();
        let gate = Gate::from_config(&config, SecretStore::empty(), stub.clone()).unwrap();
        assert!(!gate.validation_enabled());

        config.validation.seed = Some("abc".to_string());
        let gate = Gate::from_config(&config, SecretStore::empty(), stub).unwrap();
        assert!(gate.validation_enabled());
        assert_eq!(gate.resolver().prefix(), "X-Request-Key-");
    }
}
