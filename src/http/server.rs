//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the ping and forward handlers
//! - Wire up middleware (request ID, tracing, body limit)
//! - Serve plain HTTP on a Tokio listener or HTTPS via axum-server
//! - Hand each forward request to the gate and emit exactly one response
//! - Observability (metrics, correlation IDs)

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Bytes,
    extract::State,
    http::{header::InvalidHeaderValue, HeaderMap},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use axum_server::tls_rustls::RustlsConfig;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::config::GatewayConfig;
use crate::forward::{AllowedMethod, Executor, ForwardRequest, Gate, HttpExecutor, Rejection};
use crate::http::request::{propagate_request_id_layer, request_id, set_request_id_layer};
use crate::http::response::Pong;
use crate::observability::metrics;
use crate::secrets::SecretStore;
use crate::security::limits::with_body_limit;

/// How long in-flight TLS connections may drain after shutdown is signalled.
const TLS_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors building the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to build outbound HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("invalid default content type: {0}")]
    ContentType(#[from] InvalidHeaderValue),
}

/// Application state injected into handlers.
pub struct AppState<E> {
    pub gate: Arc<Gate<E>>,
}

impl<E> Clone for AppState<E> {
    fn clone(&self) -> Self {
        Self {
            gate: Arc::clone(&self.gate),
        }
    }
}

/// HTTP server for the forwarding gateway.
pub struct HttpServer {
    router: Router,
    config: Arc<GatewayConfig>,
}

impl HttpServer {
    /// Create a server forwarding through a pooled HTTP client.
    pub fn new(config: GatewayConfig, store: SecretStore) -> Result<Self, ServerError> {
        let executor = HttpExecutor::from_config(&config.timeouts)?;
        Self::with_executor(config, store, executor)
    }

    /// Create a server forwarding through `executor`.
    pub fn with_executor<E: Executor>(
        config: GatewayConfig,
        store: SecretStore,
        executor: E,
    ) -> Result<Self, ServerError> {
        let gate = Gate::from_config(&config, store, executor)?;
        Ok(Self::with_gate(config, gate))
    }

    /// Create a server around an already-built gate.
    pub fn with_gate<E: Executor>(config: GatewayConfig, gate: Gate<E>) -> Self {
        let state = AppState {
            gate: Arc::new(gate),
        };

        let router = build_router(&config, state);
        Self {
            router,
            config: Arc::new(config),
        }
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, tls = false, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Run the server over TLS on an already-bound listener.
    pub async fn run_tls(
        self,
        listener: std::net::TcpListener,
        tls: RustlsConfig,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        listener.set_nonblocking(true)?;
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, tls = true, "HTTP server starting");

        let handle = axum_server::Handle::new();
        let signal_handle = handle.clone();
        tokio::spawn(async move {
            let _ = shutdown.recv().await;
            tracing::info!("Shutdown signal received");
            signal_handle.graceful_shutdown(Some(TLS_DRAIN_TIMEOUT));
        });

        axum_server::from_tcp_rustls(listener, tls)
            .handle(handle)
            .serve(self.router.into_make_service())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

impl fmt::Debug for HttpServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpServer")
            .field("port", &self.config.listener.port)
            .field("tls", &self.config.listener.tls.is_some())
            .finish_non_exhaustive()
    }
}

/// Build the Axum router with all middleware layers.
fn build_router<E: Executor>(config: &GatewayConfig, state: AppState<E>) -> Router {
    let router = Router::new()
        .route("/v1/ping", get(ping_handler))
        .route("/v1/forward", post(forward_handler::<E>))
        .with_state(state);

    with_body_limit(router, &config.forwarding).layer(
        ServiceBuilder::new()
            .layer(set_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(propagate_request_id_layer()),
    )
}

async fn ping_handler() -> Json<Pong> {
    Json(Pong::new())
}

/// Forward handler.
/// Extracts forwarding metadata, runs the gate, relays or rejects.
async fn forward_handler<E: Executor>(
    State(state): State<AppState<E>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let start_time = Instant::now();
    let request_id = request_id(&headers).to_string();

    let request = ForwardRequest::from_parts(&headers, body, state.gate.resolver().prefix());
    let method_label = AllowedMethod::parse(&request.method)
        .map(|m| m.as_str())
        .unwrap_or("other");
    let url = request.url.clone();

    tracing::debug!(
        request_id = %request_id,
        method = %request.method,
        url = %url,
        indirect_headers = request.indirect.len(),
        body_bytes = request.body.len(),
        "Forward request received"
    );

    match state.gate.handle(request).await {
        Ok(relayed) => {
            tracing::info!(
                request_id = %request_id,
                method = method_label,
                url = %url,
                status = relayed.status.as_u16(),
                content_type = ?relayed.content_type,
                body_bytes = relayed.body.len(),
                "Forwarded"
            );
            metrics::record_forward(method_label, "forwarded", start_time);
            relayed.into_response()
        }
        Err(rejection) => {
            match &rejection {
                Rejection::Forward(e) => tracing::error!(
                    request_id = %request_id,
                    method = method_label,
                    url = %url,
                    stage = %rejection.stage(),
                    timeout = e.is_timeout(),
                    error = %e,
                    "Upstream error"
                ),
                _ => tracing::warn!(
                    request_id = %request_id,
                    method = method_label,
                    stage = %rejection.stage(),
                    reason = rejection.reason(),
                    "Request rejected"
                ),
            }
            metrics::record_forward(method_label, rejection.label(), start_time);
            rejection.into_response()
        }
    }
}
