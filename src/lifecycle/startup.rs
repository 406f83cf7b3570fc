//! Startup orchestration.
//!
//! # Responsibilities
//! - Validate configuration and load the secret store
//! - Initialize metrics, build the server, load TLS material
//! - Bind the listener last and serve until shutdown
//! - Map every startup failure to a distinct process exit code
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently
//! - Listeners start last (traffic only when ready)

use std::net::SocketAddr;
use std::path::Path;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::validation::validate_config;
use crate::config::{ConfigError, GatewayConfig, ValidationError};
use crate::http::{HttpServer, ServerError};
use crate::lifecycle::Shutdown;
use crate::net::{load_tls_config, TlsError};
use crate::observability::metrics::init_metrics;
use crate::secrets::{SecretStore, SecretsError};

/// Fatal errors before or while serving.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("secret store error: {0}")]
    Secrets(#[from] SecretsError),

    #[error("TLS error: {0}")]
    Tls(#[from] TlsError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to build server: {0}")]
    Server(#[from] ServerError),

    #[error("failed to start metrics exporter: {0}")]
    Metrics(String),

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

impl StartupError {
    /// Process exit code for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            StartupError::Serve(_) => 1,
            StartupError::Config(ConfigError::Validation(errors)) => validation_exit_code(errors),
            StartupError::Config(_) | StartupError::Metrics(_) => 5,
            StartupError::Secrets(_) => 3,
            StartupError::Tls(_) => 6,
            StartupError::Bind { .. } | StartupError::Server(_) => 7,
        }
    }
}

fn validation_exit_code(errors: &[ValidationError]) -> u8 {
    if errors
        .iter()
        .any(|e| matches!(e, ValidationError::PortOutOfRange(_)))
    {
        2
    } else if errors.contains(&ValidationError::EmptySeed) {
        4
    } else {
        5
    }
}

/// Run the gateway until SIGINT / SIGTERM.
pub async fn run(config: GatewayConfig) -> Result<(), StartupError> {
    let shutdown = Shutdown::new();
    shutdown.spawn_signal_listener();
    run_until(config, shutdown).await
}

/// Run the gateway until `shutdown` is triggered.
pub async fn run_until(config: GatewayConfig, shutdown: Shutdown) -> Result<(), StartupError> {
    validate_config(&config).map_err(|errors| StartupError::Config(ConfigError::Validation(errors)))?;

    let store = match &config.secrets.path {
        Some(path) => SecretStore::load(Path::new(path))?,
        None => {
            tracing::info!("No secrets file configured; indirection headers will not resolve");
            SecretStore::empty()
        }
    };

    if config.validation.is_enabled() {
        tracing::info!("Caller key validation enabled");
    } else {
        tracing::warn!("Caller key validation DISABLED: every caller is authorized");
    }

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config
            .observability
            .metrics_address
            .parse()
            .map_err(|e: std::net::AddrParseError| StartupError::Metrics(e.to_string()))?;
        init_metrics(addr).map_err(|e| StartupError::Metrics(e.to_string()))?;
    }

    let tls = match &config.listener.tls {
        Some(tls) => Some(load_tls_config(tls).await?),
        None => None,
    };

    let address = config.listener.bind_address();
    let server = HttpServer::new(config, store)?;

    tracing::info!(
        address = %address,
        tls = tls.is_some(),
        header_prefix = %server.config().forwarding.header_prefix,
        request_timeout_secs = server.config().timeouts.request_secs,
        "Configuration loaded"
    );

    let bind_error = |source| StartupError::Bind {
        address: address.clone(),
        source,
    };

    match tls {
        None => {
            let listener = TcpListener::bind(&address).await.map_err(bind_error)?;
            server
                .run(listener, shutdown.subscribe())
                .await
                .map_err(StartupError::Serve)?;
        }
        Some(tls) => {
            let listener = std::net::TcpListener::bind(&address).map_err(bind_error)?;
            server
                .run_tls(listener, tls, shutdown.subscribe())
                .await
                .map_err(StartupError::Serve)?;
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
