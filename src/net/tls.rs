//! TLS configuration and certificate loading.

use std::path::{Path, PathBuf};

use axum_server::tls_rustls::RustlsConfig;
use thiserror::Error;

use crate::config::TlsConfig;

#[derive(Debug, Error)]
pub enum TlsError {
    #[error("certificate file not found: {0}")]
    MissingCertificate(PathBuf),

    #[error("private key file not found: {0}")]
    MissingKey(PathBuf),

    #[error("failed to load certificate/key pair: {0}")]
    Load(#[source] std::io::Error),
}

/// Load the PEM certificate chain and private key named by `config`.
pub async fn load_tls_config(config: &TlsConfig) -> Result<RustlsConfig, TlsError> {
    let cert_path = Path::new(&config.cert_path);
    let key_path = Path::new(&config.key_path);

    if !cert_path.exists() {
        return Err(TlsError::MissingCertificate(cert_path.to_path_buf()));
    }
    if !key_path.exists() {
        return Err(TlsError::MissingKey(key_path.to_path_buf()));
    }

    let rustls = RustlsConfig::from_pem_file(cert_path, key_path)
        .await
        .map_err(TlsError::Load)?;

    tracing::info!(cert = %cert_path.display(), key = %key_path.display(), "TLS certificate loaded");
    Ok(rustls)
}
