//! Command-line arguments.
//!
//! Flags override whatever the optional TOML file sets; the merged result
//! goes through the same validation as a file-only configuration.

use std::path::PathBuf;

use clap::Parser;

use crate::config::loader::{read_config, ConfigError};
use crate::config::schema::{GatewayConfig, TlsConfig};
use crate::config::validation::validate_config;

#[derive(Debug, Parser)]
#[command(name = "forward-gateway")]
#[command(about = "Single-endpoint request forwarding gateway", long_about = None)]
pub struct CliArgs {
    /// Port to bind (1024-9999)
    pub port: u16,

    /// Use https (certificate and key from --cert/--key or the config file)
    #[arg(short = 's', long = "https")]
    pub https: bool,

    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// PEM certificate used with --https
    #[arg(long)]
    pub cert: Option<String>,

    /// PEM private key used with --https
    #[arg(long)]
    pub key: Option<String>,

    /// JSON file mapping key IDs to secret values
    #[arg(long)]
    pub secrets: Option<String>,

    /// Seed for the rotating caller key; omit to disable key validation
    #[arg(long)]
    pub seed: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,
}

impl CliArgs {
    /// Build the effective configuration: file (if any), then flags, then validation.
    pub fn into_config(self) -> Result<GatewayConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => read_config(path)?,
            None => GatewayConfig::default(),
        };

        self.apply(&mut config);
        validate_config(&config).map_err(ConfigError::Validation)?;

        Ok(config)
    }

    fn apply(self, config: &mut GatewayConfig) {
        config.listener.port = self.port;

        if self.https || self.cert.is_some() || self.key.is_some() {
            let tls = config.listener.tls.get_or_insert_with(TlsConfig::default);
            if let Some(cert) = self.cert {
                tls.cert_path = cert;
            }
            if let Some(key) = self.key {
                tls.key_path = key;
            }
        }
        if let Some(path) = self.secrets {
            config.secrets.path = Some(path);
        }
        if let Some(seed) = self.seed {
            config.validation.seed = Some(seed);
        }
        if let Some(level) = self.log_level {
            config.observability.log_level = level;
        }
    }
}
