//! Forwarding gateway (v1)
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌───────────────────────────────────────────────────────┐
//!                      │                  FORWARDING GATEWAY                   │
//!                      │                                                       │
//!   POST /v1/forward   │  ┌─────────┐   ┌────────┐   ┌────────┐   ┌─────────┐  │
//!   ───────────────────┼─▶│  http   │──▶│  auth  │──▶│ policy │──▶│ headers │  │
//!                      │  │ server  │   │  key   │   │method/ │   │ resolve │  │
//!                      │  └─────────┘   └────────┘   │  url   │   └────┬────┘  │
//!                      │                             └────────┘        │       │
//!                      │                                 secrets ──────┤       │
//!                      │                                               ▼       │
//!   200 + upstream     │  ┌─────────┐                           ┌──────────┐   │
//!   body / 400 error   │  │response │◀──────────────────────────│ executor │◀──┼──── Upstream
//!   ◀──────────────────┼──│ mapping │                           │ (reqwest)│   │
//!                      │  └─────────┘                           └──────────┘   │
//!                      └───────────────────────────────────────────────────────┘
//! ```

use std::process::ExitCode;

use clap::Parser;

use forward_gateway::config::CliArgs;
use forward_gateway::lifecycle::{self, StartupError};
use forward_gateway::observability::logging::init_logging;

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();
    let log_level = args.log_level.clone().unwrap_or_else(|| "info".to_string());

    let config = match args.into_config() {
        Ok(config) => config,
        Err(e) => {
            init_logging(&log_level);
            return fail(StartupError::Config(e));
        }
    };
    init_logging(&config.observability.log_level);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "forward-gateway starting");

    match lifecycle::run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => fail(e),
    }
}

fn fail(error: StartupError) -> ExitCode {
    tracing::error!(error = %error, exit_code = error.exit_code(), "Startup failed");
    eprintln!("forward-gateway: {error}");
    ExitCode::from(error.exit_code())
}
