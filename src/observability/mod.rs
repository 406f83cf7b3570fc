//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! http/server.rs (per request):
//!     → logging.rs (structured events keyed by request id)
//!     → metrics.rs (counter + latency histogram)
//!
//! Consumers:
//!     → stdout
//!     → Prometheus scrape (when enabled)
//! ```

pub mod logging;
pub mod metrics;
