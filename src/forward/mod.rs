//! Forwarding pipeline.
//!
//! # Data Flow
//! ```text
//! inbound headers + body
//!     → request.rs (ForwardRequest: method, url, key, indirection pairs)
//!     → gate.rs (key → method → url checks, short-circuit on first failure)
//!     → headers.rs (key IDs resolved through the secret store)
//!     → executor.rs (single outbound call, buffered response)
//!     → Relayed | Rejection
//! ```

pub mod executor;
pub mod gate;
pub mod headers;
pub mod request;

pub use executor::{Executor, ForwardError, HttpExecutor, OutboundRequest, UpstreamResponse};
pub use gate::{Gate, Rejection, Relayed, Stage};
pub use headers::{HeaderResolver, ResolvedHeaders};
pub use request::{AllowedMethod, ForwardRequest, IndirectHeader};
