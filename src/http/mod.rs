//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, middleware, handlers)
//!     → request.rs (request ID assigned and echoed)
//!     → forward::Gate (validation, policy, resolution, outbound call)
//!     → response.rs (Relayed / Rejection → HTTP response)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{request_id, X_REQUEST_ID};
pub use server::{AppState, HttpServer, ServerError};
