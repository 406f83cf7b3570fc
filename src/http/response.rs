//! Response construction.
//!
//! # Responsibilities
//! - Relay a successful forward: status, upstream content type, body bytes
//! - Map every rejection to `400` with a JSON `{"error": reason}` body
//!
//! # Design Decisions
//! - Bodies are written whole; content type is known before the first byte
//! - No upstream header other than `Content-Type` reaches the caller
//! - An absent upstream content type leaves the header off entirely

use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::forward::{Rejection, Relayed};

/// JSON error body sent with every rejection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Liveness reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pong {
    pub message: String,
}

impl Pong {
    pub fn new() -> Self {
        Self {
            message: "pong".to_string(),
        }
    }
}

impl Default for Pong {
    fn default() -> Self {
        Self::new()
    }
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.reason().to_string(),
        };
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

impl IntoResponse for Relayed {
    fn into_response(self) -> Response {
        let mut response = (self.status, self.body).into_response();
        let headers = response.headers_mut();
        headers.remove(CONTENT_TYPE);
        if let Some(content_type) = self.content_type {
            headers.insert(CONTENT_TYPE, content_type);
        }
        response
    }
}
