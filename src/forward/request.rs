//! Forwarding instructions carried in inbound headers.
//!
//! # Responsibilities
//! - Read method, target URL and caller key from the `X-Request-*` headers
//! - Collect indirection headers (`X-Request-Key-<Name>: <KeyID>`)
//! - Static method and URL policy
//!
//! # Design Decisions
//! - Missing or non-visible-ASCII header values read as empty strings and fail the
//!   later checks instead of erroring here
//! - Method names are matched exactly (`get` is not `GET`)

use std::fmt;

use axum::body::Bytes;
use axum::http::{HeaderMap, Method};

/// Header carrying the outbound method.
pub const X_REQUEST_METHOD: &str = "x-request-method";
/// Header carrying the outbound target URL.
pub const X_REQUEST_URL: &str = "x-request-url";
/// Header carrying the caller's rotating key.
pub const X_REQUEST_KEY: &str = "x-request-key";

/// Methods the gateway will forward. DELETE and everything else is refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllowedMethod {
    Get,
    Post,
    Put,
}

impl AllowedMethod {
    pub fn parse(method: &str) -> Option<Self> {
        match method {
            "GET" => Some(Self::Get),
            "POST" => Some(Self::Post),
            "PUT" => Some(Self::Put),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
        }
    }
}

impl From<AllowedMethod> for Method {
    fn from(method: AllowedMethod) -> Self {
        match method {
            AllowedMethod::Get => Method::GET,
            AllowedMethod::Post => Method::POST,
            AllowedMethod::Put => Method::PUT,
        }
    }
}

impl fmt::Display for AllowedMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Any non-empty target is syntactically acceptable. There is no scheme or
/// host allow-list here; unparseable URLs fail when the outbound request is built.
pub fn is_valid_url(url: &str) -> bool {
    !url.is_empty()
}

/// One `(outbound name, key ID)` pair taken from an indirection header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndirectHeader {
    /// Header name with the prefix stripped. May be empty.
    pub name: String,
    pub key_id: String,
}

/// Collect indirection headers in inbound order.
///
/// Names are compared to `prefix` ASCII case-insensitively.
pub fn indirect_headers(headers: &HeaderMap, prefix: &str) -> Vec<IndirectHeader> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            let name = name.as_str();
            let head = name.get(..prefix.len())?;
            if !head.eq_ignore_ascii_case(prefix) {
                return None;
            }
            let key_id = value.to_str().ok()?;
            Some(IndirectHeader {
                name: name[prefix.len()..].to_string(),
                key_id: key_id.to_string(),
            })
        })
        .collect()
}

/// Caller-supplied forwarding intent.
#[derive(Debug, Clone)]
pub struct ForwardRequest {
    pub method: String,
    pub url: String,
    pub caller_key: String,
    pub indirect: Vec<IndirectHeader>,
    pub body: Bytes,
}

impl ForwardRequest {
    /// Extract forwarding metadata from inbound headers.
    pub fn from_parts(headers: &HeaderMap, body: Bytes, prefix: &str) -> Self {
        Self {
            method: header_str(headers, X_REQUEST_METHOD),
            url: header_str(headers, X_REQUEST_URL),
            caller_key: header_str(headers, X_REQUEST_KEY),
            indirect: indirect_headers(headers, prefix),
            body,
        }
    }
}

fn header_str(headers: &HeaderMap, name: &str) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}
