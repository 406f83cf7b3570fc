//! Header indirection: key IDs in, secret-bearing outbound headers out.
//!
//! # Responsibilities
//! - Resolve each `(name, key ID)` pair through the secret store
//! - Drop pairs that cannot be resolved, silently
//! - Supply a default `Content-Type` when none was resolved
//!
//! # Design Decisions
//! - Outbound headers are an `http::HeaderMap`: names compare case-insensitively
//!   and a later insert under the same name replaces the earlier one
//! - Resolved secret values are flagged sensitive so they never render in Debug output

use axum::http::header::{InvalidHeaderValue, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderName, HeaderValue};

use crate::config::ForwardingConfig;
use crate::forward::request::IndirectHeader;
use crate::secrets::SecretStore;

/// Concrete headers attached to the outbound request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedHeaders(HeaderMap);

impl ResolvedHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert, replacing any existing value under the same (case-insensitive) name.
    pub fn insert(&mut self, name: HeaderName, value: HeaderValue) {
        self.0.insert(name, value);
    }

    /// Value of `name` as a string, if present and visible ASCII.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Insert `default` as `Content-Type` unless one is already present.
    pub fn ensure_content_type(&mut self, default: &HeaderValue) {
        if !self.0.contains_key(CONTENT_TYPE) {
            self.0.insert(CONTENT_TYPE, default.clone());
        }
    }

    pub fn as_header_map(&self) -> &HeaderMap {
        &self.0
    }

    pub fn into_header_map(self) -> HeaderMap {
        self.0
    }
}

/// Turns indirection headers into outbound headers.
#[derive(Debug, Clone)]
pub struct HeaderResolver {
    prefix: String,
    default_content_type: HeaderValue,
    store: SecretStore,
}

impl HeaderResolver {
    pub fn new(prefix: impl Into<String>, default_content_type: HeaderValue, store: SecretStore) -> Self {
        Self {
            prefix: prefix.into(),
            default_content_type,
            store,
        }
    }

    pub fn from_config(config: &ForwardingConfig, store: SecretStore) -> Result<Self, InvalidHeaderValue> {
        let default_content_type = HeaderValue::from_str(&config.default_content_type)?;
        Ok(Self::new(config.header_prefix.clone(), default_content_type, store))
    }

    /// Prefix marking an indirection header.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Resolve already-extracted pairs. Last pair wins on duplicate names.
    pub fn resolve(&self, indirect: &[IndirectHeader]) -> ResolvedHeaders {
        let mut resolved = ResolvedHeaders::new();

        for header in indirect {
            if header.name.is_empty() {
                tracing::debug!("Skipping indirection header with empty name");
                continue;
            }
            let Ok(name) = HeaderName::from_bytes(header.name.as_bytes()) else {
                tracing::debug!(header = %header.name, "Skipping invalid outbound header name");
                continue;
            };
            let Some(secret) = self.store.get(&header.key_id) else {
                tracing::debug!(header = %name, key_id = %header.key_id, "Key ID not in secret store");
                continue;
            };
            let Ok(mut value) = HeaderValue::from_str(secret) else {
                tracing::warn!(header = %name, key_id = %header.key_id, "Secret is not a valid header value");
                continue;
            };
            value.set_sensitive(true);
            resolved.insert(name, value);
        }

        resolved.ensure_content_type(&self.default_content_type);
        resolved
    }
}
