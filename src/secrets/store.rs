//! Immutable key-ID → secret mapping.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

/// Errors raised while loading the secret store at startup.
#[derive(Debug, Error)]
pub enum SecretsError {
    #[error("failed to read secrets file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("secrets file {path} is not a JSON object of strings: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Process-lifetime mapping from key IDs to secret values.
///
/// Cloning is cheap (shared `Arc`). Lookups are exact and case-sensitive.
#[derive(Clone, Default)]
pub struct SecretStore {
    entries: Arc<HashMap<String, String>>,
}

impl SecretStore {
    /// An empty store: every lookup misses.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load a flat JSON object from disk.
    pub fn load(path: &Path) -> Result<Self, SecretsError> {
        let content = std::fs::read_to_string(path).map_err(|source| SecretsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let entries: HashMap<String, String> =
            serde_json::from_str(&content).map_err(|source| SecretsError::Malformed {
                path: path.to_path_buf(),
                source,
            })?;

        tracing::info!(path = %path.display(), entries = entries.len(), "Secret store loaded");
        Ok(Self::from(entries))
    }

    /// Look up a secret by exact key ID.
    pub fn get(&self, key_id: &str) -> Option<&str> {
        self.entries.get(key_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<HashMap<String, String>> for SecretStore {
    fn from(entries: HashMap<String, String>) -> Self {
        Self {
            entries: Arc::new(entries),
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SecretStore {
    /// Later pairs overwrite earlier ones with the same key ID.
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let entries = iter
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect::<HashMap<_, _>>();
        Self::from(entries)
    }
}

impl fmt::Debug for SecretStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretStore")
            .field("entries", &self.entries.len())
            .finish()
    }
}
