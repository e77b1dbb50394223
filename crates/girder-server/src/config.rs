//! Server configuration.
//!
//! Loaded from a YAML file with sensible defaults; the CLI in `main.rs`
//! can override the network settings.

use anyhow::Context;
use girder::storage::StorageBackend;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default port the server binds to.
pub const DEFAULT_PORT: u16 = 8620;

/// Default data file path.
pub const DEFAULT_DATA_FILE: &str = ".girder/tracker.jsonl";

/// One authenticated account: a bearer token bound to a user identity.
///
/// The user record is provisioned into storage on startup if it doesn't
/// exist yet, so comment author snapshots always resolve.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Stable user id, e.g. "u-alice".
    pub id: String,

    /// Bearer token granting this identity.
    pub token: String,

    /// Display name.
    pub name: String,

    /// Avatar URL.
    #[serde(default)]
    pub picture_url: String,
}

/// Configuration for the girder server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerConfig {
    /// Port to listen on.
    pub port: u16,

    /// Bind address.
    pub bind: String,

    /// Path to the JSONL data file.
    pub data_file: PathBuf,

    /// Enable a permissive CORS layer for local frontend development.
    pub dev_cors: bool,

    /// Authenticated accounts.
    pub accounts: Vec<Account>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind: "127.0.0.1".to_string(),
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            dev_cors: false,
            accounts: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from a YAML file.
    pub async fn load(path: &Path) -> anyhow::Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    /// Save configuration to a YAML file.
    pub async fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_yaml::to_string(self).context("failed to serialize config")?;
        tokio::fs::write(path, content)
            .await
            .with_context(|| format!("failed to write config file {}", path.display()))?;
        Ok(())
    }

    /// The storage backend this configuration selects.
    #[must_use]
    pub fn backend(&self) -> StorageBackend {
        StorageBackend::Jsonl(self.data_file.clone())
    }
}
