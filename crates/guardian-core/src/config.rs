//! Application configuration management.
//!
//! Configuration is stored at `<config dir>/revenue-guardian/config.json` and
//! holds the API location, the last username used to log in, and where the
//! access token is persisted.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::client::{DEFAULT_BASE_URL, REQUEST_TIMEOUT_SECS};
use crate::auth::{FileStorage, KeyringStorage, TokenStore};

/// Application name used for config/data directory paths
const APP_NAME: &str = "revenue-guardian";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Token file name, used by the file storage backend
const TOKEN_FILE: &str = "tokens.json";

/// Environment variable overriding the API base URL
pub const API_URL_ENV: &str = "GUARDIAN_API_URL";

/// Where the access token survives between runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    File,
    Keyring,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub api_base_url: Option<String>,
    #[serde(default)]
    pub last_username: Option<String>,
    #[serde(default)]
    pub storage: StorageBackend,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// API base URL: the environment wins over the config file, which wins
    /// over the built-in default.
    pub fn api_base_url(&self) -> String {
        self.resolve_api_base_url(std::env::var(API_URL_ENV).ok())
    }

    fn resolve_api_base_url(&self, from_env: Option<String>) -> String {
        from_env
            .filter(|url| !url.trim().is_empty())
            .or_else(|| self.api_base_url.clone())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.unwrap_or(REQUEST_TIMEOUT_SECS))
    }

    pub fn token_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME).join(TOKEN_FILE))
    }

    /// Build the token store for the configured backend.
    ///
    /// Fails for the keyring backend when this build has no OS keychain
    /// support, instead of handing out a store that forgets every token.
    pub fn token_store(&self) -> Result<TokenStore> {
        Ok(match self.storage {
            StorageBackend::File => TokenStore::new(FileStorage::new(Self::token_path()?)),
            StorageBackend::Keyring => {
                if !KeyringStorage::is_persistent() {
                    bail!(
                        "Keyring token storage needs a build with the `native-keyring` feature; \
                         set \"storage\": \"file\" in the config instead"
                    );
                }
                TokenStore::new(KeyringStorage::new())
            }
        })
    }
}
