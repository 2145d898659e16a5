//! Application configuration management.
//!
//! This module handles loading and saving the client configuration, which
//! holds the backend origin, the credential backend, and the last used
//! username.
//!
//! Configuration is stored at `~/.config/jobtracker/config.json`. The backend
//! origin can be overridden with `JOBTRACKER_BACKEND_URL`.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Application name used for config/data directory paths
const APP_NAME: &str = "jobtracker";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Backend origin used for local development
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

/// Environment variable overriding the backend origin
pub const BACKEND_URL_ENV: &str = "JOBTRACKER_BACKEND_URL";

/// Environment variable selecting the credential backend
pub const TOKEN_STORE_ENV: &str = "JOBTRACKER_TOKEN_STORE";

/// Where the bearer credential is persisted between runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenStoreKind {
    #[default]
    File,
    Keyring,
}

impl FromStr for TokenStoreKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(TokenStoreKind::File),
            "keyring" | "keychain" => Ok(TokenStoreKind::Keyring),
            other => Err(anyhow!(
                "unknown token store '{}', expected 'file' or 'keyring'",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub backend_url: Option<String>,
    pub token_store: Option<TokenStoreKind>,
    pub last_username: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents).context("Failed to parse config file")
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
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
            .ok_or_else(|| anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Resolve the backend origin: explicit override, then the config file,
    /// then the local development default.
    pub fn backend_url(&self, override_url: Option<&str>) -> Result<String> {
        let raw = override_url
            .or(self.backend_url.as_deref())
            .unwrap_or(DEFAULT_BACKEND_URL);
        normalize_backend_url(raw)
    }

    /// Same as [`Config::backend_url`], with `JOBTRACKER_BACKEND_URL` as the override.
    pub fn backend_url_from_env(&self) -> Result<String> {
        let from_env = std::env::var(BACKEND_URL_ENV).ok();
        self.backend_url(from_env.as_deref().filter(|s| !s.trim().is_empty()))
    }

    pub fn token_store(&self, override_kind: Option<TokenStoreKind>) -> TokenStoreKind {
        override_kind.or(self.token_store).unwrap_or_default()
    }
}

/// Directory holding persisted client state (the credential file).
pub fn data_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_dir().ok_or_else(|| anyhow!("Could not find data directory"))?;
    Ok(data_dir.join(APP_NAME))
}

/// Validate a backend origin and strip trailing slashes so paths can be appended.
pub fn normalize_backend_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        bail!("backend URL is empty");
    }
    let url = reqwest::Url::parse(trimmed)
        .with_context(|| format!("invalid backend URL '{}'", trimmed))?;
    match url.scheme() {
        "http" | "https" => Ok(trimmed.to_string()),
        other => bail!("unsupported scheme '{}' in backend URL", other),
    }
}
