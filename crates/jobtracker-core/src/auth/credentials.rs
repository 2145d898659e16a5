//! Durable storage for the bearer credential.
//!
//! The credential lives under a single key, `token`. Every backend keeps the
//! "last write wins" contract: a `set` replaces the previous value in one
//! step, so readers never observe a partially written token.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Context, Result};
use keyring::Entry;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{self, TokenStoreKind};

/// Storage key holding the raw credential.
pub const TOKEN_KEY: &str = "token";

/// Keychain service name
const SERVICE_NAME: &str = "jobtracker";

/// Credential file name in the data directory
const CREDENTIALS_FILE: &str = "credentials.json";

pub trait TokenStore: Send + Sync {
    /// Read the stored credential, `None` when there is no session to restore.
    fn get(&self) -> Result<Option<String>>;

    /// Replace the stored credential.
    fn set(&self, token: &str) -> Result<()>;

    /// Delete the stored credential. Removing a missing credential is not an error.
    fn remove(&self) -> Result<()>;
}

/// Open the configured credential backend.
pub fn open_token_store(kind: TokenStoreKind) -> Result<Arc<dyn TokenStore>> {
    let store: Arc<dyn TokenStore> = match kind {
        TokenStoreKind::File => Arc::new(FileTokenStore::new(
            config::data_dir()?.join(CREDENTIALS_FILE),
        )),
        TokenStoreKind::Keyring => Arc::new(KeyringTokenStore::new(SERVICE_NAME)),
    };
    Ok(store)
}

// ============================================================================
// File store
// ============================================================================

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredCredentials {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token: Option<String>,
}

/// Credential persisted as a small JSON document on disk.
pub struct FileTokenStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileTokenStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        self.path.with_extension("json.tmp")
    }

    /// Write to a sibling temp file, then rename over the real file.
    fn write_atomic(&self, contents: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("Failed to create credential directory")?;
        }
        let tmp = self.tmp_path();
        fs::write(&tmp, contents).context("Failed to write credential file")?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&tmp, fs::Permissions::from_mode(0o600))
                .context("Failed to restrict credential file permissions")?;
        }
        fs::rename(&tmp, &self.path).context("Failed to replace credential file")?;
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents =
            fs::read_to_string(&self.path).context("Failed to read credential file")?;
        let stored: StoredCredentials =
            serde_json::from_str(&contents).context("Failed to parse credential file")?;
        Ok(stored.token.filter(|t| !t.is_empty()))
    }

    fn set(&self, token: &str) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| anyhow!("credential file lock poisoned"))?;
        let contents = serde_json::to_string_pretty(&StoredCredentials {
            token: Some(token.to_string()),
        })?;
        self.write_atomic(&contents)?;
        debug!(path = %self.path.display(), "Credential stored");
        Ok(())
    }

    fn remove(&self) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| anyhow!("credential file lock poisoned"))?;
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "Credential removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).context("Failed to delete credential file"),
        }
    }
}

// ============================================================================
// OS keychain store
// ============================================================================

pub struct KeyringTokenStore {
    service: String,
}

impl KeyringTokenStore {
    pub fn new(service: &str) -> Self {
        Self {
            service: service.to_string(),
        }
    }

    fn entry(&self) -> Result<Entry> {
        Entry::new(&self.service, TOKEN_KEY).context("Failed to create keyring entry")
    }
}

impl TokenStore for KeyringTokenStore {
    fn get(&self) -> Result<Option<String>> {
        match self.entry()?.get_password() {
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e).context("Failed to retrieve token from keychain"),
        }
    }

    fn set(&self, token: &str) -> Result<()> {
        self.entry()?
            .set_password(token)
            .context("Failed to store token in keychain")
    }

    fn remove(&self) -> Result<()> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete token from keychain"),
        }
    }
}

// ============================================================================
// In-memory store
// ============================================================================

/// Process-local store, for tests and for embedding without persistence.
#[derive(Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        Self {
            token: Mutex::new(Some(token.to_string())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> Result<Option<String>> {
        let token = self
            .token
            .lock()
            .map_err(|_| anyhow!("token store lock poisoned"))?;
        Ok(token.clone())
    }

    fn set(&self, token: &str) -> Result<()> {
        *self
            .token
            .lock()
            .map_err(|_| anyhow!("token store lock poisoned"))? = Some(token.to_string());
        Ok(())
    }

    fn remove(&self) -> Result<()> {
        *self
            .token
            .lock()
            .map_err(|_| anyhow!("token store lock poisoned"))? = None;
        Ok(())
    }
}
