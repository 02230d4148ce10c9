//! Durable storage for the access/refresh token pair.
//!
//! Three backends share the [`TokenStore`] contract:
//! - [`FileTokenStore`]: a JSON file in the cache directory (survives restarts)
//! - [`KeyringTokenStore`]: the OS keychain
//! - [`MemoryTokenStore`]: in-process only, used by tests and one-shot commands

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use keyring::Entry;
use tracing::warn;

/// Token file name in cache directory
const TOKEN_FILE: &str = "tokens.json";

/// Keychain service name for the keyring backend
const SERVICE_NAME: &str = "mytube";

/// The fixed storage keys for the credential pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKey {
    Access,
    Refresh,
}

impl TokenKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKey::Access => "accessToken",
            TokenKey::Refresh => "refreshToken",
        }
    }
}

impl fmt::Display for TokenKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persistent key-value holder for bearer tokens.
///
/// Reads never fail: an unreadable backend behaves as if the token were absent.
pub trait TokenStore: Send + Sync {
    fn get(&self, key: TokenKey) -> Option<String>;
    fn set(&self, key: TokenKey, value: &str) -> Result<()>;
    fn clear(&self, key: TokenKey) -> Result<()>;

    /// Remove both tokens, attempting each even if the first fails.
    fn clear_all(&self) -> Result<()> {
        let access = self.clear(TokenKey::Access);
        let refresh = self.clear(TokenKey::Refresh);
        access.and(refresh)
    }
}

// ============================================================================
// In-memory
// ============================================================================

#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    tokens: Mutex<HashMap<TokenKey, String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store with an existing credential pair
    pub fn with_tokens(access: Option<&str>, refresh: Option<&str>) -> Self {
        let mut tokens = HashMap::new();
        if let Some(access) = access {
            tokens.insert(TokenKey::Access, access.to_string());
        }
        if let Some(refresh) = refresh {
            tokens.insert(TokenKey::Refresh, refresh.to_string());
        }
        Self {
            tokens: Mutex::new(tokens),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, key: TokenKey) -> Option<String> {
        let tokens = self.tokens.lock().unwrap_or_else(|e| e.into_inner());
        tokens.get(&key).cloned()
    }

    fn set(&self, key: TokenKey, value: &str) -> Result<()> {
        let mut tokens = self.tokens.lock().unwrap_or_else(|e| e.into_inner());
        tokens.insert(key, value.to_string());
        Ok(())
    }

    fn clear(&self, key: TokenKey) -> Result<()> {
        let mut tokens = self.tokens.lock().unwrap_or_else(|e| e.into_inner());
        tokens.remove(&key);
        Ok(())
    }
}

// ============================================================================
// File
// ============================================================================

/// Tokens persisted as a flat JSON object, e.g. `{"accessToken": "..."}`.
pub struct FileTokenStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process
    lock: Mutex<()>,
}

impl FileTokenStore {
    pub fn new(cache_dir: &Path) -> Self {
        Self {
            path: cache_dir.join(TOKEN_FILE),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<HashMap<String, String>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let contents = std::fs::read_to_string(&self.path)
            .context("Failed to read token file")?;
        serde_json::from_str(&contents).context("Failed to parse token file")
    }

    fn write_all(&self, tokens: &HashMap<String, String>) -> Result<()> {
        if tokens.is_empty() {
            if self.path.exists() {
                std::fs::remove_file(&self.path).context("Failed to remove token file")?;
            }
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(tokens)?;
        std::fs::write(&self.path, contents).context("Failed to write token file")?;
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self, key: TokenKey) -> Option<String> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        match self.read_all() {
            Ok(mut tokens) => tokens.remove(key.as_str()),
            Err(e) => {
                warn!(error = %e, key = %key, "Token file unreadable, treating token as absent");
                None
            }
        }
    }

    fn set(&self, key: TokenKey, value: &str) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        // A corrupt file is replaced rather than blocking new logins
        let mut tokens = self.read_all().unwrap_or_default();
        tokens.insert(key.as_str().to_string(), value.to_string());
        self.write_all(&tokens)
    }

    fn clear(&self, key: TokenKey) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut tokens = self.read_all().unwrap_or_default();
        tokens.remove(key.as_str());
        self.write_all(&tokens)
    }
}

// ============================================================================
// OS keychain
// ============================================================================

/// Tokens stored in the OS keychain, one entry per key under the `mytube` service.
pub struct KeyringTokenStore {
    service: String,
}

impl KeyringTokenStore {
    pub fn new() -> Self {
        Self {
            service: SERVICE_NAME.to_string(),
        }
    }

    fn entry(&self, key: TokenKey) -> Result<Entry> {
        Entry::new(&self.service, key.as_str()).context("Failed to create keyring entry")
    }
}

impl Default for KeyringTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenStore for KeyringTokenStore {
    fn get(&self, key: TokenKey) -> Option<String> {
        let entry = self.entry(key).ok()?;
        match entry.get_password() {
            Ok(value) => Some(value),
            Err(keyring::Error::NoEntry) => None,
            Err(e) => {
                warn!(error = %e, key = %key, "Keychain lookup failed, treating token as absent");
                None
            }
        }
    }

    fn set(&self, key: TokenKey, value: &str) -> Result<()> {
        self.entry(key)?
            .set_password(value)
            .context("Failed to store token in keychain")
    }

    fn clear(&self, key: TokenKey) -> Result<()> {
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete token from keychain"),
        }
    }
}
