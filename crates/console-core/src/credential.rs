use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{debug, warn};

pub const TOKEN_KEY: &str = "admin_token";
pub const TOKEN_EXPIRES_KEY: &str = "admin_token_expires_at";

/// Flat string storage the credential lives in.
///
/// Reads never fail: an unreadable entry is reported as absent. Removal is
/// best effort and must be safe to repeat.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> anyhow::Result<()>;
    fn remove(&self, key: &str);
}

#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .ok()
            .and_then(|entries| entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("credential map poisoned"))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(key);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credential {
    pub token: Option<String>,
    pub expires_at: Option<String>,
}

impl Credential {
    pub fn bearer(&self) -> Option<String> {
        self.token
            .as_deref()
            .filter(|token| !token.is_empty())
            .map(|token| format!("Bearer {token}"))
    }

    pub fn has_token(&self) -> bool {
        self.token.as_deref().is_some_and(|token| !token.is_empty())
    }

    /// True only when an expiry marker is present, parses, and lies at or
    /// before `now`. The server stays the authority for everything else.
    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        self.expires_at
            .as_deref()
            .and_then(|raw| OffsetDateTime::parse(raw, &Rfc3339).ok())
            .is_some_and(|expires_at| expires_at <= now)
    }
}

/// Bearer token persistence. Every call goes back to the backing store so
/// that a clear performed by one request is seen by the next.
#[derive(Clone)]
pub struct CredentialStore {
    backend: Arc<dyn KeyValueStore>,
}

impl CredentialStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    pub fn read(&self) -> Credential {
        Credential {
            token: self.backend.get(TOKEN_KEY),
            expires_at: self.backend.get(TOKEN_EXPIRES_KEY),
        }
    }

    pub fn save(&self, token: &str, expires_at: Option<&str>) -> anyhow::Result<()> {
        self.backend.set(TOKEN_KEY, token)?;
        match expires_at {
            Some(expires_at) => self.backend.set(TOKEN_EXPIRES_KEY, expires_at)?,
            None => self.backend.remove(TOKEN_EXPIRES_KEY),
        }
        debug!("Stored admin credential");
        Ok(())
    }

    pub fn clear(&self) {
        self.backend.remove(TOKEN_KEY);
        self.backend.remove(TOKEN_EXPIRES_KEY);
        debug!("Cleared admin credential");
    }

    /// Startup check: a token exists and its marker has not passed.
    pub fn usable_at(&self, now: OffsetDateTime) -> bool {
        let credential = self.read();
        if !credential.has_token() {
            return false;
        }
        if credential.is_expired_at(now) {
            warn!(expires_at = ?credential.expires_at, "Stored credential has expired");
            return false;
        }
        true
    }
}
