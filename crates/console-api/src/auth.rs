use anyhow::Context;
use console_core::credential::KeyValueStore;
use keyring::Entry;
use tracing::{debug, warn};

const SERVICE: &str = "admin-console";

/// Credential storage backed by the OS keyring, one entry per key under
/// an `admin-console:<server>` service.
#[derive(Debug, Clone)]
pub struct KeyringStore {
    service: String,
}

impl KeyringStore {
    /// Scopes entries to one server so switching backends does not reuse a
    /// token issued by another.
    pub fn for_server(server_url: &str) -> Self {
        Self {
            service: format!("{SERVICE}:{}", server_url.trim_end_matches('/')),
        }
    }

    fn entry(&self, key: &str) -> keyring::Result<Entry> {
        Entry::new(&self.service, key)
    }
}

impl KeyValueStore for KeyringStore {
    fn get(&self, key: &str) -> Option<String> {
        let entry = match self.entry(key) {
            Ok(entry) => entry,
            Err(err) => {
                warn!(key, error = %err, "Failed to open keyring entry");
                return None;
            }
        };
        match entry.get_password() {
            Ok(value) => Some(value),
            Err(keyring::Error::NoEntry) => None,
            Err(err) => {
                warn!(key, error = %err, "Failed to read keyring entry");
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let entry = self.entry(key).context("open keyring entry")?;
        entry
            .set_password(value)
            .with_context(|| format!("write {key} to keyring"))
    }

    fn remove(&self, key: &str) {
        let Ok(entry) = self.entry(key) else {
            return;
        };
        match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => debug!(key, "Keyring entry removed"),
            Err(err) => warn!(key, error = %err, "Failed to remove keyring entry"),
        }
    }
}
