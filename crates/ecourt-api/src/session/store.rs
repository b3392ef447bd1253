// Credential store
//
// Holds the current bearer credential in memory, backed by a durable
// `TokenCache` so the credential survives process restarts. Pure state:
// no network, no coordination. Only `TokenManager` writes to it.

use std::sync::{Arc, Mutex, RwLock};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tracing::{debug, warn};

/// A durable cache failure. Never surfaces past `CredentialStore`.
#[derive(Debug, Error)]
#[error("token cache unavailable: {message}")]
pub struct CacheError {
    pub message: String,
}

impl CacheError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for CacheError {
    fn from(err: std::io::Error) -> Self {
        Self::new(err.to_string())
    }
}

/// Durable key-value storage for the credential.
///
/// Implementations live next to whatever owns the storage: an in-process
/// cache here, file and keyring caches in `ecourt-config`.
pub trait TokenCache: Send + Sync {
    /// Read the cached credential, if any.
    fn load(&self) -> Result<Option<String>, CacheError>;
    /// Replace the cached credential.
    fn save(&self, token: &str) -> Result<(), CacheError>;
    /// Forget the cached credential. Removing an absent entry is not an error.
    fn remove(&self) -> Result<(), CacheError>;
}

/// Process-local cache. Shared between stores through `Arc`, which is
/// how tests model a second run reading the first run's credential.
#[derive(Debug, Default)]
pub struct MemoryTokenCache {
    token: Mutex<Option<String>>,
}

impl MemoryTokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cache pre-populated with `token`.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }

    fn slot(&self) -> Result<std::sync::MutexGuard<'_, Option<String>>, CacheError> {
        self.token
            .lock()
            .map_err(|_| CacheError::new("memory cache lock poisoned"))
    }
}

impl TokenCache for MemoryTokenCache {
    fn load(&self) -> Result<Option<String>, CacheError> {
        Ok(self.slot()?.clone())
    }

    fn save(&self, token: &str) -> Result<(), CacheError> {
        *self.slot()? = Some(token.to_owned());
        Ok(())
    }

    fn remove(&self) -> Result<(), CacheError> {
        *self.slot()? = None;
        Ok(())
    }
}

/// The current credential: in memory first, durable cache second.
pub struct CredentialStore {
    memory: RwLock<Option<SecretString>>,
    cache: Arc<dyn TokenCache>,
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("memory", &self.memory)
            .finish_non_exhaustive()
    }
}

impl CredentialStore {
    pub fn new(cache: Arc<dyn TokenCache>) -> Self {
        Self {
            memory: RwLock::new(None),
            cache,
        }
    }

    /// A store with no durable backing beyond this process.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryTokenCache::new()))
    }

    /// The current credential, promoting a cached one into memory.
    ///
    /// A failing cache read is logged and treated as "nothing cached".
    pub fn read(&self) -> Option<SecretString> {
        if let Some(token) = self.memory.read().expect("credential lock poisoned").as_ref() {
            return Some(token.clone());
        }

        let cached = match self.cache.load() {
            Ok(cached) => cached,
            Err(e) => {
                warn!(error = %e, "ignoring unreadable token cache");
                None
            }
        };

        let token = SecretString::from(cached.filter(|t| !t.trim().is_empty())?);
        debug!("promoting cached credential into memory");
        *self.memory.write().expect("credential lock poisoned") = Some(token.clone());
        Some(token)
    }

    /// Store `token` in memory and in the durable cache.
    pub fn write(&self, token: &SecretString) {
        *self.memory.write().expect("credential lock poisoned") = Some(token.clone());
        if let Err(e) = self.cache.save(token.expose_secret()) {
            warn!(error = %e, "credential kept in memory only");
        }
    }

    /// Drop the credential from memory and from the durable cache.
    pub fn clear(&self) {
        *self.memory.write().expect("credential lock poisoned") = None;
        if let Err(e) = self.cache.remove() {
            warn!(error = %e, "failed to remove cached credential");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// A cache whose backing storage is gone.
    struct BrokenCache;

    impl TokenCache for BrokenCache {
        fn load(&self) -> Result<Option<String>, CacheError> {
            Err(CacheError::new("storage offline"))
        }
        fn save(&self, _token: &str) -> Result<(), CacheError> {
            Err(CacheError::new("storage offline"))
        }
        fn remove(&self) -> Result<(), CacheError> {
            Err(CacheError::new("storage offline"))
        }
    }

    fn secret(s: &str) -> SecretString {
        SecretString::from(s.to_owned())
    }

    #[test]
    fn empty_store_reads_none() {
        assert!(CredentialStore::in_memory().read().is_none());
    }

    #[test]
    fn write_then_read_round_trips_through_cache() {
        let cache = Arc::new(MemoryTokenCache::new());
        let store = CredentialStore::new(cache.clone());
        store.write(&secret("tok-1"));

        assert_eq!(store.read().unwrap().expose_secret(), "tok-1");
        assert_eq!(cache.load().unwrap().as_deref(), Some("tok-1"));
    }

    #[test]
    fn cached_credential_survives_a_new_store() {
        let cache: Arc<dyn TokenCache> = Arc::new(MemoryTokenCache::new());
        CredentialStore::new(Arc::clone(&cache)).write(&secret("persisted"));

        let reloaded = CredentialStore::new(cache);
        assert_eq!(reloaded.read().unwrap().expose_secret(), "persisted");
    }

    #[test]
    fn cached_credential_is_promoted_to_memory() {
        let cache = Arc::new(MemoryTokenCache::with_token("cached"));
        let store = CredentialStore::new(cache.clone());
        assert_eq!(store.read().unwrap().expose_secret(), "cached");

        // Later reads no longer depend on the cache.
        *cache.token.lock().unwrap() = None;
        assert_eq!(store.read().unwrap().expose_secret(), "cached");
    }

    #[test]
    fn clear_removes_both_layers() {
        let cache = Arc::new(MemoryTokenCache::with_token("stale"));
        let store = CredentialStore::new(cache.clone());
        assert!(store.read().is_some());

        store.clear();
        assert!(store.read().is_none());
        assert!(cache.load().unwrap().is_none());
    }

    #[test]
    fn blank_cached_value_is_ignored() {
        let store = CredentialStore::new(Arc::new(MemoryTokenCache::with_token("  ")));
        assert!(store.read().is_none());
    }

    #[test]
    fn broken_cache_degrades_to_memory_only() {
        let store = CredentialStore::new(Arc::new(BrokenCache));
        assert!(store.read().is_none());

        store.write(&secret("memory-only"));
        assert_eq!(store.read().unwrap().expose_secret(), "memory-only");

        store.clear();
        assert!(store.read().is_none());
    }
}
