// ── Durable token caches ──
//
// `TokenCache` implementations that outlive the process: a small JSON
// file per profile, or an entry in the system keyring. Both store the
// credential under `ecourt_api::session::TOKEN_CACHE_KEY`.

use std::collections::HashMap;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use ecourt_api::session::TOKEN_CACHE_KEY;
use ecourt_api::{CacheError, TokenCache};
use tracing::debug;

/// Keyring service name for cached credentials.
pub const KEYRING_SERVICE: &str = "ecourt";

// ── File ────────────────────────────────────────────────────────────

/// Credential kept in `<token_dir>/<profile>.json` as
/// `{"ecourt_token": "..."}`.
#[derive(Debug, Clone)]
pub struct FileTokenCache {
    path: PathBuf,
}

impl FileTokenCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The cache file for `profile_name` under [`crate::token_dir`].
    pub fn for_profile(profile_name: &str) -> Self {
        let file: String = profile_name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        Self::new(crate::token_dir().join(format!("{file}.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenCache for FileTokenCache {
    fn load(&self) -> Result<Option<String>, CacheError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let mut entries: HashMap<String, String> = serde_json::from_str(&raw).map_err(|e| {
            CacheError::new(format!("corrupt token file {}: {e}", self.path.display()))
        })?;
        Ok(entries.remove(TOKEN_CACHE_KEY))
    }

    fn save(&self, token: &str) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let body = serde_json::json!({ TOKEN_CACHE_KEY: token }).to_string();
        write_private(&self.path, body.as_bytes())?;
        debug!(path = %self.path.display(), "credential cached");
        Ok(())
    }

    fn remove(&self) -> Result<(), CacheError> {
        match std::fs::remove_file(&self.path) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// Write `contents`, readable by the owner only on Unix.
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options.open(path)?.write_all(contents)
}

// ── Keyring ─────────────────────────────────────────────────────────

/// Credential kept in the system keyring under service `ecourt`,
/// user `<profile>/ecourt_token`.
pub struct KeyringTokenCache {
    user: String,
    entry: keyring::Entry,
}

impl std::fmt::Debug for KeyringTokenCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyringTokenCache")
            .field("service", &KEYRING_SERVICE)
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

impl KeyringTokenCache {
    pub fn new(profile_name: &str) -> Result<Self, CacheError> {
        let user = format!("{profile_name}/{TOKEN_CACHE_KEY}");
        let entry = keyring::Entry::new(KEYRING_SERVICE, &user)
            .map_err(|e| CacheError::new(e.to_string()))?;
        Ok(Self { user, entry })
    }
}

impl TokenCache for KeyringTokenCache {
    fn load(&self) -> Result<Option<String>, CacheError> {
        match self.entry.get_password() {
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(CacheError::new(e.to_string())),
        }
    }

    fn save(&self, token: &str) -> Result<(), CacheError> {
        self.entry
            .set_password(token)
            .map_err(|e| CacheError::new(e.to_string()))
    }

    fn remove(&self) -> Result<(), CacheError> {
        match self.entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(CacheError::new(e.to_string())),
        }
    }
}
