//! Durable token storage.
//!
//! Stores the credential pair and cached profile in `<base>/session.json`
//! with restricted permissions (0600). Tokens are never logged.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::{Context, Result};
use lms_types::User;
use serde::{Deserialize, Serialize};

use super::jwt;
use crate::config::paths;

/// Key-value document persisted by the token stores.
///
/// The field names are the storage keys (`access_token`, `refresh_token`,
/// `user`, `token_expires`).
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    /// `exp` claim of the access token, seconds since epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_expires: Option<u64>,
}

impl StoredSession {
    fn apply_tokens(&mut self, access: &str, refresh: Option<&str>) {
        self.access_token = Some(access.to_string());
        self.token_expires = jwt::expires_at_secs(access);
        if let Some(refresh) = refresh {
            self.refresh_token = Some(refresh.to_string());
        }
    }
}

/// Storage for the credential pair and the cached user profile.
///
/// Only the authenticated client writes through this trait; everything else
/// reads session state from the client.
pub trait TokenStore: Send + Sync {
    /// Snapshot of everything currently stored.
    fn snapshot(&self) -> StoredSession;

    /// Stores a new access token, and the refresh token when one is given.
    /// A `None` refresh keeps the stored one.
    ///
    /// # Errors
    /// Returns an error if the store cannot be persisted.
    fn save_tokens(&self, access: &str, refresh: Option<&str>) -> Result<()>;

    /// Caches the last known profile.
    ///
    /// # Errors
    /// Returns an error if the store cannot be persisted.
    fn save_user(&self, user: &User) -> Result<()>;

    /// Removes every stored key.
    ///
    /// # Errors
    /// Returns an error if the store cannot be persisted.
    fn clear(&self) -> Result<()>;

    fn access_token(&self) -> Option<String> {
        self.snapshot().access_token
    }

    fn refresh_token(&self) -> Option<String> {
        self.snapshot().refresh_token
    }

    fn user(&self) -> Option<User> {
        self.snapshot().user
    }
}

fn lock(state: &Mutex<StoredSession>) -> MutexGuard<'_, StoredSession> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-process store with no persistence.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    state: Mutex<StoredSession>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tokens(access: &str, refresh: Option<&str>) -> Self {
        let mut session = StoredSession::default();
        session.apply_tokens(access, refresh);
        Self {
            state: Mutex::new(session),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn snapshot(&self) -> StoredSession {
        lock(&self.state).clone()
    }

    fn save_tokens(&self, access: &str, refresh: Option<&str>) -> Result<()> {
        lock(&self.state).apply_tokens(access, refresh);
        Ok(())
    }

    fn save_user(&self, user: &User) -> Result<()> {
        lock(&self.state).user = Some(user.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *lock(&self.state) = StoredSession::default();
        Ok(())
    }
}

/// JSON-file backed store. Reads are served from memory; every write is
/// flushed to disk while the lock is held, so readers never observe a
/// half-applied commit.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    state: Mutex<StoredSession>,
}

impl FileTokenStore {
    /// Opens the store at the default session path.
    ///
    /// # Errors
    /// Returns an error if an existing session file cannot be read or parsed.
    pub fn open_default() -> Result<Self> {
        Self::open(paths::session_path())
    }

    /// Opens the store at `path`. A missing file is an empty session.
    ///
    /// # Errors
    /// Returns an error if an existing session file cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let session = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read session from {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse session from {}", path.display()))?
        } else {
            StoredSession::default()
        };

        Ok(Self {
            path,
            state: Mutex::new(session),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn update(&self, apply: impl FnOnce(&mut StoredSession)) -> Result<()> {
        let mut state = lock(&self.state);
        let mut next = state.clone();
        apply(&mut next);
        persist(&self.path, &next)?;
        *state = next;
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn snapshot(&self) -> StoredSession {
        lock(&self.state).clone()
    }

    fn save_tokens(&self, access: &str, refresh: Option<&str>) -> Result<()> {
        self.update(|session| session.apply_tokens(access, refresh))
    }

    fn save_user(&self, user: &User) -> Result<()> {
        self.update(|session| session.user = Some(user.clone()))
    }

    fn clear(&self) -> Result<()> {
        let mut state = lock(&self.state);
        if self.path.exists() {
            fs::remove_file(&self.path)
                .with_context(|| format!("Failed to remove {}", self.path.display()))?;
        }
        *state = StoredSession::default();
        Ok(())
    }
}

/// Saves the session to disk with restricted permissions (0600).
fn persist(path: &Path, session: &StoredSession) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let contents = serde_json::to_string_pretty(session).context("Failed to serialize session")?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .with_context(|| format!("Failed to open {} for writing", path.display()))?;
        file.write_all(contents.as_bytes())
            .with_context(|| format!("Failed to write to {}", path.display()))?;
    }

    #[cfg(not(unix))]
    {
        fs::write(path, contents).with_context(|| format!("Failed to write to {}", path.display()))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tempfile::tempdir;

    use super::*;

    fn user() -> User {
        serde_json::from_value(json!({"id": 1, "username": "ada"})).unwrap()
    }

    #[test]
    fn test_file_store_roundtrips_through_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");

        let store = FileTokenStore::open(&path).unwrap();
        store.save_tokens("A1", Some("R1")).unwrap();
        store.save_user(&user()).unwrap();

        let reopened = FileTokenStore::open(&path).unwrap();
        assert_eq!(reopened.access_token().as_deref(), Some("A1"));
        assert_eq!(reopened.refresh_token().as_deref(), Some("R1"));
        assert_eq!(reopened.user().map(|u| u.username), Some("ada".to_string()));

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["access_token"], "A1");
        assert_eq!(raw["refresh_token"], "R1");
        assert_eq!(raw["user"]["username"], "ada");
    }

    #[cfg(unix)]
    #[test]
    fn test_file_store_uses_private_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        let store = FileTokenStore::open(&path).unwrap();
        store.save_tokens("A1", Some("R1")).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_save_tokens_without_refresh_keeps_old_refresh() {
        let store = MemoryTokenStore::with_tokens("A1", Some("R1"));
        store.save_tokens("A2", None).unwrap();

        assert_eq!(store.access_token().as_deref(), Some("A2"));
        assert_eq!(store.refresh_token().as_deref(), Some("R1"));
    }

    #[test]
    fn test_save_tokens_records_expiry() {
        let store = MemoryTokenStore::new();
        let token = jwt::test_token(&json!({"exp": 2_000_000_000u64}));
        store.save_tokens(&token, None).unwrap();

        assert_eq!(store.snapshot().token_expires, Some(2_000_000_000));
    }

    #[test]
    fn test_clear_removes_every_key_and_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        let store = FileTokenStore::open(&path).unwrap();
        store.save_tokens("A1", Some("R1")).unwrap();
        store.save_user(&user()).unwrap();

        store.clear().unwrap();

        assert_eq!(store.snapshot(), StoredSession::default());
        assert!(!path.exists());
    }
}
