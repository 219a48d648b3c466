//! Credential storage: one opaque bearer token, mirrored between a
//! durable file and an in-process copy.

use crate::error::Result;
use std::path::PathBuf;
use std::sync::RwLock;
use tracing::{debug, warn};

/// Shared store for the current bearer token.
///
/// Constructed once per process and passed by reference to the session
/// guard and the API client. The token is stored verbatim; no
/// encryption or rotation is performed.
pub trait CredentialStore: Send + Sync {
    /// Persist the token, replacing any previous one.
    fn set(&self, token: &str) -> Result<()>;
    /// Current token, if any.
    fn get(&self) -> Option<String>;
    /// Remove the token from every location.
    fn clear(&self) -> Result<()>;
}

/// File-backed store with an in-process mirror.
///
/// The file is the durable copy; the mirror is what admission checks
/// and request building read, so they never touch the filesystem.
/// Without a backing path the store is memory-only and the durable
/// half of each operation is a no-op.
pub struct FileTokenStore {
    path: Option<PathBuf>,
    mirror: RwLock<Option<String>>,
}

impl FileTokenStore {
    /// Open a store backed by `path`, loading any existing token.
    pub fn open(path: PathBuf) -> Self {
        let existing = match std::fs::read_to_string(&path) {
            Ok(content) => {
                let token = content.trim().to_string();
                if token.is_empty() { None } else { Some(token) }
            }
            Err(_) => None,
        };
        if existing.is_some() {
            debug!("Loaded stored credential from {}", path.display());
        }
        Self {
            path: Some(path),
            mirror: RwLock::new(existing),
        }
    }

    /// Open a memory-only store with no durable copy.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            mirror: RwLock::new(None),
        }
    }
}

impl CredentialStore for FileTokenStore {
    fn set(&self, token: &str) -> Result<()> {
        *self.mirror.write().expect("credential mirror poisoned") = Some(token.to_string());
        if let Some(path) = &self.path {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, token)?;
        }
        Ok(())
    }

    fn get(&self) -> Option<String> {
        self.mirror.read().expect("credential mirror poisoned").clone()
    }

    fn clear(&self) -> Result<()> {
        *self.mirror.write().expect("credential mirror poisoned") = None;
        if let Some(path) = &self.path
            && path.exists()
            && let Err(e) = std::fs::remove_file(path)
        {
            // Mirror is already cleared; the stale file only matters on
            // the next process start.
            warn!("Failed to remove token file {}: {e}", path.display());
            return Err(e.into());
        }
        Ok(())
    }
}

/// In-memory store for tests.
#[derive(Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seeded with a token.
    pub fn with_token(token: &str) -> Self {
        Self {
            token: RwLock::new(Some(token.to_string())),
        }
    }
}

impl CredentialStore for MemoryTokenStore {
    fn set(&self, token: &str) -> Result<()> {
        *self.token.write().expect("token lock poisoned") = Some(token.to_string());
        Ok(())
    }

    fn get(&self) -> Option<String> {
        self.token.read().expect("token lock poisoned").clone()
    }

    fn clear(&self) -> Result<()> {
        *self.token.write().expect("token lock poisoned") = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_clear_roundtrip() {
        let store = MemoryTokenStore::new();
        assert!(store.get().is_none());

        store.set("abc.def.ghi").unwrap();
        assert_eq!(store.get().as_deref(), Some("abc.def.ghi"));

        store.clear().unwrap();
        assert!(store.get().is_none());
    }

    #[test]
    fn test_file_store_persists_across_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token");

        let store = FileTokenStore::open(path.clone());
        store.set("tok-1").unwrap();

        let reopened = FileTokenStore::open(path);
        assert_eq!(reopened.get().as_deref(), Some("tok-1"));
    }

    #[test]
    fn test_file_store_clear_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token");

        let store = FileTokenStore::open(path.clone());
        store.set("tok-1").unwrap();
        assert!(path.exists());

        store.clear().unwrap();
        assert!(!path.exists());
        assert!(store.get().is_none());
    }

    #[test]
    fn test_memory_only_store_is_noop_on_disk() {
        let store = FileTokenStore::in_memory();
        store.set("tok-1").unwrap();
        assert_eq!(store.get().as_deref(), Some("tok-1"));
        store.clear().unwrap();
        assert!(store.get().is_none());
    }

    #[test]
    fn test_open_with_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::open(dir.path().join("absent"));
        assert!(store.get().is_none());
    }
}
