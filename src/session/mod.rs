//! Persisted identity for the active AnonBox user.
//!
//! The store mirrors three values (private token, handle, display name) into
//! an injected [`KeyValueStore`]. When no storage capability is available the
//! store reads as empty and ignores writes.

#[cfg(feature = "keychain")]
pub mod keychain;
pub mod file;
pub mod storage;

use std::sync::{Mutex, MutexGuard, PoisonError};

pub use file::FileStorage;
#[cfg(feature = "keychain")]
pub use keychain::KeychainStorage;
pub use storage::{KeyValueStore, MemoryStorage, StorageError};

/// Fixed storage keys.
pub mod keys {
    pub const PRIVATE_TOKEN: &str = "anonbox_private_token";
    pub const USER_HANDLE: &str = "anonbox_user_handle";
    pub const DISPLAY_NAME: &str = "anonbox_display_name";

    pub const ALL: [&str; 3] = [PRIVATE_TOKEN, USER_HANDLE, DISPLAY_NAME];
}

/// Identity to persist after registration or token verification.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub private_token: String,
    pub handle: String,
    pub display_name: String,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("private_token", &"<redacted>")
            .field("handle", &self.handle)
            .field("display_name", &self.display_name)
            .finish()
    }
}

/// Session as read back from storage. Any field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredSession {
    pub private_token: Option<String>,
    pub handle: Option<String>,
    pub display_name: Option<String>,
}

impl StoredSession {
    pub fn is_empty(&self) -> bool {
        self.private_token.is_none() && self.handle.is_none() && self.display_name.is_none()
    }

    /// A restorable session needs at least the token and the handle.
    pub fn into_session(self) -> Option<Session> {
        match (self.private_token, self.handle) {
            (Some(private_token), Some(handle)) => Some(Session {
                private_token,
                handle,
                display_name: self.display_name.unwrap_or_default(),
            }),
            _ => None,
        }
    }
}

/// Thread-safe facade over the storage capability.
///
/// All three keys are read and written under one lock, so a reader going
/// through this store never sees a half-written or half-cleared session.
pub struct SessionStore {
    storage: Option<Box<dyn KeyValueStore>>,
    lock: Mutex<()>,
}

impl SessionStore {
    pub fn new(storage: impl KeyValueStore + 'static) -> Self {
        Self {
            storage: Some(Box::new(storage)),
            lock: Mutex::new(()),
        }
    }

    /// Store for contexts without persistent storage: always reads all-null.
    pub fn unavailable() -> Self {
        Self {
            storage: None,
            lock: Mutex::new(()),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryStorage::new())
    }

    pub fn is_available(&self) -> bool {
        self.storage.is_some()
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get_stored_session(&self) -> StoredSession {
        let Some(storage) = &self.storage else {
            return StoredSession::default();
        };
        let _guard = self.guard();

        let read = || -> Result<StoredSession, StorageError> {
            Ok(StoredSession {
                private_token: storage.get(keys::PRIVATE_TOKEN)?,
                handle: storage.get(keys::USER_HANDLE)?,
                display_name: storage.get(keys::DISPLAY_NAME)?,
            })
        };

        read().unwrap_or_else(|e| {
            log::warn!("Failed to read stored session: {}", e);
            StoredSession::default()
        })
    }

    /// Current private token, if one is stored.
    pub fn private_token(&self) -> Option<String> {
        self.get_stored_session().private_token
    }

    /// Write all three fields.
    ///
    /// If any write fails the partially written session is removed before the
    /// error is returned.
    pub fn persist_session(&self, session: &Session) -> Result<(), StorageError> {
        let Some(storage) = &self.storage else {
            log::debug!("No session storage available, persist skipped");
            return Ok(());
        };
        let _guard = self.guard();

        let write = || -> Result<(), StorageError> {
            storage.set(keys::PRIVATE_TOKEN, &session.private_token)?;
            storage.set(keys::USER_HANDLE, &session.handle)?;
            storage.set(keys::DISPLAY_NAME, &session.display_name)?;
            Ok(())
        };

        if let Err(e) = write() {
            log::warn!("Failed to persist session, rolling back: {}", e);
            for key in keys::ALL {
                let _ = storage.remove(key);
            }
            return Err(e);
        }
        log::debug!("Session persisted for handle {}", session.handle);
        Ok(())
    }

    /// Remove all three fields. Every key is attempted even if one fails.
    pub fn clear_session(&self) -> Result<(), StorageError> {
        let Some(storage) = &self.storage else {
            return Ok(());
        };
        let _guard = self.guard();

        let mut first_err = None;
        for key in keys::ALL {
            if let Err(e) = storage.remove(key) {
                log::warn!("Failed to remove {} from session storage: {}", key, e);
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn session(token: &str, handle: &str, name: &str) -> Session {
        Session {
            private_token: token.into(),
            handle: handle.into(),
            display_name: name.into(),
        }
    }

    /// Storage that fails every `set` of the display name key.
    struct FlakyStorage {
        inner: MemoryStorage,
        fail_display_name: AtomicBool,
    }

    impl KeyValueStore for FlakyStorage {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            if key == keys::DISPLAY_NAME && self.fail_display_name.load(Ordering::SeqCst) {
                return Err(StorageError::OperationFailed("disk full".into()));
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<(), StorageError> {
            self.inner.remove(key)
        }
    }

    /// Storage whose reads always fail.
    struct BrokenStorage;

    impl KeyValueStore for BrokenStorage {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::OperationFailed("locked".into()))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Ok(())
        }

        fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Ok(())
        }
    }

    #[test]
    fn test_persist_then_get_round_trip() {
        let store = SessionStore::in_memory();
        let s = session("tok_x", "ab123", "ab");
        store.persist_session(&s).unwrap();

        let stored = store.get_stored_session();
        assert_eq!(stored.private_token.as_deref(), Some("tok_x"));
        assert_eq!(stored.handle.as_deref(), Some("ab123"));
        assert_eq!(stored.display_name.as_deref(), Some("ab"));

        // Reading twice changes nothing
        assert_eq!(store.get_stored_session(), stored);
        assert_eq!(stored.into_session(), Some(s));
    }

    #[test]
    fn test_persist_overwrites_previous_session() {
        let store = SessionStore::in_memory();
        store.persist_session(&session("old", "h1", "one")).unwrap();
        store.persist_session(&session("new", "h2", "two")).unwrap();
        assert_eq!(store.private_token().as_deref(), Some("new"));
        assert_eq!(store.get_stored_session().handle.as_deref(), Some("h2"));
    }

    #[test]
    fn test_clear_removes_everything() {
        let store = SessionStore::in_memory();
        store.persist_session(&session("tok", "h", "n")).unwrap();
        store.clear_session().unwrap();
        assert!(store.get_stored_session().is_empty());

        // Clearing an empty store is fine
        store.clear_session().unwrap();
    }

    #[test]
    fn test_unavailable_store_reads_all_null() {
        let store = SessionStore::unavailable();
        assert!(!store.is_available());
        assert_eq!(store.get_stored_session(), StoredSession::default());

        store.persist_session(&session("tok", "h", "n")).unwrap();
        assert!(store.get_stored_session().is_empty());
        store.clear_session().unwrap();
    }

    #[test]
    fn test_failed_persist_leaves_no_partial_session() {
        let store = SessionStore::new(FlakyStorage {
            inner: MemoryStorage::new(),
            fail_display_name: AtomicBool::new(true),
        });
        assert!(store.persist_session(&session("tok", "h", "n")).is_err());
        assert!(store.get_stored_session().is_empty());
    }

    #[test]
    fn test_read_failure_reads_all_null() {
        let store = SessionStore::new(BrokenStorage);
        assert!(store.get_stored_session().is_empty());
        assert_eq!(store.private_token(), None);
    }

    #[test]
    fn test_into_session_requires_token_and_handle() {
        let partial = StoredSession {
            private_token: Some("tok".into()),
            handle: None,
            display_name: Some("n".into()),
        };
        assert_eq!(partial.into_session(), None);

        let no_name = StoredSession {
            private_token: Some("tok".into()),
            handle: Some("h".into()),
            display_name: None,
        };
        assert_eq!(no_name.into_session().map(|s| s.display_name), Some(String::new()));
    }

    #[test]
    fn test_debug_redacts_token() {
        let rendered = format!("{:?}", session("secret-token", "h", "n"));
        assert!(!rendered.contains("secret-token"));
    }
}
