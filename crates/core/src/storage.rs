//! Key-value storage backends for session state
//!
//! Values live in one of two scopes. The session scope only lasts as long as
//! the running client (a browser tab session, a CLI process). The persistent
//! scope survives restarts.

use crate::error::{CoreError, CoreResult};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// Lifetime of a stored value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageScope {
    /// Cleared when the client session ends
    Session,
    /// Kept across client sessions
    Persistent,
}

/// Storage backend used by the token store
pub trait SessionStorage: Send + Sync {
    /// Read a value, `None` if the key is not set
    fn get(&self, scope: StorageScope, key: &str) -> CoreResult<Option<String>>;

    /// Write a value, replacing any previous one
    fn set(&self, scope: StorageScope, key: &str, value: &str) -> CoreResult<()>;

    /// Remove a value. Removing a missing key is not an error.
    fn remove(&self, scope: StorageScope, key: &str) -> CoreResult<()>;
}

fn lock<T>(mutex: &Mutex<T>) -> CoreResult<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| CoreError::storage("storage lock poisoned"))
}

/// Storage that keeps both scopes in memory
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<(StorageScope, String), String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, scope: StorageScope, key: &str) -> CoreResult<Option<String>> {
        Ok(lock(&self.values)?.get(&(scope, key.to_string())).cloned())
    }

    fn set(&self, scope: StorageScope, key: &str, value: &str) -> CoreResult<()> {
        lock(&self.values)?.insert((scope, key.to_string()), value.to_string());
        Ok(())
    }

    fn remove(&self, scope: StorageScope, key: &str) -> CoreResult<()> {
        lock(&self.values)?.remove(&(scope, key.to_string()));
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;

#[cfg(not(target_arch = "wasm32"))]
mod file {
    use super::{SessionStorage, StorageScope, lock};
    use crate::error::CoreResult;
    use std::collections::BTreeMap;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    /// Storage with an in-memory session scope and a JSON file for the persistent scope
    ///
    /// The file is re-read on every access and rewritten on every mutation, so
    /// two processes sharing it see each other's writes. A missing file reads
    /// as empty.
    #[derive(Debug)]
    pub struct FileStorage {
        path: PathBuf,
        session: Mutex<BTreeMap<String, String>>,
        file: Mutex<()>,
    }

    impl FileStorage {
        pub fn new(path: impl Into<PathBuf>) -> Self {
            Self {
                path: path.into(),
                session: Mutex::new(BTreeMap::new()),
                file: Mutex::new(()),
            }
        }

        /// Path of the persistent file
        pub fn path(&self) -> &Path {
            &self.path
        }

        fn read_file(&self) -> CoreResult<BTreeMap<String, String>> {
            match std::fs::read_to_string(&self.path) {
                Ok(content) if content.trim().is_empty() => Ok(BTreeMap::new()),
                Ok(content) => Ok(serde_json::from_str(&content)?),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
                Err(e) => Err(e.into()),
            }
        }

        fn write_file(&self, values: &BTreeMap<String, String>) -> CoreResult<()> {
            if let Some(parent) = self.path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let content = serde_json::to_string_pretty(values)?;
            std::fs::write(&self.path, content)?;
            Ok(())
        }
    }

    impl SessionStorage for FileStorage {
        fn get(&self, scope: StorageScope, key: &str) -> CoreResult<Option<String>> {
            match scope {
                StorageScope::Session => Ok(lock(&self.session)?.get(key).cloned()),
                StorageScope::Persistent => {
                    let _guard = lock(&self.file)?;
                    Ok(self.read_file()?.remove(key))
                }
            }
        }

        fn set(&self, scope: StorageScope, key: &str, value: &str) -> CoreResult<()> {
            match scope {
                StorageScope::Session => {
                    lock(&self.session)?.insert(key.to_string(), value.to_string());
                    Ok(())
                }
                StorageScope::Persistent => {
                    let _guard = lock(&self.file)?;
                    let mut values = self.read_file()?;
                    values.insert(key.to_string(), value.to_string());
                    self.write_file(&values)
                }
            }
        }

        fn remove(&self, scope: StorageScope, key: &str) -> CoreResult<()> {
            match scope {
                StorageScope::Session => {
                    lock(&self.session)?.remove(key);
                    Ok(())
                }
                StorageScope::Persistent => {
                    let _guard = lock(&self.file)?;
                    let mut values = self.read_file()?;
                    if values.remove(key).is_some() {
                        self.write_file(&values)?;
                    }
                    Ok(())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_scopes_are_separate() {
        let storage = MemoryStorage::new();
        storage
            .set(StorageScope::Session, "key", "session-value")
            .unwrap();

        assert_eq!(
            storage.get(StorageScope::Session, "key").unwrap().as_deref(),
            Some("session-value")
        );
        assert_eq!(storage.get(StorageScope::Persistent, "key").unwrap(), None);
    }

    #[test]
    fn test_memory_storage_remove_missing_key() {
        let storage = MemoryStorage::new();
        assert!(storage.remove(StorageScope::Persistent, "missing").is_ok());
    }

    #[test]
    fn test_file_storage_persistent_scope_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let storage = FileStorage::new(&path);
        storage
            .set(StorageScope::Persistent, "refresh_token", "RT1")
            .unwrap();
        storage
            .set(StorageScope::Session, "access_token", "AT1")
            .unwrap();
        drop(storage);

        let reopened = FileStorage::new(&path);
        assert_eq!(
            reopened
                .get(StorageScope::Persistent, "refresh_token")
                .unwrap()
                .as_deref(),
            Some("RT1")
        );
        assert_eq!(
            reopened.get(StorageScope::Session, "access_token").unwrap(),
            None
        );
    }

    #[test]
    fn test_file_storage_missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested").join("session.json"));

        assert_eq!(storage.get(StorageScope::Persistent, "anything").unwrap(), None);
        assert!(storage.remove(StorageScope::Persistent, "anything").is_ok());
        assert!(!storage.path().exists());
    }

    #[test]
    fn test_file_storage_remove_rewrites_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("session.json"));

        storage.set(StorageScope::Persistent, "a", "1").unwrap();
        storage.set(StorageScope::Persistent, "b", "2").unwrap();
        storage.remove(StorageScope::Persistent, "a").unwrap();

        let content = std::fs::read_to_string(storage.path()).unwrap();
        let values: HashMap<String, String> = serde_json::from_str(&content).unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(values.get("b").map(String::as_str), Some("2"));
    }

    #[test]
    fn test_file_storage_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "not json").unwrap();

        let storage = FileStorage::new(&path);
        assert!(matches!(
            storage.get(StorageScope::Persistent, "refresh_token"),
            Err(CoreError::Serialization { .. })
        ));
    }
}
