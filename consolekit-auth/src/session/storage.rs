//! Token Storage - persistence layer for session tokens
//!
//! A small key-value store that survives process restarts. The session store only
//! ever writes or removes the access and refresh tokens together.

use super::types::TokenPair;
use consolekit_core::{
    storage_error, ConsoleError, ConsoleResult, SessionSettings, StorageBackend, StorageConfig,
};
use std::collections::{BTreeMap, HashMap};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};
use tracing::{debug, info, warn};

/// Durable key-value storage scoped to this client
pub trait TokenStorage: Send + Sync {
    fn get(&self, key: &str) -> ConsoleResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> ConsoleResult<()>;

    fn remove(&self, key: &str) -> ConsoleResult<()>;

    /// Write several entries; backends override this to make it all-or-nothing
    fn set_many(&self, entries: &[(&str, &str)]) -> ConsoleResult<()> {
        for (key, value) in entries {
            self.set(key, value)?;
        }
        Ok(())
    }

    /// Remove several entries, attempting every key even if one fails
    fn remove_many(&self, keys: &[&str]) -> ConsoleResult<()> {
        let mut first_error = None;
        for key in keys {
            if let Err(e) = self.remove(key) {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

/// Storage keys under which the token pair lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenKeys {
    pub access_token: String,
    pub refresh_token: String,
}

impl Default for TokenKeys {
    fn default() -> Self {
        Self::from(&SessionSettings::default())
    }
}

impl From<&SessionSettings> for TokenKeys {
    fn from(settings: &SessionSettings) -> Self {
        Self {
            access_token: settings.access_token_key.clone(),
            refresh_token: settings.refresh_token_key.clone(),
        }
    }
}

impl TokenKeys {
    /// Read both tokens
    pub fn load(&self, storage: &dyn TokenStorage) -> ConsoleResult<(Option<String>, Option<String>)> {
        Ok((
            storage.get(&self.access_token)?,
            storage.get(&self.refresh_token)?,
        ))
    }

    /// Write both tokens in one storage call
    pub fn persist(&self, storage: &dyn TokenStorage, tokens: &TokenPair) -> ConsoleResult<()> {
        storage.set_many(&[
            (self.access_token.as_str(), tokens.access_token.as_str()),
            (self.refresh_token.as_str(), tokens.refresh_token.as_str()),
        ])
    }

    /// Remove both tokens in one storage call
    pub fn purge(&self, storage: &dyn TokenStorage) -> ConsoleResult<()> {
        storage.remove_many(&[self.access_token.as_str(), self.refresh_token.as_str()])
    }
}

fn poisoned(component: &str) -> ConsoleError {
    storage_error!("Storage lock poisoned", component)
}

/// Process-local storage; contents vanish with the process
#[derive(Debug, Default)]
pub struct MemoryTokenStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryTokenStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn get(&self, key: &str) -> ConsoleResult<Option<String>> {
        let entries = self.entries.read().map_err(|_| poisoned("memory_storage"))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> ConsoleResult<()> {
        let mut entries = self.entries.write().map_err(|_| poisoned("memory_storage"))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> ConsoleResult<()> {
        let mut entries = self.entries.write().map_err(|_| poisoned("memory_storage"))?;
        entries.remove(key);
        Ok(())
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> ConsoleResult<()> {
        let mut guard = self.entries.write().map_err(|_| poisoned("memory_storage"))?;
        for (key, value) in entries {
            guard.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }
}

/// Storage backed by a single JSON document on disk
///
/// Every change rewrites the whole document through a temp file and a rename, so a
/// multi-key write lands completely or not at all.
#[derive(Debug)]
pub struct FileTokenStorage {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileTokenStorage {
    /// Open (or lazily create) the storage file
    pub fn open<P: AsRef<Path>>(path: P) -> ConsoleResult<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    storage_error!(
                        format!("Failed to create storage directory {}", parent.display()),
                        "file_storage",
                        e
                    )
                })?;
            }
        }

        let entries = Self::read_entries(&path)?;
        info!(
            "Token storage opened at: {} ({} entries)",
            path.display(),
            entries.len()
        );

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(path: &Path) -> ConsoleResult<BTreeMap<String, String>> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => {
                return Err(storage_error!(
                    format!("Failed to read token storage {}", path.display()),
                    "file_storage",
                    e
                ))
            }
        };

        match serde_json::from_str(&content) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                warn!(
                    "Token storage at {} is unreadable, starting empty: {}",
                    path.display(),
                    e
                );
                Ok(BTreeMap::new())
            }
        }
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> ConsoleResult<()> {
        let json_data = serde_json::to_string_pretty(entries).map_err(ConsoleError::Serialization)?;

        let mut tmp_name = self.path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        write_private(&tmp_path, json_data.as_bytes()).map_err(|e| {
            storage_error!(
                format!("Failed to write token storage {}", tmp_path.display()),
                "file_storage",
                e
            )
        })?;
        std::fs::rename(&tmp_path, &self.path).map_err(|e| {
            storage_error!(
                format!("Failed to replace token storage {}", self.path.display()),
                "file_storage",
                e
            )
        })?;

        debug!("Flushed {} entries to {}", entries.len(), self.path.display());
        Ok(())
    }

    /// Apply `change` to a copy of the entries and keep it only if the flush succeeds
    fn update<F>(&self, change: F) -> ConsoleResult<()>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let mut guard = self.entries.lock().map_err(|_| poisoned("file_storage"))?;
        let mut next = guard.clone();
        change(&mut next);
        if next == *guard {
            return Ok(());
        }
        self.flush(&next)?;
        *guard = next;
        Ok(())
    }
}

impl TokenStorage for FileTokenStorage {
    fn get(&self, key: &str) -> ConsoleResult<Option<String>> {
        let entries = self.entries.lock().map_err(|_| poisoned("file_storage"))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> ConsoleResult<()> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> ConsoleResult<()> {
        self.update(|entries| {
            entries.remove(key);
        })
    }

    fn set_many(&self, pairs: &[(&str, &str)]) -> ConsoleResult<()> {
        self.update(|entries| {
            for (key, value) in pairs {
                entries.insert(key.to_string(), value.to_string());
            }
        })
    }

    fn remove_many(&self, keys: &[&str]) -> ConsoleResult<()> {
        self.update(|entries| {
            for key in keys {
                entries.remove(*key);
            }
        })
    }
}

/// Write `contents` to a fresh file readable only by the owner on unix
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    // A leftover temp file would keep its old permissions
    match std::fs::remove_file(path) {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => return Err(e),
        _ => {}
    }

    let mut options = std::fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    file.write_all(contents)?;
    file.sync_all()
}

/// Build the storage backend selected in configuration
pub fn storage_from_config(config: &StorageConfig) -> ConsoleResult<Arc<dyn TokenStorage>> {
    match config.backend {
        StorageBackend::Memory => Ok(Arc::new(MemoryTokenStorage::new())),
        StorageBackend::File => Ok(Arc::new(FileTokenStorage::open(config.resolved_path()?)?)),
    }
}
