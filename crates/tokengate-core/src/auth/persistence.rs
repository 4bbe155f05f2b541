//! Key-value persistence backends for credential slots.
//!
//! The token store never touches a storage medium directly. It talks to a
//! `KeyValueStore`, and the concrete backend is picked once at startup by
//! [`open_store`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use keyring::Entry;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::config::{Config, StorageBackend};

/// Service name used for OS keychain entries
const KEYRING_SERVICE: &str = "tokengate";

/// Credentials file name in the data directory
const CREDENTIALS_FILE: &str = "credentials.json";

/// String key/value persistence.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;

    /// Write several entries as one unit: either all of them land or the
    /// store is left as it was.
    ///
    /// The default writes key by key and puts the earlier values back when
    /// a write fails. If even that fails, every key in `entries` is removed.
    fn set_many(&self, entries: &[(&str, &str)]) -> Result<()> {
        let previous = entries
            .iter()
            .map(|(key, _)| Ok((*key, self.get(key)?)))
            .collect::<Result<Vec<_>>>()?;

        for (written, (key, value)) in entries.iter().enumerate() {
            if let Err(e) = self.set(key, value) {
                warn!(key, error = %e, "Batch write failed, restoring previous values");
                if let Err(restore_err) = restore(self, &previous[..=written]) {
                    warn!(error = %restore_err, "Restore failed, removing the whole batch");
                    let keys: Vec<&str> = entries.iter().map(|(k, _)| *k).collect();
                    let _ = self.remove_many(&keys);
                }
                return Err(e);
            }
        }
        Ok(())
    }

    /// Remove several keys. Every key is attempted; the first error wins.
    fn remove_many(&self, keys: &[&str]) -> Result<()> {
        let mut first_err = None;
        for key in keys {
            if let Err(e) = self.remove(key) {
                warn!(key, error = %e, "Failed to remove key");
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

fn restore<S: KeyValueStore + ?Sized>(store: &S, previous: &[(&str, Option<String>)]) -> Result<()> {
    for (key, value) in previous {
        match value {
            Some(value) => store.set(key, value)?,
            None => store.remove(key)?,
        }
    }
    Ok(())
}

// ============================================================================
// Memory / Null
// ============================================================================

/// Volatile store. Lives as long as the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| anyhow::anyhow!("Memory store lock poisoned"))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> Result<()> {
        let mut map = self.lock()?;
        for (key, value) in entries {
            map.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }

    fn remove_many(&self, keys: &[&str]) -> Result<()> {
        let mut map = self.lock()?;
        for key in keys {
            map.remove(*key);
        }
        Ok(())
    }
}

/// Store with no backing at all: writes are dropped, reads are empty.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullStore;

impl KeyValueStore for NullStore {
    fn get(&self, _key: &str) -> Result<Option<String>> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: &str) -> Result<()> {
        Ok(())
    }

    fn remove(&self, _key: &str) -> Result<()> {
        Ok(())
    }
}

// ============================================================================
// File
// ============================================================================

#[derive(Debug, Default, Serialize, Deserialize)]
struct FileContents {
    #[serde(default)]
    entries: HashMap<String, String>,
    updated_at: Option<DateTime<Utc>>,
}

/// JSON file store, written through on every mutation.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    contents: Mutex<FileContents>,
}

impl FileStore {
    /// Open the store at `path`. A missing file is an empty store.
    ///
    /// A file that does not parse is moved aside to `<name>.corrupt` and the
    /// store starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let contents = if path.exists() {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read credentials file {}", path.display()))?;
            match serde_json::from_str(&raw) {
                Ok(contents) => contents,
                Err(e) => {
                    let backup = Self::corrupt_path(&path);
                    warn!(path = %path.display(), error = %e, "Credentials file is corrupt, starting empty");
                    if let Err(e) = std::fs::rename(&path, &backup) {
                        warn!(error = %e, "Failed to move corrupt credentials file aside");
                    }
                    FileContents::default()
                }
            }
        } else {
            FileContents::default()
        };
        debug!(path = %path.display(), entries = contents.entries.len(), "File store opened");

        Ok(Self {
            path,
            contents: Mutex::new(contents),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Time of the last write, if the file has ever been written
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.contents.lock().ok().and_then(|c| c.updated_at)
    }

    fn corrupt_path(path: &Path) -> PathBuf {
        let mut name = path.file_name().unwrap_or_default().to_os_string();
        name.push(".corrupt");
        path.with_file_name(name)
    }

    /// Apply `f` to a copy of the entries, write the copy, and only then
    /// make it the in-memory state.
    fn mutate(&self, f: impl FnOnce(&mut HashMap<String, String>)) -> Result<()> {
        let mut contents = self
            .contents
            .lock()
            .map_err(|_| anyhow::anyhow!("File store lock poisoned"))?;
        let mut next = FileContents {
            entries: contents.entries.clone(),
            updated_at: Some(Utc::now()),
        };
        f(&mut next.entries);
        self.write(&next)?;
        *contents = next;
        Ok(())
    }

    /// Write to a temp file next to the target, then rename it into place.
    fn write(&self, contents: &FileContents) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir).context("Failed to create data directory")?;

        let mut tmp = NamedTempFile::new_in(dir).context("Failed to create temp credentials file")?;
        serde_json::to_writer_pretty(&mut tmp, contents)?;
        tmp.as_file()
            .sync_all()
            .context("Failed to flush credentials file")?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            tmp.as_file()
                .set_permissions(permissions)
                .context("Failed to set credentials file permissions")?;
        }

        tmp.persist(&self.path)
            .context("Failed to replace credentials file")?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let contents = self
            .contents
            .lock()
            .map_err(|_| anyhow::anyhow!("File store lock poisoned"))?;
        Ok(contents.entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.mutate(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.mutate(|entries| {
            entries.remove(key);
        })
    }

    fn set_many(&self, batch: &[(&str, &str)]) -> Result<()> {
        self.mutate(|entries| {
            for (key, value) in batch {
                entries.insert(key.to_string(), value.to_string());
            }
        })
    }

    fn remove_many(&self, keys: &[&str]) -> Result<()> {
        self.mutate(|entries| {
            for key in keys {
                entries.remove(*key);
            }
        })
    }
}

// ============================================================================
// Keyring
// ============================================================================

/// OS keychain store, one entry per key.
#[derive(Debug, Clone)]
pub struct KeyringStore {
    service: String,
}

impl KeyringStore {
    pub fn new() -> Self {
        Self::with_service(KEYRING_SERVICE)
    }

    fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, key: &str) -> Result<Entry> {
        Entry::new(&self.service, key).context("Failed to create keyring entry")
    }
}

impl Default for KeyringStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for KeyringStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e).context("Failed to read from keychain"),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entry(key)?
            .set_password(value)
            .context("Failed to store value in keychain")
    }

    fn remove(&self, key: &str) -> Result<()> {
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete value from keychain"),
        }
    }
}

// ============================================================================
// Startup selection
// ============================================================================

/// Open the backend named by the configuration.
///
/// Falls back to a [`MemoryStore`] when the configured backend has no usable
/// backing, so the session keeps working for the lifetime of the process.
pub fn open_store(config: &Config) -> Arc<dyn KeyValueStore> {
    match config.storage {
        StorageBackend::File => {
            let opened = config
                .data_dir()
                .and_then(|dir| FileStore::open(dir.join(CREDENTIALS_FILE)));
            match opened {
                Ok(store) => {
                    debug!(
                        path = %store.path().display(),
                        last_write = ?store.updated_at(),
                        "Using file credential store"
                    );
                    Arc::new(store)
                }
                Err(e) => {
                    warn!(error = %e, "File store unavailable, credentials will not persist");
                    Arc::new(MemoryStore::new())
                }
            }
        }
        StorageBackend::Keyring => Arc::new(KeyringStore::new()),
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
        StorageBackend::None => Arc::new(NullStore),
    }
}

// ============================================================================
// Tests
// ============================================================================
