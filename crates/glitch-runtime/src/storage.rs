#![forbid(unsafe_code)]

//! Small persistent key/value storage for component state.
//!
//! Components persist short lists of string identifiers (the filter menu's
//! recent selections). [`KeyValueStore`] is the seam: browser hosts back it
//! with `localStorage`, native hosts with [`FileStore`], tests with
//! [`MemoryStore`].
//!
//! # Design Invariants
//!
//! 1. **Graceful degradation**: storage failures never panic; every
//!    operation returns `Result` and callers fall back to in-memory state.
//! 2. **Atomic writes**: [`FileStore`] writes a temp file then renames it.
//! 3. **Corruption is absence**: an unreadable value reads as `Ok(None)`
//!    at the call sites that care; the error is still reported here.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | `StorageError::Unavailable` | Host has no storage | Caller keeps in-memory state |
//! | `StorageError::Io` | File I/O failure | Returns error, nothing written |
//! | `StorageError::Corrupt` | Invalid stored document | Returns error, caller treats as empty |
//!
//! # Feature Gates
//!
//! - `file-storage`: enables [`FileStore`] (JSON document on disk).

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Errors from a [`KeyValueStore`].
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The host offers no persistent storage.
    #[error("storage is unavailable")]
    Unavailable,
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The stored document could not be parsed or encoded.
    #[error("corrupt stored data: {0}")]
    Corrupt(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Persistent mapping from keys to lists of strings.
pub trait KeyValueStore {
    /// Read the list under `key`. `Ok(None)` when nothing is stored.
    fn get(&self, key: &str) -> StorageResult<Option<Vec<String>>>;

    /// Replace the list under `key`.
    fn set(&self, key: &str, values: &[String]) -> StorageResult<()>;

    /// Human-readable backend name for logs.
    fn name(&self) -> &str;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Rc<T> {
    fn get(&self, key: &str) -> StorageResult<Option<Vec<String>>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, values: &[String]) -> StorageResult<()> {
        (**self).set(key, values)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get(&self, key: &str) -> StorageResult<Option<Vec<String>>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, values: &[String]) -> StorageResult<()> {
        (**self).set(key, values)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// MemoryStore
// ─────────────────────────────────────────────────────────────────────────────

/// In-memory store for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, Vec<String>>>,
    writes: Cell<u64>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `entries`.
    #[must_use]
    pub fn with_entries<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Vec<String>)>,
    {
        let store = Self::new();
        store
            .entries
            .borrow_mut()
            .extend(entries.into_iter().map(|(k, v)| (k.into(), v)));
        store
    }

    /// Number of successful `set` calls.
    #[must_use]
    pub fn writes(&self) -> u64 {
        self.writes.get()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StorageResult<Option<Vec<String>>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, values: &[String]) -> StorageResult<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), values.to_vec());
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }

    fn name(&self) -> &str {
        "MemoryStore"
    }
}

impl fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryStore")
            .field("entries", &self.entries.borrow().len())
            .field("writes", &self.writes())
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// UnavailableStore
// ─────────────────────────────────────────────────────────────────────────────

/// A host without persistent storage (private browsing, sandboxed iframe).
/// Every operation fails with [`StorageError::Unavailable`].
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableStore;

impl KeyValueStore for UnavailableStore {
    fn get(&self, _key: &str) -> StorageResult<Option<Vec<String>>> {
        Err(StorageError::Unavailable)
    }

    fn set(&self, _key: &str, _values: &[String]) -> StorageResult<()> {
        Err(StorageError::Unavailable)
    }

    fn name(&self) -> &str {
        "UnavailableStore"
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// FileStore (feature-gated)
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(feature = "file-storage")]
mod file_store {
    use super::*;
    use serde::{Deserialize, Serialize};
    use std::collections::BTreeMap;
    use std::fs::{self, File};
    use std::io::{BufReader, BufWriter, Write};
    use std::path::{Path, PathBuf};

    /// On-disk document.
    #[derive(Serialize, Deserialize)]
    struct StoreDocument {
        format_version: u32,
        entries: BTreeMap<String, Vec<String>>,
    }

    impl StoreDocument {
        const FORMAT_VERSION: u32 = 1;

        fn new() -> Self {
            Self {
                format_version: Self::FORMAT_VERSION,
                entries: BTreeMap::new(),
            }
        }
    }

    /// JSON-file store for native hosts.
    ///
    /// # File Format
    ///
    /// ```json
    /// {
    ///   "format_version": 1,
    ///   "entries": {
    ///     "glitch.menu.recent": ["archive", "home"]
    ///   }
    /// }
    /// ```
    ///
    /// Writes go to `{path}.tmp`, are synced, then renamed over `{path}`.
    pub struct FileStore {
        path: PathBuf,
    }

    impl FileStore {
        /// Create a store at `path`. The file is created on first write.
        #[must_use]
        pub fn new(path: impl AsRef<Path>) -> Self {
            Self {
                path: path.as_ref().to_path_buf(),
            }
        }

        /// Store at the default location for `app_name`:
        /// `$XDG_STATE_HOME/glitch/{app_name}/store.json`, falling back to
        /// `~/.local/state`, then the current directory.
        #[must_use]
        pub fn default_for_app(app_name: &str) -> Self {
            let path = state_dir().join("glitch").join(app_name).join("store.json");
            Self { path }
        }

        /// Path of the backing file.
        #[must_use]
        pub fn path(&self) -> &Path {
            &self.path
        }

        fn temp_path(&self) -> PathBuf {
            let mut tmp = self.path.clone();
            tmp.set_extension("json.tmp");
            tmp
        }

        fn load(&self) -> StorageResult<StoreDocument> {
            if !self.path.exists() {
                return Ok(StoreDocument::new());
            }
            let reader = BufReader::new(File::open(&self.path)?);
            let doc: StoreDocument = serde_json::from_reader(reader)
                .map_err(|e| StorageError::Corrupt(format!("failed to parse store: {e}")))?;
            if doc.format_version != StoreDocument::FORMAT_VERSION {
                tracing::warn!(
                    stored = doc.format_version,
                    expected = StoreDocument::FORMAT_VERSION,
                    "store format version mismatch, ignoring stored data"
                );
                return Ok(StoreDocument::new());
            }
            Ok(doc)
        }

        fn save(&self, doc: &StoreDocument) -> StorageResult<()> {
            if let Some(parent) = self.path.parent() {
                fs::create_dir_all(parent)?;
            }
            let tmp_path = self.temp_path();
            {
                let mut writer = BufWriter::new(File::create(&tmp_path)?);
                serde_json::to_writer_pretty(&mut writer, doc)
                    .map_err(|e| StorageError::Corrupt(format!("failed to encode store: {e}")))?;
                writer.flush()?;
                writer.get_ref().sync_all()?;
            }
            fs::rename(&tmp_path, &self.path)?;
            Ok(())
        }
    }

    fn state_dir() -> PathBuf {
        if let Ok(state_home) = std::env::var("XDG_STATE_HOME") {
            return PathBuf::from(state_home);
        }
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(".local").join("state");
        }
        PathBuf::from(".")
    }

    impl KeyValueStore for FileStore {
        fn get(&self, key: &str) -> StorageResult<Option<Vec<String>>> {
            Ok(self.load()?.entries.remove(key))
        }

        fn set(&self, key: &str, values: &[String]) -> StorageResult<()> {
            // A corrupt document is replaced rather than blocking writes forever.
            let mut doc = match self.load() {
                Ok(doc) => doc,
                Err(StorageError::Corrupt(reason)) => {
                    tracing::warn!(path = %self.path.display(), %reason, "replacing corrupt store");
                    StoreDocument::new()
                }
                Err(err) => return Err(err),
            };
            doc.entries.insert(key.to_string(), values.to_vec());
            self.save(&doc)?;
            tracing::debug!(path = %self.path.display(), key, len = values.len(), "store saved");
            Ok(())
        }

        fn name(&self) -> &str {
            "FileStore"
        }
    }

    impl fmt::Debug for FileStore {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_struct("FileStore")
                .field("path", &self.path)
                .finish()
        }
    }
}

#[cfg(feature = "file-storage")]
pub use file_store::FileStore;
