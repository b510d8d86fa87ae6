#![forbid(unsafe_code)]

//! Bounded, persisted most-recently-used list of menu item ids.
//!
//! The list lives in a [`KeyValueStore`] under one key. Loading never
//! fails: a missing, unreadable or corrupt entry yields an empty list.
//! Recording writes through after every selection; once a write fails the
//! list stays in memory for the rest of the session.

use glitch_runtime::KeyValueStore;
use tracing::{debug, warn};

/// Storage key used when none is configured.
pub const RECENT_STORAGE_KEY: &str = "glitch.menu.recent";

/// Default number of remembered selections.
pub const DEFAULT_MAX_RECENT: usize = 5;

/// Most-recent-first list of selected item ids.
pub struct RecentSelections {
    store: Box<dyn KeyValueStore>,
    key: String,
    max: usize,
    ids: Vec<String>,
    memory_only: bool,
}

impl std::fmt::Debug for RecentSelections {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecentSelections")
            .field("store", &self.store.name())
            .field("key", &self.key)
            .field("max", &self.max)
            .field("ids", &self.ids)
            .field("memory_only", &self.memory_only)
            .finish()
    }
}

impl RecentSelections {
    /// Load the list stored under `key`, keeping at most `max` entries
    /// (at least one).
    pub fn load(store: Box<dyn KeyValueStore>, key: impl Into<String>, max: usize) -> Self {
        let key = key.into();
        let max = max.max(1);

        let ids = match store.get(&key) {
            Ok(Some(stored)) => sanitize(stored, max),
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!(store = store.name(), key = %key, error = %err, "recent list unreadable; starting empty");
                Vec::new()
            }
        };
        debug!(store = store.name(), key = %key, loaded = ids.len(), "recent list loaded");

        Self {
            store,
            key,
            max,
            ids,
            memory_only: false,
        }
    }

    /// Ids, most recent first.
    #[must_use]
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// The `n`th most recent id (0-based).
    #[must_use]
    pub fn get(&self, n: usize) -> Option<&str> {
        self.ids.get(n).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|r| r == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Capacity of the list.
    #[must_use]
    pub fn max_recent(&self) -> usize {
        self.max
    }

    /// The storage key in use.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Whether persistence has been abandoned for this session.
    #[must_use]
    pub fn is_memory_only(&self) -> bool {
        self.memory_only
    }

    /// Move `id` to the front, truncate, and persist.
    pub fn record(&mut self, id: &str) {
        self.ids.retain(|r| r != id);
        self.ids.insert(0, id.to_owned());
        self.ids.truncate(self.max);
        self.persist();
    }

    fn persist(&mut self) {
        if self.memory_only {
            return;
        }
        if let Err(err) = self.store.set(&self.key, &self.ids) {
            warn!(
                store = self.store.name(),
                key = %self.key,
                error = %err,
                "recent list not persisted; keeping it in memory for this session"
            );
            self.memory_only = true;
        }
    }
}

/// Drop empty and duplicate ids, keeping first occurrences, then truncate.
fn sanitize(stored: Vec<String>, max: usize) -> Vec<String> {
    let mut ids: Vec<String> = Vec::with_capacity(stored.len().min(max));
    for id in stored {
        if id.is_empty() || ids.contains(&id) {
            continue;
        }
        ids.push(id);
        if ids.len() == max {
            break;
        }
    }
    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use glitch_runtime::{MemoryStore, UnavailableStore};
    use std::rc::Rc;

    fn ids(list: &RecentSelections) -> Vec<&str> {
        list.ids().iter().map(String::as_str).collect()
    }

    #[test]
    fn missing_key_loads_empty() {
        let list = RecentSelections::load(Box::new(MemoryStore::new()), RECENT_STORAGE_KEY, 5);
        assert!(list.is_empty());
        assert_eq!(list.key(), RECENT_STORAGE_KEY);
    }

    #[test]
    fn record_moves_to_front_and_bounds() {
        let mut list = RecentSelections::load(Box::new(MemoryStore::new()), "k", 3);
        for id in ["a", "b", "c", "d"] {
            list.record(id);
        }
        assert_eq!(ids(&list), vec!["d", "c", "b"]);

        list.record("b");
        assert_eq!(ids(&list), vec!["b", "d", "c"]);
        assert_eq!(list.get(0), Some("b"));
        assert!(list.contains("c"));
        assert!(!list.contains("a"));
    }

    #[test]
    fn max_is_at_least_one() {
        let mut list = RecentSelections::load(Box::new(MemoryStore::new()), "k", 0);
        assert_eq!(list.max_recent(), 1);
        list.record("x");
        list.record("y");
        assert_eq!(ids(&list), vec!["y"]);
    }

    #[test]
    fn record_persists_every_time() {
        let store = Rc::new(MemoryStore::new());
        let mut list = RecentSelections::load(Box::new(Rc::clone(&store)), "k", 5);
        list.record("a");
        list.record("b");
        assert_eq!(store.writes(), 2);
        assert_eq!(
            store.get("k").unwrap(),
            Some(vec!["b".to_string(), "a".to_string()])
        );
    }

    #[test]
    fn stored_list_is_sanitized() {
        let store = MemoryStore::with_entries([(
            "k",
            vec!["a".to_string(), String::new(), "a".to_string(), "b".to_string(), "c".to_string()],
        )]);
        let list = RecentSelections::load(Box::new(store), "k", 2);
        assert_eq!(ids(&list), vec!["a", "b"]);
    }

    #[test]
    fn unavailable_storage_keeps_memory_list() {
        let mut list = RecentSelections::load(Box::new(UnavailableStore), "k", 5);
        assert!(list.is_empty());
        list.record("a");
        list.record("b");
        assert!(list.is_memory_only());
        assert_eq!(ids(&list), vec!["b", "a"]);
    }
}
