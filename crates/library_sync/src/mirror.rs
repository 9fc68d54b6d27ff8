use std::sync::{Arc, Mutex};

use indexmap::{IndexMap, IndexSet};
use library_api::LibraryEntry;
use tracing::debug;

use crate::session::lock_unpoisoned;

#[derive(Debug, Default)]
struct MirrorState {
    entries: IndexMap<String, LibraryEntry>,
    pending: IndexSet<String>,
}

/// Local copy of the user's library, keyed by catalog key in insertion order.
///
/// Holds at most one entry per key. Keys of saves that are still in flight
/// are tracked separately so a second save of the same book can be refused
/// before it reaches the network.
#[derive(Debug, Clone, Default)]
pub struct LibraryMirror {
    state: Arc<Mutex<MirrorState>>,
}

impl LibraryMirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces every entry. Later duplicates of a key are dropped.
    pub fn replace(&self, entries: Vec<LibraryEntry>) {
        let mut state = lock_unpoisoned(&self.state);
        state.entries.clear();
        for entry in entries {
            if state.entries.contains_key(&entry.key) {
                debug!(key = %entry.key, "dropping duplicate library entry");
                continue;
            }
            state.entries.insert(entry.key.clone(), entry);
        }
    }

    /// Adds an entry unless its key is already present. Returns whether it was added.
    pub fn insert(&self, entry: LibraryEntry) -> bool {
        let mut state = lock_unpoisoned(&self.state);
        if state.entries.contains_key(&entry.key) {
            return false;
        }
        state.entries.insert(entry.key.clone(), entry);
        true
    }

    /// Removes the entry with backend id `id`, keeping the order of the rest.
    pub fn remove_by_id(&self, id: &str) -> Option<LibraryEntry> {
        let mut state = lock_unpoisoned(&self.state);
        let index = state.entries.values().position(|entry| entry.id == id)?;
        state.entries.shift_remove_index(index).map(|(_, entry)| entry)
    }

    pub fn clear(&self) {
        let mut state = lock_unpoisoned(&self.state);
        state.entries.clear();
        state.pending.clear();
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        lock_unpoisoned(&self.state).entries.contains_key(key)
    }

    #[must_use]
    pub fn is_pending(&self, key: &str) -> bool {
        lock_unpoisoned(&self.state).pending.contains(key)
    }

    #[must_use]
    pub fn get_by_id(&self, id: &str) -> Option<LibraryEntry> {
        lock_unpoisoned(&self.state)
            .entries
            .values()
            .find(|entry| entry.id == id)
            .cloned()
    }

    #[must_use]
    pub fn entries(&self) -> Vec<LibraryEntry> {
        lock_unpoisoned(&self.state).entries.values().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        lock_unpoisoned(&self.state).entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Claims `key` for a save. Returns `None` when the key is already stored
    /// or another save of it is outstanding.
    pub fn reserve(&self, key: &str) -> Option<SaveReservation> {
        let mut state = lock_unpoisoned(&self.state);
        if state.entries.contains_key(key) || !state.pending.insert(key.to_string()) {
            return None;
        }
        Some(SaveReservation {
            mirror: self.clone(),
            key: key.to_string(),
        })
    }
}

/// Pending claim on a catalog key. Released on drop, including when the
/// owning task is aborted.
#[derive(Debug)]
pub struct SaveReservation {
    mirror: LibraryMirror,
    key: String,
}

impl SaveReservation {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Stores the saved entry and releases the claim.
    pub fn complete(self, entry: LibraryEntry) -> bool {
        self.mirror.insert(entry)
    }
}

impl Drop for SaveReservation {
    fn drop(&mut self) {
        lock_unpoisoned(&self.mirror.state)
            .pending
            .shift_remove(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, key: &str) -> LibraryEntry {
        LibraryEntry {
            id: id.to_string(),
            key: key.to_string(),
            title: format!("Book {id}"),
            authors: Vec::new(),
            cover: None,
            first_publish_year: None,
        }
    }

    #[test]
    fn replace_keeps_first_occurrence_of_a_key() {
        let mirror = LibraryMirror::new();
        mirror.replace(vec![entry("1", "/a"), entry("2", "/b"), entry("3", "/a")]);

        let ids: Vec<_> = mirror.entries().into_iter().map(|entry| entry.id).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn insert_refuses_duplicate_key() {
        let mirror = LibraryMirror::new();
        assert!(mirror.insert(entry("1", "/a")));
        assert!(!mirror.insert(entry("9", "/a")));
        assert_eq!(mirror.len(), 1);
    }

    #[test]
    fn remove_by_id_preserves_order() {
        let mirror = LibraryMirror::new();
        mirror.replace(vec![entry("1", "/a"), entry("2", "/b"), entry("3", "/c")]);

        let removed = mirror.remove_by_id("2").expect("entry 2 exists");
        assert_eq!(removed.key, "/b");
        let keys: Vec<_> = mirror.entries().into_iter().map(|entry| entry.key).collect();
        assert_eq!(keys, vec!["/a", "/c"]);
        assert!(mirror.remove_by_id("2").is_none());
    }

    #[test]
    fn reservation_blocks_second_claim_until_dropped() {
        let mirror = LibraryMirror::new();
        let first = mirror.reserve("/a").expect("first claim");
        assert!(mirror.reserve("/a").is_none());
        assert!(mirror.is_pending("/a"));

        drop(first);
        assert!(!mirror.is_pending("/a"));
        assert!(mirror.reserve("/a").is_some());
    }

    #[test]
    fn completed_reservation_stores_entry() {
        let mirror = LibraryMirror::new();
        let claim = mirror.reserve("/a").expect("claim");
        assert!(claim.complete(entry("1", "/a")));

        assert!(mirror.contains_key("/a"));
        assert!(!mirror.is_pending("/a"));
        assert!(mirror.reserve("/a").is_none());
    }
}
