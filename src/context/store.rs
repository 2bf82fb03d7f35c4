//! Per-node value store guarded by its own read/write lock.

use crate::value::{Key, Value};
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub(crate) struct ValueStore {
    entries: RwLock<HashMap<Key, Value>>,
}

impl ValueStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_entries(entries: HashMap<Key, Value>) -> Self {
        Self {
            entries: RwLock::new(entries),
        }
    }

    pub(crate) fn get(&self, key: &Key) -> Option<Value> {
        self.entries.read().get(key).cloned()
    }

    pub(crate) fn contains(&self, key: &Key) -> bool {
        self.entries.read().contains_key(key)
    }

    pub(crate) fn set(&self, key: Key, value: Value) {
        self.entries.write().insert(key, value);
    }

    /// Copy of the current entries, taken under the read lock.
    pub(crate) fn snapshot(&self) -> HashMap<Key, Value> {
        self.entries.read().clone()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub(crate) fn keys(&self) -> Vec<Key> {
        self.entries.read().keys().cloned().collect()
    }
}
