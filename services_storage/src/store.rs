//! Key-value store contract and the in-memory backend

use crate::{BatchOp, WriteBatch};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use thiserror::Error;

/// Errors a durable store can report
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Storage quota exceeded while writing {key}")]
    QuotaExceeded { key: String },

    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Storage data corrupt: {0}")]
    Corrupt(String),
}

/// Durable string-keyed, string-valued store
///
/// `apply` is all-or-nothing: when it returns an error no operation of the
/// batch is visible.
pub trait KeyValueStore {
    /// Reads a value
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Applies a batch atomically
    fn apply(&mut self, batch: WriteBatch) -> Result<(), StoreError>;

    /// Lists every key currently stored
    fn keys(&self) -> Result<Vec<String>, StoreError>;

    /// Writes a single value
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.apply(WriteBatch::new().set(key, value))
    }

    /// Removes a single value (no-op if absent)
    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.apply(WriteBatch::new().remove(key))
    }
}

/// Shared backends let a host keep its own handle on the store it gave away.
impl<S: KeyValueStore> KeyValueStore for Rc<RefCell<S>> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.borrow().get(key)
    }

    fn apply(&mut self, batch: WriteBatch) -> Result<(), StoreError> {
        self.borrow_mut().apply(batch)
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        self.borrow().keys()
    }
}

/// BTreeMap-backed store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-filled with `entries`
    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &BTreeMap<String, String> {
        &self.entries
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn apply(&mut self, batch: WriteBatch) -> Result<(), StoreError> {
        for op in batch.into_ops() {
            match op {
                BatchOp::Set { key, value } => {
                    self.entries.insert(key, value);
                }
                BatchOp::Remove { key } => {
                    self.entries.remove(&key);
                }
            }
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.entries.keys().cloned().collect())
    }
}
