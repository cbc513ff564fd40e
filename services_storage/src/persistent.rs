//! Shared persistence handle with session-only fallback
//!
//! The controller and every document subscription write through one
//! [`PersistentStore`]. When the durable backend rejects a write the handle
//! switches to session-only mode: that write and every later one go to an
//! in-memory overlay, reads consult the overlay first, and a
//! [`StoreWarning`] is recorded for the host to surface.

use crate::{BatchOp, KeyValueStore, StoreError, WriteBatch};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::rc::Rc;
use tracing::warn;

/// Which kind of access produced a warning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOperation {
    Read,
    Write,
}

/// A storage problem that was absorbed instead of propagated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreWarning {
    pub operation: StoreOperation,
    pub key: Option<String>,
    pub error: StoreError,
}

impl fmt::Display for StoreWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self.operation {
            StoreOperation::Read => "read",
            StoreOperation::Write => "write",
        };
        match &self.key {
            Some(key) => write!(f, "{} of {} failed: {}", op, key, self.error),
            None => write!(f, "{} failed: {}", op, self.error),
        }
    }
}

/// Where a write ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Durability {
    /// Accepted by the durable backend
    Durable,
    /// Held in memory only; lost on reload
    SessionOnly,
}

struct PersistentState {
    backend: Box<dyn KeyValueStore>,
    /// `None` while durable; `Some` once a write has failed. A `None` value
    /// inside the overlay is a tombstone.
    overlay: Option<BTreeMap<String, Option<String>>>,
    warnings: Vec<StoreWarning>,
}

impl PersistentState {
    fn warn(&mut self, operation: StoreOperation, key: Option<String>, error: StoreError) {
        warn!(?operation, key = key.as_deref(), %error, "storage problem absorbed");
        self.warnings.push(StoreWarning {
            operation,
            key,
            error,
        });
    }

    fn write_overlay(overlay: &mut BTreeMap<String, Option<String>>, batch: WriteBatch) {
        for op in batch.into_ops() {
            match op {
                BatchOp::Set { key, value } => {
                    overlay.insert(key, Some(value));
                }
                BatchOp::Remove { key } => {
                    overlay.insert(key, None);
                }
            }
        }
    }
}

/// Cloneable handle to the session's durable store
#[derive(Clone)]
pub struct PersistentStore {
    state: Rc<RefCell<PersistentState>>,
}

impl PersistentStore {
    pub fn new(backend: impl KeyValueStore + 'static) -> Self {
        Self {
            state: Rc::new(RefCell::new(PersistentState {
                backend: Box::new(backend),
                overlay: None,
                warnings: Vec::new(),
            })),
        }
    }

    /// Reads `key`; a failing read is reported as a warning and yields `None`
    pub fn get(&self, key: &str) -> Option<String> {
        let mut state = self.state.borrow_mut();
        if let Some(entry) = state.overlay.as_ref().and_then(|o| o.get(key)) {
            return entry.clone();
        }
        let result = state.backend.get(key);
        match result {
            Ok(value) => value,
            Err(err) => {
                state.warn(StoreOperation::Read, Some(key.to_string()), err);
                None
            }
        }
    }

    pub fn set(&self, key: &str, value: &str) -> Durability {
        self.apply(WriteBatch::new().set(key, value))
    }

    pub fn remove(&self, key: &str) -> Durability {
        self.apply(WriteBatch::new().remove(key))
    }

    /// Applies `batch` durably if possible, otherwise to the session overlay
    pub fn apply(&self, batch: WriteBatch) -> Durability {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;

        if let Some(overlay) = state.overlay.as_mut() {
            PersistentState::write_overlay(overlay, batch);
            return Durability::SessionOnly;
        }

        match state.backend.apply(batch.clone()) {
            Ok(()) => Durability::Durable,
            Err(err) => {
                let key = batch.ops().first().map(|op| op.key().to_string());
                state.warn(StoreOperation::Write, key, err);
                warn!("durable storage rejected a write; continuing with session-only persistence");
                let mut overlay = BTreeMap::new();
                PersistentState::write_overlay(&mut overlay, batch);
                state.overlay = Some(overlay);
                Durability::SessionOnly
            }
        }
    }

    /// Every key visible through this handle
    pub fn keys(&self) -> Vec<String> {
        let mut state = self.state.borrow_mut();
        let result = state.backend.keys();
        let mut keys: BTreeSet<String> = match result {
            Ok(keys) => keys.into_iter().collect(),
            Err(err) => {
                state.warn(StoreOperation::Read, None, err);
                BTreeSet::new()
            }
        };
        if let Some(overlay) = &state.overlay {
            for (key, value) in overlay {
                if value.is_some() {
                    keys.insert(key.clone());
                } else {
                    keys.remove(key);
                }
            }
        }
        keys.into_iter().collect()
    }

    /// True once a write has been diverted to memory
    pub fn is_session_only(&self) -> bool {
        self.state.borrow().overlay.is_some()
    }

    pub fn warnings(&self) -> Vec<StoreWarning> {
        self.state.borrow().warnings.clone()
    }

    pub fn warning_count(&self) -> usize {
        self.state.borrow().warnings.len()
    }

    /// Records a problem found by a caller (e.g. a corrupt index)
    pub fn report(&self, operation: StoreOperation, key: Option<String>, error: StoreError) {
        self.state.borrow_mut().warn(operation, key, error);
    }
}

impl fmt::Debug for PersistentStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("PersistentStore")
            .field("session_only", &state.overlay.is_some())
            .field("warnings", &state.warnings.len())
            .finish()
    }
}
