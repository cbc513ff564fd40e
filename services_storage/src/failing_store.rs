//! # Failing Store
//!
//! A KeyValueStore wrapper that can simulate failures for testing the
//! fallback paths (quota exceeded, storage disabled) without a real browser.

use crate::{KeyValueStore, StoreError, WriteBatch};

/// Policy for when failures should occur
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Never fail (passthrough)
    Never,
    /// Accept N batches, then reject every write
    AfterWrites(usize),
    /// Reject any batch touching one of these keys
    OnKeys(Vec<String>),
    /// Storage disabled: every read and write fails
    Unavailable,
}

/// Wrapper around a store that can simulate failures
#[derive(Debug)]
pub struct FailingStore<S: KeyValueStore> {
    inner: S,
    policy: FailurePolicy,
    write_count: usize,
}

impl<S: KeyValueStore> FailingStore<S> {
    /// Create a new failing store with the given policy
    pub fn new(inner: S, policy: FailurePolicy) -> Self {
        Self {
            inner,
            policy,
            write_count: 0,
        }
    }

    /// Get the underlying store (for inspection)
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Number of batches that went through
    pub fn write_count(&self) -> usize {
        self.write_count
    }

    /// Reset the failure policy
    pub fn set_policy(&mut self, policy: FailurePolicy) {
        self.policy = policy;
        self.write_count = 0;
    }

    fn write_error(&self, batch: &WriteBatch) -> Option<StoreError> {
        let first_key = || {
            batch
                .ops()
                .first()
                .map(|op| op.key().to_string())
                .unwrap_or_default()
        };
        match &self.policy {
            FailurePolicy::Never => None,
            FailurePolicy::AfterWrites(n) if self.write_count >= *n => {
                Some(StoreError::QuotaExceeded { key: first_key() })
            }
            FailurePolicy::AfterWrites(_) => None,
            FailurePolicy::OnKeys(keys) => keys
                .iter()
                .find(|key| batch.touches(key))
                .map(|key| StoreError::QuotaExceeded { key: key.clone() }),
            FailurePolicy::Unavailable => {
                Some(StoreError::Unavailable("storage disabled".to_string()))
            }
        }
    }
}

impl<S: KeyValueStore> KeyValueStore for FailingStore<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        if self.policy == FailurePolicy::Unavailable {
            return Err(StoreError::Unavailable("storage disabled".to_string()));
        }
        self.inner.get(key)
    }

    fn apply(&mut self, batch: WriteBatch) -> Result<(), StoreError> {
        if let Some(err) = self.write_error(&batch) {
            return Err(err);
        }
        self.write_count += 1;
        self.inner.apply(batch)
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        if self.policy == FailurePolicy::Unavailable {
            return Err(StoreError::Unavailable("storage disabled".to_string()));
        }
        self.inner.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;

    #[test]
    fn test_never_passes_through() {
        let mut store = FailingStore::new(MemoryStore::new(), FailurePolicy::Never);
        store.set("a", "1").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
        assert_eq!(store.write_count(), 1);
    }

    #[test]
    fn test_after_writes() {
        let mut store = FailingStore::new(MemoryStore::new(), FailurePolicy::AfterWrites(2));
        store.set("a", "1").unwrap();
        store.set("b", "2").unwrap();
        assert_eq!(
            store.set("c", "3"),
            Err(StoreError::QuotaExceeded { key: "c".to_string() })
        );
        assert_eq!(store.inner().len(), 2);
    }

    #[test]
    fn test_rejected_batch_is_not_partially_applied() {
        let mut store = FailingStore::new(
            MemoryStore::new(),
            FailurePolicy::OnKeys(vec!["tabList".to_string()]),
        );
        let batch = WriteBatch::new().set("tab:a", "x").set("tabList", "[\"a\"]");
        assert!(store.apply(batch).is_err());
        assert!(store.inner().is_empty());
    }

    #[test]
    fn test_unavailable_fails_reads() {
        let store = FailingStore::new(MemoryStore::new(), FailurePolicy::Unavailable);
        assert!(store.get("a").is_err());
        assert!(store.keys().is_err());
    }

    #[test]
    fn test_set_policy_resets_count() {
        let mut store = FailingStore::new(MemoryStore::new(), FailurePolicy::AfterWrites(0));
        assert!(store.set("a", "1").is_err());
        store.set_policy(FailurePolicy::Never);
        store.set("a", "1").unwrap();
        assert_eq!(store.write_count(), 1);
    }
}
