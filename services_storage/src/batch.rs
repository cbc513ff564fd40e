//! Write batches for atomic storage updates

use serde::{Deserialize, Serialize};

/// A single operation inside a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchOp {
    /// Store `value` under `key`
    Set { key: String, value: String },
    /// Delete `key`
    Remove { key: String },
}

impl BatchOp {
    /// Key touched by this operation
    pub fn key(&self) -> &str {
        match self {
            BatchOp::Set { key, .. } | BatchOp::Remove { key } => key,
        }
    }
}

/// An ordered group of operations that lands all at once
///
/// Later operations on the same key win, as if applied one by one.
///
/// ## Example
///
/// ```
/// use services_storage::WriteBatch;
///
/// let batch = WriteBatch::new()
///     .set("tab:new.lua", "")
///     .set("tabList", "[\"new.lua\"]");
/// assert_eq!(batch.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteBatch {
    ops: Vec<BatchOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a set operation (builder form)
    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.push_set(key, value);
        self
    }

    /// Adds a remove operation (builder form)
    pub fn remove(mut self, key: impl Into<String>) -> Self {
        self.push_remove(key);
        self
    }

    pub fn push_set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.ops.push(BatchOp::Set {
            key: key.into(),
            value: value.into(),
        });
    }

    pub fn push_remove(&mut self, key: impl Into<String>) {
        self.ops.push(BatchOp::Remove { key: key.into() });
    }

    pub fn ops(&self) -> &[BatchOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<BatchOp> {
        self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// True if any operation touches `key`
    pub fn touches(&self, key: &str) -> bool {
        self.ops.iter().any(|op| op.key() == key)
    }
}

impl From<Vec<BatchOp>> for WriteBatch {
    fn from(ops: Vec<BatchOp>) -> Self {
        Self { ops }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_keeps_order() {
        let batch = WriteBatch::new().set("a", "1").remove("b").set("c", "3");
        let keys: Vec<&str> = batch.ops().iter().map(BatchOp::key).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_touches() {
        let batch = WriteBatch::new().remove("tab:old");
        assert!(batch.touches("tab:old"));
        assert!(!batch.touches("tab:new"));
    }

    #[test]
    fn test_empty_batch() {
        let batch = WriteBatch::new();
        assert!(batch.is_empty());
        assert_eq!(batch.len(), 0);
    }
}
