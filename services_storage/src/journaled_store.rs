//! Journaled store with crash-consistent recovery.

use crate::{BatchOp, KeyValueStore, StoreError, WriteBatch};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

/// Sequence number of a committed batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BatchId(u64);

impl BatchId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JournalRecord {
    Write { batch_id: BatchId, op: BatchOp },
    Commit { batch_id: BatchId },
}

impl JournalRecord {
    fn batch_id(&self) -> BatchId {
        match self {
            JournalRecord::Write { batch_id, .. } | JournalRecord::Commit { batch_id } => *batch_id,
        }
    }
}

/// Journal record with its CRC32 checksum
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub record: JournalRecord,
    pub checksum: u32,
}

impl JournalEntry {
    fn new(record: JournalRecord) -> Self {
        let checksum = compute_checksum(&record);
        Self { record, checksum }
    }

    fn is_valid(&self) -> bool {
        compute_checksum(&self.record) == self.checksum
    }
}

fn compute_checksum(record: &JournalRecord) -> u32 {
    let data = serde_json::to_vec(record).unwrap_or_default();
    crc32fast::hash(&data)
}

/// In-memory journaled backend.
///
/// Every batch is appended as its write records followed by one commit
/// record. [`JournaledStore::from_journal`] rebuilds the map from committed
/// batches whose every entry passes its checksum, so a journal cut short or
/// damaged mid-batch recovers to the state before that batch.
#[derive(Debug, Clone, Default)]
pub struct JournaledStore {
    entries: BTreeMap<String, String>,
    journal: Vec<JournalEntry>,
    next_batch: u64,
}

impl JournaledStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the journal entries (for testing).
    pub fn journal_entries(&self) -> &[JournalEntry] {
        &self.journal
    }

    /// Returns a clone of the journal entries.
    pub fn journal_clone(&self) -> Vec<JournalEntry> {
        self.journal.clone()
    }

    /// Reconstructs storage state from a journal snapshot.
    ///
    /// This simulates a page reload where the journal was the only thing
    /// that survived.
    pub fn from_journal(entries: Vec<JournalEntry>) -> Self {
        let mut store = Self {
            entries: BTreeMap::new(),
            journal: entries,
            next_batch: 0,
        };
        store.recover();
        store
    }

    /// Serializes the journal for a host to keep on durable media
    pub fn to_json(&self) -> Result<String, StoreError> {
        serde_json::to_string_pretty(&self.journal)
            .map_err(|e| StoreError::Corrupt(e.to_string()))
    }

    /// Rebuilds a store from [`JournaledStore::to_json`] output
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        let entries: Vec<JournalEntry> =
            serde_json::from_str(json).map_err(|e| StoreError::Corrupt(e.to_string()))?;
        Ok(Self::from_journal(entries))
    }

    /// Replays committed batches from the journal.
    pub fn recover(&mut self) {
        let mut committed = Vec::new();
        let mut seen = BTreeSet::new();
        let mut corrupt = BTreeSet::new();
        let mut writes: BTreeMap<BatchId, Vec<BatchOp>> = BTreeMap::new();
        let mut max_batch = None;

        for entry in &self.journal {
            if !entry.is_valid() {
                let batch_id = entry.record.batch_id();
                warn!(batch = batch_id.as_u64(), "discarding batch with corrupt journal entry");
                corrupt.insert(batch_id);
                continue;
            }
            let batch_id = entry.record.batch_id();
            max_batch = max_batch.max(Some(batch_id.as_u64()));
            match &entry.record {
                JournalRecord::Write { op, .. } => {
                    writes.entry(batch_id).or_default().push(op.clone());
                }
                JournalRecord::Commit { .. } => {
                    if seen.insert(batch_id) {
                        committed.push(batch_id);
                    }
                }
            }
        }

        self.entries.clear();
        for batch_id in committed {
            if corrupt.contains(&batch_id) {
                continue;
            }
            if let Some(ops) = writes.remove(&batch_id) {
                Self::apply_ops(&mut self.entries, ops);
            }
        }
        self.next_batch = max_batch.map_or(0, |id| id + 1);
    }

    /// Replaces the journal with a single batch holding the current state
    pub fn compact(&mut self) {
        let batch_id = BatchId(0);
        let mut journal: Vec<JournalEntry> = self
            .entries
            .iter()
            .map(|(key, value)| {
                JournalEntry::new(JournalRecord::Write {
                    batch_id,
                    op: BatchOp::Set {
                        key: key.clone(),
                        value: value.clone(),
                    },
                })
            })
            .collect();
        journal.push(JournalEntry::new(JournalRecord::Commit { batch_id }));
        self.journal = journal;
        self.next_batch = 1;
    }

    fn apply_ops(entries: &mut BTreeMap<String, String>, ops: Vec<BatchOp>) {
        for op in ops {
            match op {
                BatchOp::Set { key, value } => {
                    entries.insert(key, value);
                }
                BatchOp::Remove { key } => {
                    entries.remove(&key);
                }
            }
        }
    }
}

impl KeyValueStore for JournaledStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn apply(&mut self, batch: WriteBatch) -> Result<(), StoreError> {
        if batch.is_empty() {
            return Ok(());
        }
        let batch_id = BatchId(self.next_batch);
        self.next_batch += 1;

        let ops = batch.into_ops();
        for op in &ops {
            self.journal.push(JournalEntry::new(JournalRecord::Write {
                batch_id,
                op: op.clone(),
            }));
        }
        self.journal
            .push(JournalEntry::new(JournalRecord::Commit { batch_id }));

        Self::apply_ops(&mut self.entries, ops);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.entries.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_appends_writes_then_commit() {
        let mut store = JournaledStore::new();
        store
            .apply(WriteBatch::new().set("tab:a", "x").set("tabList", "[\"a\"]"))
            .unwrap();

        let journal = store.journal_entries();
        assert_eq!(journal.len(), 3);
        assert!(matches!(journal[2].record, JournalRecord::Commit { .. }));
    }

    #[test]
    fn test_recovery_replays_committed_batches() {
        let mut store = JournaledStore::new();
        store.set("tab:a", "one").unwrap();
        store.set("tab:a", "two").unwrap();
        store.remove("missing").unwrap();

        let recovered = JournaledStore::from_journal(store.journal_clone());
        assert_eq!(recovered.get("tab:a").unwrap().as_deref(), Some("two"));
    }

    #[test]
    fn test_recovery_drops_uncommitted_tail() {
        let mut store = JournaledStore::new();
        store.set("tabList", "[\"a\"]").unwrap();
        store
            .apply(
                WriteBatch::new()
                    .set("tab:b", "orphan?")
                    .set("tabList", "[\"a\",\"b\"]"),
            )
            .unwrap();

        // Cut the journal after the first write of the second batch.
        let mut journal = store.journal_clone();
        journal.truncate(3);

        let recovered = JournaledStore::from_journal(journal);
        assert_eq!(recovered.get("tab:b").unwrap(), None);
        assert_eq!(recovered.get("tabList").unwrap().as_deref(), Some("[\"a\"]"));
    }

    #[test]
    fn test_recovery_skips_corrupt_entries() {
        let mut store = JournaledStore::new();
        store.set("k", "good").unwrap();
        store.set("k", "bad").unwrap();

        let mut journal = store.journal_clone();
        journal[2].checksum ^= 0xFFFF_FFFF;

        let recovered = JournaledStore::from_journal(journal);
        assert_eq!(recovered.get("k").unwrap().as_deref(), Some("good"));
    }

    #[test]
    fn test_recovery_discards_batch_with_corrupt_write() {
        let mut store = JournaledStore::new();
        store.set("tabList", r#"["a"]"#).unwrap();
        store
            .apply(
                WriteBatch::new()
                    .set("tab:b", "b")
                    .set("tabList", r#"["a","b"]"#),
            )
            .unwrap();

        // 0 write, 1 commit, 2 write tab:b, 3 write tabList, 4 commit
        let mut journal = store.journal_clone();
        journal[2].checksum ^= 0xFFFF_FFFF;

        let recovered = JournaledStore::from_journal(journal);
        assert_eq!(recovered.get("tab:b").unwrap(), None);
        assert_eq!(recovered.get("tabList").unwrap().as_deref(), Some(r#"["a"]"#));
    }

    #[test]
    fn test_batch_ids_continue_after_recovery() {
        let mut store = JournaledStore::new();
        store.set("a", "1").unwrap();
        let mut recovered = JournaledStore::from_journal(store.journal_clone());
        recovered.set("b", "2").unwrap();

        let last = recovered.journal_entries().last().unwrap();
        assert_eq!(last.record, JournalRecord::Commit { batch_id: BatchId(1) });
    }

    #[test]
    fn test_json_round_trip() {
        let mut store = JournaledStore::new();
        store.set("tab:main.lua", "--[[\n]]").unwrap();

        let json = store.to_json().unwrap();
        let restored = JournaledStore::from_json(&json).unwrap();
        assert_eq!(restored.get("tab:main.lua").unwrap().as_deref(), Some("--[[\n]]"));
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(
            JournaledStore::from_json("{ not a journal"),
            Err(StoreError::Corrupt(_))
        ));
    }

    #[test]
    fn test_compact_keeps_state() {
        let mut store = JournaledStore::new();
        for i in 0..5 {
            store.set("k", &i.to_string()).unwrap();
        }
        store.set("other", "x").unwrap();
        store.compact();

        assert_eq!(store.journal_entries().len(), 3);
        let recovered = JournaledStore::from_journal(store.journal_clone());
        assert_eq!(recovered.get("k").unwrap().as_deref(), Some("4"));
        assert_eq!(recovered.get("other").unwrap().as_deref(), Some("x"));
    }
}
