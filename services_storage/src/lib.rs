//! # Storage Service
//!
//! This crate defines TabShell's persistent store adapter.
//!
//! ## Philosophy
//!
//! The durable store is a flat, string-keyed, string-valued map scoped to one
//! user. On top of that we provide:
//! - Atomic write batches, so a buffer's content record and the tab index
//!   always change together
//! - A journaled backend that recovers only committed batches
//! - A failure-injecting wrapper for quota and disabled-storage scenarios
//! - A session-only fallback that keeps the editor working when the durable
//!   store rejects writes
//!
//! ## Design
//!
//! - **KeyValueStore**: get / set / remove / apply(batch)
//! - **WriteBatch**: ordered set/remove operations applied all-or-nothing
//! - **StoreLayout**: key derivation and the JSON tab index
//! - **PersistentStore**: shared handle with fallback and warnings

pub mod batch;
pub mod failing_store;
pub mod journaled_store;
pub mod layout;
pub mod persistent;
pub mod store;

pub use batch::{BatchOp, WriteBatch};
pub use failing_store::{FailingStore, FailurePolicy};
pub use journaled_store::{BatchId, JournalEntry, JournalRecord, JournaledStore};
pub use layout::{LayoutError, StoreLayout};
pub use persistent::{Durability, PersistentStore, StoreOperation, StoreWarning};
pub use store::{KeyValueStore, MemoryStore, StoreError};
