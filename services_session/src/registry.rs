//! Buffer registry
//!
//! Ordered map from buffer name to its live document. Order is the tab
//! display order and is also the order written to the persisted index.
//! Name uniqueness is checked by the controller before `create`; the
//! registry only refuses to break it.

use core_types::{BufferName, TabId};
use editor_core::{DocumentHandle, SubscriptionId};

/// One registered buffer
#[derive(Debug, Clone)]
pub struct BufferEntry {
    pub id: TabId,
    pub name: BufferName,
    pub document: DocumentHandle,
    /// Persistence subscription on `document`, if wired
    pub subscription: Option<SubscriptionId>,
}

#[derive(Debug, Default)]
pub struct BufferRegistry {
    entries: Vec<BufferEntry>,
}

impl BufferRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a buffer; returns `None` if `name` is already registered
    pub fn create(&mut self, name: BufferName, document: DocumentHandle) -> Option<TabId> {
        if self.contains(name.as_str()) {
            return None;
        }
        let id = TabId::new();
        self.entries.push(BufferEntry {
            id,
            name,
            document,
            subscription: None,
        });
        Some(id)
    }

    pub fn get(&self, name: &str) -> Option<&BufferEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn get_by_id(&self, id: TabId) -> Option<&BufferEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn get_by_id_mut(&mut self, id: TabId) -> Option<&mut BufferEntry> {
        self.entries.iter_mut().find(|e| e.id == id)
    }

    /// Entry at a display position
    pub fn at(&self, index: usize) -> Option<&BufferEntry> {
        self.entries.get(index)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Moves `old` to `new` in place; the entry keeps its id, document and
    /// display position. Fails if `old` is missing or `new` is taken.
    pub fn rename(&mut self, old: &str, new: BufferName) -> bool {
        if self.contains(new.as_str()) {
            return false;
        }
        match self.entries.iter_mut().find(|e| e.name == old) {
            Some(entry) => {
                entry.name = new;
                true
            }
            None => false,
        }
    }

    /// Removes a buffer, returning its former display position
    pub fn remove(&mut self, name: &str) -> Option<(usize, BufferEntry)> {
        let index = self.position(name)?;
        Some((index, self.entries.remove(index)))
    }

    /// Names in display order
    pub fn names(&self) -> impl Iterator<Item = &BufferName> {
        self.entries.iter().map(|e| &e.name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BufferEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
