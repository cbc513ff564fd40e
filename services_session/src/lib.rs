//! # Session Service
//!
//! This crate implements the tab/session manager of the shell.
//!
//! ## Philosophy
//!
//! - **One owned session**: the controller is constructed at startup and
//!   passed around explicitly; there is no global state
//! - **Identity is stable**: tabs are tracked by [`TabId`], names are labels
//! - **Silent where the user expects silence**: renames to a taken or blank
//!   name and switches to unknown tabs are no-ops with a typed outcome
//! - **Paired writes**: content records and the tab index change in one batch
//!
//! ## Invariants
//!
//! - Buffer names are pairwise distinct (case-sensitive)
//! - The active tab, if any, is registered; no tabs means no active tab
//! - Every name in the persisted index has a content record

pub mod commands;
pub mod events;
pub mod registry;

pub use events::{RenameRejection, SessionEvent};

use events::EventLog;
pub use registry::{BufferEntry, BufferRegistry};

use core_types::{BufferName, NameError, TabId};
use editor_core::{DocumentHandle, EditingSurface, HeadlessSurface, SubscriptionId};
use services_settings::SessionConfig;
use services_storage::{PersistentStore, StoreError, StoreOperation, StoreWarning, WriteBatch};
use std::cell::RefCell;
use std::rc::Rc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Session controller errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Invalid buffer name: {0}")]
    InvalidName(#[from] NameError),

    #[error("Buffer already open: {0}")]
    DuplicateName(BufferName),

    #[error("Tab not found: {0}")]
    TabNotFound(String),

    #[error("Invalid command: {0}")]
    InvalidCommand(String),
}

/// Result of a rename request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameOutcome {
    Renamed {
        tab_id: TabId,
        from: BufferName,
        to: BufferName,
    },
    /// Nothing changed; the view should show the old name again
    Reverted(RenameRejection),
}

impl RenameOutcome {
    pub fn is_renamed(&self) -> bool {
        matches!(self, RenameOutcome::Renamed { .. })
    }
}

/// Display summary of one tab
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabSummary {
    pub id: TabId,
    pub name: BufferName,
    pub active: bool,
}

/// Session controller
///
/// Owns the buffer registry, the shared editing surface and the persistence
/// handle, and keeps all three consistent.
pub struct SessionController<S: EditingSurface = HeadlessSurface> {
    registry: BufferRegistry,
    store: PersistentStore,
    surface: S,
    config: SessionConfig,
    current: Option<TabId>,
    /// Shared with document subscriptions so edit-driven writes can report
    log: Rc<RefCell<EventLog>>,
}

impl<S: EditingSurface> SessionController<S> {
    /// Creates an empty session (nothing loaded from the store)
    pub fn new(store: PersistentStore, surface: S, config: SessionConfig) -> Self {
        Self {
            registry: BufferRegistry::new(),
            store,
            surface,
            config,
            current: None,
            log: Rc::new(RefCell::new(EventLog::default())),
        }
    }

    /// Creates a session and replays the persisted tab index
    ///
    /// With no saved tabs a single default buffer is created. Otherwise
    /// every saved name is reopened in order and the last active tab, if
    /// still present, is selected.
    pub fn restore(
        store: PersistentStore,
        surface: S,
        config: SessionConfig,
    ) -> Result<Self, SessionError> {
        let mut session = Self::new(store, surface, config);

        let layout = session.config.layout.clone();
        // Read before replaying: every open below rewrites the pointer.
        let last_active = session.store.get(layout.active_key());
        let saved = match session.store.get(layout.index_key()) {
            None => Vec::new(),
            Some(raw) => match layout.decode_index(&raw) {
                Ok(names) => names,
                Err(err) => {
                    session.store.report(
                        StoreOperation::Read,
                        Some(layout.index_key().to_string()),
                        StoreError::Corrupt(err.to_string()),
                    );
                    Vec::new()
                }
            },
        };

        let mut opened = 0usize;
        for name in &saved {
            match session.open_or_restore(name, "") {
                Ok(_) => opened += 1,
                Err(err) => warn!(tab = %name, %err, "skipping entry of saved tab index"),
            }
        }

        if opened == 0 {
            let name = session.config.default_name.clone();
            let body = session.config.default_body.clone();
            session.open_or_restore(&name, &body)?;
        } else if let Some(last) = last_active {
            if !session.switch_to(&last) {
                debug!(tab = %last, "saved active tab no longer exists");
            }
        }

        info!(tabs = session.registry.len(), "session restored");
        Ok(session)
    }

    /// Opens a new empty buffer under the first free `new.lua`, `new1.lua`, ...
    pub fn new_tab(&mut self) -> Result<TabId, SessionError> {
        let mut attempt = 0;
        let name = loop {
            let candidate = self.config.candidate_name(attempt);
            if !self.registry.contains(candidate.trim()) {
                break candidate;
            }
            attempt += 1;
        };
        self.open_or_restore(&name, "")
    }

    /// Registers a buffer and makes it active
    ///
    /// Content comes from the store when a record exists for `name`,
    /// otherwise from `default_content`.
    pub fn open_or_restore(
        &mut self,
        name: &str,
        default_content: &str,
    ) -> Result<TabId, SessionError> {
        let name = BufferName::parse(name)?;
        if self.registry.contains(name.as_str()) {
            return Err(SessionError::DuplicateName(name));
        }

        let key = self.config.layout.content_key(name.as_str());
        let saved = self.store.get(&key);
        let restored = saved.is_some();
        let content = saved.unwrap_or_else(|| default_content.to_string());

        let document = DocumentHandle::new(content.clone());
        let tab_id = self
            .registry
            .create(name.clone(), document.clone())
            .ok_or_else(|| SessionError::DuplicateName(name.clone()))?;
        let subscription = self.subscribe_persistence(&document, &name);
        if let Some(entry) = self.registry.get_by_id_mut(tab_id) {
            entry.subscription = Some(subscription);
        }

        let mut batch = WriteBatch::new();
        if !restored {
            batch.push_set(key, content);
        }
        batch.push_set(self.config.layout.index_key(), self.encoded_index());
        self.persist(batch);

        info!(tab = %name, restored, "opened tab");
        self.log.borrow_mut().record(|sequence| SessionEvent::TabOpened {
            tab_id,
            name: name.into_string(),
            restored,
            sequence,
        });

        self.activate(tab_id);
        Ok(tab_id)
    }

    /// Makes `name` the active buffer; unknown names are ignored
    pub fn switch_to(&mut self, name: &str) -> bool {
        match self.registry.get(name) {
            Some(entry) => {
                let tab_id = entry.id;
                self.activate(tab_id);
                true
            }
            None => {
                debug!(tab = name, "switch to unknown tab ignored");
                false
            }
        }
    }

    /// Switches by stable id
    pub fn switch_to_id(&mut self, tab_id: TabId) -> bool {
        if self.registry.get_by_id(tab_id).is_none() {
            return false;
        }
        self.activate(tab_id);
        true
    }

    /// Renames a buffer, keeping its document and position
    ///
    /// `new_name` is trimmed. A blank or taken name (the buffer's own name
    /// included) leaves everything unchanged.
    pub fn rename(&mut self, old_name: &str, new_name: &str) -> RenameOutcome {
        let Some(tab_id) = self.registry.get(old_name).map(|e| e.id) else {
            return self.revert_rename(None, new_name, RenameRejection::UnknownTab);
        };
        let new = match BufferName::parse(new_name) {
            Ok(new) => new,
            Err(_) => {
                return self.revert_rename(Some(tab_id), new_name, RenameRejection::EmptyName)
            }
        };
        if self.registry.contains(new.as_str()) {
            return self.revert_rename(Some(tab_id), new_name, RenameRejection::DuplicateName);
        }

        let Some(entry) = self.registry.get_by_id_mut(tab_id) else {
            return self.revert_rename(None, new_name, RenameRejection::UnknownTab);
        };
        let old = entry.name.clone();
        let document = entry.document.clone();
        if let Some(subscription) = entry.subscription.take() {
            document.unsubscribe(subscription);
        }

        self.registry.rename(old.as_str(), new.clone());
        let subscription = self.subscribe_persistence(&document, &new);
        if let Some(entry) = self.registry.get_by_id_mut(tab_id) {
            entry.subscription = Some(subscription);
        }

        let layout = &self.config.layout;
        let mut batch = WriteBatch::new()
            .set(layout.content_key(new.as_str()), document.value())
            .remove(layout.content_key(old.as_str()))
            .set(layout.index_key(), self.encoded_index());
        if self.current == Some(tab_id) {
            batch.push_set(layout.active_key(), new.as_str());
        }
        self.persist(batch);

        info!(from = %old, to = %new, "renamed tab");
        self.log.borrow_mut().record(|sequence| SessionEvent::TabRenamed {
            tab_id,
            from: old.to_string(),
            to: new.to_string(),
            sequence,
        });

        RenameOutcome::Renamed {
            tab_id,
            from: old,
            to: new,
        }
    }

    /// Closes a buffer and drops its content record
    ///
    /// If it was active, the replacement is chosen by the configured
    /// [`ClosePolicy`](services_settings::ClosePolicy); closing the last tab
    /// leaves the surface empty.
    pub fn close(&mut self, name: &str) -> bool {
        let Some((index, entry)) = self.registry.remove(name) else {
            debug!(tab = name, "close of unknown tab ignored");
            return false;
        };
        if let Some(subscription) = entry.subscription {
            entry.document.unsubscribe(subscription);
        }

        let was_active = self.current == Some(entry.id);
        let replacement = if was_active {
            self.current = None;
            self.config
                .close_policy
                .select(index, self.registry.len())
                .and_then(|i| self.registry.at(i))
                .map(|e| e.id)
        } else {
            None
        };

        let layout = &self.config.layout;
        let mut batch = WriteBatch::new()
            .remove(layout.content_key(entry.name.as_str()))
            .set(layout.index_key(), self.encoded_index());
        if was_active && replacement.is_none() {
            batch.push_remove(layout.active_key());
        }
        self.persist(batch);

        info!(tab = %entry.name, "closed tab");
        self.log.borrow_mut().record(|sequence| SessionEvent::TabClosed {
            tab_id: entry.id,
            name: entry.name.into_string(),
            sequence,
        });

        if was_active {
            match replacement {
                Some(tab_id) => self.activate(tab_id),
                None => {
                    self.surface.set_active_document(None);
                    self.log
                        .borrow_mut()
                        .record(|sequence| SessionEvent::SurfaceDetached { sequence });
                }
            }
        }
        true
    }

    /// Closes by stable id
    pub fn close_id(&mut self, tab_id: TabId) -> bool {
        match self.registry.get_by_id(tab_id) {
            Some(entry) => {
                let name = entry.name.clone();
                self.close(name.as_str())
            }
            None => false,
        }
    }

    /// Name of the active buffer
    pub fn current(&self) -> Option<&BufferName> {
        self.current
            .and_then(|id| self.registry.get_by_id(id))
            .map(|e| &e.name)
    }

    pub fn current_id(&self) -> Option<TabId> {
        self.current
    }

    /// Names in display order
    pub fn tab_names(&self) -> Vec<&str> {
        self.registry.names().map(BufferName::as_str).collect()
    }

    pub fn tabs(&self) -> Vec<TabSummary> {
        self.registry
            .iter()
            .map(|e| TabSummary {
                id: e.id,
                name: e.name.clone(),
                active: self.current == Some(e.id),
            })
            .collect()
    }

    pub fn tab_id(&self, name: &str) -> Option<TabId> {
        self.registry.get(name).map(|e| e.id)
    }

    pub fn name_of(&self, tab_id: TabId) -> Option<&BufferName> {
        self.registry.get_by_id(tab_id).map(|e| &e.name)
    }

    pub fn document(&self, name: &str) -> Option<&DocumentHandle> {
        self.registry.get(name).map(|e| &e.document)
    }

    /// Document of the active buffer
    pub fn active_document(&self) -> Option<&DocumentHandle> {
        self.current
            .and_then(|id| self.registry.get_by_id(id))
            .map(|e| &e.document)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.registry.contains(name)
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn store(&self) -> &PersistentStore {
        &self.store
    }

    /// Storage problems absorbed so far
    pub fn warnings(&self) -> Vec<StoreWarning> {
        self.store.warnings()
    }

    /// True once persistence fell back to memory
    pub fn is_session_only(&self) -> bool {
        self.store.is_session_only()
    }

    /// Audit trail of session events
    pub fn events(&self) -> Vec<SessionEvent> {
        self.log.borrow().events().to_vec()
    }

    fn activate(&mut self, tab_id: TabId) {
        let Some(entry) = self.registry.get_by_id(tab_id) else {
            return;
        };
        let name = entry.name.clone();
        let document = entry.document.clone();

        let previous = self.current.replace(tab_id);
        self.persist(WriteBatch::new().set(self.config.layout.active_key(), name.as_str()));
        self.surface.set_active_document(Some(document));

        debug!(tab = %name, "switched tab");
        self.log.borrow_mut().record(|sequence| SessionEvent::TabSwitched {
            from: previous,
            to: tab_id,
            sequence,
        });
    }

    fn revert_rename(
        &mut self,
        tab_id: Option<TabId>,
        attempted: &str,
        reason: RenameRejection,
    ) -> RenameOutcome {
        debug!(attempted, %reason, "rename reverted");
        self.log.borrow_mut().record(|sequence| SessionEvent::RenameReverted {
            tab_id,
            attempted: attempted.to_string(),
            reason,
            sequence,
        });
        RenameOutcome::Reverted(reason)
    }

    fn subscribe_persistence(&self, document: &DocumentHandle, name: &BufferName) -> SubscriptionId {
        let store = self.store.clone();
        let log = Rc::clone(&self.log);
        let key = self.config.layout.content_key(name.as_str());
        document.subscribe(move |change| {
            store.set(&key, change.value);
            log.borrow_mut().check_degraded(&store);
        })
    }

    fn encoded_index(&self) -> String {
        self.config
            .layout
            .encode_index(self.registry.names().map(BufferName::as_str))
    }

    fn persist(&mut self, batch: WriteBatch) {
        self.store.apply(batch);
        self.log.borrow_mut().check_degraded(&self.store);
    }
}
