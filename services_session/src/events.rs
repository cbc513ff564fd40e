//! Session audit trail

use core_types::TabId;
use services_storage::PersistentStore;
use std::fmt;
use tracing::warn;

/// Why a rename was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameRejection {
    /// The new name was blank after trimming
    EmptyName,
    /// The new name belongs to an open buffer (including the buffer itself)
    DuplicateName,
    /// The buffer being renamed is not open
    UnknownTab,
}

impl fmt::Display for RenameRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenameRejection::EmptyName => write!(f, "name is empty"),
            RenameRejection::DuplicateName => write!(f, "name is already in use"),
            RenameRejection::UnknownTab => write!(f, "tab is not open"),
        }
    }
}

/// Session lifecycle event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A buffer was registered
    TabOpened {
        tab_id: TabId,
        name: String,
        restored: bool,
        sequence: u64,
    },
    /// The active buffer changed (or was re-selected)
    TabSwitched {
        from: Option<TabId>,
        to: TabId,
        sequence: u64,
    },
    /// A buffer took a new name
    TabRenamed {
        tab_id: TabId,
        from: String,
        to: String,
        sequence: u64,
    },
    /// A rename was silently dropped
    RenameReverted {
        tab_id: Option<TabId>,
        attempted: String,
        reason: RenameRejection,
        sequence: u64,
    },
    /// A buffer was closed
    TabClosed {
        tab_id: TabId,
        name: String,
        sequence: u64,
    },
    /// The surface shows no document
    SurfaceDetached { sequence: u64 },
    /// Durable storage stopped accepting writes
    StorageDegraded { sequence: u64 },
}

impl SessionEvent {
    pub fn sequence(&self) -> u64 {
        match self {
            SessionEvent::TabOpened { sequence, .. }
            | SessionEvent::TabSwitched { sequence, .. }
            | SessionEvent::TabRenamed { sequence, .. }
            | SessionEvent::RenameReverted { sequence, .. }
            | SessionEvent::TabClosed { sequence, .. }
            | SessionEvent::SurfaceDetached { sequence }
            | SessionEvent::StorageDegraded { sequence } => *sequence,
        }
    }
}

/// Event list shared by the controller and its document subscriptions
#[derive(Debug, Default)]
pub(crate) struct EventLog {
    events: Vec<SessionEvent>,
    next_sequence: u64,
    degraded_reported: bool,
}

impl EventLog {
    pub(crate) fn record(&mut self, event: impl FnOnce(u64) -> SessionEvent) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.events.push(event(sequence));
    }

    /// Records `StorageDegraded` the first time `store` is seen session-only
    pub(crate) fn check_degraded(&mut self, store: &PersistentStore) {
        if self.degraded_reported || !store.is_session_only() {
            return;
        }
        self.degraded_reported = true;
        warn!("tab contents will not survive a reload until storage recovers");
        self.record(|sequence| SessionEvent::StorageDegraded { sequence });
    }

    pub(crate) fn events(&self) -> &[SessionEvent] {
        &self.events
    }
}
