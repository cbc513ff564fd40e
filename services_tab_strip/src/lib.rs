//! # Tab Strip View
//!
//! One visual element per open buffer, in display order.
//!
//! ## Philosophy
//!
//! - **Keyed by identity**: elements carry the [`TabId`] they were created
//!   for; the title text is display only
//! - **Forward, don't decide**: every gesture becomes one controller call
//! - **Explicit micro-state**: a tab is either displaying its title or
//!   editing it, and leaving the input always returns to display
//!
//! ## Example
//!
//! ```ignore
//! let mut strip = TabStripView::from_session(&session);
//! strip.handle(&mut session, Gesture::DoubleClick(tab))?;
//! strip.handle(&mut session, Gesture::Input { tab, text: "init.lua".into() })?;
//! strip.handle(&mut session, Gesture::Blur(tab))?;
//! println!("{}", strip.render());
//! ```

mod render;

use core_types::TabId;
use editor_core::EditingSurface;
use services_session::{RenameOutcome, RenameRejection, SessionController, SessionError};
use tracing::debug;

/// Display state of one tab
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabMode {
    /// Showing the title
    Display,
    /// Showing a focused text input
    Editing { input: String },
}

/// One tab in the strip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabElement {
    pub id: TabId,
    pub title: String,
    pub active: bool,
    pub mode: TabMode,
}

impl TabElement {
    pub fn is_editing(&self) -> bool {
        matches!(self.mode, TabMode::Editing { .. })
    }
}

/// Part of a tab that received a click
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    Body,
    CloseGlyph,
}

/// User gesture on the strip
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gesture {
    /// The "add tab" affordance
    AddTab,
    Click { tab: TabId, target: ClickTarget },
    DoubleClick(TabId),
    /// Replaces the text of the rename input
    Input { tab: TabId, text: String },
    /// The rename input lost focus
    Blur(TabId),
}

/// What a gesture did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GestureOutcome {
    Opened(TabId),
    Switched(TabId),
    Closed(TabId),
    EditingStarted(TabId),
    InputChanged(TabId),
    Renamed(TabId),
    RenameReverted {
        tab: TabId,
        reason: RenameRejection,
    },
    /// Nothing to do (unknown tab, stale gesture)
    Ignored,
}

/// Tab strip state
#[derive(Debug, Clone, Default)]
pub struct TabStripView {
    elements: Vec<TabElement>,
}

impl TabStripView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a strip showing the current tabs of `session`
    pub fn from_session<S: EditingSurface>(session: &SessionController<S>) -> Self {
        let mut view = Self::new();
        view.sync(session);
        view
    }

    /// Rebuilds elements from the session, keeping edit state by tab id
    pub fn sync<S: EditingSurface>(&mut self, session: &SessionController<S>) {
        let previous = std::mem::take(&mut self.elements);
        self.elements = session
            .tabs()
            .into_iter()
            .map(|tab| {
                let mode = previous
                    .iter()
                    .find(|e| e.id == tab.id)
                    .map(|e| e.mode.clone())
                    .unwrap_or(TabMode::Display);
                TabElement {
                    id: tab.id,
                    title: tab.name.into_string(),
                    active: tab.active,
                    mode,
                }
            })
            .collect();
    }

    pub fn elements(&self) -> &[TabElement] {
        &self.elements
    }

    pub fn element(&self, tab: TabId) -> Option<&TabElement> {
        self.elements.iter().find(|e| e.id == tab)
    }

    /// Element at a display position
    pub fn at(&self, index: usize) -> Option<&TabElement> {
        self.elements.get(index)
    }

    /// Tab whose rename input has focus
    pub fn editing_tab(&self) -> Option<TabId> {
        self.elements.iter().find(|e| e.is_editing()).map(|e| e.id)
    }

    /// Routes one gesture to the session and refreshes the strip
    pub fn handle<S: EditingSurface>(
        &mut self,
        session: &mut SessionController<S>,
        gesture: Gesture,
    ) -> Result<GestureOutcome, SessionError> {
        debug!(?gesture, "tab strip gesture");

        // Anything outside the open input takes focus away from it first.
        if let Some(editing) = self.editing_tab() {
            let keeps_focus = match &gesture {
                Gesture::Input { tab, .. } | Gesture::Blur(tab) => *tab == editing,
                Gesture::Click {
                    tab,
                    target: ClickTarget::Body,
                } => *tab == editing,
                _ => false,
            };
            if !keeps_focus {
                self.commit(session, editing);
            }
        }

        let outcome = match gesture {
            Gesture::AddTab => GestureOutcome::Opened(session.new_tab()?),
            Gesture::Click {
                tab,
                target: ClickTarget::CloseGlyph,
            } => {
                // Consumed here; the body handler never sees it.
                if session.close_id(tab) {
                    GestureOutcome::Closed(tab)
                } else {
                    GestureOutcome::Ignored
                }
            }
            Gesture::Click {
                tab,
                target: ClickTarget::Body,
            } => {
                if session.switch_to_id(tab) {
                    GestureOutcome::Switched(tab)
                } else {
                    GestureOutcome::Ignored
                }
            }
            Gesture::DoubleClick(tab) => match session.name_of(tab) {
                Some(name) => {
                    let input = name.to_string();
                    match self.elements.iter_mut().find(|e| e.id == tab) {
                        Some(element) => {
                            element.mode = TabMode::Editing { input };
                            GestureOutcome::EditingStarted(tab)
                        }
                        None => GestureOutcome::Ignored,
                    }
                }
                None => GestureOutcome::Ignored,
            },
            Gesture::Input { tab, text } => {
                match self.elements.iter_mut().find(|e| e.id == tab) {
                    Some(TabElement {
                        mode: TabMode::Editing { input },
                        ..
                    }) => {
                        *input = text;
                        GestureOutcome::InputChanged(tab)
                    }
                    _ => GestureOutcome::Ignored,
                }
            }
            Gesture::Blur(tab) => self.commit(session, tab),
        };

        self.sync(session);
        Ok(outcome)
    }

    /// Leaves edit mode on `tab`, renaming it to the input text
    fn commit<S: EditingSurface>(
        &mut self,
        session: &mut SessionController<S>,
        tab: TabId,
    ) -> GestureOutcome {
        let Some(element) = self.elements.iter_mut().find(|e| e.id == tab) else {
            return GestureOutcome::Ignored;
        };
        let TabMode::Editing { input } = std::mem::replace(&mut element.mode, TabMode::Display)
        else {
            return GestureOutcome::Ignored;
        };

        let Some(old) = session.name_of(tab).map(|n| n.to_string()) else {
            return GestureOutcome::Ignored;
        };
        let outcome = match session.rename(&old, &input) {
            RenameOutcome::Renamed { .. } => GestureOutcome::Renamed(tab),
            RenameOutcome::Reverted(reason) => GestureOutcome::RenameReverted { tab, reason },
        };
        self.sync(session);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use editor_core::HeadlessSurface;
    use services_settings::SessionConfig;
    use services_storage::{MemoryStore, PersistentStore};

    fn setup() -> (SessionController, TabStripView) {
        let session = SessionController::restore(
            PersistentStore::new(MemoryStore::new()),
            HeadlessSurface::new(),
            SessionConfig::default(),
        )
        .unwrap();
        let strip = TabStripView::from_session(&session);
        (session, strip)
    }

    fn titles(strip: &TabStripView) -> Vec<&str> {
        strip.elements().iter().map(|e| e.title.as_str()).collect()
    }

    #[test]
    fn test_strip_mirrors_session() {
        let (session, strip) = setup();
        assert_eq!(titles(&strip), vec!["main.lua"]);
        assert!(strip.at(0).unwrap().active);
        assert_eq!(strip.at(0).unwrap().id, session.current_id().unwrap());
    }

    #[test]
    fn test_add_tab_and_click_switches() {
        let (mut session, mut strip) = setup();
        let main = session.current_id().unwrap();

        let outcome = strip.handle(&mut session, Gesture::AddTab).unwrap();
        assert!(matches!(outcome, GestureOutcome::Opened(_)));
        assert_eq!(titles(&strip), vec!["main.lua", "new.lua"]);
        assert!(strip.at(1).unwrap().active);

        strip
            .handle(
                &mut session,
                Gesture::Click {
                    tab: main,
                    target: ClickTarget::Body,
                },
            )
            .unwrap();
        assert!(strip.at(0).unwrap().active);
        assert!(!strip.at(1).unwrap().active);
        assert_eq!(session.current().unwrap(), "main.lua");
    }

    #[test]
    fn test_close_glyph_does_not_switch() {
        let (mut session, mut strip) = setup();
        strip.handle(&mut session, Gesture::AddTab).unwrap();
        let main = strip.at(0).unwrap().id;

        let outcome = strip
            .handle(
                &mut session,
                Gesture::Click {
                    tab: main,
                    target: ClickTarget::CloseGlyph,
                },
            )
            .unwrap();

        assert_eq!(outcome, GestureOutcome::Closed(main));
        assert_eq!(titles(&strip), vec!["new.lua"]);
        assert_eq!(session.current().unwrap(), "new.lua");
    }

    #[test]
    fn test_double_click_prefills_input() {
        let (mut session, mut strip) = setup();
        let tab = strip.at(0).unwrap().id;

        strip.handle(&mut session, Gesture::DoubleClick(tab)).unwrap();

        assert_eq!(strip.editing_tab(), Some(tab));
        assert_eq!(
            strip.element(tab).unwrap().mode,
            TabMode::Editing {
                input: "main.lua".to_string()
            }
        );
    }

    #[test]
    fn test_blur_commits_rename() {
        let (mut session, mut strip) = setup();
        let tab = strip.at(0).unwrap().id;

        strip.handle(&mut session, Gesture::DoubleClick(tab)).unwrap();
        strip
            .handle(
                &mut session,
                Gesture::Input {
                    tab,
                    text: "init.lua".to_string(),
                },
            )
            .unwrap();
        let outcome = strip.handle(&mut session, Gesture::Blur(tab)).unwrap();

        assert_eq!(outcome, GestureOutcome::Renamed(tab));
        assert_eq!(strip.element(tab).unwrap().title, "init.lua");
        assert_eq!(strip.element(tab).unwrap().mode, TabMode::Display);
        assert_eq!(session.current().unwrap(), "init.lua");
    }

    #[test]
    fn test_blur_with_taken_name_reverts_title() {
        let (mut session, mut strip) = setup();
        strip.handle(&mut session, Gesture::AddTab).unwrap();
        let tab = strip.at(1).unwrap().id;

        strip.handle(&mut session, Gesture::DoubleClick(tab)).unwrap();
        strip
            .handle(
                &mut session,
                Gesture::Input {
                    tab,
                    text: "main.lua".to_string(),
                },
            )
            .unwrap();
        let outcome = strip.handle(&mut session, Gesture::Blur(tab)).unwrap();

        assert_eq!(
            outcome,
            GestureOutcome::RenameReverted {
                tab,
                reason: RenameRejection::DuplicateName
            }
        );
        assert_eq!(strip.element(tab).unwrap().title, "new.lua");
        assert_eq!(strip.element(tab).unwrap().mode, TabMode::Display);
    }

    #[test]
    fn test_blur_unchanged_name_returns_to_display() {
        let (mut session, mut strip) = setup();
        let tab = strip.at(0).unwrap().id;

        strip.handle(&mut session, Gesture::DoubleClick(tab)).unwrap();
        strip.handle(&mut session, Gesture::Blur(tab)).unwrap();

        assert_eq!(strip.editing_tab(), None);
        assert_eq!(titles(&strip), vec!["main.lua"]);
    }

    #[test]
    fn test_other_gesture_blurs_open_input() {
        let (mut session, mut strip) = setup();
        strip.handle(&mut session, Gesture::AddTab).unwrap();
        let main = strip.at(0).unwrap().id;
        let new = strip.at(1).unwrap().id;

        strip.handle(&mut session, Gesture::DoubleClick(main)).unwrap();
        strip
            .handle(
                &mut session,
                Gesture::Input {
                    tab: main,
                    text: "boot.lua".to_string(),
                },
            )
            .unwrap();
        strip
            .handle(
                &mut session,
                Gesture::Click {
                    tab: new,
                    target: ClickTarget::Body,
                },
            )
            .unwrap();

        assert_eq!(strip.editing_tab(), None);
        assert_eq!(titles(&strip), vec!["boot.lua", "new.lua"]);
    }

    #[test]
    fn test_stale_gestures_are_ignored() {
        let (mut session, mut strip) = setup();
        let ghost = TabId::new();
        assert_eq!(
            strip.handle(&mut session, Gesture::DoubleClick(ghost)).unwrap(),
            GestureOutcome::Ignored
        );
        assert_eq!(
            strip.handle(&mut session, Gesture::Blur(ghost)).unwrap(),
            GestureOutcome::Ignored
        );
        let tab = strip.at(0).unwrap().id;
        assert_eq!(
            strip
                .handle(
                    &mut session,
                    Gesture::Input {
                        tab,
                        text: "x".to_string()
                    }
                )
                .unwrap(),
            GestureOutcome::Ignored
        );
    }
}
