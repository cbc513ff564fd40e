//! Editing surface abstraction
//!
//! The shell renders one document at a time. Hosts implement
//! [`EditingSurface`] for their real widget; [`HeadlessSurface`] is the
//! deterministic implementation used by the console and by tests.

use crate::DocumentHandle;
use core_types::DocumentId;

/// The single shared display for the active document
pub trait EditingSurface {
    /// Shows `document`, or nothing when `None`
    fn set_active_document(&mut self, document: Option<DocumentHandle>);

    /// Returns the document currently shown
    fn active_document(&self) -> Option<&DocumentHandle>;
}

/// In-memory surface that records every attach and detach
#[derive(Debug, Default)]
pub struct HeadlessSurface {
    active: Option<DocumentHandle>,
    history: Vec<Option<DocumentId>>,
}

impl HeadlessSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sequence of documents shown so far (`None` = detached)
    pub fn history(&self) -> &[Option<DocumentId>] {
        &self.history
    }

    pub fn is_detached(&self) -> bool {
        self.active.is_none()
    }

    /// Renders the active document, line-numbered
    pub fn render(&self) -> String {
        let Some(document) = &self.active else {
            return String::from("(no document)");
        };
        let value = document.value();
        value
            .split('\n')
            .enumerate()
            .map(|(row, line)| format!("{:>4} | {}", row + 1, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl EditingSurface for HeadlessSurface {
    fn set_active_document(&mut self, document: Option<DocumentHandle>) {
        self.history.push(document.as_ref().map(DocumentHandle::id));
        self.active = document;
    }

    fn active_document(&self) -> Option<&DocumentHandle> {
        self.active.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headless_surface_starts_detached() {
        let surface = HeadlessSurface::new();
        assert!(surface.is_detached());
        assert_eq!(surface.render(), "(no document)");
    }

    #[test]
    fn test_attach_and_detach() {
        let mut surface = HeadlessSurface::new();
        let doc = DocumentHandle::new("a\nb");
        surface.set_active_document(Some(doc.clone()));
        assert!(surface.active_document().unwrap().same_document(&doc));
        assert_eq!(surface.render(), "   1 | a\n   2 | b");

        surface.set_active_document(None);
        assert!(surface.is_detached());
        assert_eq!(surface.history(), &[Some(doc.id()), None]);
    }
}
