//! Live documents and their change notifications

use core_types::DocumentId;
use std::cell::RefCell;
use std::fmt;
use std::ops::Range;
use std::rc::Rc;

#[cfg(feature = "serde_support")]
use serde::{Deserialize, Serialize};

/// Cursor position in a document (row and byte column)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    pub const fn zero() -> Self {
        Self { row: 0, col: 0 }
    }
}

/// Handle returned by [`Document::subscribe`], used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

/// Payload delivered to change subscribers after every edit
#[derive(Debug, Clone, Copy)]
pub struct ContentChange<'a> {
    pub document: DocumentId,
    pub version: u64,
    pub value: &'a str,
}

type ChangeListener = Box<dyn FnMut(&ContentChange<'_>)>;

/// Text document with synchronous change notification
///
/// Content is kept verbatim (trailing newlines included).
pub struct Document {
    id: DocumentId,
    text: String,
    version: u64,
    listeners: Vec<(SubscriptionId, ChangeListener)>,
    next_subscription: u64,
}

impl Document {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            id: DocumentId::new(),
            text: content.into(),
            version: 0,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn value(&self) -> &str {
        &self.text
    }

    /// Number of edits applied since creation
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn line_count(&self) -> usize {
        self.text.split('\n').count()
    }

    pub fn line(&self, row: usize) -> Option<&str> {
        self.text.split('\n').nth(row)
    }

    /// Replaces the whole content
    pub fn set_value(&mut self, content: impl Into<String>) {
        self.text = content.into();
        self.changed();
    }

    /// Inserts text at a byte offset
    pub fn insert(&mut self, offset: usize, text: &str) -> bool {
        if offset > self.text.len() || !self.text.is_char_boundary(offset) {
            return false;
        }
        self.text.insert_str(offset, text);
        self.changed();
        true
    }

    /// Inserts text at a row/column position
    pub fn insert_at(&mut self, pos: Position, text: &str) -> bool {
        match self.offset_of(pos) {
            Some(offset) => self.insert(offset, text),
            None => false,
        }
    }

    /// Appends text at the end
    pub fn append(&mut self, text: &str) {
        self.text.push_str(text);
        self.changed();
    }

    /// Deletes a byte range
    pub fn delete(&mut self, range: Range<usize>) -> bool {
        if range.start > range.end
            || range.end > self.text.len()
            || !self.text.is_char_boundary(range.start)
            || !self.text.is_char_boundary(range.end)
        {
            return false;
        }
        self.text.replace_range(range, "");
        self.changed();
        true
    }

    /// Registers a change subscriber
    ///
    /// Subscribers run synchronously inside the edit call. They receive the new
    /// value and must not reach back into the document through its handle.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&ContentChange<'_>) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Removes a change subscriber; returns false if it was not registered
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sub, _)| *sub != id);
        self.listeners.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }

    fn offset_of(&self, pos: Position) -> Option<usize> {
        let mut offset = 0;
        for (row, line) in self.text.split('\n').enumerate() {
            if row == pos.row {
                if pos.col > line.len() {
                    return None;
                }
                return Some(offset + pos.col);
            }
            offset += line.len() + 1;
        }
        None
    }

    fn changed(&mut self) {
        self.version += 1;
        let change = ContentChange {
            document: self.id,
            version: self.version,
            value: &self.text,
        };
        for (_, listener) in self.listeners.iter_mut() {
            listener(&change);
        }
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("id", &self.id)
            .field("len", &self.text.len())
            .field("version", &self.version)
            .field("subscribers", &self.listeners.len())
            .finish()
    }
}

/// Shared handle to a live document
///
/// Clones point at the same document; handing a handle to another owner
/// keeps its content and edit counter.
#[derive(Debug, Clone)]
pub struct DocumentHandle(Rc<RefCell<Document>>);

impl DocumentHandle {
    pub fn new(content: impl Into<String>) -> Self {
        Self(Rc::new(RefCell::new(Document::new(content))))
    }

    pub fn id(&self) -> DocumentId {
        self.0.borrow().id()
    }

    /// Returns a copy of the current content
    pub fn value(&self) -> String {
        self.0.borrow().value().to_string()
    }

    pub fn version(&self) -> u64 {
        self.0.borrow().version()
    }

    pub fn set_value(&self, content: impl Into<String>) {
        self.0.borrow_mut().set_value(content);
    }

    pub fn insert(&self, offset: usize, text: &str) -> bool {
        self.0.borrow_mut().insert(offset, text)
    }

    pub fn insert_at(&self, pos: Position, text: &str) -> bool {
        self.0.borrow_mut().insert_at(pos, text)
    }

    pub fn append(&self, text: &str) {
        self.0.borrow_mut().append(text);
    }

    pub fn delete(&self, range: Range<usize>) -> bool {
        self.0.borrow_mut().delete(range)
    }

    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: FnMut(&ContentChange<'_>) + 'static,
    {
        self.0.borrow_mut().subscribe(listener)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.0.borrow_mut().unsubscribe(id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.0.borrow().subscriber_count()
    }

    /// True if both handles share one document
    pub fn same_document(&self, other: &DocumentHandle) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Runs `f` with read access to the document
    pub fn with<R>(&self, f: impl FnOnce(&Document) -> R) -> R {
        f(&self.0.borrow())
    }
}
