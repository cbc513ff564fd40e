//! # Editor Core
//!
//! The document model and display surface the tab shell embeds.
//!
//! ## Philosophy
//!
//! - **One live document per buffer**: a [`DocumentHandle`] owns the text and
//!   its edit counter; cloning the handle shares the document
//! - **Synchronous notification**: every edit fires the document's change
//!   subscribers before the edit call returns, no batching
//! - **Single surface**: exactly one document (or none) is shown at a time
//!   through an [`EditingSurface`]
//!
//! ## Non-Goals
//!
//! This is NOT:
//! - A syntax highlighter or tokenizer
//! - An undo/redo engine

pub mod document;
pub mod surface;

pub use document::{ContentChange, Document, DocumentHandle, Position, SubscriptionId};
pub use surface::{EditingSurface, HeadlessSurface};
