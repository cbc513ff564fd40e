//! # Core Types
//!
//! This crate defines the fundamental types shared by every TabShell crate.
//!
//! ## Philosophy
//!
//! - **Identity is not display text**: a tab is addressed by its [`TabId`],
//!   which survives renames. The [`BufferName`] is only a title and a
//!   storage key suffix.
//! - **Validated at the edge**: a [`BufferName`] can only be built from a
//!   non-empty, trimmed string.
//!
//! ## Key Types
//!
//! - [`TabId`]: Stable identifier for an open tab
//! - [`DocumentId`]: Identifier for a live document handle
//! - [`BufferName`]: Unique, case-sensitive buffer name

pub mod buffer_name;
pub mod ids;
mod uuid_tools;

pub use buffer_name::{BufferName, NameError};
pub use ids::{DocumentId, TabId};
pub use uuid_tools::new_uuid;
