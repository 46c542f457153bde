//! Shared types for docview.
//!
//! The document tree is loaded once at startup and then shared read-only by
//! every session, so everything here is plain data with no interior
//! mutability.

pub mod document;
pub mod error;
pub mod event;

pub use document::{DocumentNode, compare_entries};
pub use error::{Error, Result};
pub use event::{Key, KeyCode, Pane, SessionEvent};
