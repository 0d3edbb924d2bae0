//! Document sync and persistence for a contenteditable notepad.
//!
//! The rendering host owns the live DOM; this crate owns the document model.
//! The [`document::DocumentController`] keeps the two in step through the
//! [`bridge`], persists documents through `notepad-core`, and talks to the UI
//! shell through a [`collaborator::Collaborator`]. [`server::serve`] exposes
//! all of it over a newline-delimited JSON protocol on stdio.

pub mod bridge;
pub mod collaborator;
pub mod config;
pub mod document;
pub mod protocol;
pub mod server;

#[cfg(test)]
mod test_utils;

// Re-export commonly used types
pub use notepad_core::error::{NotepadError, Result};
pub use server::serve;
