//! Core storage abstractions for notepad.
//!
//! This crate provides the leaf components of the document pipeline that do
//! not depend on the rendering host:
//!
//! - **Metadata Store**: JSON table of last-known document sizes by path
//! - **Persistence Gateway**: verbatim document reads and writes
//! - **Size Tracker**: byte-size computation and the session size history
//! - **Markup**: editable-root marker detection and injection
//! - **Error Types**: the error taxonomy shared by every crate
//!
//! # Examples
//!
//! ```no_run
//! use notepad_core::{MetadataStore, PersistenceGateway};
//! use std::path::Path;
//!
//! # async fn example() -> notepad_core::Result<()> {
//! let gateway = PersistenceGateway::new(MetadataStore::new("metadata.json"));
//! let size_kb = gateway
//!     .save_document(Path::new("note.ntp"), "<p>hello</p>")
//!     .await?;
//! assert!(size_kb > 0.0);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod markup;
pub mod metadata;
pub mod persistence;
pub mod size;

// Re-export commonly used types
pub use error::{NotepadError, Result};
pub use markup::{EDITABLE_ROOT_MARKER, ensure_editable_root, has_editable_root};
pub use metadata::{MetadataRecord, MetadataStore};
pub use persistence::{PersistenceGateway, normalize_extension};
pub use size::{SessionSizeHistory, SizeBand, progress_value, size_kb};
