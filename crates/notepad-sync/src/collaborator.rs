//! Seam to the UI shell that owns dialogs and notifications.
//!
//! The document controller never shows UI itself. It asks the collaborator
//! for destinations and files and hands it user-visible warnings. Prompts are
//! modal: the controller awaits them before handling further events.

use crate::config::FileFilter;
use async_trait::async_trait;
use std::path::PathBuf;

/// Dialogs and notifications supplied by the UI shell.
#[async_trait]
pub trait Collaborator: Send + Sync {
    /// Asks where to save an unsaved document; `None` means cancelled.
    async fn choose_save_destination(&self, filters: &[FileFilter]) -> Option<PathBuf>;

    /// Asks which file to open; `None` means cancelled.
    async fn choose_open_file(&self, filters: &[FileFilter]) -> Option<PathBuf>;

    /// Shows a warning to the user.
    fn warn(&self, message: &str);
}
