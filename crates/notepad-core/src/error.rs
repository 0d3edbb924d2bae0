use std::path::{Path, PathBuf};
use thiserror::Error;

/// Core error types for notepad.
///
/// Storage and metadata errors are caught at the boundary where they occur
/// and converted either to a user-visible warning or to a degraded default.
/// None of them are fatal for the document controller.
///
/// # Examples
///
/// ```
/// use notepad_core::error::{NotepadError, Result};
///
/// fn write(path: &std::path::Path) -> Result<()> {
///     Err(NotepadError::io(
///         path,
///         std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
///     ))
/// }
///
/// let err = write(std::path::Path::new("/tmp/note.ntp")).unwrap_err();
/// assert!(err.to_string().contains("/tmp/note.ntp"));
/// ```
#[derive(Error, Debug)]
pub enum NotepadError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("file too large: {} is {size} bytes (max: {limit} bytes)", path.display())]
    FileTooLarge { path: PathBuf, size: u64, limit: u64 },

    #[error("metadata store {} is corrupt: {source}", path.display())]
    MetadataCorrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("bridge delivery failed: {0}")]
    BridgeDelivery(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl NotepadError {
    /// Wraps an I/O error together with the path it occurred on.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Returns the file path the error refers to, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Io { path, .. }
            | Self::FileTooLarge { path, .. }
            | Self::MetadataCorrupt { path, .. } => Some(path),
            Self::BridgeDelivery(_) | Self::Json(_) => None,
        }
    }
}

/// Convenience type alias for `Result<T, NotepadError>`.
pub type Result<T> = std::result::Result<T, NotepadError>;
