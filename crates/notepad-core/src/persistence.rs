//! Document persistence.
//!
//! Documents are stored as the raw markup string, verbatim: no envelope and
//! no checksum. Writes replace the whole file in place (no temp file, no
//! rename), so a crash mid-write can leave a truncated file. Callers create
//! parent directories themselves.
//!
//! # Error Handling
//!
//! Read and write failures are returned as [`NotepadError::Io`] carrying the
//! offending path so the caller can show it to the user. Metadata failures
//! after a successful write are logged and swallowed.

use crate::error::{NotepadError, Result};
use crate::metadata::{MetadataRecord, MetadataStore};
use crate::size::size_kb;
use std::path::{Path, PathBuf};

/// Maximum document size accepted when opening a file (10MB).
pub const MAX_FILE_SIZE: u64 = 10_000_000;

/// Documents larger than this are opened with a warning (1MB).
pub const LARGE_FILE_THRESHOLD: u64 = 1_000_000;

/// Reads and writes documents and keeps the metadata store current.
#[derive(Debug, Clone)]
pub struct PersistenceGateway {
    metadata: MetadataStore,
}

impl PersistenceGateway {
    pub fn new(metadata: MetadataStore) -> Self {
        Self { metadata }
    }

    pub fn metadata(&self) -> &MetadataStore {
        &self.metadata
    }

    /// Writes `content` to `path`, replacing any existing file.
    ///
    /// # Errors
    ///
    /// `NotepadError::Io` when the path is unwritable (permissions, missing
    /// parent directory, disk full).
    pub async fn write_document(&self, path: &Path, content: &str) -> Result<()> {
        tracing::debug!("Writing {} bytes to {}", content.len(), path.display());

        tokio::fs::write(path, content).await.map_err(|e| {
            match e.kind() {
                std::io::ErrorKind::PermissionDenied => {
                    tracing::warn!("Permission denied writing {}", path.display());
                }
                std::io::ErrorKind::NotFound => {
                    tracing::warn!("Parent directory missing for {}", path.display());
                }
                _ => {
                    tracing::error!("IO error writing {}: {}", path.display(), e);
                }
            }
            NotepadError::io(path, e)
        })
    }

    /// Reads the document at `path`.
    ///
    /// # Errors
    ///
    /// - `NotepadError::Io` - not found, permission denied, or not UTF-8
    /// - `NotepadError::FileTooLarge` - file exceeds [`MAX_FILE_SIZE`]
    pub async fn read_document(&self, path: &Path) -> Result<String> {
        tracing::debug!("Reading document {}", path.display());

        let metadata = tokio::fs::metadata(path).await.map_err(|e| {
            log_read_error(path, &e);
            NotepadError::io(path, e)
        })?;

        let size = metadata.len();
        if size > MAX_FILE_SIZE {
            tracing::error!(
                "Document exceeds maximum size: {} bytes (limit: {} bytes)",
                size,
                MAX_FILE_SIZE
            );
            return Err(NotepadError::FileTooLarge {
                path: path.to_path_buf(),
                size,
                limit: MAX_FILE_SIZE,
            });
        }
        if size > LARGE_FILE_THRESHOLD {
            tracing::warn!("Document is large: {} bytes for {}", size, path.display());
        }

        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            log_read_error(path, &e);
            NotepadError::io(path, e)
        })?;

        tracing::debug!("Read {} ({} bytes)", path.display(), content.len());
        Ok(content)
    }

    /// Writes the document and records its size in the metadata store.
    ///
    /// Returns the recorded size in kilobytes. The metadata update only
    /// happens after the write succeeded.
    pub async fn save_document(&self, path: &Path, content: &str) -> Result<f64> {
        self.write_document(path, content).await?;

        let size = size_kb(content);
        self.record_metadata(path, size).await;

        tracing::info!("Saved {} ({:.3} KB)", path.display(), size);
        Ok(size)
    }

    /// Updates or appends the metadata record for `path`.
    ///
    /// Failures to rewrite the store are logged, never returned.
    pub async fn record_metadata(&self, path: &Path, size_kb: f64) {
        let key = path.to_string_lossy();
        if let Err(e) = self.metadata.record(&key, size_kb).await {
            tracing::warn!("Failed to update metadata for {}: {}", key, e);
        }
    }

    /// Loads every known metadata record; corrupt or missing stores are empty.
    pub async fn load_metadata(&self) -> Vec<MetadataRecord> {
        self.metadata.load().await
    }
}

fn log_read_error(path: &Path, e: &std::io::Error) {
    match e.kind() {
        std::io::ErrorKind::NotFound => {
            tracing::debug!("File not found: {}", path.display());
        }
        std::io::ErrorKind::PermissionDenied => {
            tracing::warn!("Permission denied reading {}", path.display());
        }
        _ => {
            tracing::error!("IO error reading {}: {}", path.display(), e);
        }
    }
}

/// Makes sure `path` ends with the `.{extension}` file extension.
///
/// The extension comparison is exact; any other extension is kept and the
/// canonical one is appended after it.
///
/// # Examples
///
/// ```
/// use notepad_core::persistence::normalize_extension;
/// use std::path::{Path, PathBuf};
///
/// assert_eq!(normalize_extension(Path::new("note"), "ntp"), PathBuf::from("note.ntp"));
/// assert_eq!(normalize_extension(Path::new("note.ntp"), "ntp"), PathBuf::from("note.ntp"));
/// assert_eq!(normalize_extension(Path::new("note.txt"), "ntp"), PathBuf::from("note.txt.ntp"));
/// ```
pub fn normalize_extension(path: &Path, extension: &str) -> PathBuf {
    if path.extension().is_some_and(|ext| ext == extension) {
        return path.to_path_buf();
    }

    let mut normalized = path.as_os_str().to_os_string();
    normalized.push(".");
    normalized.push(extension);
    PathBuf::from(normalized)
}
