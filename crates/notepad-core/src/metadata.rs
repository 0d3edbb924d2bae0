//! File-backed metadata store.
//!
//! The store is a single JSON array of `{ "path": string, "size_kb": number }`
//! objects, unique by `path`. Every mutation reloads the whole file, updates
//! or appends one record, and rewrites the whole file. There is no
//! incremental format; documents are few and small.
//!
//! A missing file is an empty store. A corrupt file is also treated as an
//! empty store: the condition is logged and never propagated.

use crate::error::{NotepadError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Last known size of one saved document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataRecord {
    /// Document path, compared as a case-sensitive string.
    pub path: String,
    /// Size in kilobytes at the last save.
    pub size_kb: f64,
}

impl MetadataRecord {
    pub fn new(path: impl Into<String>, size_kb: f64) -> Self {
        Self {
            path: path.into(),
            size_kb,
        }
    }
}

/// Metadata table persisted at a fixed location.
///
/// The location is configuration injected at construction.
///
/// # Examples
///
/// ```no_run
/// use notepad_core::metadata::MetadataStore;
///
/// # async fn example() -> notepad_core::Result<()> {
/// let store = MetadataStore::new("/var/lib/notepad/metadata.json");
/// store.record("/home/me/note.ntp", 1.5).await?;
///
/// let records = store.load().await;
/// assert_eq!(records[0].size_kb, 1.5);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MetadataStore {
    location: PathBuf,
}

impl MetadataStore {
    pub fn new(location: impl Into<PathBuf>) -> Self {
        Self {
            location: location.into(),
        }
    }

    /// Path of the backing JSON file.
    pub fn location(&self) -> &Path {
        &self.location
    }

    /// Loads all records, degrading to an empty table on any failure.
    pub async fn load(&self) -> Vec<MetadataRecord> {
        match self.try_load().await {
            Ok(records) => records,
            Err(NotepadError::MetadataCorrupt { path, source }) => {
                tracing::warn!(
                    "Metadata store {} is corrupt, starting empty: {}",
                    path.display(),
                    source
                );
                Vec::new()
            }
            Err(e) => {
                tracing::warn!("Could not read metadata store, starting empty: {}", e);
                Vec::new()
            }
        }
    }

    /// Loads all records, reporting why the table could not be read.
    ///
    /// A missing file is not an error and yields an empty table.
    pub async fn try_load(&self) -> Result<Vec<MetadataRecord>> {
        let raw = match tokio::fs::read_to_string(&self.location).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No metadata store at {}", self.location.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(NotepadError::io(&self.location, e)),
        };

        serde_json::from_str(&raw).map_err(|source| NotepadError::MetadataCorrupt {
            path: self.location.clone(),
            source,
        })
    }

    /// Updates the record for `path` or appends a new one, then rewrites the
    /// whole store.
    pub async fn record(&self, path: &str, size_kb: f64) -> Result<()> {
        let mut records = self.load().await;
        upsert(&mut records, path, size_kb);
        self.write_all(&records).await?;

        tracing::debug!(
            "Recorded {:.3} KB for {} ({} records)",
            size_kb,
            path,
            records.len()
        );
        Ok(())
    }

    async fn write_all(&self, records: &[MetadataRecord]) -> Result<()> {
        let json = serde_json::to_string_pretty(records)?;
        tokio::fs::write(&self.location, json)
            .await
            .map_err(|e| NotepadError::io(&self.location, e))
    }
}

/// Replaces the size of an existing record in place or appends a new record.
fn upsert(records: &mut Vec<MetadataRecord>, path: &str, size_kb: f64) {
    match records.iter_mut().find(|r| r.path == path) {
        Some(existing) => existing.size_kb = size_kb,
        None => records.push(MetadataRecord::new(path, size_kb)),
    }
}
