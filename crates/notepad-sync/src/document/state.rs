use notepad_core::size::{SizeBand, progress_value, size_kb};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// The document currently being edited.
///
/// Owned exclusively by the document controller. The rendering host only
/// holds a transient copy that is reconciled through the content bridge.
///
/// # Examples
///
/// ```
/// use notepad_sync::document::Document;
///
/// let mut doc = Document::new("<p>hello</p>".into(), None);
/// assert!(!doc.is_dirty());
///
/// doc.apply_edit("<p>hello world</p>".into());
/// assert!(doc.is_dirty());
/// assert_eq!(doc.size_kb(), "<p>hello world</p>".len() as f64 / 1024.0);
/// ```
#[derive(Debug, Clone)]
pub struct Document {
    content: String,
    path: Option<PathBuf>,
    /// Cached for display; always derived from `content`
    size_kb: f64,
    dirty: bool,
    /// Last time `content` was replaced
    updated_at: Instant,
}

impl Document {
    /// Creates a clean document. `None` means unsaved, in-memory only.
    pub fn new(content: String, path: Option<PathBuf>) -> Self {
        let size_kb = size_kb(&content);
        Self {
            content,
            path,
            size_kb,
            dirty: false,
            updated_at: Instant::now(),
        }
    }

    /// Creates an empty unsaved document.
    pub fn empty() -> Self {
        Self::new(String::new(), None)
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn size_kb(&self) -> f64 {
        self.size_kb
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn updated_at(&self) -> Instant {
        self.updated_at
    }

    /// Replaces the content after a user edit and marks the document dirty.
    pub fn apply_edit(&mut self, content: String) {
        self.replace_content(content);
        self.dirty = true;
    }

    /// Replaces the content with freshly loaded markup; the document is clean.
    pub fn apply_load(&mut self, content: String) {
        self.replace_content(content);
        self.dirty = false;
    }

    pub fn set_path(&mut self, path: Option<PathBuf>) {
        self.path = path;
    }

    /// Marks the document as persisted at `path` with exactly `content`.
    pub fn mark_saved(&mut self, path: PathBuf, content: String) {
        self.replace_content(content);
        self.path = Some(path);
        self.dirty = false;
    }

    /// Display title: file name or `untitled_name`, prefixed with `*` when dirty.
    pub fn title(&self, untitled_name: &str) -> String {
        let name = self
            .path
            .as_deref()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| untitled_name.to_string());

        if self.dirty { format!("*{name}") } else { name }
    }

    /// Snapshot for the host's status display.
    pub fn status(&self, untitled_name: &str) -> DocumentStatus {
        let progress = progress_value(self.size_kb);
        DocumentStatus {
            title: self.title(untitled_name),
            path: self.path.as_ref().map(|p| p.to_string_lossy().into_owned()),
            dirty: self.dirty,
            size_kb: self.size_kb,
            progress,
            band: SizeBand::for_progress(progress),
        }
    }

    fn replace_content(&mut self, content: String) {
        self.size_kb = size_kb(&content);
        self.content = content;
        self.updated_at = Instant::now();
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::empty()
    }
}

/// What the host shows about the current document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentStatus {
    pub title: String,
    pub path: Option<String>,
    pub dirty: bool,
    pub size_kb: f64,
    /// Latest size mapped to 0-100
    pub progress: u8,
    pub band: SizeBand,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_document_is_clean() {
        let doc = Document::new("<p>a</p>".into(), Some("/tmp/a.ntp".into()));
        assert_eq!(doc.content(), "<p>a</p>");
        assert_eq!(doc.path(), Some(Path::new("/tmp/a.ntp")));
        assert!(!doc.is_dirty());
        assert_eq!(doc.size_kb(), 8.0 / 1024.0);
    }

    #[test]
    fn test_empty_document() {
        let doc = Document::empty();
        assert_eq!(doc.content(), "");
        assert!(doc.path().is_none());
        assert_eq!(doc.size_kb(), 0.0);
    }

    #[test]
    fn test_edit_then_load_resets_dirty() {
        let mut doc = Document::empty();
        doc.apply_edit("<p>typed</p>".into());
        assert!(doc.is_dirty());

        doc.apply_load("<p>loaded</p>".into());
        assert!(!doc.is_dirty());
        assert_eq!(doc.content(), "<p>loaded</p>");
    }

    #[test]
    fn test_size_follows_content() {
        let mut doc = Document::empty();
        doc.apply_edit("x".repeat(2048));
        assert_eq!(doc.size_kb(), 2.0);
        doc.apply_edit(String::new());
        assert_eq!(doc.size_kb(), 0.0);
    }

    #[test]
    fn test_edit_updates_timestamp() {
        let mut doc = Document::empty();
        let before = doc.updated_at();
        doc.apply_edit("<p>x</p>".into());
        assert!(doc.updated_at() >= before);
    }

    #[test]
    fn test_mark_saved() {
        let mut doc = Document::empty();
        doc.apply_edit("<p>x</p>".into());
        doc.mark_saved("/tmp/x.ntp".into(), "x".repeat(2048));
        assert!(!doc.is_dirty());
        assert_eq!(doc.path(), Some(Path::new("/tmp/x.ntp")));
        assert_eq!(doc.content().len(), 2048);
        assert_eq!(doc.size_kb(), 2.0);
    }

    #[test]
    fn test_title() {
        let mut doc = Document::empty();
        assert_eq!(doc.title("Untitled"), "Untitled");

        doc.apply_edit("x".into());
        assert_eq!(doc.title("Untitled"), "*Untitled");

        doc.mark_saved("/home/me/notes/todo.ntp".into(), "x".into());
        assert_eq!(doc.title("Untitled"), "todo.ntp");
    }

    #[test]
    fn test_status_maps_size_to_band() {
        let mut doc = Document::empty();
        doc.apply_edit("x".repeat(60 * 1024));

        let status = doc.status("Untitled");
        assert_eq!(status.progress, 60);
        assert_eq!(status.band, SizeBand::Medium);
        assert!(status.dirty);
        assert_eq!(status.path, None);
        assert_eq!(status.title, "*Untitled");
    }
}
