//! Document controller.
//!
//! The controller is the single owner of the current [`Document`]. It runs on
//! one task that drains a [`ControllerEvent`] inbox; every mutation of the
//! document happens there, so no locks guard document state.
//!
//! # Save round-trip
//!
//! The live markup sits in the rendering host, and the controller's copy may
//! be one edit behind. `save` therefore asks the host for a snapshot and
//! returns; the snapshot re-enters the inbox as
//! [`ControllerEvent::ContentSnapshot`] and runs the write. Other events keep
//! flowing while the request is outstanding.
//!
//! Freshness is best-effort: the write sees every edit notification that
//! completed before the fetch was issued. Edits racing the fetch may or may
//! not be included. The destination is fixed when the fetch is issued, and
//! the written snapshot only becomes the in-memory content if no edit or
//! load happened in between.
//!
//! # Pending paths
//!
//! An opened path belongs to content that has not reached the surface yet.
//! It is queued next to the loader submission and adopted when that content
//! is delivered, so a save issued in between still targets the document the
//! host is showing.

use super::loader::BackgroundLoader;
use super::state::{Document, DocumentStatus};
use crate::bridge::{BridgeInbound, ContentBridge};
use crate::collaborator::Collaborator;
use crate::config::{EditorConfig, FilesConfig};
use crate::protocol::RequestId;
use notepad_core::markup::ensure_editable_root;
use notepad_core::metadata::MetadataStore;
use notepad_core::persistence::{PersistenceGateway, normalize_extension};
use notepad_core::size::SessionSizeHistory;
use std::collections::{HashMap, VecDeque};
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Work item for the controller task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerEvent {
    Open {
        content: String,
        path: Option<PathBuf>,
    },
    OpenFile,
    New,
    Close,
    Save,
    /// Edit notification from the rendering host.
    ContentChanged(String),
    /// Reply to a content fetch issued by `save`.
    ContentSnapshot {
        request_id: RequestId,
        html: String,
    },
    /// Delivery from the background loader.
    SurfaceLoad(String),
    Shutdown,
}

/// Owns the current document and wires the pipeline together.
pub struct DocumentController {
    document: Document,
    history: SessionSizeHistory,
    gateway: PersistenceGateway,
    bridge: ContentBridge,
    loader: BackgroundLoader,
    collaborator: Arc<dyn Collaborator>,
    files: FilesConfig,
    pending_fetches: HashMap<RequestId, PendingSave>,
    /// Paths of submitted loads, in delivery order
    pending_paths: VecDeque<Option<PathBuf>>,
    next_request_id: RequestId,
    /// Bumped on every surface load
    generation: u64,
    /// Bumped on every edit notification
    edits: u64,
}

/// Document state captured when a save fetched the host content.
#[derive(Debug, Clone)]
struct PendingSave {
    path: Option<PathBuf>,
    generation: u64,
    edits: u64,
}

impl DocumentController {
    /// Builds the controller and spawns its background loader.
    ///
    /// Loads the metadata store once to seed the session size history. A
    /// missing or corrupt store yields an empty history.
    pub async fn start(
        config: &EditorConfig,
        bridge: ContentBridge,
        collaborator: Arc<dyn Collaborator>,
        inbox: mpsc::UnboundedSender<ControllerEvent>,
    ) -> Self {
        let gateway =
            PersistenceGateway::new(MetadataStore::new(&config.storage.metadata_path));

        let known = gateway.load_metadata().await;
        let mut history = SessionSizeHistory::new();
        history.seed(known.iter().map(|record| record.size_kb));
        tracing::info!(
            "Document controller started ({} known documents in {})",
            known.len(),
            config.storage.metadata_path.display()
        );

        Self {
            document: Document::empty(),
            history,
            gateway,
            bridge,
            loader: BackgroundLoader::spawn(inbox),
            collaborator,
            files: config.files.clone(),
            pending_fetches: HashMap::new(),
            pending_paths: VecDeque::new(),
            next_request_id: 1,
            generation: 0,
            edits: 0,
        }
    }

    /// Drains the inbox until it closes or a shutdown arrives.
    pub async fn run(mut self, mut inbox: mpsc::UnboundedReceiver<ControllerEvent>) {
        while let Some(event) = inbox.recv().await {
            if self.handle_event(event).await.is_break() {
                break;
            }
        }
        tracing::info!("Document controller stopped");
    }

    /// Handles one event; `Break` means the controller should stop.
    pub async fn handle_event(&mut self, event: ControllerEvent) -> ControlFlow<()> {
        match event {
            ControllerEvent::Open { content, path } => self.open_document(content, path),
            ControllerEvent::OpenFile => self.open_file().await,
            ControllerEvent::New => self.new_document(),
            ControllerEvent::Close => self.close_document(),
            ControllerEvent::Save => self.save(),
            ControllerEvent::ContentChanged(html) => self.handle_content_changed(html),
            ControllerEvent::ContentSnapshot { request_id, html } => {
                self.complete_save(request_id, html).await;
            }
            ControllerEvent::SurfaceLoad(content) => self.load_surface_content(content),
            ControllerEvent::Shutdown => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }

    /// Queues `content` for display; `path` (or none) is adopted once the
    /// content is delivered.
    ///
    /// Never blocks and never fails; without a path the document is unsaved.
    pub fn open_document(&mut self, content: String, path: Option<PathBuf>) {
        match &path {
            Some(p) => tracing::info!("Opening {} ({} bytes)", p.display(), content.len()),
            None => tracing::info!("Opening unsaved document ({} bytes)", content.len()),
        }
        self.pending_paths.push_back(path);
        self.loader.submit(content);
    }

    /// Starts an empty unsaved document.
    pub fn new_document(&mut self) {
        self.open_document(String::new(), None);
    }

    /// Discards the current document in favour of an empty unsaved one.
    pub fn close_document(&mut self) {
        if self.document.is_dirty() {
            tracing::info!("Closing document with unsaved changes");
        }
        self.new_document();
    }

    /// Prompts for a file, reads it, and opens it.
    ///
    /// A read failure is shown to the user and leaves the current document
    /// untouched.
    pub async fn open_file(&mut self) {
        let filters = self.files.dialog_filters();
        let Some(path) = self.collaborator.choose_open_file(&filters).await else {
            tracing::debug!("Open cancelled");
            return;
        };

        match self.gateway.read_document(&path).await {
            Ok(content) => self.open_document(content, Some(path)),
            Err(e) => {
                tracing::error!("Failed to open {}: {}", path.display(), e);
                self.collaborator
                    .warn(&format!("Could not open {}: {}", path.display(), e));
            }
        }
    }

    /// Applies an edit reported by the rendering host.
    ///
    /// This is the only way content becomes authoritative after a load.
    pub fn handle_content_changed(&mut self, content: String) {
        self.edits += 1;
        self.document.apply_edit(content);
        let size = self.history.record(self.document.content());
        tracing::trace!("Content changed ({:.3} KB)", size);
        self.publish_status();
    }

    /// Requests the live markup from the host; the write happens when the
    /// snapshot arrives.
    pub fn save(&mut self) {
        let request_id = self.next_request_id;
        self.next_request_id += 1;

        match self.bridge.fetch_content(request_id) {
            Ok(()) => {
                tracing::debug!("Save requested content snapshot #{}", request_id);
                let pending = PendingSave {
                    path: self.document.path().map(Path::to_path_buf),
                    generation: self.generation,
                    edits: self.edits,
                };
                self.pending_fetches.insert(request_id, pending);
            }
            Err(e) => tracing::warn!("Save aborted: {}", e),
        }
    }

    /// Continuation of [`save`](Self::save): writes the fetched markup.
    ///
    /// The destination is the document's path when the fetch was issued.
    /// Without one the collaborator picks a destination, which is given the
    /// canonical extension and adopted on success. A failed write is
    /// reported to the user and leaves the document dirty.
    pub async fn complete_save(&mut self, request_id: RequestId, html: String) {
        let Some(pending) = self.pending_fetches.remove(&request_id) else {
            tracing::warn!("Ignoring content snapshot for unknown request #{}", request_id);
            return;
        };

        let destination = match pending.path {
            Some(path) => path,
            None => {
                let filters = self.files.dialog_filters();
                match self.collaborator.choose_save_destination(&filters).await {
                    Some(chosen) => normalize_extension(&chosen, &self.files.extension),
                    None => {
                        tracing::debug!("Save cancelled");
                        return;
                    }
                }
            }
        };

        match self.gateway.save_document(&destination, &html).await {
            Ok(_) if pending.generation != self.generation => {
                tracing::debug!(
                    "Saved {} after another document was loaded",
                    destination.display()
                );
            }
            Ok(_) if pending.edits != self.edits => {
                tracing::debug!(
                    "Edits arrived while saving {}, document stays dirty",
                    destination.display()
                );
                self.document.set_path(Some(destination));
                self.publish_status();
            }
            Ok(_) => {
                self.document.mark_saved(destination, html);
                self.history.record(self.document.content());
                self.publish_status();
            }
            Err(e) => {
                tracing::error!("Failed to save {}: {}", destination.display(), e);
                self.collaborator
                    .warn(&format!("Could not save {}: {}", destination.display(), e));
            }
        }
    }

    /// Displays delivered content, making sure the surface stays editable.
    ///
    /// Adopts the path queued with the matching open request, if any.
    pub fn load_surface_content(&mut self, content: String) {
        if let Some(path) = self.pending_paths.pop_front() {
            self.document.set_path(path);
        }
        self.generation += 1;

        let patched = ensure_editable_root(&content).into_owned();
        self.bridge.replace_content(&patched);
        self.document.apply_load(patched);
        self.history.record(self.document.content());
        self.publish_status();
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn history(&self) -> &SessionSizeHistory {
        &self.history
    }

    pub fn status(&self) -> DocumentStatus {
        self.document.status(&self.files.untitled_name)
    }

    /// Number of saves waiting for a content snapshot.
    pub fn pending_fetches(&self) -> usize {
        self.pending_fetches.len()
    }

    fn publish_status(&self) {
        self.bridge.publish_status(self.status());
    }
}

/// Cheap, cloneable entry point for the UI shell and the rendering host.
#[derive(Debug, Clone)]
pub struct ControllerHandle {
    inbox: mpsc::UnboundedSender<ControllerEvent>,
}

impl ControllerHandle {
    pub fn new(inbox: mpsc::UnboundedSender<ControllerEvent>) -> Self {
        Self { inbox }
    }

    pub fn open_document(&self, content: String, path: Option<PathBuf>) {
        self.send(ControllerEvent::Open { content, path });
    }

    pub fn open_file(&self) {
        self.send(ControllerEvent::OpenFile);
    }

    pub fn new_document(&self) {
        self.send(ControllerEvent::New);
    }

    pub fn close_document(&self) {
        self.send(ControllerEvent::Close);
    }

    pub fn save(&self) {
        self.send(ControllerEvent::Save);
    }

    pub fn shutdown(&self) {
        self.send(ControllerEvent::Shutdown);
    }

    /// Inbound bridge endpoint for the rendering host.
    pub fn bridge(&self) -> BridgeInbound {
        BridgeInbound::new(self.inbox.clone())
    }

    fn send(&self, event: ControllerEvent) {
        if self.inbox.send(event).is_err() {
            tracing::debug!("Controller stopped, dropping request");
        }
    }
}
