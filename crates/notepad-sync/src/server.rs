//! Stdio front end.
//!
//! Wires the document controller to a host speaking the line protocol in
//! [`crate::protocol`]. Three tasks cooperate:
//!
//! - the reader decodes host messages and routes them to the controller inbox
//!   or to a waiting prompt
//! - the controller task owns the document
//! - the writer encodes outbound commands, one per line
//!
//! Prompts are answered out of band with `promptResult`. The controller
//! awaits them, so replies are routed by the reader straight to the waiting
//! prompt instead of through the inbox.

use crate::bridge::ContentBridge;
use crate::collaborator::Collaborator;
use crate::config::{EditorConfig, FileFilter};
use crate::document::{ControllerHandle, DocumentController};
use crate::protocol::{HostCommand, HostMessage, RequestId, decode_message, encode_command};
use async_trait::async_trait;
use dashmap::DashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::{mpsc, oneshot};

/// Runs the sync process until the host sends `shutdown` or closes `input`.
pub async fn serve<R, W>(input: R, output: W, config: EditorConfig)
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
    let (bridge, commands) = ContentBridge::channel();
    let prompts = Arc::new(PendingPrompts::new());

    let collaborator = Arc::new(StdioCollaborator::new(bridge.clone(), Arc::clone(&prompts)));
    let controller =
        DocumentController::start(&config, bridge, collaborator, inbox_tx.clone()).await;
    let handle = ControllerHandle::new(inbox_tx);

    let writer = tokio::spawn(write_commands(output, commands));
    let controller_task = tokio::spawn(controller.run(inbox_rx));

    read_messages(input, &handle, &prompts).await;

    // Nobody is left to answer prompts; unblock the controller if it waits.
    prompts.close();
    handle.shutdown();

    if let Err(e) = controller_task.await {
        tracing::error!("Document controller task failed: {}", e);
    }
    if let Err(e) = writer.await {
        tracing::error!("Writer task failed: {}", e);
    }
    tracing::info!("Server stopped");
}

async fn read_messages<R>(input: R, handle: &ControllerHandle, prompts: &PendingPrompts)
where
    R: AsyncRead + Unpin,
{
    let inbound = handle.bridge();
    let mut lines = BufReader::new(input).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => {
                tracing::info!("Host closed input");
                return;
            }
            Err(e) => {
                tracing::error!("Failed to read host input: {}", e);
                return;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        let message = match decode_message(&line) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!("Skipping malformed host message: {}", e);
                continue;
            }
        };

        match message {
            HostMessage::ContentChanged { html } => inbound.content_changed(html),
            HostMessage::ContentSnapshot { request_id, html } => {
                inbound.content_snapshot(request_id, html);
            }
            HostMessage::Open { content, path } => handle.open_document(content, path),
            HostMessage::OpenFile => handle.open_file(),
            HostMessage::New => handle.new_document(),
            HostMessage::Close => handle.close_document(),
            HostMessage::Save => handle.save(),
            HostMessage::PromptResult { request_id, path } => prompts.resolve(request_id, path),
            HostMessage::Shutdown => {
                tracing::info!("Shutdown requested by host");
                return;
            }
        }
    }
}

async fn write_commands<W>(mut output: W, mut commands: mpsc::UnboundedReceiver<HostCommand>)
where
    W: AsyncWrite + Unpin,
{
    while let Some(command) = commands.recv().await {
        let line = match encode_command(&command) {
            Ok(line) => line,
            Err(e) => {
                tracing::error!("Failed to encode host command: {}", e);
                continue;
            }
        };

        let written = async {
            output.write_all(line.as_bytes()).await?;
            output.flush().await
        }
        .await;

        if let Err(e) = written {
            tracing::error!("Failed to write to host: {}", e);
            return;
        }
    }
}

/// Prompts waiting for a `promptResult` from the host.
#[derive(Debug, Default)]
pub struct PendingPrompts {
    waiting: DashMap<RequestId, oneshot::Sender<Option<PathBuf>>>,
    next_id: AtomicU64,
    closed: AtomicBool,
}

impl PendingPrompts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a request id and the receiver its reply will arrive on.
    ///
    /// Once closed, the receiver resolves immediately as cancelled.
    pub fn register(&self) -> (RequestId, oneshot::Receiver<Option<PathBuf>>) {
        let request_id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let (tx, rx) = oneshot::channel();

        if !self.closed.load(Ordering::Acquire) {
            self.waiting.insert(request_id, tx);
            if self.closed.load(Ordering::Acquire) {
                self.waiting.remove(&request_id);
            }
        }
        (request_id, rx)
    }

    /// Hands `path` to the prompt waiting on `request_id`.
    pub fn resolve(&self, request_id: RequestId, path: Option<PathBuf>) {
        match self.waiting.remove(&request_id) {
            Some((_, tx)) => {
                if tx.send(path).is_err() {
                    tracing::debug!("Prompt #{} was abandoned before its reply", request_id);
                }
            }
            None => tracing::warn!("Ignoring prompt result for unknown request #{}", request_id),
        }
    }

    pub(crate) fn forget(&self, request_id: RequestId) {
        self.waiting.remove(&request_id);
    }

    /// Cancels every waiting prompt and all future ones.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
        self.waiting.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.waiting.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.waiting.is_empty()
    }
}

/// [`Collaborator`] that forwards dialogs and warnings to the host.
pub struct StdioCollaborator {
    bridge: ContentBridge,
    prompts: Arc<PendingPrompts>,
}

impl StdioCollaborator {
    pub fn new(bridge: ContentBridge, prompts: Arc<PendingPrompts>) -> Self {
        Self { bridge, prompts }
    }

    async fn prompt(
        &self,
        request_id: RequestId,
        command: HostCommand,
        reply: oneshot::Receiver<Option<PathBuf>>,
    ) -> Option<PathBuf> {
        if let Err(e) = self.bridge.send(command) {
            tracing::warn!("Could not prompt host: {}", e);
            self.prompts.forget(request_id);
            return None;
        }

        reply.await.unwrap_or_else(|_| {
            tracing::debug!("Prompt #{} cancelled", request_id);
            None
        })
    }
}

#[async_trait]
impl Collaborator for StdioCollaborator {
    async fn choose_save_destination(&self, filters: &[FileFilter]) -> Option<PathBuf> {
        let (request_id, reply) = self.prompts.register();
        let command = HostCommand::ChooseSaveDestination {
            request_id,
            filters: filters.to_vec(),
        };
        self.prompt(request_id, command, reply).await
    }

    async fn choose_open_file(&self, filters: &[FileFilter]) -> Option<PathBuf> {
        let (request_id, reply) = self.prompts.register();
        let command = HostCommand::ChooseOpenFile {
            request_id,
            filters: filters.to_vec(),
        };
        self.prompt(request_id, command, reply).await
    }

    fn warn(&self, message: &str) {
        let command = HostCommand::Warning {
            message: message.to_string(),
        };
        if let Err(e) = self.bridge.send(command) {
            tracing::warn!("Could not deliver warning \"{}\": {}", message, e);
        }
    }
}
