//! Content bridge between the rendering host and the document controller.
//!
//! The bridge has one inbound operation, [`BridgeInbound::content_changed`],
//! called whenever the visible document mutates, and one outbound operation,
//! [`ContentBridge::replace_content`], which makes the host discard its DOM
//! and display new markup. Both carry the full markup.
//!
//! Outbound delivery is fire-and-forget. Replacing the host's DOM wholesale
//! drops any listeners attached to it, so every replacement is followed by an
//! explicit `rebindChangeHook` command; the host must re-attach its change
//! notification hook when it sees it.
//!
//! A closed host channel is logged and otherwise ignored.

use crate::document::{ControllerEvent, DocumentStatus};
use crate::protocol::{HostCommand, RequestId};
use notepad_core::error::{NotepadError, Result};
use tokio::sync::mpsc;

/// Outbound half: commands from the controller to the rendering host.
#[derive(Debug, Clone)]
pub struct ContentBridge {
    outbound: mpsc::UnboundedSender<HostCommand>,
}

impl ContentBridge {
    pub fn new(outbound: mpsc::UnboundedSender<HostCommand>) -> Self {
        Self { outbound }
    }

    /// Creates a bridge together with the receiver the host side drains.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<HostCommand>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    /// Tells the host to display `html` verbatim, then to rebind its change hook.
    pub fn replace_content(&self, html: &str) {
        self.deliver(HostCommand::ReplaceContent {
            html: html.to_string(),
        });
        self.deliver(HostCommand::RebindChangeHook);
    }

    /// Asks the host for its live markup; the reply arrives as a snapshot event.
    pub fn fetch_content(&self, request_id: RequestId) -> Result<()> {
        self.send(HostCommand::FetchContent { request_id })
    }

    pub fn publish_status(&self, status: DocumentStatus) {
        self.deliver(HostCommand::Status(status));
    }

    pub fn send(&self, command: HostCommand) -> Result<()> {
        self.outbound
            .send(command)
            .map_err(|_| NotepadError::BridgeDelivery("rendering host channel closed".into()))
    }

    fn deliver(&self, command: HostCommand) {
        if let Err(e) = self.send(command) {
            tracing::warn!("Dropped host command: {}", e);
        }
    }
}

/// Inbound half: notifications from the rendering host to the controller.
#[derive(Debug, Clone)]
pub struct BridgeInbound {
    inbox: mpsc::UnboundedSender<ControllerEvent>,
}

impl BridgeInbound {
    pub fn new(inbox: mpsc::UnboundedSender<ControllerEvent>) -> Self {
        Self { inbox }
    }

    /// The visible document mutated; `html` is the full new markup.
    pub fn content_changed(&self, html: String) {
        self.forward(ControllerEvent::ContentChanged(html));
    }

    /// Reply to a [`ContentBridge::fetch_content`] request.
    pub fn content_snapshot(&self, request_id: RequestId, html: String) {
        self.forward(ControllerEvent::ContentSnapshot { request_id, html });
    }

    fn forward(&self, event: ControllerEvent) {
        if self.inbox.send(event).is_err() {
            tracing::debug!("Controller stopped, dropping host notification");
        }
    }
}
