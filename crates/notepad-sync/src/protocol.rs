//! Wire protocol between the rendering host and the sync process.
//!
//! Messages are newline-delimited JSON objects exchanged over stdin/stdout.
//!
//! # Inbound (host → core)
//!
//! Tagged by `method`: `contentChanged`, `contentSnapshot`, `open`,
//! `openFile`, `new`, `close`, `save`, `promptResult`, `shutdown`.
//!
//! # Outbound (core → host)
//!
//! Tagged by `command`: `replaceContent`, `rebindChangeHook`, `fetchContent`,
//! `status`, `warning`, `chooseSaveDestination`, `chooseOpenFile`.
//!
//! Content-carrying messages always hold the full document markup, never a
//! diff.

use crate::config::FileFilter;
use crate::document::DocumentStatus;
use notepad_core::error::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Identifier pairing an outbound request with its inbound reply.
pub type RequestId = u64;

/// Message sent by the rendering host or the UI shell.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(
    tag = "method",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum HostMessage {
    /// The visible document mutated.
    ContentChanged { html: String },
    /// Reply to a `fetchContent` command.
    ContentSnapshot { request_id: RequestId, html: String },
    /// Display `content`, optionally backed by `path`.
    Open {
        #[serde(default)]
        content: String,
        #[serde(default)]
        path: Option<PathBuf>,
    },
    OpenFile,
    New,
    Close,
    Save,
    /// Reply to a `chooseSaveDestination` or `chooseOpenFile` command.
    PromptResult {
        request_id: RequestId,
        #[serde(default)]
        path: Option<PathBuf>,
    },
    Shutdown,
}

/// Command sent to the rendering host or the UI shell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(
    tag = "command",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum HostCommand {
    /// Discard the current DOM and display `html` verbatim.
    ReplaceContent { html: String },
    /// Re-attach the change notification hook after a replacement.
    RebindChangeHook,
    /// Reply with a `contentSnapshot` carrying the live markup.
    FetchContent { request_id: RequestId },
    Status(DocumentStatus),
    Warning { message: String },
    ChooseSaveDestination {
        request_id: RequestId,
        filters: Vec<FileFilter>,
    },
    ChooseOpenFile {
        request_id: RequestId,
        filters: Vec<FileFilter>,
    },
}

/// Parses one inbound protocol line.
pub fn decode_message(line: &str) -> Result<HostMessage> {
    Ok(serde_json::from_str(line.trim())?)
}

/// Serializes one outbound command as a newline-terminated line.
pub fn encode_command(command: &HostCommand) -> Result<String> {
    let mut line = serde_json::to_string(command)?;
    line.push('\n');
    Ok(line)
}
