//! Background loader.
//!
//! Decouples "a document was requested" from "the surface displays it".
//! [`BackgroundLoader::submit`] never blocks: it queues the content for a
//! single worker task that relays it back to the controller inbox as a
//! [`ControllerEvent::SurfaceLoad`]. The controller then applies it on its
//! own task, so the worker never touches document state.
//!
//! # Ordering
//!
//! One worker per loader, one job at a time, FIFO. There is no cancellation:
//! every submission is delivered exactly once, so a stale delivery simply
//! overwrites the surface with older content.

use super::controller::ControllerEvent;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Single-worker relay from open requests to surface loads.
#[derive(Debug)]
pub struct BackgroundLoader {
    queue: mpsc::UnboundedSender<String>,
    worker: JoinHandle<()>,
}

impl BackgroundLoader {
    /// Spawns the worker task. Must be called inside a tokio runtime.
    pub fn spawn(inbox: mpsc::UnboundedSender<ControllerEvent>) -> Self {
        let (queue, mut jobs) = mpsc::unbounded_channel::<String>();

        let worker = tokio::spawn(async move {
            while let Some(content) = jobs.recv().await {
                tracing::trace!("Relaying {} bytes to the surface", content.len());
                if inbox.send(ControllerEvent::SurfaceLoad(content)).is_err() {
                    tracing::debug!("Controller stopped, background loader exiting");
                    break;
                }
            }
        });

        Self { queue, worker }
    }

    /// Schedules `content` for display and returns immediately.
    pub fn submit(&self, content: String) {
        if self.queue.send(content).is_err() {
            tracing::warn!("Background loader worker is gone, dropping load");
        }
    }

    /// Returns true once the worker task has exited.
    pub fn is_finished(&self) -> bool {
        self.worker.is_finished()
    }
}

impl Drop for BackgroundLoader {
    fn drop(&mut self) {
        self.worker.abort();
    }
}
