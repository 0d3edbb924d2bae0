//! Test utilities for driving the document controller without a host.

#[cfg(test)]
pub(crate) mod test_helpers {
    use crate::bridge::ContentBridge;
    use crate::collaborator::Collaborator;
    use crate::config::{EditorConfig, FileFilter, StorageConfig};
    use crate::document::{ControllerEvent, ControllerHandle, DocumentController};
    use crate::protocol::{HostCommand, RequestId};
    use async_trait::async_trait;
    use notepad_core::metadata::{MetadataRecord, MetadataStore};
    use std::collections::VecDeque;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tempfile::TempDir;
    use tokio::sync::mpsc;

    /// Collaborator answering prompts from queued replies.
    ///
    /// An exhausted queue answers as if the user cancelled.
    #[derive(Default)]
    pub(crate) struct ScriptedCollaborator {
        save_destinations: Mutex<VecDeque<Option<PathBuf>>>,
        open_files: Mutex<VecDeque<Option<PathBuf>>>,
        save_prompts: Mutex<usize>,
        warnings: Mutex<Vec<String>>,
    }

    impl ScriptedCollaborator {
        pub(crate) fn push_save_destination(&self, destination: Option<PathBuf>) {
            self.save_destinations.lock().unwrap().push_back(destination);
        }

        pub(crate) fn push_open_file(&self, path: Option<PathBuf>) {
            self.open_files.lock().unwrap().push_back(path);
        }

        pub(crate) fn save_prompts(&self) -> usize {
            *self.save_prompts.lock().unwrap()
        }

        pub(crate) fn warnings(&self) -> Vec<String> {
            self.warnings.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Collaborator for ScriptedCollaborator {
        async fn choose_save_destination(&self, _filters: &[FileFilter]) -> Option<PathBuf> {
            *self.save_prompts.lock().unwrap() += 1;
            self.save_destinations.lock().unwrap().pop_front().flatten()
        }

        async fn choose_open_file(&self, _filters: &[FileFilter]) -> Option<PathBuf> {
            self.open_files.lock().unwrap().pop_front().flatten()
        }

        fn warn(&self, message: &str) {
            self.warnings.lock().unwrap().push(message.to_string());
        }
    }

    /// A controller wired to in-memory channels and a scratch directory.
    pub(crate) struct Harness {
        pub(crate) controller: DocumentController,
        pub(crate) collaborator: Arc<ScriptedCollaborator>,
        pub(crate) dir: TempDir,
        inbox_tx: mpsc::UnboundedSender<ControllerEvent>,
        inbox: mpsc::UnboundedReceiver<ControllerEvent>,
        host: Option<mpsc::UnboundedReceiver<HostCommand>>,
    }

    impl Harness {
        pub(crate) async fn new() -> Self {
            Self::build(TempDir::new().unwrap()).await
        }

        /// Starts with `raw` as the metadata store contents.
        pub(crate) async fn with_metadata(raw: &str) -> Self {
            let dir = TempDir::new().unwrap();
            std::fs::write(dir.path().join("metadata.json"), raw).unwrap();
            Self::build(dir).await
        }

        async fn build(dir: TempDir) -> Self {
            let config = EditorConfig {
                storage: StorageConfig {
                    metadata_path: dir.path().join("metadata.json"),
                },
                ..EditorConfig::default()
            };
            let (inbox_tx, inbox) = mpsc::unbounded_channel();
            let (bridge, host) = ContentBridge::channel();
            let collaborator = Arc::new(ScriptedCollaborator::default());

            let controller = DocumentController::start(
                &config,
                bridge,
                Arc::clone(&collaborator) as Arc<dyn Collaborator>,
                inbox_tx.clone(),
            )
            .await;

            Self {
                controller,
                collaborator,
                dir,
                inbox_tx,
                inbox,
                host: Some(host),
            }
        }

        /// Handles the next event the controller's inbox receives.
        pub(crate) async fn pump(&mut self) {
            let event = tokio::time::timeout(Duration::from_secs(5), self.inbox.recv())
                .await
                .expect("timed out waiting for a controller event")
                .expect("controller inbox closed");
            let _ = self.controller.handle_event(event).await;
        }

        /// Drains every command sent to the host so far.
        pub(crate) fn host_commands(&mut self) -> Vec<HostCommand> {
            let mut commands = Vec::new();
            if let Some(host) = self.host.as_mut() {
                while let Ok(command) = host.try_recv() {
                    commands.push(command);
                }
            }
            commands
        }

        /// Returns the id of the most recent content fetch.
        pub(crate) fn take_fetch_request(&mut self) -> RequestId {
            self.host_commands()
                .into_iter()
                .rev()
                .find_map(|command| match command {
                    HostCommand::FetchContent { request_id } => Some(request_id),
                    _ => None,
                })
                .expect("no content fetch was requested")
        }

        pub(crate) fn close_host(&mut self) {
            self.host = None;
        }

        pub(crate) fn metadata_path(&self) -> PathBuf {
            self.dir.path().join("metadata.json")
        }

        pub(crate) async fn metadata(&self) -> Vec<MetadataRecord> {
            MetadataStore::new(self.metadata_path())
                .try_load()
                .await
                .unwrap()
        }

        /// Document files in the scratch directory, metadata excluded.
        pub(crate) fn written_documents(&self) -> Vec<PathBuf> {
            std::fs::read_dir(self.dir.path())
                .unwrap()
                .map(|entry| entry.unwrap().path())
                .filter(|path| *path != self.metadata_path())
                .collect()
        }

        /// Splits the harness for tests that run the controller loop.
        pub(crate) fn into_parts(
            self,
        ) -> (
            DocumentController,
            ControllerHandle,
            mpsc::UnboundedReceiver<ControllerEvent>,
        ) {
            (
                self.controller,
                ControllerHandle::new(self.inbox_tx),
                self.inbox,
            )
        }
    }
}
