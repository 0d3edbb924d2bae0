//! Common test utilities for integration tests.
//!
//! `HostClient` plays the rendering host: it spawns the `notepad-sync`
//! binary, writes protocol lines to its stdin and reads commands back from
//! its stdout.

use serde_json::{Value, json};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};
use tempfile::TempDir;

const READ_TIMEOUT: Duration = Duration::from_secs(10);

/// Test host for communicating with the sync binary.
pub(crate) struct HostClient {
    process: Child,
    /// Decoded stdout lines, fed by a reader thread.
    commands: mpsc::Receiver<Value>,
    /// Scratch directory holding the config, metadata store and documents.
    dir: TempDir,
}

impl HostClient {
    /// Spawn the notepad-sync binary with a config pointing into a fresh
    /// temporary directory.
    pub(crate) fn spawn() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = dir.path().join("notepad.json");
        let config = json!({
            "storage": { "metadata_path": dir.path().join("metadata.json") }
        });
        std::fs::write(&config_path, config.to_string()).expect("Failed to write config");

        let mut process = Command::new(env!("CARGO_BIN_EXE_notepad-sync"))
            .arg(&config_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .expect("Failed to spawn notepad-sync binary");

        let stdout = process.stdout.take().expect("Failed to capture stdout");
        let (tx, commands) = mpsc::channel();
        thread::spawn(move || {
            for line in BufReader::new(stdout).lines() {
                let Ok(line) = line else { break };
                let command: Value = serde_json::from_str(&line)
                    .unwrap_or_else(|e| panic!("Invalid JSON: {e} in: {line:?}"));
                if tx.send(command).is_err() {
                    break;
                }
            }
        });

        Self {
            process,
            commands,
            dir,
        }
    }

    pub(crate) fn dir(&self) -> &Path {
        self.dir.path()
    }

    pub(crate) fn metadata_path(&self) -> PathBuf {
        self.dir.path().join("metadata.json")
    }

    /// Send one protocol message.
    pub(crate) fn send(&mut self, message: &Value) {
        let stdin = self.process.stdin.as_mut().expect("stdin not captured");
        writeln!(stdin, "{message}").unwrap();
        stdin.flush().unwrap();
    }

    /// Send a raw line, well-formed or not.
    pub(crate) fn send_raw(&mut self, line: &str) {
        let stdin = self.process.stdin.as_mut().expect("stdin not captured");
        stdin.write_all(line.as_bytes()).unwrap();
        stdin.flush().unwrap();
    }

    /// Read the next command, panicking if none arrives in time.
    pub(crate) fn next_command(&mut self) -> Value {
        self.commands
            .recv_timeout(READ_TIMEOUT)
            .expect("Timed out waiting for a command")
    }

    /// Read commands until one named `name` arrives, returning it.
    pub(crate) fn read_until(&mut self, name: &str) -> Value {
        let deadline = Instant::now() + READ_TIMEOUT;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let command = self
                .commands
                .recv_timeout(remaining)
                .unwrap_or_else(|_| panic!("Timed out waiting for {name}"));
            if command["command"] == name {
                return command;
            }
        }
    }

    /// Answer the content fetch that a save triggers.
    pub(crate) fn answer_fetch(&mut self, html: &str) {
        let fetch = self.read_until("fetchContent");
        self.send(&json!({
            "method": "contentSnapshot",
            "requestId": fetch["requestId"],
            "html": html
        }));
    }

    /// Answer the next save dialog with `path` (`None` cancels).
    pub(crate) fn answer_save_prompt(&mut self, path: Option<&Path>) -> Value {
        let prompt = self.read_until("chooseSaveDestination");
        self.send(&json!({
            "method": "promptResult",
            "requestId": prompt["requestId"],
            "path": path
        }));
        prompt
    }

    /// Ask the binary to stop and wait for it to exit.
    pub(crate) fn shutdown(&mut self) -> ExitStatus {
        self.send(&json!({ "method": "shutdown" }));
        self.wait()
    }

    /// Close stdin and wait for the binary to exit.
    pub(crate) fn close_input(&mut self) -> ExitStatus {
        drop(self.process.stdin.take());
        self.wait()
    }

    fn wait(&mut self) -> ExitStatus {
        let deadline = Instant::now() + READ_TIMEOUT;
        loop {
            if let Some(status) = self.process.try_wait().expect("Failed to poll process") {
                return status;
            }
            assert!(Instant::now() < deadline, "notepad-sync did not exit");
            thread::sleep(Duration::from_millis(20));
        }
    }
}

impl Drop for HostClient {
    fn drop(&mut self) {
        let _ = self.process.kill();
        let _ = self.process.wait();
    }
}
