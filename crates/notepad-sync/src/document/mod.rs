//! Document management module.
//!
//! - `state`: the current document and its status snapshot
//! - `controller`: single-writer controller and its event inbox
//! - `loader`: background relay from open requests to surface loads

mod controller;
mod loader;
mod state;

pub use controller::{ControllerEvent, ControllerHandle, DocumentController};
pub use loader::BackgroundLoader;
pub use state::{Document, DocumentStatus};
