//! In-memory notes and comments service
//!
//! This library keeps notes and their comments in memory, with soft-delete
//! semantics, per-note comment counters and date-ordered retrieval. A small
//! command-line driver runs scripts of commands against one service.

mod cli;
mod comment;
mod config;
mod errors;
mod helper;
mod note;
mod service;
mod types;

// Re-export key components
pub use cli::*;
pub use comment::*;
pub use config::*;
pub use errors::*;
pub use helper::*;
pub use note::*;
pub use service::*;
pub use types::*;
