//! Error types for the notes service.
//!
//! This module defines the error type shared by the service, the
//! configuration layer and the command-line driver.

use std::io;

use thiserror::Error;

/// The main error type for the notes service.
#[derive(Error, Debug)]
pub enum NotesError {
    /// No active note matches the requested id.
    #[error("Note not found: {id}")]
    NoteNotFound { id: u32 },

    /// No active comment matches the requested id. With `of_note` set, `id`
    /// is a note id and the note has no active comments.
    #[error("{}", comment_not_found_message(.id, .of_note))]
    CommentNotFound { id: u32, of_note: bool },

    /// Errors related to file I/O operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Errors related to serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Errors related to configuration.
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// A command line could not be parsed or executed.
    #[error("{message}")]
    CommandError { message: String },

    /// for mutex lock acquisition issues
    #[error("{message}")]
    LockAcquisitionFailed { message: String },
}

fn comment_not_found_message(id: &u32, of_note: &bool) -> String {
    if *of_note {
        format!("No comments found for note {}", id)
    } else {
        format!("Comment not found: {}", id)
    }
}

impl NotesError {
    /// True for the two lookup failures a caller would map to "not found".
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            NotesError::NoteNotFound { .. } | NotesError::CommentNotFound { .. }
        )
    }
}
