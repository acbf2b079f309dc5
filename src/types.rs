//! Shared types: the crate `Result` alias and the command set of the CLI.
use clap::Subcommand;

use crate::NotesError;

/// A specialized Result type for notes service operations.
pub type Result<T> = std::result::Result<T, NotesError>;

/// Commands accepted by the notes shell, one per input line
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Add a new note
    Add {
        /// Title of the note
        #[clap(short = 'T', long)]
        title: String,

        /// Body of the note
        #[clap(short, long, default_value = "")]
        text: String,

        /// Owner of the note (defaults to the configured owner)
        #[clap(short, long)]
        owner: Option<u32>,

        /// Creation date in epoch seconds (defaults to now)
        #[clap(short, long, allow_negative_numbers = true)]
        date: Option<i64>,

        /// Store the note as already deleted
        #[clap(long)]
        deleted: bool,
    },

    /// Comment on an existing note
    Comment {
        /// ID of the note to comment on
        note_id: u32,

        /// Comment text
        #[clap(short, long)]
        message: String,

        /// Owner of the comment (defaults to the configured owner)
        #[clap(short, long)]
        owner: Option<u32>,

        /// ID of the comment this one replies to
        #[clap(short, long)]
        reply_to: Option<u32>,

        /// Creation date in epoch seconds (defaults to now)
        #[clap(short, long, allow_negative_numbers = true)]
        date: Option<i64>,
    },

    /// Replace the title and text of a note
    Edit {
        /// ID of the note to edit
        id: u32,

        /// New title for the note
        #[clap(short = 'T', long)]
        title: String,

        /// New text for the note
        #[clap(short, long, default_value = "")]
        text: String,
    },

    /// Replace the message of a comment
    EditComment {
        /// ID of the comment to edit
        id: u32,

        /// New comment text
        #[clap(short, long)]
        message: String,

        /// ID of the comment this one replies to
        #[clap(short, long)]
        reply_to: Option<u32>,
    },

    /// Delete a note and all of its comments
    Delete {
        /// ID of the note to delete
        id: u32,
    },

    /// Delete a single comment
    DeleteComment {
        /// ID of the comment to delete
        id: u32,
    },

    /// Undo the deletion of a comment
    RestoreComment {
        /// ID of the comment to restore
        id: u32,
    },

    /// List active notes ordered by creation date
    List {
        /// Newest first
        #[clap(long, conflicts_with = "asc")]
        desc: bool,

        /// Oldest first
        #[clap(long)]
        asc: bool,
    },

    /// Show one note
    Show {
        /// ID of the note to show
        id: u32,
    },

    /// List the active comments of a note ordered by creation date
    Comments {
        /// ID of the note
        note_id: u32,

        /// Newest first
        #[clap(long, conflicts_with = "asc")]
        desc: bool,

        /// Oldest first
        #[clap(long)]
        asc: bool,
    },

    /// Print every stored note and comment, deleted ones included, as JSON
    Dump,
}
