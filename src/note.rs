//! Note records and the caller-side draft used to create or edit them.
use serde::{Deserialize, Serialize};

/// A note as stored by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Sequential identifier, starting at 1
    pub id: u32,
    /// Owner of the note
    pub owner_id: u32,
    /// Note title
    pub title: String,
    /// Note body
    pub text: String,
    /// Creation time in epoch seconds, supplied by the caller
    pub date: i64,
    /// Number of active comments attached to this note
    pub comments: u32,
    /// Tombstone flag
    pub deleted: bool,
}

impl Note {
    /// Builds a stored note from a draft. Only the service assigns ids.
    pub(crate) fn from_draft(id: u32, draft: NoteDraft) -> Self {
        Note {
            id,
            owner_id: draft.owner_id,
            title: draft.title,
            text: draft.text,
            date: draft.date,
            comments: 0,
            deleted: draft.deleted,
        }
    }
}

/// Caller-supplied fields of a note.
///
/// `edit` only takes `title` and `text` from a draft; the remaining fields
/// are fixed by the record being edited.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteDraft {
    pub owner_id: u32,
    pub title: String,
    pub text: String,
    pub date: i64,
    /// Stores the note as a tombstone straight away
    #[serde(default)]
    pub deleted: bool,
}

impl NoteDraft {
    /// Creates a draft with the given title, body and creation date.
    pub fn new(title: impl Into<String>, text: impl Into<String>, date: i64) -> Self {
        NoteDraft {
            title: title.into(),
            text: text.into(),
            date,
            ..Default::default()
        }
    }

    pub fn owner(mut self, owner_id: u32) -> Self {
        self.owner_id = owner_id;
        self
    }

    pub fn deleted(mut self, deleted: bool) -> Self {
        self.deleted = deleted;
        self
    }
}
