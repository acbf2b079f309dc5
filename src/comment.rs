//! Comment records attached to notes.
use serde::{Deserialize, Serialize};

/// A comment as stored by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Sequential identifier, independent of note ids
    pub id: u32,
    /// Parent note
    pub note_id: u32,
    pub owner_id: u32,
    /// Comment this one answers; stored but never interpreted
    pub reply_to: Option<u32>,
    pub message: String,
    /// Creation time in epoch seconds, supplied by the caller
    pub date: i64,
    pub deleted: bool,
}

impl Comment {
    pub(crate) fn from_draft(id: u32, note_id: u32, draft: CommentDraft) -> Self {
        Comment {
            id,
            note_id,
            owner_id: draft.owner_id,
            reply_to: draft.reply_to,
            message: draft.message,
            date: draft.date,
            deleted: draft.deleted,
        }
    }
}

/// Caller-supplied fields of a comment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentDraft {
    pub owner_id: u32,
    #[serde(default)]
    pub reply_to: Option<u32>,
    pub message: String,
    pub date: i64,
    #[serde(default)]
    pub deleted: bool,
}

impl CommentDraft {
    pub fn new(message: impl Into<String>, date: i64) -> Self {
        CommentDraft {
            message: message.into(),
            date,
            ..Default::default()
        }
    }

    pub fn owner(mut self, owner_id: u32) -> Self {
        self.owner_id = owner_id;
        self
    }

    pub fn reply_to(mut self, comment_id: Option<u32>) -> Self {
        self.reply_to = comment_id;
        self
    }

    pub fn deleted(mut self, deleted: bool) -> Self {
        self.deleted = deleted;
        self
    }
}
