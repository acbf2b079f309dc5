use std::sync::{Arc, Mutex};

use log::{debug, info, trace, warn};
use serde::{Deserialize, Serialize};

use crate::{Comment, CommentDraft, Note, NoteDraft, NotesError, Result};

/// Owns the notes and comments collections and keeps them consistent.
///
/// Records are never removed. Deletion sets a tombstone flag, and every
/// operation that changes a comment's state adjusts the parent's
/// `comments` counter in the same call.
#[derive(Debug, Default)]
pub struct NotesService {
    /// Notes in insertion order
    notes: Vec<Note>,

    /// Comments in insertion order
    comments: Vec<Comment>,

    /// Last id handed out for a note
    last_note_id: u32,

    /// Last id handed out for a comment
    last_comment_id: u32,
}

/// Full copy of both collections, tombstones included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceSnapshot {
    pub notes: Vec<Note>,
    pub comments: Vec<Comment>,
}

impl NotesService {
    /// Creates an empty service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a note and returns its newly assigned id.
    ///
    /// Ids start at 1 and grow by one per call. The comment counter of the
    /// stored note always starts at zero.
    pub fn add(&mut self, draft: NoteDraft) -> u32 {
        self.last_note_id += 1;
        let note = Note::from_draft(self.last_note_id, draft);
        self.notes.push(note);
        info!(
            "Added note {} ({} note(s) stored)",
            self.last_note_id,
            self.len_notes()
        );
        self.last_note_id
    }

    /// Attaches a comment to an active note and returns the comment id.
    ///
    /// # Errors
    ///
    /// `NoteNotFound` when no active note has `note_id`.
    pub fn create_comment(&mut self, draft: CommentDraft, note_id: u32) -> Result<u32> {
        let note_index = self
            .notes
            .iter()
            .position(|note| note.id == note_id && !note.deleted)
            .ok_or_else(|| {
                warn!("Cannot comment on note {}: no active note", note_id);
                NotesError::NoteNotFound { id: note_id }
            })?;

        self.last_comment_id += 1;
        let comment = Comment::from_draft(self.last_comment_id, note_id, draft);

        // A comment stored as a tombstone does not count towards the note.
        if !comment.deleted {
            self.notes[note_index].comments += 1;
        }

        self.comments.push(comment);
        info!(
            "Added comment {} to note {} ({} comment(s) stored)",
            self.last_comment_id,
            note_id,
            self.len_comments()
        );
        Ok(self.last_comment_id)
    }

    /// Tombstones a note together with all of its comments.
    ///
    /// The note's `comments` counter is left untouched.
    ///
    /// # Errors
    ///
    /// `NoteNotFound` when the note is absent or already deleted.
    pub fn delete(&mut self, note_id: u32) -> Result<bool> {
        let note = self
            .notes
            .iter_mut()
            .find(|note| note.id == note_id && !note.deleted)
            .ok_or_else(|| {
                warn!("Cannot delete note {}: no active note", note_id);
                NotesError::NoteNotFound { id: note_id }
            })?;
        note.deleted = true;

        let mut tombstoned = 0;
        for comment in self.comments.iter_mut().filter(|c| c.note_id == note_id) {
            comment.deleted = true;
            tombstoned += 1;
        }

        info!(
            "Deleted note {} and marked {} comment(s) as deleted",
            note_id, tombstoned
        );
        Ok(true)
    }

    /// Tombstones one comment and decrements its note's counter.
    ///
    /// # Errors
    ///
    /// `CommentNotFound` when the comment is absent or already deleted.
    pub fn delete_comment(&mut self, comment_id: u32) -> Result<bool> {
        let comment = self
            .comments
            .iter_mut()
            .find(|comment| comment.id == comment_id && !comment.deleted)
            .ok_or_else(|| {
                warn!("Cannot delete comment {}: no active comment", comment_id);
                NotesError::CommentNotFound {
                    id: comment_id,
                    of_note: false,
                }
            })?;
        comment.deleted = true;
        let note_id = comment.note_id;

        // The parent counts down even if it is itself deleted.
        if let Some(note) = self.notes.iter_mut().find(|note| note.id == note_id) {
            note.comments = note.comments.saturating_sub(1);
        }

        info!("Deleted comment {} of note {}", comment_id, note_id);
        Ok(true)
    }

    /// Replaces the title and text of an active note.
    ///
    /// # Errors
    ///
    /// `NoteNotFound` when the note is absent or deleted.
    pub fn edit(&mut self, draft: NoteDraft, note_id: u32) -> Result<bool> {
        let note = self
            .notes
            .iter_mut()
            .find(|note| note.id == note_id && !note.deleted)
            .ok_or_else(|| {
                warn!("Cannot edit note {}: no active note", note_id);
                NotesError::NoteNotFound { id: note_id }
            })?;

        note.title = draft.title;
        note.text = draft.text;

        info!("Edited note {}", note_id);
        Ok(true)
    }

    /// Replaces the message and reply target of an active comment.
    ///
    /// # Errors
    ///
    /// `CommentNotFound` when the comment is absent or deleted.
    pub fn edit_comment(&mut self, draft: CommentDraft, comment_id: u32) -> Result<bool> {
        let comment = self
            .comments
            .iter_mut()
            .find(|comment| comment.id == comment_id && !comment.deleted)
            .ok_or_else(|| {
                warn!("Cannot edit comment {}: no active comment", comment_id);
                NotesError::CommentNotFound {
                    id: comment_id,
                    of_note: false,
                }
            })?;

        comment.message = draft.message;
        comment.reply_to = draft.reply_to;

        info!("Edited comment {}", comment_id);
        Ok(true)
    }

    /// Returns the active notes ordered by creation date.
    ///
    /// Notes sharing a date keep their insertion order.
    pub fn get(&self, ascending: bool) -> Vec<Note> {
        let mut notes: Vec<Note> = self
            .notes
            .iter()
            .filter(|note| !note.deleted)
            .cloned()
            .collect();

        notes.sort_by(|a, b| {
            let cmp = a.date.cmp(&b.date);
            if ascending {
                cmp
            } else {
                cmp.reverse()
            }
        });

        debug!("Returning {} active note(s)", notes.len());
        notes
    }

    /// Returns the active note with the given id.
    ///
    /// Deleted notes are skipped while scanning, so a tombstone elsewhere in
    /// the collection never hides the target.
    ///
    /// # Errors
    ///
    /// `NoteNotFound` when the note is absent or deleted.
    pub fn get_by_id(&self, note_id: u32) -> Result<Note> {
        debug!("Retrieving note by ID: {}", note_id);
        self.notes
            .iter()
            .filter(|note| !note.deleted)
            .find(|note| note.id == note_id)
            .cloned()
            .ok_or_else(|| {
                debug!("Note not found: {}", note_id);
                NotesError::NoteNotFound { id: note_id }
            })
    }

    /// Returns the active comments of a note ordered by creation date,
    /// oldest first unless `descending` is set.
    ///
    /// # Errors
    ///
    /// * `NoteNotFound` when no note with `note_id` was ever added. Deleted
    ///   notes still count as existing here.
    /// * `CommentNotFound` when the note has no active comments.
    pub fn get_comments(&self, note_id: u32, descending: bool) -> Result<Vec<Comment>> {
        if !self.notes.iter().any(|note| note.id == note_id) {
            debug!("Note not found while listing comments: {}", note_id);
            return Err(NotesError::NoteNotFound { id: note_id });
        }

        let mut comments: Vec<Comment> = self
            .comments
            .iter()
            .filter(|comment| comment.note_id == note_id && !comment.deleted)
            .cloned()
            .collect();

        if comments.is_empty() {
            debug!("Note {} has no active comments", note_id);
            return Err(NotesError::CommentNotFound {
                id: note_id,
                of_note: true,
            });
        }

        comments.sort_by(|a, b| {
            let cmp = a.date.cmp(&b.date);
            if descending {
                cmp.reverse()
            } else {
                cmp
            }
        });

        trace!("Returning {} comment(s) for note {}", comments.len(), note_id);
        Ok(comments)
    }

    /// Clears the tombstone of a comment and counts it towards its note again.
    ///
    /// Returns `false`, changing nothing, when the comment is not deleted.
    ///
    /// # Errors
    ///
    /// `CommentNotFound` when no comment has `comment_id`.
    pub fn restore_comment(&mut self, comment_id: u32) -> Result<bool> {
        let comment = self
            .comments
            .iter_mut()
            .find(|comment| comment.id == comment_id)
            .ok_or_else(|| {
                warn!("Cannot restore comment {}: no such comment", comment_id);
                NotesError::CommentNotFound {
                    id: comment_id,
                    of_note: false,
                }
            })?;

        if !comment.deleted {
            debug!("Comment {} is not deleted, nothing to restore", comment_id);
            return Ok(false);
        }
        comment.deleted = false;
        let note_id = comment.note_id;

        if let Some(note) = self.notes.iter_mut().find(|note| note.id == note_id) {
            note.comments += 1;
        }

        info!("Restored comment {} of note {}", comment_id, note_id);
        Ok(true)
    }

    /// Copies both collections, tombstones included.
    pub fn snapshot(&self) -> ServiceSnapshot {
        ServiceSnapshot {
            notes: self.notes.clone(),
            comments: self.comments.clone(),
        }
    }

    /// Number of stored notes, deleted ones included
    pub fn len_notes(&self) -> usize {
        self.notes.len()
    }

    /// Number of stored comments, deleted ones included
    pub fn len_comments(&self) -> usize {
        self.comments.len()
    }

    /// Drops every record and restarts both id sequences.
    #[cfg(test)]
    pub(crate) fn reset(&mut self) {
        self.notes.clear();
        self.comments.clear();
        self.last_note_id = 0;
        self.last_comment_id = 0;
    }

    /// Looks a note up without filtering tombstones.
    #[cfg(test)]
    pub(crate) fn note_raw(&self, note_id: u32) -> Option<&Note> {
        self.notes.iter().find(|note| note.id == note_id)
    }

    /// Looks a comment up without filtering tombstones.
    #[cfg(test)]
    pub(crate) fn comment_raw(&self, comment_id: u32) -> Option<&Comment> {
        self.comments.iter().find(|comment| comment.id == comment_id)
    }
}

/// A `NotesService` behind a single lock.
///
/// Every call holds the lock for the whole operation, so an operation that
/// touches both collections is never observed half done.
#[derive(Debug, Clone, Default)]
pub struct SharedNotesService {
    inner: Arc<Mutex<NotesService>>,
}

impl SharedNotesService {
    pub fn new(service: NotesService) -> Self {
        Self {
            inner: Arc::new(Mutex::new(service)),
        }
    }

    /// Runs `f` with exclusive access to the service.
    pub fn with<T>(&self, f: impl FnOnce(&mut NotesService) -> Result<T>) -> Result<T> {
        let mut service = self
            .inner
            .lock()
            .map_err(|_| NotesError::LockAcquisitionFailed {
                message: "Failed to acquire lock on notes service".to_string(),
            })?;
        f(&mut service)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(title: &str, date: i64) -> NoteDraft {
        NoteDraft::new(title, format!("{} body", title), date)
    }

    fn comment(message: &str, date: i64) -> CommentDraft {
        CommentDraft::new(message, date)
    }

    #[test]
    fn add_assigns_sequential_ids() {
        let mut service = NotesService::new();
        assert_eq!(service.add(note("Note 3", 1649311475)), 1);
        assert_eq!(service.add(note("Note 2", 1649311465)), 2);
        assert_eq!(service.add(note("Note 1", 1649311455)), 3);
    }

    #[test]
    fn add_ids_keep_growing_after_deletes() {
        let mut service = NotesService::new();
        service.add(note("a", 1));
        service.add(note("b", 2));
        service.delete(2).unwrap();
        assert_eq!(service.add(note("c", 3)), 3);
    }

    #[test]
    fn reset_restarts_id_sequences() {
        let mut service = NotesService::new();
        service.add(note("a", 1));
        service.create_comment(comment("c", 2), 1).unwrap();
        service.reset();

        assert!(service.note_raw(1).is_none());
        assert!(service.comment_raw(1).is_none());
        assert_eq!(service.add(note("b", 3)), 1);
        assert_eq!(service.create_comment(comment("d", 4), 1).unwrap(), 1);
    }

    #[test]
    fn create_comment_increments_counter() {
        let mut service = NotesService::new();
        service.add(note("Note 1", 1649311455));
        service.create_comment(comment("Comment 1", 1649311460), 1).unwrap();
        service.create_comment(comment("Comment 2", 1649311450), 1).unwrap();
        let id = service
            .create_comment(comment("Comment 3", 1649311470), 1)
            .unwrap();

        assert_eq!(id, 3);
        assert_eq!(service.get_by_id(1).unwrap().comments, 3);
        assert_eq!(service.comment_raw(3).unwrap().note_id, 1);
    }

    #[test]
    fn create_comment_fails_for_unknown_or_deleted_note() {
        let mut service = NotesService::new();
        assert!(matches!(
            service.create_comment(comment("c", 1), 1),
            Err(NotesError::NoteNotFound { id: 1 })
        ));

        service.add(note("Note 1", 1));
        assert!(matches!(
            service.create_comment(comment("c", 1), 2),
            Err(NotesError::NoteNotFound { id: 2 })
        ));

        service.delete(1).unwrap();
        assert!(matches!(
            service.create_comment(comment("c", 1), 1),
            Err(NotesError::NoteNotFound { id: 1 })
        ));
        assert_eq!(service.len_comments(), 0);
    }

    #[test]
    fn tombstoned_draft_does_not_count() {
        let mut service = NotesService::new();
        service.add(note("Note 1", 1));
        service
            .create_comment(comment("hidden", 2).deleted(true), 1)
            .unwrap();

        assert_eq!(service.note_raw(1).unwrap().comments, 0);
        assert!(service.restore_comment(1).unwrap());
        assert_eq!(service.note_raw(1).unwrap().comments, 1);
    }

    #[test]
    fn delete_marks_note_and_its_comments() {
        let mut service = NotesService::new();
        service.add(note("Note 1", 1649311455));
        service.add(note("Note 2", 1649311465));
        service.create_comment(comment("Comment 1", 1649311460), 2).unwrap();
        service.create_comment(comment("Comment 2", 1649311450), 2).unwrap();

        assert!(service.delete(2).unwrap());

        let deleted = service.note_raw(2).unwrap();
        assert!(deleted.deleted);
        assert_eq!(deleted.comments, 2);
        assert!(service.comment_raw(1).unwrap().deleted);
        assert!(service.comment_raw(2).unwrap().deleted);
        assert!(!service.note_raw(1).unwrap().deleted);
    }

    #[test]
    fn delete_twice_fails() {
        let mut service = NotesService::new();
        service.add(note("Note 1", 1));
        service.delete(1).unwrap();
        assert!(matches!(
            service.delete(1),
            Err(NotesError::NoteNotFound { id: 1 })
        ));
        assert!(matches!(
            service.delete(3),
            Err(NotesError::NoteNotFound { id: 3 })
        ));
    }

    #[test]
    fn delete_comment_decrements_counter() {
        let mut service = NotesService::new();
        service.add(note("Note 1", 1));
        service.create_comment(comment("Comment 1", 2), 1).unwrap();

        assert!(service.delete_comment(1).unwrap());
        assert!(service.comment_raw(1).unwrap().deleted);
        assert_eq!(service.note_raw(1).unwrap().comments, 0);

        assert!(matches!(
            service.delete_comment(1),
            Err(NotesError::CommentNotFound { id: 1, of_note: false })
        ));
        assert!(matches!(
            service.delete_comment(2),
            Err(NotesError::CommentNotFound { id: 2, of_note: false })
        ));
        assert_eq!(service.note_raw(1).unwrap().comments, 0);
    }

    #[test]
    fn edit_keeps_identity_fields() {
        let mut service = NotesService::new();
        service.add(note("Note 1", 1649311455).owner(7));
        service.create_comment(comment("c", 1649311456), 1).unwrap();

        let replacement = NoteDraft::new("Note 2", "Text 2", 1649311465)
            .owner(9)
            .deleted(true);
        assert!(service.edit(replacement, 1).unwrap());

        let expected = Note {
            id: 1,
            owner_id: 7,
            title: "Note 2".to_string(),
            text: "Text 2".to_string(),
            date: 1649311455,
            comments: 1,
            deleted: false,
        };
        assert_eq!(service.note_raw(1), Some(&expected));
    }

    #[test]
    fn edit_fails_for_unknown_or_deleted_note() {
        let mut service = NotesService::new();
        service.add(note("Note 1", 1));
        assert!(matches!(
            service.edit(note("x", 2), 2),
            Err(NotesError::NoteNotFound { id: 2 })
        ));

        service.delete(1).unwrap();
        assert!(matches!(
            service.edit(note("x", 2), 1),
            Err(NotesError::NoteNotFound { id: 1 })
        ));
        assert_eq!(service.note_raw(1).unwrap().title, "Note 1");
    }

    #[test]
    fn edit_comment_keeps_identity_fields() {
        let mut service = NotesService::new();
        service.add(note("Note 1", 1649311455));
        service
            .create_comment(comment("Comment 1", 1649311460).owner(3), 1)
            .unwrap();

        let replacement = comment("Comment 2", 1649311450).owner(4).reply_to(Some(1));
        assert!(service.edit_comment(replacement, 1).unwrap());

        let expected = Comment {
            id: 1,
            note_id: 1,
            owner_id: 3,
            reply_to: Some(1),
            message: "Comment 2".to_string(),
            date: 1649311460,
            deleted: false,
        };
        assert_eq!(service.comment_raw(1), Some(&expected));
    }

    #[test]
    fn edit_comment_fails_for_unknown_or_deleted_comment() {
        let mut service = NotesService::new();
        service.add(note("Note 1", 1));
        service.create_comment(comment("Comment 1", 2), 1).unwrap();

        assert!(matches!(
            service.edit_comment(comment("x", 3), 2),
            Err(NotesError::CommentNotFound { id: 2, of_note: false })
        ));

        service.delete_comment(1).unwrap();
        assert!(matches!(
            service.edit_comment(comment("x", 3), 1),
            Err(NotesError::CommentNotFound { id: 1, of_note: false })
        ));
    }

    #[test]
    fn get_filters_tombstones_and_sorts() {
        let mut service = NotesService::new();
        service.add(note("Note 3", 1649311475));
        service.add(note("Note 2", 1649311465).deleted(true));
        service.add(note("Note 1", 1649311455));

        let ascending: Vec<u32> = service.get(true).iter().map(|n| n.id).collect();
        assert_eq!(ascending, vec![3, 1]);

        let descending: Vec<u32> = service.get(false).iter().map(|n| n.id).collect();
        assert_eq!(descending, vec![1, 3]);

        // The store itself keeps the tombstone.
        assert_eq!(service.len_notes(), 3);
        assert!(service.note_raw(2).unwrap().deleted);
    }

    #[test]
    fn get_by_id_skips_unrelated_tombstones() {
        let mut service = NotesService::new();
        service.add(note("Note 1", 1).deleted(true));
        service.add(note("Note 2", 2));

        assert_eq!(service.get_by_id(2).unwrap().title, "Note 2");
        assert!(matches!(
            service.get_by_id(1),
            Err(NotesError::NoteNotFound { id: 1 })
        ));
        assert!(matches!(
            service.get_by_id(5),
            Err(NotesError::NoteNotFound { id: 5 })
        ));
    }

    #[test]
    fn get_comments_sorts_active_comments() {
        let mut service = NotesService::new();
        service.add(note("Note 1", 1649311455));
        service
            .create_comment(comment("Comment 1", 1649311460).deleted(true), 1)
            .unwrap();
        service.create_comment(comment("Comment 3", 1649311470), 1).unwrap();
        service.create_comment(comment("Comment 2", 1649311450), 1).unwrap();

        let ascending: Vec<u32> = service
            .get_comments(1, false)
            .unwrap()
            .iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ascending, vec![3, 2]);

        let descending: Vec<u32> = service
            .get_comments(1, true)
            .unwrap()
            .iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(descending, vec![2, 3]);
    }

    #[test]
    fn get_comments_error_cases() {
        let mut service = NotesService::new();
        service.add(note("Note 1", 1));
        assert!(matches!(
            service.get_comments(1, false),
            Err(NotesError::CommentNotFound {
                id: 1,
                of_note: true
            })
        ));

        service.create_comment(comment("c", 2), 1).unwrap();
        assert!(matches!(
            service.get_comments(2, false),
            Err(NotesError::NoteNotFound { id: 2 })
        ));

        // A deleted note still exists for this check, but its comments are gone.
        service.delete(1).unwrap();
        assert!(matches!(
            service.get_comments(1, false),
            Err(NotesError::CommentNotFound { .. })
        ));
    }

    #[test]
    fn restore_comment_round_trip() {
        let mut service = NotesService::new();
        service.add(note("Note 1", 1649311455));
        service.create_comment(comment("Comment 1", 1649311460), 1).unwrap();

        assert!(!service.restore_comment(1).unwrap());
        assert_eq!(service.note_raw(1).unwrap().comments, 1);

        service.delete_comment(1).unwrap();
        assert!(service.restore_comment(1).unwrap());

        let restored = service.comment_raw(1).unwrap();
        assert!(!restored.deleted);
        assert_eq!(restored.message, "Comment 1");
        assert_eq!(service.note_raw(1).unwrap().comments, 1);

        assert!(matches!(
            service.restore_comment(2),
            Err(NotesError::CommentNotFound { id: 2, of_note: false })
        ));
    }

    #[test]
    fn comment_of_deleted_note_still_moves_counter() {
        let mut service = NotesService::new();
        service.add(note("Note 1", 1));
        service.create_comment(comment("Comment 1", 2), 1).unwrap();
        service.delete(1).unwrap();
        assert_eq!(service.note_raw(1).unwrap().comments, 1);

        assert!(service.restore_comment(1).unwrap());
        assert!(!service.comment_raw(1).unwrap().deleted);
        assert_eq!(service.note_raw(1).unwrap().comments, 2);

        assert!(service.delete_comment(1).unwrap());
        assert!(service.comment_raw(1).unwrap().deleted);
        assert_eq!(service.note_raw(1).unwrap().comments, 1);
        assert!(service.note_raw(1).unwrap().deleted);
    }

    #[test]
    fn snapshot_includes_tombstones() {
        let mut service = NotesService::new();
        service.add(note("Note 1", 1));
        service.create_comment(comment("c", 2), 1).unwrap();
        service.delete(1).unwrap();

        let snapshot = service.snapshot();
        assert_eq!(snapshot.notes.len(), 1);
        assert!(snapshot.notes[0].deleted);
        assert!(snapshot.comments[0].deleted);
    }

    #[test]
    fn shared_service_assigns_unique_ids_across_threads() {
        let shared = SharedNotesService::default();
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let shared = shared.clone();
                std::thread::spawn(move || {
                    (0..25)
                        .map(|j| {
                            shared
                                .with(|svc| Ok(svc.add(note("n", i * 100 + j))))
                                .unwrap()
                        })
                        .collect::<Vec<u32>>()
                })
            })
            .collect();

        let mut ids: Vec<u32> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        ids.sort_unstable();
        assert_eq!(ids, (1..=200).collect::<Vec<u32>>());
    }

    #[test]
    fn shared_service_propagates_errors() {
        let shared = SharedNotesService::new(NotesService::new());
        let result = shared.with(|svc| svc.get_by_id(1));
        assert!(matches!(result, Err(NotesError::NoteNotFound { id: 1 })));
    }
}
