//! Script runner for the notes service
//!
//! Each input line is one command. Commands run against a single shared
//! service, so later lines see the effects of earlier ones.
use std::io::{BufRead, Write};

use clap::{error::ErrorKind, Parser};
use log::{debug, info, warn};
use serde::Serialize;

use crate::{
    now_timestamp, render_comment, render_list, render_note, split_command_line, CommentDraft,
    Commands, Config, NoteDraft, NotesError, Result, SharedNotesService, ShellLine,
};

/// Counters reported after a script has been run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Commands that were parsed and attempted
    pub executed: usize,
    /// Commands that failed to parse or returned an error
    pub failed: usize,
}

/// CLI Application handler - executes commands against the notes service
pub struct App {
    /// The service every command operates on
    service: SharedNotesService,

    /// Application configuration
    config: Config,

    /// Whether results are printed as JSON
    json: bool,
}

impl App {
    /// Create a new application. `json` forces JSON output even when the
    /// config asks for text.
    pub fn new(service: SharedNotesService, config: Config, json: bool) -> Self {
        let json = json || config.json_output;
        Self {
            service,
            config,
            json,
        }
    }

    /// Runs every line of `input`, writing results and errors to `output`.
    ///
    /// Command failures are reported and the run continues; only I/O errors
    /// abort it.
    pub fn run<R: BufRead, W: Write>(&self, input: R, mut output: W) -> Result<RunSummary> {
        let mut summary = RunSummary::default();

        for (index, line) in input.lines().enumerate() {
            let line = line?;
            match self.execute_line(&line) {
                Ok(None) => continue,
                Ok(Some(result)) => {
                    summary.executed += 1;
                    writeln!(output, "{}", result)?;
                }
                Err(e) => {
                    summary.executed += 1;
                    summary.failed += 1;
                    warn!("Line {} failed: {}", index + 1, e);
                    writeln!(output, "error: {}", e)?;
                }
            }
        }

        info!(
            "Script finished: {} command(s), {} failed",
            summary.executed, summary.failed
        );
        Ok(summary)
    }

    /// Parses and executes one line. Blank and `#` lines yield `None`.
    pub fn execute_line(&self, line: &str) -> Result<Option<String>> {
        let words = split_command_line(line)?;
        if words.is_empty() {
            return Ok(None);
        }

        let parsed = match ShellLine::try_parse_from(words) {
            Ok(parsed) => parsed,
            Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
                return Ok(Some(e.to_string()));
            }
            Err(e) => {
                return Err(NotesError::CommandError {
                    message: e.to_string().trim_end().to_string(),
                })
            }
        };

        debug!("Executing {:?}", parsed.command);
        self.execute(parsed.command).map(Some)
    }

    /// Executes one command and renders its result.
    pub fn execute(&self, command: Commands) -> Result<String> {
        match command {
            Commands::Add {
                title,
                text,
                owner,
                date,
                deleted,
            } => {
                let draft = NoteDraft {
                    owner_id: owner.unwrap_or(self.config.default_owner_id),
                    title,
                    text,
                    date: date.unwrap_or_else(now_timestamp),
                    deleted,
                };
                let id = self.service.with(|svc| Ok(svc.add(draft)))?;
                self.render_created("Note", id)
            }

            Commands::Comment {
                note_id,
                message,
                owner,
                reply_to,
                date,
            } => {
                let draft = CommentDraft::new(message, date.unwrap_or_else(now_timestamp))
                    .owner(owner.unwrap_or(self.config.default_owner_id))
                    .reply_to(reply_to);
                let id = self
                    .service
                    .with(|svc| svc.create_comment(draft, note_id))?;
                self.render_created("Comment", id)
            }

            Commands::Edit { id, title, text } => {
                let draft = NoteDraft::new(title, text, 0);
                let ok = self.service.with(|svc| svc.edit(draft, id))?;
                self.render_outcome(ok, format!("Note {} updated", id))
            }

            Commands::EditComment {
                id,
                message,
                reply_to,
            } => {
                let draft = CommentDraft::new(message, 0).reply_to(reply_to);
                let ok = self.service.with(|svc| svc.edit_comment(draft, id))?;
                self.render_outcome(ok, format!("Comment {} updated", id))
            }

            Commands::Delete { id } => {
                let ok = self.service.with(|svc| svc.delete(id))?;
                self.render_outcome(ok, format!("Note {} deleted", id))
            }

            Commands::DeleteComment { id } => {
                let ok = self.service.with(|svc| svc.delete_comment(id))?;
                self.render_outcome(ok, format!("Comment {} deleted", id))
            }

            Commands::RestoreComment { id } => {
                let restored = self.service.with(|svc| svc.restore_comment(id))?;
                let message = if restored {
                    format!("Comment {} restored", id)
                } else {
                    format!("Comment {} was not deleted", id)
                };
                self.render_outcome(restored, message)
            }

            Commands::List { desc, asc } => {
                let ascending = if desc {
                    false
                } else {
                    asc || self.config.notes_ascending
                };
                let notes = self.service.with(|svc| Ok(svc.get(ascending)))?;

                if self.json {
                    return to_json(&notes);
                }
                if notes.is_empty() {
                    return Ok("No notes found.".to_string());
                }
                Ok(render_list(notes.iter().map(render_note).collect(), "note"))
            }

            Commands::Show { id } => {
                let note = self.service.with(|svc| svc.get_by_id(id))?;
                if self.json {
                    return to_json(&note);
                }
                Ok(render_note(&note))
            }

            Commands::Comments { note_id, desc, asc } => {
                let descending = if asc {
                    false
                } else {
                    desc || self.config.comments_descending
                };
                let comments = self
                    .service
                    .with(|svc| svc.get_comments(note_id, descending))?;

                if self.json {
                    return to_json(&comments);
                }
                Ok(render_list(
                    comments.iter().map(render_comment).collect(),
                    "comment",
                ))
            }

            Commands::Dump => {
                let snapshot = self.service.with(|svc| Ok(svc.snapshot()))?;
                to_json(&snapshot)
            }
        }
    }

    fn render_created(&self, kind: &str, id: u32) -> Result<String> {
        if self.json {
            return to_json(&serde_json::json!({ "id": id }));
        }
        Ok(format!("{} created with ID: {}", kind, id))
    }

    fn render_outcome(&self, ok: bool, message: String) -> Result<String> {
        if self.json {
            return to_json(&serde_json::json!({ "ok": ok }));
        }
        Ok(message)
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
