use chrono::{DateTime, Utc};
use log::trace;

use crate::{Comment, Note, NotesError, Result};

/// Splits a shell line into words, honouring quotes.
///
/// Returns an empty vector for blank lines and `#` comments.
pub fn split_command_line(line: &str) -> Result<Vec<String>> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(Vec::new());
    }

    let words = shell_words::split(trimmed).map_err(|e| NotesError::CommandError {
        message: format!("Failed to parse command line: {}", e),
    })?;
    trace!("Split command line into {} word(s)", words.len());
    Ok(words)
}

/// Current time in epoch seconds, used when a command omits `--date`
pub fn now_timestamp() -> i64 {
    Utc::now().timestamp()
}

/// Renders an epoch-seconds date, falling back to the raw number when it is
/// out of chrono's range.
pub fn format_date(date: i64) -> String {
    DateTime::<Utc>::from_timestamp(date, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| date.to_string())
}

/// Width of the separator printed between listed records
pub fn separator_width() -> usize {
    terminal_size::terminal_size()
        .map(|(w, _)| w.0 as usize)
        .unwrap_or(80)
        .min(50)
}

/// Text block for one note
pub fn render_note(note: &Note) -> String {
    let mut out = format!(
        "ID: {} | Owner: {} | Created: {} | Comments: {}\n",
        note.id,
        note.owner_id,
        format_date(note.date),
        note.comments
    );
    out.push_str(&format!("Title: {}\n", console::style(&note.title).bold()));
    if !note.text.is_empty() {
        out.push_str(&format!("\n{}\n", note.text));
    }
    out
}

/// Text block for one comment
pub fn render_comment(comment: &Comment) -> String {
    let reply = comment
        .reply_to
        .map(|id| format!(" | Reply to: {}", id))
        .unwrap_or_default();
    format!(
        "ID: {} | Note: {} | Owner: {} | Created: {}{}\n{}\n",
        comment.id,
        comment.note_id,
        comment.owner_id,
        format_date(comment.date),
        reply,
        console::style(&comment.message).cyan()
    )
}

/// Joins rendered blocks with a separator and a trailing count line.
pub fn render_list(blocks: Vec<String>, noun: &str) -> String {
    let count = blocks.len();
    let separator = format!("{}\n", "-".repeat(separator_width()));
    let mut out = blocks.join(&separator);
    out.push_str(&format!(
        "\nFound {} {}{}",
        count,
        noun,
        if count == 1 { "" } else { "s" }
    ));
    out
}
