// src/ports/terminal.rs
use crate::domain::{DomainError, Note, ProfileView};
use crate::util::text::summary;
use chrono::{DateTime, Local, TimeZone, Utc};
use std::fmt::Write;

const SUMMARY_WIDTH: usize = 60;
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Static, user-facing text for each failure kind.
pub fn alert_message(error: &DomainError) -> &'static str {
    match error {
        DomainError::NoteNotFound(_) => "That note no longer exists.",
        DomainError::EmptyNote => "Please enter some text or attach an image.",
        DomainError::NotAuthenticated => "You are not signed in. Run `pnote login` first.",
        DomainError::InvalidInput(_) => "The request was rejected. Please check your input.",
        DomainError::Backend(_) => "Could not reach the note service. Please try again.",
        DomainError::Storage(_) => "Could not access the local session file.",
    }
}

/// Plain-text rendering of notes and profiles for the terminal.
#[derive(Debug, Default)]
pub struct TerminalPresenter {
    utc: bool,
}

impl TerminalPresenter {
    pub fn new() -> Self {
        Self { utc: false }
    }

    /// Render times in UTC instead of the local zone.
    #[cfg(test)]
    pub(crate) fn with_utc() -> Self {
        Self { utc: true }
    }

    pub fn format_timestamp(&self, millis: i64) -> String {
        match Utc.timestamp_millis_opt(millis).single() {
            Some(time) if self.utc => time.format(TIME_FORMAT).to_string(),
            Some(time) => time.with_timezone(&Local).format(TIME_FORMAT).to_string(),
            None => "-".to_string(),
        }
    }

    fn format_date(&self, time: &DateTime<Utc>) -> String {
        if self.utc {
            time.format("%B %Y").to_string()
        } else {
            time.with_timezone(&Local).format("%B %Y").to_string()
        }
    }

    /// One line per note, newest first.
    pub fn render_list(&self, notes: &[Note]) -> String {
        if notes.is_empty() {
            return "No notes yet. Add one with `pnote add`.\n".to_string();
        }

        let mut out = String::new();
        for note in notes.iter().rev() {
            let _ = writeln!(
                out,
                "{} {:>6}  {}  {}{}",
                if note.done { "[x]" } else { "[ ]" },
                note.id,
                self.format_timestamp(note.timestamp),
                summary(&note.text, SUMMARY_WIDTH),
                if note.image.is_some() { "  [image]" } else { "" },
            );
        }
        out
    }

    pub fn render_note(&self, note: &Note) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Note {}", note.id);
        let _ = writeln!(out, "Created: {}", self.format_timestamp(note.timestamp));
        let _ = writeln!(out, "Done:    {}", if note.done { "yes" } else { "no" });
        if let Some(image) = &note.image {
            let _ = writeln!(out, "Image:   {}", image);
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", note.text);
        out
    }

    pub fn render_profile(&self, view: &ProfileView) -> String {
        let profile = &view.profile;
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Name:   {}",
            profile.display_name.as_deref().unwrap_or("(not set)")
        );
        let _ = writeln!(out, "Email:  {}", view.email.as_deref().unwrap_or("-"));
        if let Some(phone) = &profile.phone {
            let _ = writeln!(out, "Phone:  {}", phone);
        }
        if let Some(created) = &view.created_at {
            let _ = writeln!(out, "Joined: {}", self.format_date(created));
        }
        if let Some(avatar) = &profile.avatar_url {
            let _ = writeln!(out, "Avatar: {}", avatar);
        }
        out
    }
}
