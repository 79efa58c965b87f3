// src/domain/note.rs
use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize};

/// A row of the notes table as the backend returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: i64,
    /// Image-only rows may carry a null or missing text column.
    #[serde(default, deserialize_with = "nullable_text")]
    pub text: String,
    #[serde(default)]
    pub done: bool,
    /// Creation time in epoch milliseconds, set by the client.
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default)]
    pub image: Option<String>,
}

impl Note {
    /// A note with neither text nor image carries nothing worth storing.
    pub fn is_blank(&self) -> bool {
        is_blank(&self.text, self.image.as_deref())
    }
}

/// Insert payload; the backend assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewNote {
    pub text: String,
    pub done: bool,
    pub timestamp: i64,
    pub image: Option<String>,
}

impl NewNote {
    pub fn new(text: impl Into<String>, image: Option<String>) -> Self {
        Self {
            text: text.into(),
            done: false,
            timestamp: now_millis(),
            image,
        }
    }
}

/// Partial update of a note row. Absent fields are left alone remotely.
///
/// `image` is doubly optional: `Some(None)` clears the column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NoteChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub done: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<Option<String>>,
}

impl NoteChanges {
    pub fn done(done: bool) -> Self {
        Self {
            done: Some(done),
            ..Self::default()
        }
    }

    /// Full-record content update: text and image both written.
    pub fn content(note: &Note) -> Self {
        Self {
            text: Some(note.text.clone()),
            done: None,
            image: Some(note.image.clone()),
        }
    }

    /// Apply the same change locally.
    pub fn apply_to(&self, note: &mut Note) {
        if let Some(text) = &self.text {
            note.text = text.clone();
        }
        if let Some(done) = self.done {
            note.done = done;
        }
        if let Some(image) = &self.image {
            note.image = image.clone();
        }
    }
}

fn nullable_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

pub(crate) fn is_blank(text: &str, image: Option<&str>) -> bool {
    text.trim().is_empty() && image.is_none()
}

pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
