// src/application/note_store.rs
use crate::application::NoteRepository;
use crate::domain::note::is_blank;
use crate::domain::{DomainError, NewNote, Note, NoteChanges};
use tracing::{debug, info, instrument};

/// Owned mirror of the remote notes table.
///
/// Every mutation issues exactly one remote call and only touches the local
/// list after that call succeeds, so a failure leaves the list as it was.
pub struct NoteStore<R: NoteRepository> {
    repository: R,
    notes: Vec<Note>,
}

impl<R: NoteRepository> NoteStore<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository,
            notes: Vec::new(),
        }
    }

    /// Replace the local list with a fresh fetch of all rows.
    #[instrument(level = "debug", skip(self))]
    pub fn load(&mut self) -> Result<&[Note], DomainError> {
        self.notes = self.repository.list_notes()?;
        debug!(count = self.notes.len(), "Loaded notes");
        Ok(&self.notes)
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn get(&self, id: i64) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn repository_mut(&mut self) -> &mut R {
        &mut self.repository
    }

    /// Insert a note and append the backend row.
    ///
    /// Blank text without an image is rejected before any remote call.
    #[instrument(level = "debug", skip(self, text))]
    pub fn create(&mut self, text: &str, image: Option<String>) -> Result<Note, DomainError> {
        if is_blank(text, image.as_deref()) {
            return Err(DomainError::EmptyNote);
        }

        let row = self.repository.insert_note(&NewNote::new(text, image))?;
        info!(note_id = row.id, "Created note");
        self.notes.push(row.clone());
        Ok(row)
    }

    /// Flip `done` remotely and locally. Unknown ids are a no-op.
    #[instrument(level = "debug", skip(self))]
    pub fn toggle_done(&mut self, id: i64) -> Result<Option<Note>, DomainError> {
        let Some(current) = self.get(id) else {
            debug!(note_id = id, "Toggle ignored, note not in list");
            return Ok(None);
        };

        let changes = NoteChanges::done(!current.done);
        let row = self.repository.update_note(id, &changes)?;
        self.replace_local(row.clone());
        Ok(Some(row))
    }

    pub fn delete(&mut self, id: i64) -> Result<usize, DomainError> {
        self.delete_many(&[id])
    }

    /// Delete rows remotely, then drop the acknowledged ones from the list.
    ///
    /// Rows the backend did not report as deleted stay in the list. Returns
    /// how many local entries were removed.
    #[instrument(level = "debug", skip(self))]
    pub fn delete_many(&mut self, ids: &[i64]) -> Result<usize, DomainError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let deleted = self.repository.delete_notes(ids)?;
        if deleted.len() != ids.len() {
            debug!(
                requested = ids.len(),
                deleted = deleted.len(),
                "Backend deleted fewer rows than requested"
            );
        }

        let before = self.notes.len();
        self.notes.retain(|n| !deleted.contains(&n.id));
        let removed = before - self.notes.len();
        info!(removed, "Deleted notes");
        Ok(removed)
    }

    /// Write text and image of `note` to the row with the same id.
    #[instrument(level = "debug", skip(self, note), fields(note_id = note.id))]
    pub fn update(&mut self, note: &Note) -> Result<Note, DomainError> {
        if note.is_blank() {
            return Err(DomainError::EmptyNote);
        }

        let row = self
            .repository
            .update_note(note.id, &NoteChanges::content(note))?;
        self.replace_local(row.clone());
        info!(note_id = row.id, "Updated note");
        Ok(row)
    }

    fn replace_local(&mut self, row: Note) {
        match self.notes.iter_mut().find(|n| n.id == row.id) {
            Some(slot) => *slot = row,
            // Remote has it even though our last fetch did not
            None => self.notes.push(row),
        }
    }
}
