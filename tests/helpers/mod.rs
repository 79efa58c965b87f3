use pnote::application::NoteStore;
use pnote::domain::Note;
use pnote::util::testing::{note, MockNoteRepository};

/// Store loaded from a mock table holding `count` notes with ids 1..=count.
pub fn loaded_store(count: i64) -> NoteStore<MockNoteRepository> {
    let mock = MockNoteRepository::builder()
        .with_notes((1..=count).map(|id| note(id, &format!("note {}", id))))
        .build();
    let mut store = NoteStore::new(mock);
    store.load().expect("Load should succeed");
    store
}

pub fn ids(notes: &[Note]) -> Vec<i64> {
    notes.iter().map(|n| n.id).collect()
}
