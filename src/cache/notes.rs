//! Whole-value transforms over the local note cache.
//!
//! Every function returns a fresh vector; callers publish it with a single
//! signal `set`, so readers never see a half-applied change.

use crate::models::{Note, NoteField};

pub fn append_note(notes: &[Note], note: Note) -> Vec<Note> {
    let mut next = Vec::with_capacity(notes.len() + 1);
    next.extend_from_slice(notes);
    next.push(note);
    next
}

/// Swaps in the store's canonical copy. `None` when the id is not cached.
pub fn replace_note(notes: &[Note], note: &Note) -> Option<Vec<Note>> {
    if !notes.iter().any(|n| n.id == note.id) {
        return None;
    }

    Some(
        notes
            .iter()
            .map(|n| if n.id == note.id { note.clone() } else { n.clone() })
            .collect(),
    )
}

/// Optimistic single-field edit. `None` when the id is not cached.
pub fn set_field(notes: &[Note], id: &str, field: NoteField, value: &str) -> Option<Vec<Note>> {
    if !notes.iter().any(|n| n.id == id) {
        return None;
    }

    Some(
        notes
            .iter()
            .map(|n| {
                if n.id == id {
                    n.with_field(field, value)
                } else {
                    n.clone()
                }
            })
            .collect(),
    )
}

/// Drops `id` and every note whose parent is `id`.
///
/// This is a local cascade only; it does not assume anything about what the
/// store did with the children. Returns the remaining notes and the removed
/// ids in cache order.
pub fn remove_cascade(notes: &[Note], id: &str) -> (Vec<Note>, Vec<String>) {
    let mut kept = Vec::with_capacity(notes.len());
    let mut removed = Vec::new();

    for n in notes {
        if n.id == id || n.parent_ref() == Some(id) {
            removed.push(n.id.clone());
        } else {
            kept.push(n.clone());
        }
    }

    (kept, removed)
}
