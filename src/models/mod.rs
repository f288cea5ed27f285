use serde::{Deserialize, Serialize};

/// A note as stored by the content service.
///
/// The wire names differ from ours: `content` is the body and `parentId`
/// is the parent reference.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Note {
    pub id: String,

    pub title: String,

    #[serde(rename = "content", default)]
    pub body: String,

    /// Parent note id. `None` (or empty, as some backends send) marks a root.
    #[serde(rename = "parentId", default)]
    pub parent_id: Option<String>,
}

impl Note {
    pub fn parent_ref(&self) -> Option<&str> {
        self.parent_id.as_deref().filter(|p| !p.is_empty())
    }

    pub fn is_root(&self) -> bool {
        self.parent_ref().is_none()
    }

    pub fn field(&self, field: NoteField) -> &str {
        match field {
            NoteField::Title => &self.title,
            NoteField::Body => &self.body,
        }
    }

    pub(crate) fn with_field(&self, field: NoteField, value: &str) -> Note {
        let mut next = self.clone();
        match field {
            NoteField::Title => next.title = value.to_string(),
            NoteField::Body => next.body = value.to_string(),
        }
        next
    }
}

/// The two independently synced fields of a note.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NoteField {
    Title,
    Body,
}

/// One field group per update call. Title and body are never sent together.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(untagged)]
pub enum NotePatch {
    Title { title: String },
    Body { content: String },
}

impl NotePatch {
    pub fn new(field: NoteField, value: String) -> Self {
        match field {
            NoteField::Title => NotePatch::Title { title: value },
            NoteField::Body => NotePatch::Body { content: value },
        }
    }

    pub fn field(&self) -> NoteField {
        match self {
            NotePatch::Title { .. } => NoteField::Title,
            NotePatch::Body { .. } => NoteField::Body,
        }
    }

    pub fn value(&self) -> &str {
        match self {
            NotePatch::Title { title } => title,
            NotePatch::Body { content } => content,
        }
    }
}
