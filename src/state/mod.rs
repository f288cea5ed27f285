mod note_sync;

pub use note_sync::NoteSyncController;

use crate::hierarchy::{build_hierarchy, RootNode};
use crate::models::Note;
use crate::sync::{SyncError, SyncOp};
use leptos::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// What the notification surface shows. Messages are fixed per operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub op: SyncOp,
    pub message: &'static str,
}

impl Notice {
    pub fn success(op: SyncOp) -> Option<Self> {
        op.success_message().map(|message| Self {
            level: NoticeLevel::Success,
            op,
            message,
        })
    }

    pub fn failure(op: SyncOp) -> Self {
        Self {
            level: NoticeLevel::Error,
            op,
            message: op.failure_message(),
        }
    }
}

/// Title being edited, kept apart from the committed title until commit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TitleDraft {
    pub id: String,
    pub draft: String,
}

/// Selection and title editing, seen together.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EditState {
    Idle,
    Viewing(String),
    EditingTitle { id: String, draft: String },
}

/// Reactive state shared with the rendering layer.
#[derive(Clone, Copy)]
pub struct NotesState {
    /// Arrival order. Replaced wholesale on every change.
    pub notes: RwSignal<Vec<Note>>,

    /// Working copy of the active note, kept in step with its cache entry.
    pub selected: RwSignal<Option<Note>>,

    pub title_edit: RwSignal<Option<TitleDraft>>,

    pub notice: RwSignal<Option<Notice>>,
    pub last_error: RwSignal<Option<SyncError>>,

    pub notes_loading: RwSignal<bool>,
    /// Guards `load` against stale responses.
    pub notes_request_id: RwSignal<u64>,
}

impl NotesState {
    pub fn new() -> Self {
        Self {
            notes: RwSignal::new(vec![]),
            selected: RwSignal::new(None),
            title_edit: RwSignal::new(None),
            notice: RwSignal::new(None),
            last_error: RwSignal::new(None),
            notes_loading: RwSignal::new(false),
            notes_request_id: RwSignal::new(0),
        }
    }

    /// Tree view of the cache. Tracked, so views re-derive on change.
    pub fn hierarchy(&self) -> Vec<RootNode> {
        self.notes.with(|notes| build_hierarchy(notes))
    }

    pub fn selected_id(&self) -> Option<String> {
        self.selected.with_untracked(|s| s.as_ref().map(|n| n.id.clone()))
    }

    pub fn edit_state(&self) -> EditState {
        if let Some(t) = self.title_edit.get() {
            return EditState::EditingTitle {
                id: t.id,
                draft: t.draft,
            };
        }
        match self.selected.get() {
            Some(n) => EditState::Viewing(n.id),
            None => EditState::Idle,
        }
    }

    pub(crate) fn find_untracked(&self, id: &str) -> Option<Note> {
        self.notes
            .with_untracked(|notes| notes.iter().find(|n| n.id == id).cloned())
    }
}

impl Default for NotesState {
    fn default() -> Self {
        Self::new()
    }
}
