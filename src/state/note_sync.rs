use crate::api::{ApiClient, ApiError, ContentStore};
use crate::cache::{append_note, remove_cascade, replace_note, set_field};
use crate::config::{CoalesceWindows, EnvConfig};
use crate::hierarchy::{orphans, resolve_parent, RootNode};
use crate::models::{Note, NoteField, NotePatch};
use crate::state::{Notice, NotesState, TitleDraft};
use crate::sync::{BrowserRuntime, Runtime, SyncError, SyncOp, WriteCoalescer, WriteKey};
use leptos::logging::{error, log, warn};
use leptos::prelude::*;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Responses are applied only if the epoch they were issued under is still current.
#[derive(Default)]
struct Epochs {
    global: u64,
    per_note: HashMap<String, u64>,
}

impl Epochs {
    fn current(&self, id: &str) -> (u64, u64) {
        (self.global, self.per_note.get(id).copied().unwrap_or(0))
    }

    fn bump(&mut self, id: &str) {
        *self.per_note.entry(id.to_string()).or_insert(0) += 1;
    }

    /// Every older response is stale under the new global epoch, so the
    /// per-note counters can start over.
    fn bump_all(&mut self) {
        self.global += 1;
        self.per_note.clear();
    }
}

/// Optimistic, debounced sync of the note cache with the content store.
///
/// Responsibilities:
/// - local edits land in the cache and selection immediately
/// - per-(note, field) debounce of outgoing writes
/// - merging store responses back (the store wins)
/// - cancelling pending and in-flight writes for deleted notes / on teardown
///
/// Non-responsibilities:
/// - rendering, focus handling, notification display
/// - retries: a failed write keeps the local value and waits for the next edit
pub struct NoteSyncController<S: ContentStore, R: Runtime> {
    store: S,
    runtime: R,
    state: NotesState,
    coalescer: WriteCoalescer<R>,
    epochs: Rc<RefCell<Epochs>>,
}

impl<S: ContentStore, R: Runtime> Clone for NoteSyncController<S, R> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            runtime: self.runtime.clone(),
            state: self.state,
            coalescer: self.coalescer.clone(),
            epochs: self.epochs.clone(),
        }
    }
}

impl NoteSyncController<ApiClient, BrowserRuntime> {
    /// Browser entry point: HTTP store, window timers, initial load kicked off.
    pub fn connect(config: &EnvConfig) -> Self {
        console_error_panic_hook::set_once();

        let ctrl = Self::new(
            ApiClient::new(config.api_url.clone()),
            BrowserRuntime,
            config.windows(),
        );
        ctrl.load();
        ctrl
    }
}

impl<S: ContentStore, R: Runtime> NoteSyncController<S, R> {
    pub fn new(store: S, runtime: R, windows: CoalesceWindows) -> Self {
        Self {
            store,
            coalescer: WriteCoalescer::new(runtime.clone(), windows),
            runtime,
            state: NotesState::new(),
            epochs: Rc::new(RefCell::new(Epochs::default())),
        }
    }

    pub fn state(&self) -> NotesState {
        self.state
    }

    pub fn coalescer(&self) -> &WriteCoalescer<R> {
        &self.coalescer
    }

    pub fn hierarchy(&self) -> Vec<RootNode> {
        self.state.hierarchy()
    }

    /// Replaces the cache with the store's list.
    pub fn load(&self) {
        let req_id = self.state.notes_request_id.get_untracked().saturating_add(1);
        self.state.notes_request_id.set(req_id);
        self.state.notes_loading.set(true);

        let store = self.store.clone();
        let s2 = self.clone();
        self.runtime.spawn_local(async move {
            let result = store.list().await;

            // Ignore stale responses.
            if s2.state.notes_request_id.get_untracked() != req_id {
                return;
            }

            match result {
                Ok(notes) => {
                    let hidden = orphans(&notes).len();
                    if hidden > 0 {
                        warn!("{hidden} note(s) have no root parent and stay out of the tree");
                    }
                    log!("loaded {} notes", notes.len());
                    s2.state.notes.set(notes);
                    s2.resync_selection();
                }
                Err(e) => s2.report_failure(SyncOp::List, e),
            }
            s2.state.notes_loading.set(false);
        });
    }

    /// Creates a note, as a child of the selection when the selection is a root.
    ///
    /// Blank titles are ignored. Returns whether a request was issued.
    pub fn create_note(&self, title: &str) -> bool {
        let parent = self.state.selected.with_untracked(|s| {
            s.as_ref()
                .filter(|n| n.is_root())
                .map(|n| n.id.clone())
        });
        self.create_note_under(title, parent.as_deref())
    }

    pub fn create_note_under(&self, title: &str, parent: Option<&str>) -> bool {
        if title.trim().is_empty() {
            return false;
        }

        let parent = parent.filter(|p| !p.is_empty());
        let resolved = self
            .state
            .notes
            .with_untracked(|notes| resolve_parent(notes, parent));
        if parent.is_some() && resolved.as_deref() != parent {
            warn!("create target {:?} is not a root; using {:?}", parent, resolved);
        }

        let title = title.to_string();
        let store = self.store.clone();
        let s2 = self.clone();
        self.runtime.spawn_local(async move {
            match store.create(&title, resolved.as_deref()).await {
                Ok(note) => {
                    let next = s2
                        .state
                        .notes
                        .with_untracked(|notes| append_note(notes, note));
                    s2.state.notes.set(next);
                    s2.notify_success(SyncOp::Create);
                }
                Err(e) => s2.report_failure(SyncOp::Create, e),
            }
        });
        true
    }

    pub fn select(&self, id: &str) -> bool {
        let Some(note) = self.state.find_untracked(id) else {
            return false;
        };
        self.state.selected.set(Some(note));
        true
    }

    pub fn clear_selection(&self) {
        self.state.selected.set(None);
    }

    /// Optimistic body edit; the write goes out after the body window.
    pub fn edit_body(&self, id: &str, body: &str) -> bool {
        self.apply_local_edit(id, NoteField::Body, body)
    }

    /// Optimistic title edit; the write goes out after the title window.
    pub fn rename(&self, id: &str, title: &str) -> bool {
        self.apply_local_edit(id, NoteField::Title, title)
    }

    /// Selects `id` and enters title editing for it, leaving any other title
    /// edit without committing it.
    pub fn begin_title_edit(&self, id: &str) -> bool {
        let Some(note) = self.state.find_untracked(id) else {
            return false;
        };
        self.state.selected.set(Some(note.clone()));
        self.state.title_edit.set(Some(TitleDraft {
            id: note.id,
            draft: note.title,
        }));
        true
    }

    pub fn edit_title_draft(&self, text: &str) {
        self.state.title_edit.update(|t| {
            if let Some(t) = t {
                t.draft = text.to_string();
            }
        });
    }

    /// Enter or blur: applies the draft and writes it without waiting for the window.
    pub fn commit_title(&self) -> bool {
        let Some(TitleDraft { id, draft }) = self.state.title_edit.get_untracked() else {
            return false;
        };
        self.state.title_edit.set(None);

        if !self.rename(&id, &draft) {
            return false;
        }
        self.coalescer.flush(&WriteKey::new(id, NoteField::Title));
        true
    }

    pub fn cancel_title_edit(&self) {
        self.state.title_edit.set(None);
    }

    /// Deletes remotely, then drops the note and its children from the cache.
    pub fn delete_note(&self, id: &str) {
        // No write may fire for the note (or its children) while the delete is out.
        let (_, doomed) = self
            .state
            .notes
            .with_untracked(|notes| remove_cascade(notes, id));
        self.coalescer.cancel_note(id);
        for d in doomed.iter() {
            self.coalescer.cancel_note(d);
        }

        let id = id.to_string();
        let store = self.store.clone();
        let s2 = self.clone();
        self.runtime.spawn_local(async move {
            match store.delete(&id).await {
                Ok(()) => {
                    s2.apply_delete(&id);
                    s2.notify_success(SyncOp::Delete);
                }
                Err(e) => s2.report_failure(SyncOp::Delete, e),
            }
        });
    }

    /// Drops pending writes for `id` and discards responses still in flight.
    pub fn cancel_note(&self, id: &str) {
        self.coalescer.cancel_note(id);
        self.epochs.borrow_mut().bump(id);
    }

    /// Drops every pending write, in-flight response and pending load.
    pub fn teardown(&self) {
        let dropped = self.coalescer.cancel_all();
        if dropped > 0 {
            log!("teardown dropped {dropped} pending write(s)");
        }
        self.epochs.borrow_mut().bump_all();
        self.state
            .notes_request_id
            .set(self.state.notes_request_id.get_untracked().saturating_add(1));
        self.state.notes_loading.set(false);
    }

    pub fn dismiss_notice(&self) {
        self.state.notice.set(None);
    }

    fn apply_local_edit(&self, id: &str, field: NoteField, value: &str) -> bool {
        let Some(next) = self
            .state
            .notes
            .with_untracked(|notes| set_field(notes, id, field, value))
        else {
            return false;
        };
        self.state.notes.set(next);

        if let Some(sel) = self
            .state
            .selected
            .get_untracked()
            .filter(|n| n.id == id)
        {
            self.state.selected.set(Some(sel.with_field(field, value)));
        }

        let s2 = self.clone();
        self.coalescer.submit(
            WriteKey::new(id, field),
            value.to_string(),
            move |key, value| s2.issue_update(key, value),
        );
        true
    }

    fn issue_update(&self, key: WriteKey, value: String) {
        let epoch = self.epochs.borrow().current(&key.id);
        let op = SyncOp::update(key.field);
        let patch = NotePatch::new(key.field, value);

        let store = self.store.clone();
        let s2 = self.clone();
        self.runtime.spawn_local(async move {
            let result = store.update(&key.id, patch).await;

            if s2.epochs.borrow().current(&key.id) != epoch {
                warn!("dropping {op} response for cancelled note {}", key.id);
                return;
            }

            // Completion order decides: a slower, older response can land last.
            match result {
                Ok(note) => {
                    s2.apply_confirmed(note);
                    s2.notify_success(op);
                }
                Err(e) => s2.report_failure(op, e),
            }
        });
    }

    fn apply_confirmed(&self, note: Note) {
        if let Some(next) = self
            .state
            .notes
            .with_untracked(|notes| replace_note(notes, &note))
        {
            self.state.notes.set(next);
        }

        if self.state.selected_id().as_deref() == Some(note.id.as_str()) {
            self.state.selected.set(Some(note));
        }
    }

    fn apply_delete(&self, id: &str) {
        let (kept, mut removed) = self
            .state
            .notes
            .with_untracked(|notes| remove_cascade(notes, id));
        self.state.notes.set(kept);

        if !removed.iter().any(|r| r == id) {
            removed.push(id.to_string());
        }
        for r in removed.iter() {
            self.cancel_note(r);
        }

        if let Some(sel) = self.state.selected_id() {
            if removed.contains(&sel) {
                self.state.selected.set(None);
            }
        }
        let editing = self
            .state
            .title_edit
            .with_untracked(|t| t.as_ref().map(|t| t.id.clone()));
        if let Some(editing) = editing {
            if removed.contains(&editing) {
                self.state.title_edit.set(None);
            }
        }
    }

    /// Points the selection and title draft at the current cache entries,
    /// dropping them when their note is gone.
    fn resync_selection(&self) {
        if let Some(sel) = self.state.selected_id() {
            self.state.selected.set(self.state.find_untracked(&sel));
        }
        let editing = self
            .state
            .title_edit
            .with_untracked(|t| t.as_ref().map(|t| t.id.clone()));
        if let Some(editing) = editing {
            if self.state.find_untracked(&editing).is_none() {
                self.state.title_edit.set(None);
            }
        }
    }

    fn notify_success(&self, op: SyncOp) {
        if let Some(n) = Notice::success(op) {
            self.state.notice.set(Some(n));
        }
    }

    /// Failures stop here: logged, recorded, shown. Local edits are kept.
    fn report_failure(&self, op: SyncOp, e: ApiError) {
        let err = SyncError::remote(op, e);
        error!("{err}");
        self.state.last_error.set(Some(err));
        self.state.notice.set(Some(Notice::failure(op)));
    }
}
