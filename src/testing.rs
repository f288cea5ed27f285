//! Deterministic runtime and in-memory store for unit tests.

use crate::api::{ApiError, ApiErrorKind, ApiResult, ContentStore};
use crate::models::{Note, NotePatch};
use crate::sync::Runtime;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::time::Duration;

pub(crate) type LocalTask = Pin<Box<dyn Future<Output = ()>>>;

struct Timer {
    deadline: Duration,
    id: u64,
    callback: Box<dyn FnOnce()>,
}

#[derive(Default)]
struct RuntimeInner {
    now: Duration,
    next_id: u64,
    timers: Vec<Timer>,
    tasks: VecDeque<LocalTask>,
}

/// Virtual clock: timers fire only from `advance`, tasks run only from `run_tasks`.
#[derive(Clone, Default)]
pub(crate) struct ManualRuntime {
    inner: Rc<RefCell<RuntimeInner>>,
}

impl ManualRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        let target = self.inner.borrow().now + by;

        loop {
            let next = {
                let mut inner = self.inner.borrow_mut();
                let due = inner
                    .timers
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| t.deadline <= target)
                    .min_by_key(|(_, t)| (t.deadline, t.id))
                    .map(|(i, _)| i);
                due.map(|i| {
                    let t = inner.timers.remove(i);
                    inner.now = t.deadline;
                    t.callback
                })
            };

            match next {
                Some(cb) => cb(),
                None => break,
            }
        }

        self.inner.borrow_mut().now = target;
    }

    pub fn armed_timers(&self) -> usize {
        self.inner.borrow().timers.len()
    }

    /// Runs queued tasks (and anything they spawn) to completion, in spawn order.
    pub fn run_tasks(&self) {
        while let Some(task) = self.next_task() {
            futures::executor::block_on(task);
        }
    }

    /// Hands queued tasks to the caller so completion order can be chosen.
    pub fn take_tasks(&self) -> Vec<LocalTask> {
        self.inner.borrow_mut().tasks.drain(..).collect()
    }

    pub fn queued_tasks(&self) -> usize {
        self.inner.borrow().tasks.len()
    }

    fn next_task(&self) -> Option<LocalTask> {
        self.inner.borrow_mut().tasks.pop_front()
    }
}

impl Runtime for ManualRuntime {
    type TimerHandle = u64;

    fn set_timeout(&self, delay: Duration, callback: Box<dyn FnOnce()>) -> Option<u64> {
        let mut inner = self.inner.borrow_mut();
        inner.next_id += 1;
        let id = inner.next_id;
        let deadline = inner.now + delay;
        inner.timers.push(Timer {
            deadline,
            id,
            callback,
        });
        Some(id)
    }

    fn clear_timeout(&self, handle: u64) {
        self.inner.borrow_mut().timers.retain(|t| t.id != handle);
    }

    fn spawn_local<F>(&self, fut: F)
    where
        F: Future<Output = ()> + 'static,
    {
        self.inner.borrow_mut().tasks.push_back(Box::pin(fut));
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum StoreCall {
    List,
    Create {
        title: String,
        parent_id: Option<String>,
    },
    Update {
        id: String,
        patch: NotePatch,
    },
    Delete {
        id: String,
    },
}

#[derive(Default)]
struct StoreInner {
    notes: Vec<Note>,
    calls: Vec<StoreCall>,
    next_id: u64,
    fail: bool,
    normalize_title: bool,
}

/// Content store held in memory. Records every call it receives.
#[derive(Clone, Default)]
pub(crate) struct FakeStore {
    inner: Rc<RefCell<StoreInner>>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_notes(notes: Vec<Note>) -> Self {
        let s = Self::default();
        s.inner.borrow_mut().notes = notes;
        s
    }

    /// Every following call fails until reset.
    pub fn set_failing(&self, fail: bool) {
        self.inner.borrow_mut().fail = fail;
    }

    /// Trims stored titles, so responses differ from what was sent.
    pub fn set_normalize_title(&self, on: bool) {
        self.inner.borrow_mut().normalize_title = on;
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.inner.borrow().calls.clone()
    }

    pub fn update_calls(&self) -> Vec<(String, NotePatch)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                StoreCall::Update { id, patch } => Some((id, patch)),
                _ => None,
            })
            .collect()
    }

    pub fn stored(&self) -> Vec<Note> {
        self.inner.borrow().notes.clone()
    }

    fn record(&self, call: StoreCall) -> ApiResult<()> {
        let mut inner = self.inner.borrow_mut();
        inner.calls.push(call);
        if inner.fail {
            return Err(ApiError {
                kind: ApiErrorKind::Network,
                message: "connection refused".to_string(),
            });
        }
        Ok(())
    }

    fn not_found(id: &str) -> ApiError {
        ApiError {
            kind: ApiErrorKind::Http,
            message: format!("Content not found: {id}"),
        }
    }
}

impl ContentStore for FakeStore {
    async fn list(&self) -> ApiResult<Vec<Note>> {
        self.record(StoreCall::List)?;
        Ok(self.stored())
    }

    async fn create(&self, title: &str, parent_id: Option<&str>) -> ApiResult<Note> {
        self.record(StoreCall::Create {
            title: title.to_string(),
            parent_id: parent_id.map(str::to_string),
        })?;

        let mut inner = self.inner.borrow_mut();
        inner.next_id += 1;
        let note = Note {
            id: format!("srv-{}", inner.next_id),
            title: title.to_string(),
            body: String::new(),
            parent_id: parent_id.map(str::to_string),
        };
        inner.notes.push(note.clone());
        Ok(note)
    }

    async fn update(&self, id: &str, patch: NotePatch) -> ApiResult<Note> {
        self.record(StoreCall::Update {
            id: id.to_string(),
            patch: patch.clone(),
        })?;

        let mut inner = self.inner.borrow_mut();
        let normalize = inner.normalize_title;
        let note = inner
            .notes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| Self::not_found(id))?;
        match patch {
            NotePatch::Title { title } if normalize => note.title = title.trim().to_string(),
            NotePatch::Title { title } => note.title = title,
            NotePatch::Body { content } => note.body = content,
        }
        Ok(note.clone())
    }

    async fn delete(&self, id: &str) -> ApiResult<()> {
        self.record(StoreCall::Delete { id: id.to_string() })?;

        let mut inner = self.inner.borrow_mut();
        let before = inner.notes.len();
        inner
            .notes
            .retain(|n| n.id != id && n.parent_ref() != Some(id));
        if inner.notes.len() == before {
            return Err(Self::not_found(id));
        }
        Ok(())
    }
}

pub(crate) fn note(id: &str, title: &str, parent: Option<&str>) -> Note {
    Note {
        id: id.to_string(),
        title: title.to_string(),
        body: String::new(),
        parent_id: parent.map(str::to_string),
    }
}
