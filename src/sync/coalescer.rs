use crate::config::CoalesceWindows;
use crate::models::NoteField;
use crate::sync::runtime::Runtime;
use leptos::logging::warn;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Coalescing is independent per (note id, field).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct WriteKey {
    pub id: String,
    pub field: NoteField,
}

impl WriteKey {
    pub fn new(id: impl Into<String>, field: NoteField) -> Self {
        Self {
            id: id.into(),
            field,
        }
    }
}

type FireFn = Box<dyn FnOnce(WriteKey, String)>;

struct PendingWrite<H> {
    value: String,
    timer: Option<H>,
    fire: FireFn,
}

/// Turns bursts of edits into one write per quiet period.
///
/// Each key owns a pending value and at most one armed timer. A new edit
/// replaces the value and restarts the timer. When the timer fires the
/// pending entry is removed before `fire` runs, so edits arriving while that
/// write is in flight start a fresh cycle.
///
/// The table lives as long as the coalescer, not as long as any cache value.
pub struct WriteCoalescer<R: Runtime> {
    runtime: R,
    windows: CoalesceWindows,
    pending: Rc<RefCell<HashMap<WriteKey, PendingWrite<R::TimerHandle>>>>,
}

impl<R: Runtime> Clone for WriteCoalescer<R> {
    fn clone(&self) -> Self {
        Self {
            runtime: self.runtime.clone(),
            windows: self.windows,
            pending: self.pending.clone(),
        }
    }
}

impl<R: Runtime> WriteCoalescer<R> {
    pub fn new(runtime: R, windows: CoalesceWindows) -> Self {
        Self {
            runtime,
            windows,
            pending: Rc::new(RefCell::new(HashMap::new())),
        }
    }

    pub fn windows(&self) -> CoalesceWindows {
        self.windows
    }

    /// Records `value` as the latest for `key` and (re)starts its window.
    ///
    /// `fire` runs once with the last submitted value when the window elapses
    /// or the key is flushed. Replaced submissions never fire.
    pub fn submit<F>(&self, key: WriteKey, value: String, fire: F)
    where
        F: FnOnce(WriteKey, String) + 'static,
    {
        self.cancel(&key);

        let delay = match key.field {
            NoteField::Body => self.windows.body,
            NoteField::Title => self.windows.title,
        };

        let this = self.clone();
        let key2 = key.clone();
        let timer = self
            .runtime
            .set_timeout(delay, Box::new(move || this.fire(&key2)));

        self.pending.borrow_mut().insert(
            key.clone(),
            PendingWrite {
                value,
                timer,
                fire: Box::new(fire),
            },
        );

        if timer.is_none() {
            warn!("no timer available for {:?}; writing immediately", key);
            self.flush(&key);
        }
    }

    /// Issues the pending write for `key` now. Returns whether one existed.
    pub fn flush(&self, key: &WriteKey) -> bool {
        let Some(p) = self.take(key) else {
            return false;
        };
        if let Some(t) = p.timer {
            self.runtime.clear_timeout(t);
        }
        (p.fire)(key.clone(), p.value);
        true
    }

    /// Drops the pending write for `key` without issuing it.
    pub fn cancel(&self, key: &WriteKey) -> bool {
        let Some(p) = self.take(key) else {
            return false;
        };
        if let Some(t) = p.timer {
            self.runtime.clear_timeout(t);
        }
        true
    }

    /// Drops pending writes for every field of `id`.
    pub fn cancel_note(&self, id: &str) -> usize {
        [NoteField::Title, NoteField::Body]
            .into_iter()
            .filter(|f| self.cancel(&WriteKey::new(id, *f)))
            .count()
    }

    pub fn cancel_all(&self) -> usize {
        let drained: Vec<PendingWrite<R::TimerHandle>> =
            self.pending.borrow_mut().drain().map(|(_, p)| p).collect();
        for p in drained.iter() {
            if let Some(t) = p.timer {
                self.runtime.clear_timeout(t);
            }
        }
        drained.len()
    }

    pub fn pending_value(&self, key: &WriteKey) -> Option<String> {
        self.pending.borrow().get(key).map(|p| p.value.clone())
    }

    pub fn pending_len(&self) -> usize {
        self.pending.borrow().len()
    }

    fn take(&self, key: &WriteKey) -> Option<PendingWrite<R::TimerHandle>> {
        self.pending.borrow_mut().remove(key)
    }

    fn fire(&self, key: &WriteKey) {
        // The timer already fired; nothing to clear.
        let Some(p) = self.take(key) else {
            return;
        };
        (p.fire)(key.clone(), p.value);
    }
}
