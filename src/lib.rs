//! Client-side sync engine for a two-level note tree backed by a remote
//! contents service.
//!
//! Local edits are applied to reactive state at once, coalesced per
//! (note, field), written in the background, and reconciled with whatever
//! the service returns.

pub mod api;
pub mod cache;
pub mod config;
pub mod hierarchy;
pub mod models;
pub mod state;
pub mod sync;

#[cfg(test)]
pub(crate) mod testing;

pub use api::{ApiClient, ApiError, ApiErrorKind, ApiResult, ContentStore};
pub use config::{CoalesceWindows, EnvConfig};
pub use hierarchy::{build_hierarchy, RootNode};
pub use models::{Note, NoteField, NotePatch};
pub use state::{EditState, Notice, NoticeLevel, NoteSyncController, NotesState, TitleDraft};
pub use sync::{BrowserRuntime, Runtime, SyncError, SyncOp, WriteCoalescer, WriteKey};
