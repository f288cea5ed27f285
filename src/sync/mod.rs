mod coalescer;
mod error;
mod runtime;

pub use coalescer::{WriteCoalescer, WriteKey};
pub use error::{SyncError, SyncOp};
pub use runtime::{BrowserRuntime, Runtime};
