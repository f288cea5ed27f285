use crate::api::ApiError;
use crate::models::NoteField;

/// The store operation a notification or failure refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SyncOp {
    List,
    Create,
    UpdateTitle,
    UpdateBody,
    Delete,
}

impl SyncOp {
    pub fn update(field: NoteField) -> Self {
        match field {
            NoteField::Title => SyncOp::UpdateTitle,
            NoteField::Body => SyncOp::UpdateBody,
        }
    }

    /// Loading the list is silent on success.
    pub fn success_message(self) -> Option<&'static str> {
        match self {
            SyncOp::List => None,
            SyncOp::Create => Some("Content created successfully!"),
            SyncOp::UpdateTitle => Some("Title updated successfully!"),
            SyncOp::UpdateBody => Some("Content updated successfully!"),
            SyncOp::Delete => Some("Content deleted successfully!"),
        }
    }

    pub fn failure_message(self) -> &'static str {
        match self {
            SyncOp::List => "Failed to fetch contents.",
            SyncOp::Create => "Failed to create content.",
            SyncOp::UpdateTitle => "Failed to update title.",
            SyncOp::UpdateBody => "Failed to update content.",
            SyncOp::Delete => "Failed to delete content.",
        }
    }
}

impl std::fmt::Display for SyncOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SyncOp::List => "list",
            SyncOp::Create => "create",
            SyncOp::UpdateTitle => "update title",
            SyncOp::UpdateBody => "update body",
            SyncOp::Delete => "delete",
        };
        f.write_str(s)
    }
}

/// Whatever went wrong remotely, the engine sees one kind of failure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SyncError {
    RemoteOperationFailed { op: SyncOp, source: ApiError },
}

impl SyncError {
    pub fn remote(op: SyncOp, source: ApiError) -> Self {
        SyncError::RemoteOperationFailed { op, source }
    }

    pub fn op(&self) -> SyncOp {
        match self {
            SyncError::RemoteOperationFailed { op, .. } => *op,
        }
    }
}

impl std::fmt::Display for SyncError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncError::RemoteOperationFailed { op, source } => {
                write!(f, "remote {op} failed: {source}")
            }
        }
    }
}

impl std::error::Error for SyncError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SyncError::RemoteOperationFailed { source, .. } => Some(source),
        }
    }
}
