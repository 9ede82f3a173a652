use crate::{FileCandidate, TaskStatus};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User picked a file in the picker.
    FileChosen(FileCandidate),
    /// User clicked "Upload and Analyze".
    UploadClicked,
    /// Upload endpoint answered with a task id.
    UploadAccepted { task_id: String },
    /// Upload attempt ended without a task id.
    UploadFailed(UploadFailure),
    /// Status endpoint answered for a task.
    StatusReported { task_id: String, status: TaskStatus },
    /// Status request failed. `retryable` failures (server errors) poll
    /// again within the attempt budget; the rest end the attempt.
    StatusCheckFailed { task_id: String, retryable: bool },
    /// The uploader is being torn down; nothing may update it afterwards.
    Detached,
    /// UI/render tick to coalesce rendering.
    Tick,
}

/// Why an upload attempt did not produce a task id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadFailure {
    /// Server answered with a non-success status.
    Rejected { status: u16 },
    /// Success status but no usable `task_id` in the body.
    InvalidResponse,
    /// Request never completed; carries the underlying failure message.
    Transport(String),
}
