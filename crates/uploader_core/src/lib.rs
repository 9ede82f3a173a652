//! Uploader core: pure state machine and view-model helpers.
mod effect;
mod file;
mod msg;
mod policy;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use file::{FileCandidate, SelectedFile, OCTET_STREAM_MEDIA_TYPE, PDF_MEDIA_TYPE};
pub use msg::{Msg, UploadFailure};
pub use policy::{estimate_progress, PollPolicy, PENDING_PROGRESS_CAP};
pub use state::{Phase, TaskStatus, UploaderState};
pub use update::{
    update, ERR_INVALID_RESPONSE, ERR_NOT_PDF, ERR_POLL_TIMEOUT, ERR_SELECT_FILE_FIRST,
    ERR_STATUS_CHECK_FAILED, ERR_TASK_FAILED, ERR_UPLOAD_FAILED,
};
pub use view_model::{ActionButtonView, UploaderViewModel, BUTTON_BUSY_LABEL, BUTTON_IDLE_LABEL};
