use std::time::Duration;

use crate::{Effect, Msg, Phase, SelectedFile, TaskStatus, UploadFailure, UploaderState};

pub const ERR_NOT_PDF: &str = "Please select a PDF file";
pub const ERR_SELECT_FILE_FIRST: &str = "Please select a file first";
pub const ERR_UPLOAD_FAILED: &str = "Failed to upload file";
pub const ERR_INVALID_RESPONSE: &str = "Invalid response from server";
pub const ERR_STATUS_CHECK_FAILED: &str = "Failed to check task status";
pub const ERR_TASK_FAILED: &str = "Task failed";
pub const ERR_POLL_TIMEOUT: &str = "Timed out waiting for analysis to complete";

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: UploaderState, msg: Msg) -> (UploaderState, Vec<Effect>) {
    // A detached uploader is defunct; late engine results must not touch it.
    if !state.is_attached() {
        return (state, Vec::new());
    }

    let effects = match msg {
        Msg::FileChosen(candidate) => {
            match SelectedFile::accept(candidate) {
                Some(file) => state.select_file(file),
                None => state.reject_file(ERR_NOT_PDF),
            }
            Vec::new()
        }
        Msg::UploadClicked => {
            match state.selected_file().cloned() {
                Some(file) if !state.is_processing() => {
                    state.begin_upload();
                    vec![Effect::UploadFile { file }]
                }
                _ => {
                    state.set_error(ERR_SELECT_FILE_FIRST);
                    Vec::new()
                }
            }
        }
        Msg::UploadAccepted { task_id } => {
            if *state.phase() != Phase::Uploading {
                return (state, Vec::new());
            }
            state.begin_polling(task_id.clone());
            vec![Effect::CheckStatus {
                task_id,
                delay: Duration::ZERO,
            }]
        }
        Msg::UploadFailed(failure) => {
            if *state.phase() == Phase::Uploading {
                state.fail(upload_failure_message(failure));
            }
            Vec::new()
        }
        Msg::StatusReported { task_id, status } => {
            if !state.is_polling(&task_id) {
                return (state, Vec::new());
            }
            apply_status(&mut state, task_id, status)
        }
        Msg::StatusCheckFailed { task_id, retryable } => {
            if !state.is_polling(&task_id) {
                return (state, Vec::new());
            }
            if retryable {
                let attempts = state.record_retry();
                if state.policy().allows_another_attempt(attempts) {
                    let delay = state.policy().delay_for(attempts);
                    return (state, vec![Effect::CheckStatus { task_id, delay }]);
                }
            }
            state.fail(ERR_STATUS_CHECK_FAILED);
            Vec::new()
        }
        Msg::Detached => {
            let was_polling = matches!(state.phase(), Phase::Polling { .. });
            state.detach();
            if was_polling {
                vec![Effect::CancelPolling]
            } else {
                Vec::new()
            }
        }
        Msg::Tick => Vec::new(),
    };

    (state, effects)
}

fn apply_status(state: &mut UploaderState, task_id: String, status: TaskStatus) -> Vec<Effect> {
    match status {
        TaskStatus::Completed { result } => {
            state.complete(result);
            Vec::new()
        }
        TaskStatus::Failed { message } => {
            state.fail(message.unwrap_or_else(|| ERR_TASK_FAILED.to_string()));
            Vec::new()
        }
        TaskStatus::Pending { elapsed_secs } => {
            let attempts = state.record_pending(elapsed_secs.unwrap_or(0.0));
            if state.policy().allows_another_attempt(attempts) {
                let delay = state.policy().delay_for(attempts);
                vec![Effect::CheckStatus { task_id, delay }]
            } else {
                state.fail(ERR_POLL_TIMEOUT);
                Vec::new()
            }
        }
    }
}

fn upload_failure_message(failure: UploadFailure) -> String {
    match failure {
        UploadFailure::Rejected { .. } => ERR_UPLOAD_FAILED.to_string(),
        UploadFailure::InvalidResponse => ERR_INVALID_RESPONSE.to_string(),
        UploadFailure::Transport(message) => message,
    }
}
