use std::time::Duration;

use crate::SelectedFile;

/// IO requested by [`crate::update`]; executed by the app against the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// POST the file to the upload endpoint.
    UploadFile { file: SelectedFile },
    /// Query the status endpoint for `task_id` once `delay` has elapsed.
    CheckStatus { task_id: String, delay: Duration },
    /// Drop any scheduled status check.
    CancelPolling,
}
