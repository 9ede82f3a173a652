use serde_json::Value;

use crate::view_model::{ActionButtonView, UploaderViewModel};
use crate::{PollPolicy, SelectedFile};

/// Where the uploader is in its upload/poll sequence.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Uploading,
    Polling { task_id: String, attempts: u32 },
}

/// Task status as reported by the status endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskStatus {
    /// Any status other than `completed` or `error`.
    Pending { elapsed_secs: Option<f64> },
    Completed { result: Option<Value> },
    Failed { message: Option<String> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct UploaderState {
    file: Option<SelectedFile>,
    phase: Phase,
    error: Option<String>,
    result: Option<Value>,
    progress: u8,
    policy: PollPolicy,
    attached: bool,
    dirty: bool,
}

impl Default for UploaderState {
    fn default() -> Self {
        Self::with_policy(PollPolicy::default())
    }
}

impl UploaderState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: PollPolicy) -> Self {
        Self {
            file: None,
            phase: Phase::Idle,
            error: None,
            result: None,
            progress: 0,
            policy,
            attached: true,
            dirty: false,
        }
    }

    pub fn view(&self) -> UploaderViewModel {
        let processing = self.is_processing();
        let action = if processing {
            ActionButtonView::busy()
        } else {
            ActionButtonView::idle(self.file.is_some())
        };
        UploaderViewModel {
            picker_enabled: !processing,
            file_name: self.file.as_ref().map(|file| file.name().to_string()),
            processing,
            progress: processing.then_some(self.progress),
            error: self.error.clone(),
            result_json: self
                .result
                .as_ref()
                .filter(|value| !value.is_null())
                .and_then(|value| serde_json::to_string_pretty(value).ok()),
            action,
        }
    }

    /// Returns whether a render is due and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn is_processing(&self) -> bool {
        self.phase != Phase::Idle
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn selected_file(&self) -> Option<&SelectedFile> {
        self.file.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn result(&self) -> Option<&Value> {
        self.result.as_ref()
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn policy(&self) -> &PollPolicy {
        &self.policy
    }

    pub(crate) fn is_polling(&self, task_id: &str) -> bool {
        matches!(&self.phase, Phase::Polling { task_id: current, .. } if current == task_id)
    }

    pub(crate) fn select_file(&mut self, file: SelectedFile) {
        self.file = Some(file);
        self.error = None;
        self.mark_dirty();
    }

    pub(crate) fn reject_file(&mut self, message: &str) {
        self.file = None;
        self.error = Some(message.to_string());
        self.mark_dirty();
    }

    pub(crate) fn set_error(&mut self, message: &str) {
        self.error = Some(message.to_string());
        self.mark_dirty();
    }

    pub(crate) fn begin_upload(&mut self) {
        self.phase = Phase::Uploading;
        self.error = None;
        self.result = None;
        self.progress = 0;
        self.mark_dirty();
    }

    pub(crate) fn begin_polling(&mut self, task_id: String) {
        self.phase = Phase::Polling {
            task_id,
            attempts: 0,
        };
        self.mark_dirty();
    }

    /// Records a pending response and returns the number seen so far.
    pub(crate) fn record_pending(&mut self, elapsed_secs: f64) -> u32 {
        self.progress = self.policy.estimate(elapsed_secs);
        self.mark_dirty();
        self.count_attempt()
    }

    /// Records a failed check that will be retried. Progress is left as is.
    pub(crate) fn record_retry(&mut self) -> u32 {
        self.count_attempt()
    }

    fn count_attempt(&mut self) -> u32 {
        match &mut self.phase {
            Phase::Polling { attempts, .. } => {
                *attempts = attempts.saturating_add(1);
                *attempts
            }
            Phase::Idle | Phase::Uploading => 0,
        }
    }

    pub(crate) fn complete(&mut self, result: Option<Value>) {
        self.phase = Phase::Idle;
        self.result = result;
        self.progress = 100;
        self.mark_dirty();
    }

    pub(crate) fn fail(&mut self, message: impl Into<String>) {
        self.phase = Phase::Idle;
        self.error = Some(message.into());
        self.mark_dirty();
    }

    pub(crate) fn detach(&mut self) {
        self.attached = false;
        self.phase = Phase::Idle;
        self.mark_dirty();
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}
