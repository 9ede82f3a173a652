pub const BUTTON_IDLE_LABEL: &str = "Upload and Analyze";
pub const BUTTON_BUSY_LABEL: &str = "Processing...";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploaderViewModel {
    pub picker_enabled: bool,
    pub file_name: Option<String>,
    pub processing: bool,
    /// Percentage shown next to the progress indicator; only while processing.
    pub progress: Option<u8>,
    pub error: Option<String>,
    /// Result payload pretty-printed with two-space indentation.
    pub result_json: Option<String>,
    pub action: ActionButtonView,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionButtonView {
    pub label: &'static str,
    pub enabled: bool,
}

impl ActionButtonView {
    pub(crate) fn idle(has_file: bool) -> Self {
        Self {
            label: BUTTON_IDLE_LABEL,
            enabled: has_file,
        }
    }

    pub(crate) fn busy() -> Self {
        Self {
            label: BUTTON_BUSY_LABEL,
            enabled: false,
        }
    }
}
