use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use uploader_core::{
    update, ActionButtonView, FileCandidate, Msg, TaskStatus, UploaderState, UploaderViewModel,
    BUTTON_BUSY_LABEL, BUTTON_IDLE_LABEL, ERR_NOT_PDF, PDF_MEDIA_TYPE,
};

fn with_file() -> UploaderState {
    let candidate = FileCandidate::new("paper.pdf", PDF_MEDIA_TYPE, "/tmp/paper.pdf");
    update(UploaderState::new(), Msg::FileChosen(candidate)).0
}

fn completed_with(result: Option<Value>) -> UploaderState {
    let (state, _) = update(with_file(), Msg::UploadClicked);
    let (state, _) = update(
        state,
        Msg::UploadAccepted {
            task_id: "t1".to_string(),
        },
    );
    update(
        state,
        Msg::StatusReported {
            task_id: "t1".to_string(),
            status: TaskStatus::Completed { result },
        },
    )
    .0
}

#[test]
fn fresh_state_renders_picker_and_disabled_button() {
    let view = UploaderState::new().view();
    assert_eq!(
        view,
        UploaderViewModel {
            picker_enabled: true,
            file_name: None,
            processing: false,
            progress: None,
            error: None,
            result_json: None,
            action: ActionButtonView {
                label: BUTTON_IDLE_LABEL,
                enabled: false,
            },
        }
    );
}

#[test]
fn selected_file_enables_button() {
    let view = with_file().view();
    assert_eq!(view.file_name.as_deref(), Some("paper.pdf"));
    assert_eq!(view.action.label, BUTTON_IDLE_LABEL);
    assert!(view.action.enabled);
}

#[test]
fn processing_shows_progress_and_busy_button() {
    let (state, _) = update(with_file(), Msg::UploadClicked);
    let view = state.view();
    assert!(view.processing);
    assert!(!view.picker_enabled);
    assert_eq!(view.progress, Some(0));
    assert_eq!(
        view.action,
        ActionButtonView {
            label: BUTTON_BUSY_LABEL,
            enabled: false,
        }
    );
}

#[test]
fn error_banner_follows_state() {
    let candidate = FileCandidate::new("a.txt", "text/plain", "/tmp/a.txt");
    let (state, _) = update(UploaderState::new(), Msg::FileChosen(candidate));
    assert_eq!(state.view().error.as_deref(), Some(ERR_NOT_PDF));
}

#[test]
fn result_is_pretty_printed_with_key_order_kept() {
    let raw = r#"{"title":"Attention","authors":["A","B"],"meta":{"pages":12,"abstract":null}}"#;
    let result: Value = serde_json::from_str(raw).unwrap();
    let view = completed_with(Some(result)).view();

    let expected = "{\n  \"title\": \"Attention\",\n  \"authors\": [\n    \"A\",\n    \"B\"\n  ],\n  \"meta\": {\n    \"pages\": 12,\n    \"abstract\": null\n  }\n}";
    assert_eq!(view.result_json.as_deref(), Some(expected));
    assert!(!view.processing);
    assert_eq!(view.progress, None);

    let reparsed: Value = serde_json::from_str(expected).unwrap();
    assert_eq!(reparsed, serde_json::from_str::<Value>(raw).unwrap());
}

#[test]
fn null_or_missing_result_shows_no_panel() {
    assert_eq!(completed_with(None).view().result_json, None);
    assert_eq!(completed_with(Some(Value::Null)).view().result_json, None);
    assert_eq!(
        completed_with(Some(json!([]))).view().result_json.as_deref(),
        Some("[]")
    );
}

#[test]
fn falsy_scalar_results_are_still_shown() {
    for (result, expected) in [(json!(false), "false"), (json!(0), "0"), (json!(""), "\"\"")] {
        assert_eq!(
            completed_with(Some(result)).view().result_json.as_deref(),
            Some(expected)
        );
    }
}

#[test]
fn view_is_idempotent() {
    let state = completed_with(Some(json!({"x": 1})));
    assert_eq!(state.view(), state.view());

    let (state, _) = update(with_file(), Msg::UploadClicked);
    assert_eq!(state.view(), state.view());
}
