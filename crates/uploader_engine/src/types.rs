use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Status of a task as reported by `GET /api/v1/task-status/{task_id}`.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusReport {
    Pending { elapsed_secs: Option<f64> },
    Completed { result: Option<Value> },
    Failed { message: Option<String> },
}

/// Raw status body. Every field is optional; interpretation happens in
/// [`StatusReport::from`].
#[derive(Debug, Default, Deserialize)]
pub(crate) struct StatusBody {
    #[serde(default)]
    status: Option<Value>,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<Value>,
    #[serde(default)]
    elapsed_time: Option<Value>,
}

impl From<StatusBody> for StatusReport {
    fn from(body: StatusBody) -> Self {
        match body.status.as_ref().and_then(Value::as_str) {
            Some("completed") => StatusReport::Completed {
                result: body.result,
            },
            Some("error") => StatusReport::Failed {
                message: body.error.and_then(|error| match error {
                    Value::Null => None,
                    Value::String(text) => Some(text),
                    other => Some(other.to_string()),
                }),
            },
            _ => StatusReport::Pending {
                elapsed_secs: body.elapsed_time.as_ref().and_then(Value::as_f64),
            },
        }
    }
}

/// Body of `POST /api/v1/research`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResearchRequest {
    pub topic: String,
    pub max_papers: u32,
}

impl ResearchRequest {
    pub const DEFAULT_MAX_PAPERS: u32 = 10;

    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            max_papers: Self::DEFAULT_MAX_PAPERS,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    UploadAccepted { task_id: String },
    UploadFailed { error: ApiError },
    StatusReported { task_id: String, report: StatusReport },
    StatusCheckFailed { task_id: String, error: ApiError },
    ResearchCompleted { response: Value },
    ResearchFailed { error: ApiError },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct ApiError {
    pub kind: FailureKind,
    pub message: String,
}

impl ApiError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    HttpStatus(u16),
    Timeout,
    Network,
    /// Body was not the JSON shape the endpoint promises.
    InvalidResponse,
    /// Upload succeeded but carried no usable `task_id`.
    MissingTaskId,
    /// Request could not be built (bad media type, unusable URL).
    InvalidRequest,
    /// Local file could not be read.
    Io,
}

impl FailureKind {
    /// A 5xx answer: the service is up but could not serve this request now.
    pub fn is_server_error(&self) -> bool {
        matches!(self, FailureKind::HttpStatus(code) if (500..600).contains(code))
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::InvalidResponse => write!(f, "invalid response"),
            FailureKind::MissingTaskId => write!(f, "missing task id"),
            FailureKind::InvalidRequest => write!(f, "invalid request"),
            FailureKind::Io => write!(f, "io error"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn report(body: Value) -> StatusReport {
        serde_json::from_value::<StatusBody>(body).unwrap().into()
    }

    #[test]
    fn only_5xx_counts_as_server_error() {
        assert!(FailureKind::HttpStatus(500).is_server_error());
        assert!(FailureKind::HttpStatus(503).is_server_error());
        assert!(!FailureKind::HttpStatus(404).is_server_error());
        assert!(!FailureKind::Timeout.is_server_error());
        assert!(!FailureKind::InvalidResponse.is_server_error());
    }

    #[test]
    fn completed_carries_result() {
        assert_eq!(
            report(json!({"status": "completed", "result": {"x": 1}})),
            StatusReport::Completed {
                result: Some(json!({"x": 1}))
            }
        );
    }

    #[test]
    fn error_message_is_stringified_when_not_text() {
        assert_eq!(
            report(json!({"status": "error", "error": "bad pdf"})),
            StatusReport::Failed {
                message: Some("bad pdf".to_string())
            }
        );
        assert_eq!(
            report(json!({"status": "error", "error": {"code": 3}})),
            StatusReport::Failed {
                message: Some(r#"{"code":3}"#.to_string())
            }
        );
        assert_eq!(
            report(json!({"status": "error"})),
            StatusReport::Failed { message: None }
        );
    }

    #[test]
    fn anything_else_is_pending() {
        assert_eq!(
            report(json!({"status": "processing", "elapsed_time": 12.5})),
            StatusReport::Pending {
                elapsed_secs: Some(12.5)
            }
        );
        assert_eq!(
            report(json!({"status": 7, "elapsed_time": "soon"})),
            StatusReport::Pending { elapsed_secs: None }
        );
        assert_eq!(report(json!({})), StatusReport::Pending { elapsed_secs: None });
    }

    #[test]
    fn research_request_serializes_snake_case() {
        let body = serde_json::to_value(ResearchRequest::new("graph neural nets")).unwrap();
        assert_eq!(body, json!({"topic": "graph neural nets", "max_papers": 10}));
    }
}
