use std::sync::{mpsc, Arc};

use uploader_core::{Effect, Msg, TaskStatus, UploadFailure};
use uploader_engine::{
    AnalysisClient, ApiError, ClientSettings, EngineEvent, EngineHandle, EventSink, FailureKind,
    ReqwestAnalysisClient, StatusReport, UploadRequest,
};
use uploader_logging::{uploader_debug, uploader_info, uploader_warn};

/// Executes core effects against the engine. Engine results come back as
/// [`Msg`]s on the channel handed to the constructor.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(settings: ClientSettings, msg_tx: mpsc::Sender<Msg>) -> Result<Self, ApiError> {
        let client = ReqwestAnalysisClient::new(settings)?;
        Ok(Self::with_client(Arc::new(client), msg_tx))
    }

    pub fn with_client(client: Arc<dyn AnalysisClient>, msg_tx: mpsc::Sender<Msg>) -> Self {
        let engine = EngineHandle::with_client(client, Arc::new(MsgSink { tx: msg_tx }));
        Self { engine }
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::UploadFile { file } => {
                    uploader_info!("UploadFile name={} path={:?}", file.name(), file.path());
                    self.engine.upload(UploadRequest {
                        path: file.path().to_path_buf(),
                        file_name: file.name().to_string(),
                        media_type: file.media_type().to_string(),
                    });
                }
                Effect::CheckStatus { task_id, delay } => {
                    uploader_debug!("CheckStatus task_id={} delay={:?}", task_id, delay);
                    self.engine.check_status(task_id, delay);
                }
                Effect::CancelPolling => self.engine.cancel_polling(),
            }
        }
    }
}

struct MsgSink {
    tx: mpsc::Sender<Msg>,
}

impl EventSink for MsgSink {
    fn emit(&self, event: EngineEvent) {
        if let Some(msg) = map_event(event) {
            let _ = self.tx.send(msg);
        }
    }
}

fn map_event(event: EngineEvent) -> Option<Msg> {
    match event {
        EngineEvent::UploadAccepted { task_id } => {
            uploader_info!("Upload accepted, task_id={}", task_id);
            Some(Msg::UploadAccepted { task_id })
        }
        EngineEvent::UploadFailed { error } => Some(Msg::UploadFailed(map_upload_error(error))),
        EngineEvent::StatusReported { task_id, report } => Some(Msg::StatusReported {
            task_id,
            status: map_report(report),
        }),
        EngineEvent::StatusCheckFailed { task_id, error } => {
            let retryable = error.kind.is_server_error();
            if retryable {
                uploader_warn!("Status check for {} hit {}, retrying", task_id, error);
            }
            Some(Msg::StatusCheckFailed { task_id, retryable })
        }
        EngineEvent::ResearchCompleted { .. } | EngineEvent::ResearchFailed { .. } => None,
    }
}

fn map_upload_error(error: ApiError) -> UploadFailure {
    match error.kind {
        FailureKind::HttpStatus(status) => UploadFailure::Rejected { status },
        FailureKind::InvalidResponse | FailureKind::MissingTaskId => {
            UploadFailure::InvalidResponse
        }
        FailureKind::Timeout
        | FailureKind::Network
        | FailureKind::InvalidRequest
        | FailureKind::Io => UploadFailure::Transport(error.message),
    }
}

fn map_report(report: StatusReport) -> TaskStatus {
    match report {
        StatusReport::Pending { elapsed_secs } => TaskStatus::Pending { elapsed_secs },
        StatusReport::Completed { result } => TaskStatus::Completed { result },
        StatusReport::Failed { message } => TaskStatus::Failed { message },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn api_error(kind: FailureKind) -> ApiError {
        ApiError {
            kind,
            message: "connection refused".to_string(),
        }
    }

    #[test]
    fn upload_errors_map_to_failures() {
        assert_eq!(
            map_upload_error(api_error(FailureKind::HttpStatus(413))),
            UploadFailure::Rejected { status: 413 }
        );
        assert_eq!(
            map_upload_error(api_error(FailureKind::MissingTaskId)),
            UploadFailure::InvalidResponse
        );
        assert_eq!(
            map_upload_error(api_error(FailureKind::InvalidResponse)),
            UploadFailure::InvalidResponse
        );
        assert_eq!(
            map_upload_error(api_error(FailureKind::Network)),
            UploadFailure::Transport("connection refused".to_string())
        );
    }

    #[test]
    fn status_events_map_to_messages() {
        let msg = map_event(EngineEvent::StatusReported {
            task_id: "t".to_string(),
            report: StatusReport::Completed {
                result: Some(json!({"x": 1})),
            },
        });
        assert_eq!(
            msg,
            Some(Msg::StatusReported {
                task_id: "t".to_string(),
                status: TaskStatus::Completed {
                    result: Some(json!({"x": 1}))
                },
            })
        );

        let msg = map_event(EngineEvent::StatusCheckFailed {
            task_id: "t".to_string(),
            error: api_error(FailureKind::Timeout),
        });
        assert_eq!(
            msg,
            Some(Msg::StatusCheckFailed {
                task_id: "t".to_string(),
                retryable: false,
            })
        );

        let msg = map_event(EngineEvent::StatusCheckFailed {
            task_id: "t".to_string(),
            error: api_error(FailureKind::HttpStatus(502)),
        });
        assert_eq!(
            msg,
            Some(Msg::StatusCheckFailed {
                task_id: "t".to_string(),
                retryable: true,
            })
        );
    }

    #[test]
    fn research_events_are_not_uploader_messages() {
        assert_eq!(
            map_event(EngineEvent::ResearchCompleted {
                response: json!({})
            }),
            None
        );
    }
}
