use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use uploader_logging::{uploader_debug, uploader_error, uploader_warn};

use crate::client::{AnalysisClient, ReqwestAnalysisClient};
use crate::{ApiError, ClientSettings, EngineEvent, PaperUpload, ResearchRequest, UploadRequest};

/// Receives engine results. Called from the engine's runtime threads.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelEventSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

enum EngineCommand {
    Upload { request: UploadRequest },
    CheckStatus { task_id: String, delay: Duration },
    CancelPolling,
    Research { request: ResearchRequest },
}

/// Owns the IO thread. Dropping the handle cancels every scheduled status
/// check and stops the runtime.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    shutdown: CancellationToken,
}

impl EngineHandle {
    pub fn new(settings: ClientSettings, sink: Arc<dyn EventSink>) -> Result<Self, ApiError> {
        let client = ReqwestAnalysisClient::new(settings)?;
        Ok(Self::with_client(Arc::new(client), sink))
    }

    pub fn with_client(client: Arc<dyn AnalysisClient>, sink: Arc<dyn EventSink>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let shutdown = CancellationToken::new();
        let worker_shutdown = shutdown.clone();

        thread::spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    uploader_error!("Could not start engine runtime: {}", err);
                    return;
                }
            };
            // Replaced on every cancel so later checks are unaffected.
            let mut poll_token = worker_shutdown.child_token();
            while let Ok(command) = cmd_rx.recv() {
                match command {
                    EngineCommand::CancelPolling => {
                        uploader_debug!("Cancelling scheduled status checks");
                        poll_token.cancel();
                        poll_token = worker_shutdown.child_token();
                    }
                    EngineCommand::CheckStatus { task_id, delay } => {
                        runtime.spawn(check_status(
                            client.clone(),
                            sink.clone(),
                            task_id,
                            delay,
                            poll_token.clone(),
                        ));
                    }
                    EngineCommand::Upload { request } => {
                        runtime.spawn(upload(client.clone(), sink.clone(), request));
                    }
                    EngineCommand::Research { request } => {
                        runtime.spawn(research(client.clone(), sink.clone(), request));
                    }
                }
            }
            worker_shutdown.cancel();
            runtime.shutdown_background();
        });

        Self { cmd_tx, shutdown }
    }

    pub fn upload(&self, request: UploadRequest) {
        self.send(EngineCommand::Upload { request });
    }

    /// Schedules one status check after `delay`.
    pub fn check_status(&self, task_id: impl Into<String>, delay: Duration) {
        self.send(EngineCommand::CheckStatus {
            task_id: task_id.into(),
            delay,
        });
    }

    pub fn cancel_polling(&self) {
        self.send(EngineCommand::CancelPolling);
    }

    pub fn research(&self, request: ResearchRequest) {
        self.send(EngineCommand::Research { request });
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            uploader_warn!("Engine thread is gone; command dropped");
        }
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn upload(client: Arc<dyn AnalysisClient>, sink: Arc<dyn EventSink>, request: UploadRequest) {
    let result = match PaperUpload::read(&request).await {
        Ok(paper) => client.upload_paper(&paper).await,
        Err(err) => Err(err),
    };
    let event = match result {
        Ok(task_id) => EngineEvent::UploadAccepted { task_id },
        Err(error) => {
            uploader_warn!("Upload of {} failed: {}", request.file_name, error);
            EngineEvent::UploadFailed { error }
        }
    };
    sink.emit(event);
}

async fn check_status(
    client: Arc<dyn AnalysisClient>,
    sink: Arc<dyn EventSink>,
    task_id: String,
    delay: Duration,
    token: CancellationToken,
) {
    tokio::select! {
        _ = token.cancelled() => return,
        _ = tokio::time::sleep(delay) => {}
    }
    let result = tokio::select! {
        _ = token.cancelled() => return,
        result = client.task_status(&task_id) => result,
    };
    if token.is_cancelled() {
        return;
    }
    let event = match result {
        Ok(report) => EngineEvent::StatusReported { task_id, report },
        Err(error) => {
            uploader_warn!("Status check for task {} failed: {}", task_id, error);
            EngineEvent::StatusCheckFailed { task_id, error }
        }
    };
    sink.emit(event);
}

async fn research(
    client: Arc<dyn AnalysisClient>,
    sink: Arc<dyn EventSink>,
    request: ResearchRequest,
) {
    let event = match client.conduct_research(&request).await {
        Ok(response) => EngineEvent::ResearchCompleted { response },
        Err(error) => EngineEvent::ResearchFailed { error },
    };
    sink.emit(event);
}
