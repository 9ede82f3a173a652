use reqwest::multipart::{Form, Part};
use reqwest::{Body, Response};
use serde_json::Value;
use uploader_logging::{uploader_debug, uploader_info};

use crate::types::StatusBody;
use crate::{ApiError, ClientSettings, FailureKind, PaperUpload, ResearchRequest, StatusReport};

/// The analysis service as seen by the uploader.
#[async_trait::async_trait]
pub trait AnalysisClient: Send + Sync {
    /// `POST /api/v1/upload-paper`; returns the task id.
    async fn upload_paper(&self, paper: &PaperUpload) -> Result<String, ApiError>;

    /// `GET /api/v1/task-status/{task_id}`.
    async fn task_status(&self, task_id: &str) -> Result<StatusReport, ApiError>;

    /// `POST /api/v1/research`; returns the response body verbatim.
    async fn conduct_research(&self, request: &ResearchRequest) -> Result<Value, ApiError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestAnalysisClient {
    settings: ClientSettings,
    client: reqwest::Client,
}

impl ReqwestAnalysisClient {
    pub fn new(settings: ClientSettings) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .build()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { settings, client })
    }
}

#[async_trait::async_trait]
impl AnalysisClient for ReqwestAnalysisClient {
    async fn upload_paper(&self, paper: &PaperUpload) -> Result<String, ApiError> {
        let url = self.settings.upload_url();
        let length = paper.bytes.len() as u64;
        let part = Part::stream_with_length(Body::from(paper.bytes.clone()), length)
            .file_name(paper.file_name.clone())
            .mime_str(&paper.media_type)
            .map_err(|err| ApiError::new(FailureKind::InvalidRequest, err.to_string()))?;
        let form = Form::new().part("file", part);

        uploader_info!(
            "Uploading {} ({} bytes) to {}",
            paper.file_name,
            length,
            url
        );
        let response = self
            .client
            .post(url)
            .timeout(self.settings.upload_timeout)
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let body = json_body(ensure_success(response).await?).await?;

        match body.get("task_id") {
            Some(Value::String(task_id)) if !task_id.is_empty() => Ok(task_id.clone()),
            Some(Value::Number(task_id)) => Ok(task_id.to_string()),
            _ => Err(ApiError::new(
                FailureKind::MissingTaskId,
                "upload response has no task_id",
            )),
        }
    }

    async fn task_status(&self, task_id: &str) -> Result<StatusReport, ApiError> {
        let url = self.settings.task_status_url(task_id);
        uploader_debug!("Checking status of task {} at {}", task_id, url);
        let response = self
            .client
            .get(url)
            .timeout(self.settings.request_timeout)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let body = json_body(ensure_success(response).await?).await?;
        let body: StatusBody = serde_json::from_value(body)
            .map_err(|err| ApiError::new(FailureKind::InvalidResponse, err.to_string()))?;
        Ok(body.into())
    }

    async fn conduct_research(&self, request: &ResearchRequest) -> Result<Value, ApiError> {
        let url = self.settings.research_url();
        uploader_info!(
            "Requesting research on {:?} (max {} papers)",
            request.topic,
            request.max_papers
        );
        let response = self
            .client
            .post(url)
            .timeout(self.settings.request_timeout)
            .json(request)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        json_body(ensure_success(response).await?).await
    }
}

/// Non-success statuses become `HttpStatus`; the message prefers the
/// server's `detail` field when the error body carries one.
async fn ensure_success(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let detail = response
        .json::<Value>()
        .await
        .ok()
        .and_then(|body| body.get("detail").and_then(Value::as_str).map(str::to_string));
    Err(ApiError::new(
        FailureKind::HttpStatus(status.as_u16()),
        detail.unwrap_or_else(|| status.to_string()),
    ))
}

async fn json_body(response: Response) -> Result<Value, ApiError> {
    let bytes = response.bytes().await.map_err(map_reqwest_error)?;
    serde_json::from_slice(&bytes)
        .map_err(|err| ApiError::new(FailureKind::InvalidResponse, err.to_string()))
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return ApiError::new(FailureKind::InvalidResponse, err.to_string());
    }
    ApiError::new(FailureKind::Network, err.to_string())
}
