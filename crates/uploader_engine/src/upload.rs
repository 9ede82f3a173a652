use std::path::PathBuf;

use bytes::Bytes;

use crate::{ApiError, FailureKind};

/// What the app asks the engine to upload: a file on disk plus the name and
/// media type it was selected with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub path: PathBuf,
    pub file_name: String,
    pub media_type: String,
}

/// A file loaded into memory, ready to be sent as the multipart `file` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaperUpload {
    pub file_name: String,
    pub media_type: String,
    pub bytes: Bytes,
}

impl PaperUpload {
    pub fn new(
        file_name: impl Into<String>,
        media_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            media_type: media_type.into(),
            bytes: bytes.into(),
        }
    }

    pub async fn read(request: &UploadRequest) -> Result<Self, ApiError> {
        let bytes = tokio::fs::read(&request.path).await.map_err(|err| {
            ApiError::new(
                FailureKind::Io,
                format!("failed to read {}: {}", request.path.display(), err),
            )
        })?;
        Ok(Self::new(
            request.file_name.clone(),
            request.media_type.clone(),
            bytes,
        ))
    }
}
