use std::time::Duration;

use thiserror::Error;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://localhost:9000";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("invalid base url {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

#[derive(Debug, Clone)]
pub struct ClientSettings {
    base_url: Url,
    pub connect_timeout: Duration,
    /// Applies to status and research requests.
    pub request_timeout: Duration,
    /// Applies to the upload, which carries the whole PDF.
    pub upload_timeout: Duration,
}

impl ClientSettings {
    /// Validates `base_url` (absolute http(s) URL that can carry a path) and
    /// fills in default timeouts.
    pub fn parse(base_url: &str) -> Result<Self, SettingsError> {
        let invalid = |reason: String| SettingsError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason,
        };
        let url = Url::parse(base_url.trim()).map_err(|err| invalid(err.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme {}", url.scheme())));
        }
        if url.cannot_be_a_base() {
            return Err(invalid("url cannot carry a path".to_string()));
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(invalid("query and fragment are not allowed".to_string()));
        }
        Ok(Self {
            base_url: url,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            upload_timeout: Duration::from_secs(300),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends `segments` to the base path, percent-encoding each one.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    pub(crate) fn upload_url(&self) -> Url {
        self.endpoint(&["api", "v1", "upload-paper"])
    }

    pub(crate) fn task_status_url(&self, task_id: &str) -> Url {
        self.endpoint(&["api", "v1", "task-status", task_id])
    }

    pub(crate) fn research_url(&self) -> Url {
        self.endpoint(&["api", "v1", "research"])
    }
}
