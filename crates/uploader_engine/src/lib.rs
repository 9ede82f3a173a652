//! Uploader engine: HTTP client for the analysis service and effect execution.
mod client;
mod engine;
mod persist;
mod settings;
mod types;
mod upload;

pub use client::{AnalysisClient, ReqwestAnalysisClient};
pub use engine::{ChannelEventSink, EngineHandle, EventSink};
pub use persist::{write_result, PersistError};
pub use settings::{ClientSettings, SettingsError, DEFAULT_BASE_URL};
pub use types::{ApiError, EngineEvent, FailureKind, ResearchRequest, StatusReport};
pub use upload::{PaperUpload, UploadRequest};
