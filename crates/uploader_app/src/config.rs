//! RON configuration for the uploader binary.
//!
//! Every section is optional; missing fields fall back to the defaults below.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use uploader_core::PollPolicy;
use uploader_engine::{ClientSettings, DEFAULT_BASE_URL};
use uploader_logging::{LogDestination, LogSettings};

pub const DEFAULT_CONFIG_FILE: &str = "paper-uploader.ron";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub poll: PollConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub base_url: String,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub upload_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
            upload_timeout_secs: 300,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    pub interval_ms: u64,
    pub backoff_factor: f64,
    pub max_interval_ms: u64,
    pub max_attempts: Option<u32>,
    pub assumed_duration_secs: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        let policy = PollPolicy::default();
        Self {
            interval_ms: duration_ms(policy.interval),
            backoff_factor: policy.backoff_factor,
            max_interval_ms: duration_ms(policy.max_interval),
            max_attempts: policy.max_attempts,
            assumed_duration_secs: policy.assumed_duration.as_secs(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum LogTarget {
    File,
    #[default]
    Terminal,
    Both,
    Off,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub destination: LogTarget,
    pub level: String,
    pub file: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        let defaults = LogSettings::default();
        Self {
            destination: LogTarget::Terminal,
            level: defaults.level.to_string().to_lowercase(),
            file: defaults.file,
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("parsing config: {}", path.display()))
    }

    pub fn parse(raw: &str) -> Result<Self> {
        ron::from_str(raw).map_err(|err| anyhow!("invalid RON: {err}"))
    }

    /// Uses `user` if given, else `./paper-uploader.ron` when present, else
    /// built-in defaults.
    pub fn resolve(user: Option<&Path>) -> Result<Self> {
        if let Some(path) = user {
            return Self::load(path);
        }
        let default = PathBuf::from(DEFAULT_CONFIG_FILE);
        if default.exists() {
            Self::load(&default)
        } else {
            Ok(Self::default())
        }
    }

    pub fn to_ron(&self) -> Result<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::new())
            .map_err(|err| anyhow!("serializing config: {err}"))
    }

    pub fn client_settings(&self) -> Result<ClientSettings> {
        let mut settings = ClientSettings::parse(&self.server.base_url)?;
        settings.connect_timeout = Duration::from_secs(self.server.connect_timeout_secs);
        settings.request_timeout = Duration::from_secs(self.server.request_timeout_secs);
        settings.upload_timeout = Duration::from_secs(self.server.upload_timeout_secs);
        Ok(settings)
    }

    pub fn poll_policy(&self) -> Result<PollPolicy> {
        let poll = &self.poll;
        if !poll.backoff_factor.is_finite() || poll.backoff_factor < 1.0 {
            return Err(anyhow!(
                "poll.backoff_factor must be a number >= 1.0, got {}",
                poll.backoff_factor
            ));
        }
        if poll.interval_ms == 0 {
            return Err(anyhow!("poll.interval_ms must be positive"));
        }
        Ok(PollPolicy {
            interval: Duration::from_millis(poll.interval_ms),
            backoff_factor: poll.backoff_factor,
            max_interval: Duration::from_millis(poll.max_interval_ms),
            max_attempts: poll.max_attempts,
            assumed_duration: Duration::from_secs(poll.assumed_duration_secs),
        })
    }

    /// `level_override` (from `--log-level`) wins over the file.
    pub fn log_settings(&self, level_override: Option<&str>) -> Result<LogSettings> {
        let name = level_override.unwrap_or(&self.logging.level);
        let level = uploader_logging::parse_level(name)
            .ok_or_else(|| anyhow!("unknown log level {name:?}"))?;
        let destination = match self.logging.destination {
            LogTarget::File => LogDestination::File,
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::Both => LogDestination::Both,
            LogTarget::Off => LogDestination::Off,
        };
        Ok(LogSettings {
            destination,
            level,
            file: self.logging.file.clone(),
        })
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
