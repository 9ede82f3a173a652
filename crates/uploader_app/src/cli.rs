use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::{mpsc, Arc};
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use uploader_core::{FileCandidate, UploaderState};
use uploader_engine::{ChannelEventSink, EngineEvent, EngineHandle, ResearchRequest};
use uploader_logging::{uploader_debug, uploader_info};

use crate::app::{save_result, Outcome, Session};
use crate::config::AppConfig;
use crate::effects::EffectRunner;

#[derive(Parser, Debug)]
#[command(name = "paper-uploader")]
#[command(about = "Upload a research paper PDF for analysis and show the result")]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Command,

    /// Path to config RON. If omitted, uses ./paper-uploader.ron if present.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Analysis service origin, e.g. http://localhost:9000.
    #[arg(long, global = true, env = "PAPER_UPLOADER_BASE_URL")]
    pub base_url: Option<String>,

    /// Override log level (trace/debug/info/warn/error/off).
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Upload a PDF, wait for the analysis, and print the result.
    Upload {
        file: PathBuf,
        /// Also write the result JSON to this file.
        #[arg(long)]
        output: Option<PathBuf>,
        #[arg(long)]
        poll_interval_ms: Option<u64>,
        #[arg(long)]
        max_poll_attempts: Option<u32>,
    },
    /// Ask the service to research a topic.
    Research {
        #[arg(long)]
        topic: String,
        #[arg(long, default_value_t = ResearchRequest::DEFAULT_MAX_PAPERS)]
        max_papers: u32,
    },
    /// Print the effective configuration.
    Config,
}

pub fn dispatch(args: Args) -> Result<ExitCode> {
    let mut cfg = AppConfig::resolve(args.config.as_deref())?;
    apply_overrides(&mut cfg, &args);
    uploader_logging::initialize(&cfg.log_settings(args.log_level.as_deref())?);
    uploader_debug!("Effective config: {:?}", cfg);

    match args.cmd {
        Command::Upload {
            ref file,
            ref output,
            ..
        } => upload(&cfg, file, output.as_deref()),
        Command::Research {
            ref topic,
            max_papers,
        } => research(&cfg, topic, max_papers),
        Command::Config => {
            println!("{}", cfg.to_ron()?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn apply_overrides(cfg: &mut AppConfig, args: &Args) {
    if let Some(base_url) = &args.base_url {
        cfg.server.base_url = base_url.clone();
    }
    if let Command::Upload {
        poll_interval_ms,
        max_poll_attempts,
        ..
    } = &args.cmd
    {
        if let Some(interval) = poll_interval_ms {
            cfg.poll.interval_ms = *interval;
        }
        if let Some(max) = max_poll_attempts {
            cfg.poll.max_attempts = Some(*max);
        }
    }
}

fn upload(cfg: &AppConfig, file: &Path, output: Option<&Path>) -> Result<ExitCode> {
    let settings = cfg.client_settings()?;
    let policy = cfg.poll_policy()?;
    uploader_info!("Using analysis service at {}", settings.base_url());

    let (msg_tx, msg_rx) = mpsc::channel();
    let runner = EffectRunner::new(settings, msg_tx).context("starting engine")?;
    let mut session = Session::new(
        UploaderState::with_policy(policy),
        runner,
        msg_rx,
        io::stdout(),
    );

    let outcome = session.run(FileCandidate::from_path(file))?;
    if let Some(output) = output {
        save_result(session.state(), output)?;
    }
    Ok(match outcome {
        Outcome::Completed => ExitCode::SUCCESS,
        Outcome::Failed => ExitCode::FAILURE,
    })
}

fn research(cfg: &AppConfig, topic: &str, max_papers: u32) -> Result<ExitCode> {
    let settings = cfg.client_settings()?;
    let wait = settings.request_timeout + Duration::from_secs(5);

    let (tx, rx) = mpsc::channel();
    let engine = EngineHandle::new(settings, Arc::new(ChannelEventSink::new(tx)))
        .context("starting engine")?;
    engine.research(ResearchRequest {
        topic: topic.to_string(),
        max_papers,
    });

    match rx
        .recv_timeout(wait)
        .map_err(|_| anyhow!("no answer to research request within {wait:?}"))?
    {
        EngineEvent::ResearchCompleted { response } => {
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(ExitCode::SUCCESS)
        }
        EngineEvent::ResearchFailed { error } => {
            Err(anyhow!(error).context(format!("research on {topic:?} failed")))
        }
        other => bail!("unexpected engine event {other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_flags_override_config() {
        let args = Args::parse_from([
            "paper-uploader",
            "--base-url",
            "http://analysis:8080",
            "upload",
            "paper.pdf",
            "--poll-interval-ms",
            "500",
            "--max-poll-attempts",
            "4",
        ]);
        let mut cfg = AppConfig::default();
        apply_overrides(&mut cfg, &args);

        assert_eq!(cfg.server.base_url, "http://analysis:8080");
        assert_eq!(cfg.poll.interval_ms, 500);
        assert_eq!(cfg.poll.max_attempts, Some(4));
    }

    #[test]
    fn research_defaults_to_ten_papers() {
        let args = Args::parse_from(["paper-uploader", "research", "--topic", "llm agents"]);
        match args.cmd {
            Command::Research { topic, max_papers } => {
                assert_eq!(topic, "llm agents");
                assert_eq!(max_papers, 10);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
