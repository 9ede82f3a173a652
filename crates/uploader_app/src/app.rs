use std::io::Write;
use std::path::Path;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use uploader_core::{update, FileCandidate, Msg, UploaderState};
use uploader_logging::{uploader_info, uploader_warn};

use crate::effects::EffectRunner;
use crate::render::TerminalRenderer;

/// How long the loop waits for an engine result before ticking.
const TICK: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    Failed,
}

/// One uploader instance: state, effect runner and renderer. Every message,
/// whether from the user or the engine, goes through [`Session::dispatch`].
pub struct Session<W: Write> {
    state: UploaderState,
    runner: EffectRunner,
    msg_rx: mpsc::Receiver<Msg>,
    renderer: TerminalRenderer<W>,
}

impl<W: Write> Session<W> {
    pub fn new(
        state: UploaderState,
        runner: EffectRunner,
        msg_rx: mpsc::Receiver<Msg>,
        out: W,
    ) -> Self {
        Self {
            state,
            runner,
            msg_rx,
            renderer: TerminalRenderer::new(out),
        }
    }

    pub fn state(&self) -> &UploaderState {
        &self.state
    }

    pub fn dispatch(&mut self, msg: Msg) -> Result<()> {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let was_dirty = state.consume_dirty();
        let view = state.view();
        self.state = state;
        self.runner.enqueue(effects);
        if was_dirty {
            self.renderer.draw(&view).context("writing to terminal")?;
        }
        Ok(())
    }

    /// Selects `candidate`, clicks upload, and pumps engine results until the
    /// uploader is idle again. A rejected file ends the run before any upload.
    /// The session is detached on return.
    pub fn run(&mut self, candidate: FileCandidate) -> Result<Outcome> {
        self.dispatch(Msg::FileChosen(candidate))?;
        if self.state.selected_file().is_none() {
            self.dispatch(Msg::Detached)?;
            return Ok(Outcome::Failed);
        }
        self.dispatch(Msg::UploadClicked)?;

        let pumped = self.pump();
        self.dispatch(Msg::Detached)?;
        pumped?;

        if self.state.error().is_some() {
            Ok(Outcome::Failed)
        } else {
            Ok(Outcome::Completed)
        }
    }

    fn pump(&mut self) -> Result<()> {
        while self.state.is_processing() {
            match self.msg_rx.recv_timeout(TICK) {
                Ok(msg) => self.dispatch(msg)?,
                Err(RecvTimeoutError::Timeout) => self.dispatch(Msg::Tick)?,
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(anyhow!("engine stopped before the upload finished"));
                }
            }
        }
        Ok(())
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.renderer.into_inner()
    }
}

/// Writes the result payload (if any) to `output`.
pub fn save_result(state: &UploaderState, output: &Path) -> Result<()> {
    match state.result() {
        Some(result) => {
            let path = uploader_engine::write_result(output, result)
                .with_context(|| format!("writing result to {}", output.display()))?;
            uploader_info!("Result written to {:?}", path);
        }
        None => uploader_warn!("No result to write to {:?}", output),
    }
    Ok(())
}
