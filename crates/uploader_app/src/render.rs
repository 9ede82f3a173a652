use std::io::{self, Write};

use uploader_core::UploaderViewModel;

const TITLE: &str = "Upload Research Paper";
const PROGRESS_CELLS: usize = 20;

/// Turns a view model into the lines of one terminal frame. Pure.
pub fn render(view: &UploaderViewModel) -> Vec<String> {
    let mut lines = vec![TITLE.to_string()];

    let picker = if view.picker_enabled {
        "[Select PDF]"
    } else {
        "[Select PDF] (disabled)"
    };
    lines.push(picker.to_string());

    if let Some(name) = &view.file_name {
        lines.push(format!("Selected: {name}"));
    }

    if let Some(percent) = view.progress {
        lines.push(format!(
            "{} Processing: {}%",
            progress_bar(percent),
            percent
        ));
    }

    if let Some(error) = &view.error {
        lines.push(format!("Error: {error}"));
    }

    if let Some(json) = &view.result_json {
        lines.push("Analysis Results:".to_string());
        lines.extend(json.lines().map(str::to_string));
    }

    let state = if view.action.enabled { "" } else { " (disabled)" };
    lines.push(format!("[{}]{}", view.action.label, state));
    lines
}

fn progress_bar(percent: u8) -> String {
    let filled = usize::from(percent.min(100)) * PROGRESS_CELLS / 100;
    format!(
        "[{}{}]",
        "#".repeat(filled),
        "-".repeat(PROGRESS_CELLS - filled)
    )
}

/// Writes a frame whenever it differs from the previous one.
pub struct TerminalRenderer<W: Write> {
    out: W,
    last: Vec<String>,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            last: Vec::new(),
        }
    }

    pub fn draw(&mut self, view: &UploaderViewModel) -> io::Result<()> {
        let frame = render(view);
        if frame == self.last {
            return Ok(());
        }
        if !self.last.is_empty() {
            writeln!(self.out)?;
        }
        for line in &frame {
            writeln!(self.out, "{line}")?;
        }
        self.out.flush()?;
        self.last = frame;
        Ok(())
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}
