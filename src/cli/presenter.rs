//! CLI presenter for output formatting

use std::io::{self, Write};

use colored::*;

use crate::bridge::{Response, Value};

/// Presenter for CLI output formatting
pub struct Presenter {
    /// A `\r` progress line is on stderr
    progress_active: bool,
}

impl Presenter {
    pub fn new() -> Self {
        Self {
            progress_active: false,
        }
    }

    /// Print info message to stderr
    pub fn info(&self, message: &str) {
        eprintln!("{} {}", "ℹ".cyan(), message);
    }

    /// Print success message to stderr
    pub fn success(&self, message: &str) {
        eprintln!("{} {}", "✓".green(), message);
    }

    /// Print warning message to stderr
    pub fn warn(&self, message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Print error message to stderr
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Print an error and its source chain
    pub fn error_chain(&self, error: &(dyn std::error::Error + 'static)) {
        self.error(&error.to_string());
        let mut causes = Vec::new();
        let mut source = error.source();
        while let Some(inner) = source {
            causes.push(inner.to_string());
            source = inner.source();
        }
        self.causes(causes.iter());
    }

    fn causes<'a>(&self, causes: impl Iterator<Item = &'a String>) {
        for cause in causes {
            eprintln!("  {} {}", "caused by:".dimmed(), cause);
        }
    }

    /// Output text to stdout (paths, statuses, config values)
    pub fn output(&self, text: &str) {
        println!("{}", text);
    }

    /// Format recording progress bar
    pub fn format_progress(&self, elapsed_ms: u64, total_ms: u64) -> String {
        let elapsed_secs = elapsed_ms / 1000;
        let total_secs = total_ms / 1000;
        let percent = if total_ms > 0 {
            (elapsed_ms as f64 / total_ms as f64 * 100.0).min(100.0)
        } else {
            0.0
        };

        let bar_width = 20;
        let filled = ((percent / 100.0) * bar_width as f64) as usize;
        let empty = bar_width - filled;

        format!(
            "[{}{}] {:>3}s / {}s",
            "█".repeat(filled).cyan(),
            "░".repeat(empty),
            elapsed_secs,
            total_secs
        )
    }

    /// Redraw the recording progress line in place
    pub fn update_recording_progress(&mut self, elapsed_ms: u64, total_ms: u64, paused: bool) {
        let label = if paused { "Paused   " } else { "Recording" };
        eprint!(
            "\r{} {} {}",
            "●".red(),
            label,
            self.format_progress(elapsed_ms, total_ms)
        );
        let _ = io::stderr().flush();
        self.progress_active = true;
    }

    /// End the progress line
    pub fn finish_progress(&mut self) {
        if self.progress_active {
            eprintln!();
            self.progress_active = false;
        }
    }

    /// Print daemon status
    pub fn daemon_status(&self, state: &str) {
        eprintln!("{} Daemon: {}", "●".cyan(), state);
    }

    /// Print a key-value pair (for config list)
    pub fn key_value(&self, key: &str, value: &str) {
        println!("{}: {}", key.cyan(), value);
    }

    /// Print a bridge response for a user
    pub fn response(&self, response: &Response) {
        match response {
            Response::Status { status } => self.output(status.as_str()),
            Response::Value { value } => match value {
                Value::Flag(true) => self.success("Done"),
                Value::Flag(false) => self.warn("Nothing to do"),
                Value::Recording(data) => {
                    self.success(&format!(
                        "Saved {} ({}, {})",
                        data.path,
                        format_millis(data.ms_duration),
                        data.mime_type
                    ));
                    self.output(data.uri.trim_start_matches("file://"));
                }
                Value::Path(Some(path)) => self.output(path),
                Value::Path(None) => self.output("(none)"),
            },
            Response::Error { error } => {
                self.error(&error.message);
                self.causes(error.causes.iter());
            }
        }
    }
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new()
    }
}

/// `m:ss.mmm` for a recording length
pub fn format_millis(ms: u64) -> String {
    let minutes = ms / 60_000;
    let seconds = (ms % 60_000) / 1000;
    format!("{}:{:02}.{:03}", minutes, seconds, ms % 1000)
}
