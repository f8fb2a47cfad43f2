//! CLI presenter for output formatting

use std::io::{self, Write};

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

use crate::application::ports::{StatusKind, StatusReporter};
use crate::domain::recording::{format_clock, format_length};

/// Presenter for CLI output formatting
pub struct Presenter {
    spinner: Option<ProgressBar>,
}

impl Presenter {
    /// Create a new presenter
    pub fn new() -> Self {
        Self { spinner: None }
    }

    /// Start a spinner with message
    pub fn start_spinner(&mut self, message: &str) {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.red} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        spinner.set_style(style);
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        self.spinner = Some(spinner);
    }

    /// Update spinner message
    pub fn update_spinner(&self, message: &str) {
        if let Some(ref spinner) = self.spinner {
            spinner.set_message(message.to_string());
        }
    }

    /// Mark spinner as success and finish
    pub fn spinner_success(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_with_message(format!("{} {}", "✓".green(), message));
        }
    }

    /// Mark spinner as failed and finish
    pub fn spinner_fail(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_with_message(format!("{} {}", "✗".red(), message));
        }
    }

    /// Stop spinner without status
    pub fn stop_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
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

    /// Output text to stdout
    pub fn output(&self, text: &str) {
        println!("{}", text);
    }

    /// Print a question to stderr and leave the cursor on the same line
    pub fn prompt(&self, question: &str) {
        eprint!("{} {} ", "?".magenta(), question);
        let _ = io::stderr().flush();
    }

    /// Live recording line: `● REC 00:12 / 05:00`
    pub fn format_timer(&self, elapsed_ms: u64, max_ms: u64) -> String {
        format!(
            "{} {} / {}  {}",
            "REC".red().bold(),
            format_clock(elapsed_ms),
            format_clock(max_ms),
            "(Enter to stop, Ctrl+C to cancel)".dimmed()
        )
    }

    /// Update the recording timer
    pub fn update_recording_timer(&self, elapsed_ms: u64, max_ms: u64) {
        self.update_spinner(&self.format_timer(elapsed_ms, max_ms));
    }

    /// One-line description of a finished recording
    pub fn format_summary(&self, size: &str, sample_rate: Option<u32>, duration_ms: u64) -> String {
        match sample_rate {
            Some(rate) => format!(
                "Recorded {} ({} Hz, 16-bit mono, {})",
                format_length(duration_ms),
                rate,
                size
            ),
            None => format!("Recorded {} ({})", format_length(duration_ms), size),
        }
    }

    /// Print a key-value pair (for config list)
    pub fn key_value(&self, key: &str, value: &str) {
        println!("{}: {}", key.cyan(), value);
    }
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusReporter for Presenter {
    fn report(&self, kind: StatusKind, message: &str) {
        match kind {
            StatusKind::Info => self.info(message),
            StatusKind::Loading => eprintln!("{} {}", "⠋".cyan(), message),
            StatusKind::Success => self.success(message),
            StatusKind::Error => self.error(message),
        }
    }
}
