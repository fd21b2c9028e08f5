//! CLI presenter for output formatting

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

use crate::domain::media::PlaybackEvent;

/// Presenter for CLI output formatting
pub struct Presenter {
    spinner: Option<ProgressBar>,
    playback: Option<ProgressBar>,
    is_spinner_active: Arc<AtomicBool>,
}

impl Presenter {
    /// Create a new presenter
    pub fn new() -> Self {
        Self {
            spinner: None,
            playback: None,
            is_spinner_active: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Start a spinner with message
    pub fn start_spinner(&mut self, message: &str) {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.cyan} {msg}")
        {
            spinner.set_style(style);
        }
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(80));
        self.spinner = Some(spinner);
        self.is_spinner_active.store(true, Ordering::SeqCst);
    }

    /// Mark spinner as success and finish
    pub fn spinner_success(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_with_message(format!("{} {}", "✓".green(), message));
        }
        self.is_spinner_active.store(false, Ordering::SeqCst);
    }

    /// Mark spinner as failed and finish
    pub fn spinner_fail(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_with_message(format!("{} {}", "✗".red(), message));
        }
        self.is_spinner_active.store(false, Ordering::SeqCst);
    }

    /// Stop spinner without status
    pub fn stop_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
        self.is_spinner_active.store(false, Ordering::SeqCst);
    }

    pub fn is_spinner_active(&self) -> bool {
        self.is_spinner_active.load(Ordering::SeqCst)
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

    /// Print a bridge rejection to stderr
    pub fn rejection(&self, code: &str, message: &str) {
        eprintln!("{} {}: {}", "✗".red(), code.bold(), message);
    }

    /// Output text to stdout (resolve values, config values)
    pub fn output(&self, text: &str) {
        println!("{}", text);
    }

    /// Format a millisecond position as `m:ss`
    pub fn format_position(&self, ms: u64) -> String {
        let secs = ms / 1000;
        format!("{}:{:02}", secs / 60, secs % 60)
    }

    /// Format playback progress as `[bar] m:ss / m:ss`
    pub fn format_progress(&self, position_ms: u64, duration_ms: u64) -> String {
        let percent = if duration_ms > 0 {
            (position_ms as f64 / duration_ms as f64 * 100.0).min(100.0)
        } else {
            0.0
        };

        let bar_width = 20;
        let filled = ((percent / 100.0) * bar_width as f64) as usize;
        let empty = bar_width - filled;

        format!(
            "[{}{}] {} / {}",
            "█".repeat(filled).cyan(),
            "░".repeat(empty),
            self.format_position(position_ms),
            self.format_position(duration_ms)
        )
    }

    /// Show a playback event on the progress line.
    /// A finishing event completes the line; the next event starts a new one.
    pub fn show_playback(&mut self, event: &PlaybackEvent) {
        let line = self.format_progress(event.current_position, event.duration);
        let bar = self.playback.get_or_insert_with(|| {
            let bar = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
                bar.set_style(style);
            }
            bar
        });

        if event.is_finished() {
            bar.finish_with_message(format!("{} Finished {}", "✓".green(), line));
            self.playback = None;
        } else {
            bar.set_message(format!("Playing {}", line));
            bar.tick();
        }
    }

    /// Clear any unfinished playback line
    pub fn clear_playback(&mut self) {
        if let Some(bar) = self.playback.take() {
            bar.finish_and_clear();
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
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_position_minutes_and_seconds() {
        let presenter = Presenter::new();
        assert_eq!(presenter.format_position(0), "0:00");
        assert_eq!(presenter.format_position(61_500), "1:01");
    }

    #[test]
    fn format_progress_at_start() {
        let presenter = Presenter::new();
        let progress = presenter.format_progress(0, 10_000);
        assert!(progress.contains("0:00 / 0:10"));
    }

    #[test]
    fn format_progress_at_end() {
        let presenter = Presenter::new();
        let progress = presenter.format_progress(10_000, 10_000);
        assert!(progress.contains("0:10 / 0:10"));
    }

    #[test]
    fn format_progress_unknown_duration() {
        let presenter = Presenter::new();
        let progress = presenter.format_progress(3000, 0);
        assert!(progress.contains("0:03 / 0:00"));
    }

    #[test]
    fn finished_event_resets_playback_line() {
        let mut presenter = Presenter::new();
        presenter.show_playback(&PlaybackEvent::progress(3000, 1000));
        assert!(presenter.playback.is_some());
        presenter.show_playback(&PlaybackEvent::finished(3000));
        assert!(presenter.playback.is_none());
    }

    #[test]
    fn spinner_lifecycle() {
        let mut presenter = Presenter::new();
        presenter.start_spinner("Preparing");
        assert!(presenter.is_spinner_active());
        presenter.spinner_success("Done");
        assert!(!presenter.is_spinner_active());
    }
}
