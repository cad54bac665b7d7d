//! Progress reporting while waiting on the backend

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner shown on stderr until the first byte of a response arrives.
///
/// A hidden reporter does nothing, which keeps `--quiet` and JSON output
/// free of terminal control sequences.
pub struct ProgressReporter {
    bar: Option<ProgressBar>,
    enabled: bool,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            bar: None,
            enabled: true,
        }
    }

    pub fn hidden() -> Self {
        Self {
            bar: None,
            enabled: false,
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    /// Start (or relabel) the spinner.
    pub fn waiting(&mut self, prefix: &str, message: &str) {
        if !self.enabled {
            return;
        }
        let bar = self.bar.get_or_insert_with(|| {
            let bar = ProgressBar::new_spinner();
            bar.set_style(Self::spinner_style());
            bar.enable_steady_tick(Duration::from_millis(100));
            bar
        });
        bar.set_prefix(prefix.to_string());
        bar.set_message(message.to_string());
    }

    /// Remove the spinner from the terminal.
    pub fn clear(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_reporter_never_draws() {
        let mut reporter = ProgressReporter::hidden();
        reporter.waiting("req-1", "waiting");
        assert!(reporter.bar.is_none());
    }
}
