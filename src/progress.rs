//! Progress bar for applying a merge plan

use indicatif::{ProgressBar, ProgressStyle};
use reconcile::{ExecuteSummary, PlannedAction, ProgressCallback};

use crate::ui;

/// Spinner for a step of unknown length; `None` when output is quiet
pub fn spinner(msg: &str, quiet: bool) -> Option<ProgressBar> {
    if quiet {
        return None;
    }
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(msg.to_string());
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));
    Some(spinner)
}

/// Progress callback drawing an indicatif bar
pub struct BarProgress {
    bar: Option<ProgressBar>,
    hidden: bool,
}

impl BarProgress {
    pub fn new(quiet: bool) -> Self {
        Self {
            bar: None,
            hidden: quiet,
        }
    }
}

impl ProgressCallback for BarProgress {
    fn on_start(&mut self, total: usize) {
        if self.hidden || total == 0 {
            return;
        }
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );
        self.bar = Some(bar);
    }

    fn on_action(&mut self, action: &PlannedAction) {
        if let Some(bar) = &self.bar {
            bar.set_message(ui::truncate_path(action.path(), 50));
            bar.inc(1);
        }
    }

    fn on_complete(&mut self, _summary: &ExecuteSummary) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}
