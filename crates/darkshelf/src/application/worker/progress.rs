use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Receives one `inc` per finished job of a sync run
pub trait ProgressReporter: Send + Sync {
    fn start(&self, total: u64);
    fn inc(&self);
    fn finish(&self);
}

impl ProgressReporter for () {
    fn start(&self, _total: u64) {}

    fn inc(&self) {}

    fn finish(&self) {}
}

impl ProgressReporter for ProgressBar {
    fn start(&self, total: u64) {
        self.reset();
        self.set_length(total);
        self.enable_steady_tick(Duration::from_millis(500));
    }

    fn inc(&self) {
        ProgressBar::inc(self, 1);
    }

    fn finish(&self) {
        self.disable_steady_tick();
        self.finish_with_message("Finish!");
    }
}

/// Text bar shown on stderr while a sync runs
pub fn progress_bar() -> ProgressBar {
    let style = ProgressStyle::with_template(
        "{prefix} [{bar:60}] {percent}% {per_sec} {eta} {msg}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("=>-");

    ProgressBar::new(0)
        .with_style(style)
        .with_prefix("Updating")
}
