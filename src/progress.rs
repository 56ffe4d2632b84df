use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

pub struct ProgressTracker {
    bar: ProgressBar,
    failed: u64,
}

impl ProgressTracker {
    pub fn new(message: &str, total: u64) -> Self {
        let bar = ProgressBar::with_draw_target(Some(total), ProgressDrawTarget::stderr_with_hz(10));
        if let Ok(style) =
            ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
        {
            bar.set_style(style.progress_chars("=>-"));
        }
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(200));
        Self { bar, failed: 0 }
    }

    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
            failed: 0,
        }
    }

    pub fn tile_done(&self) {
        self.bar.inc(1);
    }

    pub fn tile_failed(&mut self) {
        self.failed += 1;
        self.bar.set_message(format!("{} failed", self.failed));
        self.bar.inc(1);
    }

    pub fn finish(self) {
        self.bar.finish_and_clear();
    }
}

pub fn progress_for_run(message: &str, total: u64, no_progress: bool) -> ProgressTracker {
    if no_progress {
        ProgressTracker::hidden()
    } else {
        ProgressTracker::new(message, total)
    }
}
