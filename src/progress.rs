//! Progress bar for batch runs

use declarative::{Outcome, ProgressCallback};
use indicatif::{ProgressBar, ProgressStyle};

/// Renders batch progress on stderr; hidden when output must stay clean
pub struct BatchProgress {
    bar: ProgressBar,
    failed: usize,
}

impl BatchProgress {
    pub fn new(visible: bool) -> Self {
        let bar = if visible {
            ProgressBar::new(0)
        } else {
            ProgressBar::hidden()
        };
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            bar.set_style(style.progress_chars("=>-"));
        }
        Self { bar, failed: 0 }
    }
}

impl ProgressCallback for BatchProgress {
    fn on_batch_start(&mut self, count: usize) {
        self.bar.set_length(count as u64);
    }

    fn on_job_start(&mut self, label: &str) {
        self.bar.set_message(label.to_string());
    }

    fn on_job_complete(&mut self, label: &str, result: &declarative::Result<Outcome>) {
        if result.is_err() {
            self.failed += 1;
            self.bar.set_message(format!("{label} failed ({} so far)", self.failed));
        }
        self.bar.inc(1);
    }

    fn on_batch_complete(&mut self) {
        self.bar.finish_and_clear();
    }
}
