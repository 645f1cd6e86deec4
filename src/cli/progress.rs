//! Progress display for batch runs.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use super::icons::{dim_arrow, error, success, warn};
use crate::models::{FailureReason, UrlOutcome};
use crate::pipeline::ProgressUpdate;

/// A single bar over the URL list with a status line per finished URL.
pub struct BatchProgress {
    bar: ProgressBar,
}

impl BatchProgress {
    pub fn new(total: usize) -> Self {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓░"),
        );
        bar.set_message("Fetching");
        Self { bar }
    }

    /// Hidden bar for `--json` runs, so stdout stays machine-readable.
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    /// Record one finished URL.
    pub fn update(&self, update: &ProgressUpdate<'_>) {
        let line = match update.outcome {
            UrlOutcome::Extracted { .. } => format!(
                "{} [{}/{}] {} {} {}",
                success(),
                update.completed,
                update.total,
                update.url,
                dim_arrow(),
                update.summary()
            ),
            UrlOutcome::Failed { reason } => {
                let icon = match reason {
                    FailureReason::Fatal(_) => error(),
                    _ => warn(),
                };
                format!(
                    "{} [{}/{}] {} {} {}",
                    icon,
                    update.completed,
                    update.total,
                    update.url,
                    dim_arrow(),
                    style(update.summary()).yellow()
                )
            }
        };
        self.bar.println(line);
        self.bar.set_position(update.completed as u64);
        if update.completed < update.total {
            self.bar.set_message(format!("{:.0}%", update.fraction() * 100.0));
        }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
