//! Sequential batch runs with jittered pacing.

use std::time::Duration;

use chrono::Utc;
use tracing::debug;

use super::orchestrator::RetrievalOrchestrator;
use crate::models::{BatchEntry, BatchResult, UrlOutcome};
use crate::utils::random;

/// Delay window between consecutive URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    pub min: Duration,
    pub max: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            min: Duration::from_millis(1000),
            max: Duration::from_millis(2500),
        }
    }
}

impl Pacing {
    /// No delay at all.
    pub fn none() -> Self {
        Self {
            min: Duration::ZERO,
            max: Duration::ZERO,
        }
    }

    pub fn from_millis(min: u64, max: u64) -> Self {
        Self {
            min: Duration::from_millis(min),
            max: Duration::from_millis(max),
        }
    }

    /// A jittered delay inside the window.
    pub fn next_delay(&self) -> Duration {
        random::duration_between(self.min, self.max)
    }
}

/// Progress notification sent after each URL.
#[derive(Debug, Clone)]
pub struct ProgressUpdate<'a> {
    /// URLs finished so far, including this one.
    pub completed: usize,
    pub total: usize,
    pub url: &'a str,
    pub outcome: &'a UrlOutcome,
}

impl ProgressUpdate<'_> {
    /// Share of the batch finished, in `0.0..=1.0`.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        self.completed as f64 / self.total as f64
    }

    /// One-line summary such as "extracted 12 heading(s) via browser".
    pub fn summary(&self) -> String {
        match self.outcome {
            UrlOutcome::Extracted { structure, tier } => {
                format!("extracted {} heading(s) via {}", structure.len(), tier)
            }
            UrlOutcome::Failed { reason } => format!("skipped: {}", reason),
        }
    }
}

/// Walks a URL list one at a time and collects results in input order.
pub struct BatchCoordinator {
    orchestrator: RetrievalOrchestrator,
    pacing: Pacing,
}

impl BatchCoordinator {
    pub fn new(orchestrator: RetrievalOrchestrator) -> Self {
        Self {
            orchestrator,
            pacing: Pacing::default(),
        }
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn orchestrator(&self) -> &RetrievalOrchestrator {
        &self.orchestrator
    }

    /// Retrieve every URL. A failed URL is recorded and the batch moves on.
    pub async fn run<S, F>(&self, urls: &[S], mut on_progress: F) -> BatchResult
    where
        S: AsRef<str>,
        F: FnMut(&ProgressUpdate<'_>),
    {
        let started_at = Utc::now();
        let total = urls.len();
        let mut entries = Vec::with_capacity(total);

        for (i, url) in urls.iter().enumerate() {
            let url = url.as_ref().trim();
            let outcome = self.orchestrator.retrieve(url).await;

            on_progress(&ProgressUpdate {
                completed: i + 1,
                total,
                url,
                outcome: &outcome,
            });

            entries.push(BatchEntry {
                index: i + 1,
                url: url.to_string(),
                outcome,
            });

            if i + 1 < total {
                let delay = self.pacing.next_delay();
                if !delay.is_zero() {
                    debug!("Pacing {:?} before next URL", delay);
                    tokio::time::sleep(delay).await;
                }
            }
        }

        BatchResult {
            entries,
            started_at,
            finished_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CompetitorStructure, FailureReason, FetchTier};

    #[test]
    fn test_pacing_within_window() {
        let pacing = Pacing::from_millis(10, 20);
        for _ in 0..50 {
            let delay = pacing.next_delay();
            assert!(delay >= Duration::from_millis(10) && delay <= Duration::from_millis(20));
        }
        assert_eq!(Pacing::none().next_delay(), Duration::ZERO);
    }

    #[test]
    fn test_progress_fraction_and_summary() {
        let outcome = UrlOutcome::Extracted {
            structure: CompetitorStructure::NoRelevantHeadings,
            tier: FetchTier::Static,
        };
        let update = ProgressUpdate {
            completed: 1,
            total: 4,
            url: "https://example.com",
            outcome: &outcome,
        };
        assert_eq!(update.fraction(), 0.25);
        assert_eq!(update.summary(), "extracted 0 heading(s) via static");

        let failed = UrlOutcome::Failed {
            reason: FailureReason::Blocked("captcha".into()),
        };
        let update = ProgressUpdate {
            completed: 4,
            total: 4,
            url: "https://example.com",
            outcome: &failed,
        };
        assert_eq!(update.fraction(), 1.0);
        assert_eq!(update.summary(), "skipped: blocked (captcha)");
    }
}
