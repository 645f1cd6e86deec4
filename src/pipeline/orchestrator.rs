//! Per-URL tier selection: browser first when present, static HTTP after.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::extract::HeadingExtractor;
use crate::models::{FailureReason, FetchOutcome, FetchedPage, UrlOutcome};
use crate::scrapers::{BlockDetector, PageFetcher};

/// Runs one URL through the available tiers and extracts its headings.
///
/// The browser tier is handed in at construction. Whether it can actually
/// run is its own business (`PageFetcher::is_available`); the orchestrator
/// never probes the environment itself.
pub struct RetrievalOrchestrator {
    static_fetcher: Arc<dyn PageFetcher>,
    dynamic_fetcher: Option<Arc<dyn PageFetcher>>,
    detector: BlockDetector,
    extractor: HeadingExtractor,
}

impl RetrievalOrchestrator {
    pub fn new(
        static_fetcher: Arc<dyn PageFetcher>,
        dynamic_fetcher: Option<Arc<dyn PageFetcher>>,
    ) -> Self {
        Self {
            static_fetcher,
            dynamic_fetcher,
            detector: BlockDetector::default(),
            extractor: HeadingExtractor::default(),
        }
    }

    pub fn with_detector(mut self, detector: BlockDetector) -> Self {
        self.detector = detector;
        self
    }

    pub fn with_extractor(mut self, extractor: HeadingExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn has_dynamic_tier(&self) -> bool {
        self.dynamic_fetcher.is_some()
    }

    /// The browser tier, if one was injected and can run right now.
    pub fn active_dynamic_tier(&self) -> Option<&Arc<dyn PageFetcher>> {
        self.dynamic_fetcher.as_ref().filter(|d| d.is_available())
    }

    /// Fetch `url` and extract its structure, or report why it failed.
    pub async fn retrieve(&self, url: &str) -> UrlOutcome {
        match self.fetch(url).await {
            FetchOutcome::Success(page) => {
                let structure = self.extractor.extract_html(&page.body);
                debug!(
                    "{}: {} heading(s) via {} tier",
                    url,
                    structure.len(),
                    page.tier
                );
                UrlOutcome::Extracted {
                    structure,
                    tier: page.tier,
                }
            }
            other => {
                let reason = FailureReason::from_outcome(&other).unwrap_or_else(|| {
                    FailureReason::Transient("no outcome".to_string())
                });
                warn!("Skipping {}: {}", url, reason);
                UrlOutcome::Failed { reason }
            }
        }
    }

    /// Tier fall-through without extraction.
    pub async fn fetch(&self, url: &str) -> FetchOutcome {
        if let Some(dynamic) = self.active_dynamic_tier() {
            info!("Fetching {} via {} tier", url, dynamic.tier());
            match self.gate(dynamic.fetch(url).await) {
                outcome @ (FetchOutcome::Success(_) | FetchOutcome::FatalError(_)) => {
                    return outcome;
                }
                other => {
                    info!(
                        "{} tier {} for {}, falling back to {}",
                        dynamic.tier(),
                        other.label(),
                        url,
                        self.static_fetcher.tier()
                    );
                }
            }
        } else {
            info!("Fetching {} via {} tier", url, self.static_fetcher.tier());
        }

        self.gate(self.static_fetcher.fetch(url).await)
    }

    /// Turn a "successful" block page into `Blocked`, whichever tier produced it.
    fn gate(&self, outcome: FetchOutcome) -> FetchOutcome {
        match outcome {
            FetchOutcome::Success(page) => match self.blocked_marker(&page) {
                Some(marker) => FetchOutcome::Blocked(marker),
                None => FetchOutcome::Success(page),
            },
            other => other,
        }
    }

    fn blocked_marker(&self, page: &FetchedPage) -> Option<String> {
        self.detector.find_marker(&page.body).map(str::to_string)
    }
}
