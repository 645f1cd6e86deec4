//! Challenge and anti-bot page detection.
//!
//! Anti-bot vendors frequently answer with HTTP 200 and an interstitial, so
//! the body is checked regardless of status. Ambiguous pages count as blocked:
//! forwarding interstitial headings into a prompt is worse than skipping a
//! competitor.

/// Markers that identify challenge, CAPTCHA and access-denied pages.
pub const DEFAULT_BLOCK_MARKERS: &[&str] = &[
    "cloudflare",
    "captcha",
    "just a moment",
    "checking your browser",
    "access denied",
    "blocked",
    "attention required",
];

/// Case-insensitive substring matcher over response bodies.
#[derive(Debug, Clone)]
pub struct BlockDetector {
    markers: Vec<String>,
}

impl Default for BlockDetector {
    fn default() -> Self {
        Self::new(DEFAULT_BLOCK_MARKERS)
    }
}

impl BlockDetector {
    pub fn new<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let markers = markers
            .into_iter()
            .map(|m| m.as_ref().trim().to_lowercase())
            .filter(|m| !m.is_empty())
            .collect();
        Self { markers }
    }

    pub fn markers(&self) -> &[String] {
        &self.markers
    }

    /// First marker found in `body`, if any.
    pub fn find_marker(&self, body: &str) -> Option<&str> {
        let lower = body.to_lowercase();
        self.markers
            .iter()
            .find(|m| lower.contains(m.as_str()))
            .map(|m| m.as_str())
    }

    pub fn is_blocked(&self, body: &str) -> bool {
        self.find_marker(body).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checking_your_browser_is_blocked() {
        let detector = BlockDetector::default();
        let body = "<html><title>One moment</title><body>Checking your browser before accessing example.com</body></html>";
        assert!(detector.is_blocked(body));
        assert_eq!(detector.find_marker(body), Some("checking your browser"));
    }

    #[test]
    fn test_case_insensitive() {
        let detector = BlockDetector::default();
        assert!(detector.is_blocked("ACCESS DENIED"));
        assert!(detector.is_blocked("Please complete the CAPTCHA"));
        assert!(detector.is_blocked("Attention Required! | Cloudflare"));
    }

    #[test]
    fn test_clean_page_not_blocked() {
        let detector = BlockDetector::default();
        assert!(!detector.is_blocked("<h2>Pricing Plans</h2><p>Compare our tiers.</p>"));
        assert_eq!(detector.find_marker(""), None);
    }

    #[test]
    fn test_deterministic() {
        let detector = BlockDetector::default();
        let body = "Just a moment...";
        assert_eq!(detector.is_blocked(body), detector.is_blocked(body));
        assert!(detector.is_blocked(body));
    }

    #[test]
    fn test_custom_markers() {
        let detector = BlockDetector::new(["  Rate Limited ", ""]);
        assert_eq!(detector.markers(), &["rate limited".to_string()]);
        assert!(detector.is_blocked("You have been rate limited"));
        assert!(!detector.is_blocked("cloudflare"));
    }
}
