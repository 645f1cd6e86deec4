//! Page fetchers: static HTTP and stealth browser tiers.

pub mod block_detect;
pub mod browser;
mod http_client;
pub mod retry;

pub use block_detect::{BlockDetector, DEFAULT_BLOCK_MARKERS};
pub use browser::{BrowserEngineConfig, BrowserFetcher, CHALLENGE_TIMEOUT_REASON};
pub use http_client::{ClientBuildError, HttpFetcher, HttpFetcherBuilder, IMPERSONATE_USER_AGENTS};
pub use retry::RetryPolicy;

use async_trait::async_trait;
use url::Url;

use crate::models::{FetchError, FetchOutcome, FetchTier};

/// One retrieval tier.
///
/// Implementations classify their own results (block pages included) into a
/// [`FetchOutcome`]; callers never see raw transport errors.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Tier reported in results and logs.
    fn tier(&self) -> FetchTier;

    /// Whether this tier can run in the current environment. Once false it
    /// stays false for the rest of the process.
    fn is_available(&self) -> bool {
        true
    }

    /// Fetch `url` once (including any internal retries).
    async fn fetch(&self, url: &str) -> FetchOutcome;
}

/// Parse a user-supplied URL, accepting only http and https.
pub fn validate_url(raw: &str) -> Result<Url, FetchError> {
    let url = Url::parse(raw.trim()).map_err(|e| FetchError::InvalidUrl(format!("{}: {}", raw, e)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(FetchError::InvalidUrl(format!(
            "{}: unsupported scheme '{}'",
            raw,
            url.scheme()
        )));
    }
    if url.host_str().is_none() {
        return Err(FetchError::InvalidUrl(format!("{}: missing host", raw)));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url_accepts_http_and_https() {
        assert!(validate_url("https://example.com/page").is_ok());
        assert!(validate_url("  http://example.com  ").is_ok());
    }

    #[test]
    fn test_validate_url_rejects_malformed() {
        assert!(matches!(validate_url("not a url"), Err(FetchError::InvalidUrl(_))));
        assert!(matches!(validate_url("ftp://example.com/file"), Err(FetchError::InvalidUrl(_))));
        assert!(matches!(validate_url("example.com/page"), Err(FetchError::InvalidUrl(_))));
    }
}
