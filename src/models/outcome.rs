//! Fetch outcomes shared by the static and browser tiers.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which retrieval tier produced a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchTier {
    /// Plain HTTP GET through the shared reqwest client.
    Static,
    /// Headless browser with stealth patches.
    Dynamic,
}

impl fmt::Display for FetchTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static => f.write_str("static"),
            Self::Dynamic => f.write_str("browser"),
        }
    }
}

/// A page body accepted by a fetcher (not a block page).
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub requested_url: String,
    pub final_url: String,
    pub status: u16,
    pub body: String,
    pub tier: FetchTier,
}

/// Causes carried by transient and fatal outcomes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("request timed out")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
    #[error("HTTP status {0}")]
    HttpStatus(u16),
    #[error("failed to read response body: {0}")]
    Body(String),
    #[error("browser error: {0}")]
    Browser(String),
    #[error("navigation failed: {0}")]
    Navigation(String),
}

/// Result of one fetch through one tier.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    Success(FetchedPage),
    /// The response was a challenge or anti-bot page; carries the matched
    /// marker or a short reason such as `challenge-timeout`.
    Blocked(String),
    /// Retryable failure that survived the tier's own retries.
    TransientError(FetchError),
    /// Failure no tier can recover from (malformed input).
    FatalError(FetchError),
    /// The environment cannot run this tier at all. Not a per-call error.
    Unavailable(String),
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::FatalError(_))
    }

    /// Short label used in logs and progress lines.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Success(_) => "success",
            Self::Blocked(_) => "blocked",
            Self::TransientError(_) => "transient error",
            Self::FatalError(_) => "fatal error",
            Self::Unavailable(_) => "unavailable",
        }
    }
}

impl fmt::Display for FetchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success(page) => write!(f, "success ({} via {})", page.status, page.tier),
            Self::Blocked(reason) => write!(f, "blocked ({})", reason),
            Self::TransientError(e) => write!(f, "transient error: {}", e),
            Self::FatalError(e) => write!(f, "fatal error: {}", e),
            Self::Unavailable(reason) => write!(f, "unavailable: {}", reason),
        }
    }
}
