//! Batch results, kept in input order.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::heading::CompetitorStructure;
use super::outcome::{FetchOutcome, FetchTier};

/// Why a URL produced no structure after every tier was tried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FailureReason {
    Blocked(String),
    Transient(String),
    Fatal(String),
}

impl FailureReason {
    /// Failure reason for a non-success outcome. `Success` has none.
    pub fn from_outcome(outcome: &FetchOutcome) -> Option<Self> {
        match outcome {
            FetchOutcome::Success(_) => None,
            FetchOutcome::Blocked(reason) => Some(Self::Blocked(reason.clone())),
            FetchOutcome::TransientError(e) => Some(Self::Transient(e.to_string())),
            FetchOutcome::FatalError(e) => Some(Self::Fatal(e.to_string())),
            FetchOutcome::Unavailable(reason) => Some(Self::Transient(reason.clone())),
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blocked(reason) => write!(f, "blocked ({})", reason),
            Self::Transient(detail) => write!(f, "{}", detail),
            Self::Fatal(detail) => write!(f, "{}", detail),
        }
    }
}

/// Final result for a single URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UrlOutcome {
    Extracted {
        structure: CompetitorStructure,
        tier: FetchTier,
    },
    Failed {
        reason: FailureReason,
    },
}

impl UrlOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Extracted { .. })
    }

    pub fn structure(&self) -> Option<&CompetitorStructure> {
        match self {
            Self::Extracted { structure, .. } => Some(structure),
            Self::Failed { .. } => None,
        }
    }
}

/// One input URL and what became of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchEntry {
    /// 1-based position in the input list.
    pub index: usize,
    pub url: String,
    pub outcome: UrlOutcome,
}

/// Raised when a batch finished without a single usable structure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BatchError {
    #[error("no competitor produced usable structure ({attempted} URL(s) attempted)")]
    NoUsableStructure { attempted: usize },
}

/// Every URL of a batch run, in input order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResult {
    pub entries: Vec<BatchEntry>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl BatchResult {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn success_count(&self) -> usize {
        self.entries.iter().filter(|e| e.outcome.is_success()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.len() - self.success_count()
    }

    /// Successful entries in input order.
    pub fn successes(&self) -> impl Iterator<Item = (&BatchEntry, &CompetitorStructure)> {
        self.entries
            .iter()
            .filter_map(|e| e.outcome.structure().map(|s| (e, s)))
    }

    /// Structures of successful entries in input order, or an error when
    /// nothing succeeded.
    pub fn structures(&self) -> Result<Vec<&CompetitorStructure>, BatchError> {
        let structures: Vec<_> = self.successes().map(|(_, s)| s).collect();
        if structures.is_empty() {
            return Err(BatchError::NoUsableStructure {
                attempted: self.len(),
            });
        }
        Ok(structures)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FetchError, HeadingLevel, HeadingRecord};

    fn entry(index: usize, outcome: UrlOutcome) -> BatchEntry {
        BatchEntry {
            index,
            url: format!("https://example.com/{}", index),
            outcome,
        }
    }

    fn extracted(text: &str) -> UrlOutcome {
        UrlOutcome::Extracted {
            structure: CompetitorStructure::from_headings(vec![HeadingRecord::new(
                HeadingLevel::H2,
                text,
            )]),
            tier: FetchTier::Static,
        }
    }

    fn failed() -> UrlOutcome {
        UrlOutcome::Failed {
            reason: FailureReason::Transient("HTTP status 503".to_string()),
        }
    }

    #[test]
    fn test_counts_and_order() {
        let result = BatchResult {
            entries: vec![entry(1, extracted("First")), entry(2, failed()), entry(3, extracted("Third"))],
            started_at: Utc::now(),
            finished_at: Utc::now(),
        };

        assert_eq!(result.success_count(), 2);
        assert_eq!(result.failure_count(), 1);

        let indexes: Vec<usize> = result.successes().map(|(e, _)| e.index).collect();
        assert_eq!(indexes, vec![1, 3]);
    }

    #[test]
    fn test_structures_errors_when_nothing_succeeded() {
        let result = BatchResult {
            entries: vec![entry(1, failed()), entry(2, failed())],
            started_at: Utc::now(),
            finished_at: Utc::now(),
        };
        assert_eq!(
            result.structures().unwrap_err(),
            BatchError::NoUsableStructure { attempted: 2 }
        );
    }

    #[test]
    fn test_failure_reason_from_outcome() {
        assert_eq!(
            FailureReason::from_outcome(&FetchOutcome::Blocked("captcha".to_string())),
            Some(FailureReason::Blocked("captcha".to_string()))
        );
        assert_eq!(
            FailureReason::from_outcome(&FetchOutcome::FatalError(FetchError::InvalidUrl(
                "nope".to_string()
            ))),
            Some(FailureReason::Fatal("invalid URL: nope".to_string()))
        );
    }
}
