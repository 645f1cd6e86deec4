//! Data models for headscout.

mod batch;
mod heading;
mod outcome;

pub use batch::{BatchEntry, BatchError, BatchResult, FailureReason, UrlOutcome};
pub use heading::{CompetitorStructure, HeadingLevel, HeadingRecord, NO_RELEVANT_HEADINGS};
pub use outcome::{FetchError, FetchOutcome, FetchTier, FetchedPage};
