//! headscout - competitor heading-structure harvester.
//!
//! Fetches competitor pages through a browser tier and a static HTTP tier,
//! rejects challenge pages, extracts their H2/H3/H4 outline, and assembles
//! an outline prompt from the results.

pub mod cli;
pub mod config;
pub mod extract;
pub mod models;
pub mod pipeline;
pub mod prompt;
pub mod scrapers;
pub mod utils;

pub use config::{ConfigError, LoadOptions, Settings};
pub use extract::HeadingExtractor;
pub use models::{
    BatchEntry, BatchError, BatchResult, CompetitorStructure, FailureReason, FetchError,
    FetchOutcome, FetchTier, FetchedPage, HeadingLevel, HeadingRecord, UrlOutcome,
};
pub use pipeline::{BatchCoordinator, Pacing, ProgressUpdate, RetrievalOrchestrator};
pub use prompt::PromptAssembler;
pub use scrapers::{BlockDetector, BrowserFetcher, HttpFetcher, PageFetcher, RetryPolicy};
