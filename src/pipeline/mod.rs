//! Retrieval pipeline: tier orchestration per URL and sequential batches.

mod batch;
mod orchestrator;

pub use batch::{BatchCoordinator, Pacing, ProgressUpdate};
pub use orchestrator::RetrievalOrchestrator;
