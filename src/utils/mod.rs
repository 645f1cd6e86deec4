//! Shared utility functions.
//!
//! - `random`: cheap jitter and pick-one helpers (no crypto guarantees)
//! - `text`: URL-list parsing and path expansion

pub mod random;
mod text;

pub use text::{expand_path, parse_url_list};
