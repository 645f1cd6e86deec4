//! Heading extraction from competitor pages.

mod headings;

pub use headings::{HeadingExtractor, DEFAULT_NOISE_KEYWORDS};
