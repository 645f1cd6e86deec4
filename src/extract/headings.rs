//! H2/H3/H4 extraction with length and noise-keyword filtering.

use std::sync::LazyLock;

use scraper::{Html, Selector};

use crate::models::{CompetitorStructure, HeadingLevel, HeadingRecord};

/// Keywords that mark a heading as page chrome rather than content.
///
/// Matched as case-insensitive substrings, so "nav" also drops "Navigation".
pub const DEFAULT_NOISE_KEYWORDS: &[&str] = &[
    "footer",
    "menu",
    "nav",
    "copyright",
    "sign up",
    "log in",
    "cookie",
    "privacy",
    // Ukrainian
    "меню",
    "навігація",
    "авторські права",
    "зареєструватися",
    "реєстрація",
    "увійти",
    "конфіденційність",
    // Russian
    "навигация",
    "авторские права",
    "зарегистрироваться",
    "регистрация",
    "войти",
    "конфиденциальность",
];

/// Headings at or below this many characters are dropped.
const MIN_HEADING_CHARS: usize = 3;

static HEADING_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h2, h3, h4").expect("static heading selector is valid"));

/// Pulls filtered headings out of a parsed document.
#[derive(Debug, Clone)]
pub struct HeadingExtractor {
    noise_keywords: Vec<String>,
}

impl Default for HeadingExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_NOISE_KEYWORDS)
    }
}

impl HeadingExtractor {
    /// Create an extractor with a custom noise-keyword set.
    pub fn new<I, S>(noise_keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let noise_keywords = noise_keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        Self { noise_keywords }
    }

    pub fn noise_keywords(&self) -> &[String] {
        &self.noise_keywords
    }

    /// Parse `html` and extract its headings.
    pub fn extract_html(&self, html: &str) -> CompetitorStructure {
        let document = Html::parse_document(html);
        self.extract(&document)
    }

    /// Extract H2/H3/H4 headings in document order.
    ///
    /// Duplicates are kept; consolidation happens when the prompt is written.
    pub fn extract(&self, document: &Html) -> CompetitorStructure {
        let headings = document
            .select(&HEADING_SELECTOR)
            .filter_map(|element| {
                let level = HeadingLevel::from_tag(element.value().name())?;
                let text = normalize_text(element.text());
                self.accept(&text).then(|| HeadingRecord::new(level, text))
            })
            .collect();

        CompetitorStructure::from_headings(headings)
    }

    /// Whether normalized heading text passes the length and noise filters.
    pub fn accept(&self, text: &str) -> bool {
        if text.chars().count() <= MIN_HEADING_CHARS {
            return false;
        }
        let lower = text.to_lowercase();
        !self.noise_keywords.iter().any(|k| lower.contains(k.as_str()))
    }
}

/// Join text nodes and collapse whitespace runs into single spaces.
fn normalize_text<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    let joined: String = parts.collect();
    joined.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(structure: &CompetitorStructure) -> Vec<(HeadingLevel, &str)> {
        structure
            .headings()
            .iter()
            .map(|h| (h.level, h.text.as_str()))
            .collect()
    }

    #[test]
    fn test_noise_and_footer_headings_dropped() {
        let html = "<h2>Intro</h2><h2>Nav</h2><h3>Pricing Plans</h3>\
                    <footer><h2>Copyright 2024</h2></footer>";
        let structure = HeadingExtractor::default().extract_html(html);
        assert_eq!(
            texts(&structure),
            vec![(HeadingLevel::H2, "Intro"), (HeadingLevel::H3, "Pricing Plans")]
        );
    }

    #[test]
    fn test_h1_and_h5_ignored() {
        let html = "<h1>Main Title</h1><h2>Section one</h2><h5>Tiny heading</h5>";
        let structure = HeadingExtractor::default().extract_html(html);
        assert_eq!(texts(&structure), vec![(HeadingLevel::H2, "Section one")]);
    }

    #[test]
    fn test_document_order_across_levels() {
        let html = "<h3>Alpha part</h3><h2>Beta part</h2><h4>Gamma part</h4><h2>Delta part</h2>";
        let structure = HeadingExtractor::default().extract_html(html);
        assert_eq!(
            texts(&structure),
            vec![
                (HeadingLevel::H3, "Alpha part"),
                (HeadingLevel::H2, "Beta part"),
                (HeadingLevel::H4, "Gamma part"),
                (HeadingLevel::H2, "Delta part"),
            ]
        );
    }

    #[test]
    fn test_short_headings_dropped_after_trim() {
        let html = "<h2>   FAQ   </h2><h2>Why</h2><h2>  Long enough </h2><h3>abcd</h3>";
        let structure = HeadingExtractor::default().extract_html(html);
        assert_eq!(
            texts(&structure),
            vec![(HeadingLevel::H2, "Long enough"), (HeadingLevel::H3, "abcd")]
        );
    }

    #[test]
    fn test_nested_markup_and_whitespace_collapsed() {
        let html = "<h2>\n  How to <em>choose</em>\n   a plan\n</h2>";
        let structure = HeadingExtractor::default().extract_html(html);
        assert_eq!(texts(&structure), vec![(HeadingLevel::H2, "How to choose a plan")]);
    }

    #[test]
    fn test_duplicates_kept() {
        let html = "<h2>Shipping info</h2><h2>Shipping info</h2>";
        let structure = HeadingExtractor::default().extract_html(html);
        assert_eq!(structure.len(), 2);
    }

    #[test]
    fn test_noise_matching_is_case_insensitive() {
        let html = "<h2>COOKIE Settings</h2><h3>Sign Up today</h3><h3>Вхід та Меню</h3>";
        let structure = HeadingExtractor::default().extract_html(html);
        assert_eq!(structure, CompetitorStructure::NoRelevantHeadings);
    }

    #[test]
    fn test_no_headings_returns_sentinel() {
        let structure = HeadingExtractor::default().extract_html("<p>No headings here</p>");
        assert_eq!(structure, CompetitorStructure::NoRelevantHeadings);
    }

    #[test]
    fn test_custom_keywords_replace_defaults() {
        let extractor = HeadingExtractor::new(["Sponsored"]);
        let html = "<h2>Sponsored content</h2><h2>Footer links</h2>";
        let structure = extractor.extract_html(html);
        assert_eq!(texts(&structure), vec![(HeadingLevel::H2, "Footer links")]);
        assert_eq!(extractor.noise_keywords(), &["sponsored".to_string()]);
    }
}
