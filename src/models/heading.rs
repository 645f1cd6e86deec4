//! Heading records and per-competitor structures.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Text rendered in place of a structure whose headings were all filtered out.
pub const NO_RELEVANT_HEADINGS: &str = "No relevant headings found";

/// Heading level taken from competitor pages.
///
/// H1 is deliberately absent: it belongs to the synthesized outline, not to
/// what we echo back from competitors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadingLevel {
    H2,
    H3,
    H4,
}

impl HeadingLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::H2 => "H2",
            Self::H3 => "H3",
            Self::H4 => "H4",
        }
    }

    /// Map an HTML tag name (`h2`, `H3`, ...) to a level.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "h2" => Some(Self::H2),
            "h3" => Some(Self::H3),
            "h4" => Some(Self::H4),
            _ => None,
        }
    }
}

impl fmt::Display for HeadingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single heading that survived filtering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadingRecord {
    pub level: HeadingLevel,
    pub text: String,
}

impl HeadingRecord {
    pub fn new(level: HeadingLevel, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }
}

impl fmt::Display for HeadingRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>{}", self.level, self.text)
    }
}

/// Headings extracted from one competitor page.
///
/// `NoRelevantHeadings` means the page was parsed but nothing passed the
/// filter, which is different from a page that could not be fetched at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "headings", rename_all = "snake_case")]
pub enum CompetitorStructure {
    Headings(Vec<HeadingRecord>),
    NoRelevantHeadings,
}

impl CompetitorStructure {
    /// Build a structure from a filtered heading list, using the sentinel for
    /// an empty list.
    pub fn from_headings(headings: Vec<HeadingRecord>) -> Self {
        if headings.is_empty() {
            Self::NoRelevantHeadings
        } else {
            Self::Headings(headings)
        }
    }

    pub fn headings(&self) -> &[HeadingRecord] {
        match self {
            Self::Headings(h) => h,
            Self::NoRelevantHeadings => &[],
        }
    }

    pub fn has_headings(&self) -> bool {
        matches!(self, Self::Headings(_))
    }

    pub fn len(&self) -> usize {
        self.headings().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for CompetitorStructure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoRelevantHeadings => f.write_str(NO_RELEVANT_HEADINGS),
            Self::Headings(headings) => {
                for (i, heading) in headings.iter().enumerate() {
                    if i > 0 {
                        f.write_str("\n")?;
                    }
                    write!(f, "{}", heading)?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_from_tag() {
        assert_eq!(HeadingLevel::from_tag("h2"), Some(HeadingLevel::H2));
        assert_eq!(HeadingLevel::from_tag("H4"), Some(HeadingLevel::H4));
        assert_eq!(HeadingLevel::from_tag("h1"), None);
        assert_eq!(HeadingLevel::from_tag("p"), None);
    }

    #[test]
    fn test_empty_headings_become_sentinel() {
        let structure = CompetitorStructure::from_headings(Vec::new());
        assert_eq!(structure, CompetitorStructure::NoRelevantHeadings);
        assert!(!structure.has_headings());
        assert_eq!(structure.to_string(), NO_RELEVANT_HEADINGS);
    }

    #[test]
    fn test_structure_renders_one_line_per_heading() {
        let structure = CompetitorStructure::from_headings(vec![
            HeadingRecord::new(HeadingLevel::H2, "Intro"),
            HeadingRecord::new(HeadingLevel::H3, "Pricing Plans"),
        ]);
        assert_eq!(structure.to_string(), "<H2>Intro\n<H3>Pricing Plans");
        assert_eq!(structure.len(), 2);
    }

    #[test]
    fn test_structure_serializes_with_kind_tag() {
        let json = serde_json::to_value(CompetitorStructure::NoRelevantHeadings).unwrap();
        assert_eq!(json["kind"], "no_relevant_headings");

        let json = serde_json::to_value(CompetitorStructure::Headings(vec![HeadingRecord::new(
            HeadingLevel::H3,
            "Setup guide",
        )]))
        .unwrap();
        assert_eq!(json["kind"], "headings");
        assert_eq!(json["headings"][0]["level"], "h3");
    }
}
