//! Heading extraction on realistic pages.

use headscout::{CompetitorStructure, HeadingExtractor, HeadingLevel};

const LANDING_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Acme CRM</title></head>
<body>
  <header>
    <nav><h2>Navigation</h2><ul><li>Home</li></ul></nav>
  </header>
  <main>
    <h1>Acme CRM for small teams</h1>
    <h2>Why teams switch to Acme</h2>
    <h3>Fast onboarding</h3>
    <h3>Pipeline   automation</h3>
    <h2>Pricing</h2>
    <h4>Enterprise add-ons</h4>
    <h2>FAQ</h2>
  </main>
  <aside><h3>Sign up for our newsletter</h3></aside>
  <footer><h2>Footer links</h2><h4>Privacy Policy</h4></footer>
</body>
</html>"#;

#[test]
fn test_landing_page_outline() {
    let structure = HeadingExtractor::default().extract_html(LANDING_PAGE);

    let outline: Vec<(HeadingLevel, &str)> = structure
        .headings()
        .iter()
        .map(|h| (h.level, h.text.as_str()))
        .collect();

    assert_eq!(
        outline,
        vec![
            (HeadingLevel::H2, "Why teams switch to Acme"),
            (HeadingLevel::H3, "Fast onboarding"),
            (HeadingLevel::H3, "Pipeline automation"),
            (HeadingLevel::H2, "Pricing"),
            (HeadingLevel::H4, "Enterprise add-ons"),
        ]
    );
}

#[test]
fn test_rendered_structure_lines() {
    let html = "<h2>Intro</h2><h2>Nav</h2><h3>Pricing Plans</h3>\
                <footer><h2>Copyright 2024</h2></footer>";
    let structure = HeadingExtractor::default().extract_html(html);

    assert_eq!(structure.to_string(), "<H2>Intro\n<H3>Pricing Plans");
}

#[test]
fn test_cyrillic_noise_keywords() {
    let html = "<h2>Як обрати тариф</h2><h2>Меню сайту</h2><h3>Войти в кабинет</h3>\
                <h3>Порівняння планів</h3>";
    let structure = HeadingExtractor::default().extract_html(html);

    let texts: Vec<&str> = structure.headings().iter().map(|h| h.text.as_str()).collect();
    assert_eq!(texts, vec!["Як обрати тариф", "Порівняння планів"]);
}

#[test]
fn test_heading_length_counts_characters() {
    // Four Cyrillic characters are eight bytes but still only four chars.
    let html = "<h2>Ціни</h2><h2>Так</h2>";
    let structure = HeadingExtractor::default().extract_html(html);

    let texts: Vec<&str> = structure.headings().iter().map(|h| h.text.as_str()).collect();
    assert_eq!(texts, vec!["Ціни"]);
}

#[test]
fn test_empty_document_renders_sentinel() {
    let structure = HeadingExtractor::default().extract_html("");

    assert_eq!(structure, CompetitorStructure::NoRelevantHeadings);
    assert_eq!(structure.to_string(), "No relevant headings found");
}

#[test]
fn test_structure_json_shape() {
    let structure = HeadingExtractor::default().extract_html("<h2>Getting started</h2>");
    let json = serde_json::to_value(&structure).unwrap();

    assert_eq!(json["kind"], "headings");
    assert_eq!(json["headings"][0]["level"], "h2");
    assert_eq!(json["headings"][0]["text"], "Getting started");

    let empty = serde_json::to_value(CompetitorStructure::NoRelevantHeadings).unwrap();
    assert_eq!(empty["kind"], "no_relevant_headings");
}
