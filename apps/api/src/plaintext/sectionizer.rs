//! Heuristic splitter for free-form résumé text.
//!
//! A line is a heading when any of these hold:
//! - it is already upper-case, shorter than 30 chars and contains a letter
//! - it starts with a markdown (`## Skills`) or short numeric (`2. Education`) marker
//! - it is a run of capitalized words ending with a colon (`Work Experience:`)
//!
//! Classification looks at one line at a time, never at its neighbours.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::markup::builder::IMPLICIT_SECTION_TITLE;
use crate::models::{Document, Item, Section};

/// Upper-case headings must be shorter than this (in chars).
const MAX_UPPERCASE_HEADING_LEN: usize = 30;

static RE_MARKDOWN_HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#{1,6}\s+(.+?)\s*#*$").unwrap());

static RE_NUMERIC_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,2}[.)]\s+([A-Z][^.]{0,28})$").unwrap());

static RE_CAPITALIZED_COLON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Z][A-Za-z]*(?:\s+[A-Z][A-Za-z]*)*):$").unwrap());

static RE_EMPHASIS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*|__").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineClass {
    Blank,
    /// Heading with its marker and trailing colon removed.
    Heading(String),
    Content(String),
}

/// Classifies a single line.
pub fn classify_line(line: &str) -> LineClass {
    let line = line.trim();
    if line.is_empty() {
        return LineClass::Blank;
    }

    if let Some(caps) = RE_MARKDOWN_HEADING.captures(line) {
        return LineClass::Heading(heading_title(&caps[1]));
    }
    if let Some(caps) = RE_NUMERIC_HEADING.captures(line) {
        return LineClass::Heading(heading_title(&caps[1]));
    }
    if let Some(caps) = RE_CAPITALIZED_COLON.captures(line) {
        return LineClass::Heading(caps[1].to_string());
    }
    if is_uppercase_heading(line) {
        return LineClass::Heading(heading_title(line));
    }

    LineClass::Content(line.to_string())
}

fn is_uppercase_heading(line: &str) -> bool {
    line.chars().count() < MAX_UPPERCASE_HEADING_LEN && line == line.to_uppercase()
}

fn heading_title(raw: &str) -> String {
    raw.trim().trim_end_matches(':').trim_end().to_string()
}

/// Splits free text into sections. Content before the first heading lands in an
/// implicit `SUMMARY` section.
pub fn sectionize(text: &str) -> Document {
    let mut sections: Vec<Section> = Vec::new();

    for line in text.lines() {
        match classify_line(line) {
            LineClass::Blank => {}
            LineClass::Heading(title) => sections.push(Section::new(title)),
            LineClass::Content(text) => {
                if sections.is_empty() {
                    sections.push(Section::new(IMPLICIT_SECTION_TITLE));
                }
                if let Some(current) = sections.last_mut() {
                    current.items.push(Item::plain(text));
                }
            }
        }
    }

    Document {
        name: None,
        contact: None,
        sections,
    }
}

/// Removes markdown bold markers that generators tend to leave in plain text.
pub fn strip_markdown_emphasis(text: &str) -> String {
    RE_EMPHASIS.replace_all(text, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(doc: &Document) -> Vec<&str> {
        doc.sections.iter().map(|s| s.title.as_str()).collect()
    }

    #[test]
    fn test_uppercase_headings_split_sections() {
        let doc = sectionize("SUMMARY\nBuilt X\nEXPERIENCE\nDid Y");
        assert_eq!(
            doc.sections,
            vec![
                Section {
                    title: "SUMMARY".to_string(),
                    items: vec![Item::plain("Built X")],
                },
                Section {
                    title: "EXPERIENCE".to_string(),
                    items: vec![Item::plain("Did Y")],
                },
            ]
        );
    }

    #[test]
    fn test_content_before_heading_opens_summary() {
        let doc = sectionize("Seasoned engineer\n\nSKILLS\nRust");
        assert_eq!(titles(&doc), vec!["SUMMARY", "SKILLS"]);
        assert_eq!(doc.sections[0].items, vec![Item::plain("Seasoned engineer")]);
    }

    #[test]
    fn test_markdown_and_numeric_markers() {
        assert_eq!(classify_line("## Projects"), LineClass::Heading("Projects".to_string()));
        assert_eq!(classify_line("# Skills:"), LineClass::Heading("Skills".to_string()));
        assert_eq!(classify_line("2. Education"), LineClass::Heading("Education".to_string()));
    }

    #[test]
    fn test_numbered_sentence_is_content() {
        assert!(matches!(
            classify_line("1. Reduced latency by 40% across the whole fleet."),
            LineClass::Content(_)
        ));
    }

    #[test]
    fn test_capitalized_words_with_colon() {
        assert_eq!(
            classify_line("Work Experience:"),
            LineClass::Heading("Work Experience".to_string())
        );
        assert!(matches!(classify_line("Languages: Rust, Go"), LineClass::Content(_)));
    }

    #[test]
    fn test_uppercase_rule_limits() {
        assert!(matches!(
            classify_line("THIS LINE IS FAR TOO LONG TO BE A HEADING"),
            LineClass::Content(_)
        ));
        assert_eq!(classify_line("2020 - 2022"), LineClass::Heading("2020 - 2022".to_string()));
        assert_eq!(classify_line("EDUCATION:"), LineClass::Heading("EDUCATION".to_string()));
    }

    #[test]
    fn test_empty_heading_section_is_kept() {
        let doc = sectionize("AWARDS\nSKILLS\nRust");
        assert_eq!(titles(&doc), vec!["AWARDS", "SKILLS"]);
        assert!(doc.sections[0].items.is_empty());
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(sectionize(""), Document::default());
        assert_eq!(sectionize("\n  \n"), Document::default());
    }

    #[test]
    fn test_sectionize_is_deterministic() {
        let text = "Intro\nSKILLS\nRust\n## Projects\nCompiler";
        assert_eq!(sectionize(text), sectionize(text));
    }

    #[test]
    fn test_strip_markdown_emphasis() {
        assert_eq!(strip_markdown_emphasis("**Led** the __team__"), "Led the team");
    }
}
