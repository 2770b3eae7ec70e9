//! Document model builder: normalizes tokenizer output into a `Document`.
//!
//! `build` is total: any `RawDocument`, including one with no sections, yields a
//! `Document`. Inline emphasis is flattened to plain text here; the renderer re-applies
//! weight only to structural slots (titles, headings).

use crate::markup::inline::{clean_field, clean_lines, collapse_spaces};
use crate::markup::tokenizer::{MacroKind, RawDocument, RawEntry, RawSection};
use crate::models::{Document, Item, Section};

/// Title used for text that appears before any titled section.
pub const IMPLICIT_SECTION_TITLE: &str = "SUMMARY";

pub fn build(raw: RawDocument) -> Document {
    let name = raw.name.as_deref().map(clean_field).filter(|n| !n.is_empty());
    let contact = raw
        .contact
        .as_deref()
        .map(clean_contact)
        .filter(|c| !c.is_empty());

    let mut sections = Vec::with_capacity(raw.sections.len() + 1);

    let leading: Vec<String> = raw
        .leading
        .iter()
        .map(|l| collapse_spaces(l))
        .filter(|l| !l.is_empty())
        .collect();
    if !leading.is_empty() {
        sections.push(Section {
            title: IMPLICIT_SECTION_TITLE.to_string(),
            items: leading.into_iter().map(Item::plain).collect(),
        });
    }

    sections.extend(raw.sections.into_iter().map(build_section));

    Document {
        name,
        contact,
        sections,
    }
}

fn build_section(raw: RawSection) -> Section {
    let title = clean_field(&raw.title);
    let title = if title.is_empty() {
        IMPLICIT_SECTION_TITLE.to_string()
    } else {
        title
    };

    let items = raw.entries.into_iter().filter_map(build_item).collect();
    Section { title, items }
}

/// Maps one raw entry to exactly one item. Only blank loose lines are skipped.
fn build_item(entry: RawEntry) -> Option<Item> {
    match entry {
        RawEntry::Loose(text) => {
            let text = collapse_spaces(&text);
            (!text.is_empty()).then_some(Item::PlainLine { text })
        }
        RawEntry::Macro { kind, args } => {
            let arg = |i: usize| args.get(i).map(|a| clean_field(a)).unwrap_or_default();
            Some(match kind {
                MacroKind::Subheading => Item::Subheading {
                    title: arg(0),
                    right_date: arg(1),
                    subtitle: arg(2),
                    subtitle_right: arg(3),
                },
                MacroKind::ProjectHeading => Item::ProjectHeading {
                    title: arg(0),
                    right_date: arg(1),
                },
                MacroKind::Bullet => Item::Bullet { text: arg(0) },
                // Section titles never reach the entry list; keep the text regardless.
                MacroKind::SectionTitle => Item::PlainLine { text: arg(0) },
            })
        }
    }
}

/// Contact lines are joined with a separator when the header spans several lines.
fn clean_contact(raw: &str) -> String {
    clean_lines(raw).join(" | ")
}

/// Collapses runs of blank lines to at most one and trims trailing spaces.
pub fn collapse_blank_lines(text: &str) -> String {
    let mut out = Vec::new();
    let mut blank_run = 0;
    for line in text.lines() {
        let line = line.trim_end();
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run == 1 && !out.is_empty() {
                out.push("");
            }
        } else {
            blank_run = 0;
            out.push(line);
        }
    }
    while out.last() == Some(&"") {
        out.pop();
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::tokenizer::extract;

    fn raw_macro(kind: MacroKind, args: &[&str]) -> RawEntry {
        RawEntry::Macro {
            kind,
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    #[test]
    fn test_build_empty_raw_document() {
        let doc = build(RawDocument::default());
        assert_eq!(doc, Document::default());
    }

    #[test]
    fn test_build_name_only() {
        let raw = RawDocument {
            name: Some(r"\Huge \scshape Ada Lovelace".to_string()),
            ..Default::default()
        };
        let doc = build(raw);
        assert_eq!(doc.name.as_deref(), Some("Ada Lovelace"));
        assert!(doc.sections.is_empty());
    }

    #[test]
    fn test_build_cleans_arguments() {
        let raw = RawDocument {
            sections: vec![RawSection {
                title: " Projects ".to_string(),
                entries: vec![
                    raw_macro(MacroKind::ProjectHeading, &[r"\textbf{Compiler} $|$ \emph{Rust}", "2021"]),
                    raw_macro(MacroKind::Bullet, &["Cut   build \n time by 40\\%"]),
                ],
            }],
            ..Default::default()
        };
        let doc = build(raw);
        assert_eq!(doc.sections[0].title, "Projects");
        assert_eq!(
            doc.sections[0].items,
            vec![
                Item::ProjectHeading {
                    title: "Compiler | Rust".to_string(),
                    right_date: "2021".to_string()
                },
                Item::bullet("Cut build time by 40%"),
            ]
        );
    }

    #[test]
    fn test_empty_bullet_macro_still_maps_to_item() {
        let raw = RawDocument {
            sections: vec![RawSection {
                title: "Skills".to_string(),
                entries: vec![raw_macro(MacroKind::Bullet, &[""])],
            }],
            ..Default::default()
        };
        assert_eq!(build(raw).sections[0].items, vec![Item::bullet("")]);
    }

    #[test]
    fn test_leading_lines_become_summary_section() {
        let raw = RawDocument {
            leading: vec!["Seasoned engineer.".to_string()],
            sections: vec![RawSection {
                title: "Skills".to_string(),
                entries: vec![],
            }],
            ..Default::default()
        };
        let doc = build(raw);
        assert_eq!(doc.sections.len(), 2);
        assert_eq!(doc.sections[0].title, IMPLICIT_SECTION_TITLE);
        assert_eq!(doc.sections[1].title, "Skills");
        assert!(doc.sections[1].items.is_empty(), "empty sections are kept");
    }

    #[test]
    fn test_contact_multiline_joined() {
        let raw = RawDocument {
            contact: Some("\\small ada@example.com \\\\ 555-0100".to_string()),
            ..Default::default()
        };
        assert_eq!(
            build(raw).contact.as_deref(),
            Some("ada@example.com | 555-0100")
        );
    }

    #[test]
    fn test_build_is_deterministic() {
        let src = "\\begin{document}\\section{Experience}\\resumeSubheading{Engineer}{2020}{Acme}{Remote}\\resumeItem{Led X}\\end{document}";
        assert_eq!(build(extract(src)), build(extract(src)));
    }

    #[test]
    fn test_collapse_blank_lines() {
        assert_eq!(collapse_blank_lines("a\n\n\n\nb  \n\n"), "a\n\nb");
        assert_eq!(collapse_blank_lines("\n\na"), "a");
    }
}
