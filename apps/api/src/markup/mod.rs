//! Résumé markup dialect: scanner, inline cleanup, tokenizer and model builder.
//!
//! `parse_markup` is the entry point used by the render pipeline. It never fails;
//! anything it cannot structure comes back as plain lines.

pub mod builder;
pub mod inline;
pub mod scanner;
pub mod tokenizer;

use tracing::debug;

use crate::models::Document;
use crate::plaintext::sectionize;

use builder::build;
use tokenizer::{extract, RawDocument};

pub use builder::collapse_blank_lines;

/// Markers that identify a source as markup rather than prose.
const MARKUP_MARKERS: &[&str] = &[r"\begin{document}", r"\documentclass", r"\section"];

/// True when the text carries a document body or a section macro.
pub fn looks_like_markup(text: &str) -> bool {
    MARKUP_MARKERS.iter().any(|m| text.contains(m))
}

/// Parses a markup source into a `Document`.
///
/// Sources without any recognized structural macro are flattened to plain text and
/// sectionized by the plain-text heuristics; the header found by the tokenizer is kept
/// either way.
pub fn parse_markup(source: &str) -> Document {
    let raw = extract(source);
    if !raw.malformed.is_empty() {
        debug!(count = raw.malformed.len(), "Malformed macros recovered as plain lines");
    }

    if !raw.is_unstructured() {
        return build(raw);
    }

    let header = build(RawDocument {
        name: raw.name,
        contact: raw.contact,
        ..Default::default()
    });
    let text = collapse_blank_lines(&raw.leading.join("\n"));
    let mut doc = sectionize(&text);
    doc.name = header.name;
    doc.contact = header.contact;
    doc
}
