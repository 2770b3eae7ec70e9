//! Markup tokenizer: finds the structural macros of the résumé dialect.
//!
//! The tokenizer is total: it never fails. Macros whose arguments cannot be read are
//! recorded in `RawDocument::malformed` and their text stays in the surrounding loose
//! text, which later becomes plain lines.

use serde::Serialize;
use tracing::debug;

use crate::markup::inline::clean_lines;
use crate::markup::scanner::{next_command, read_args, read_group, strip_comments, MarkupError};

const BODY_BEGIN: &str = r"\begin{document}";
const BODY_END: &str = r"\end{document}";
const CENTER_BEGIN: &str = r"\begin{center}";
const CENTER_END: &str = r"\end{center}";

/// Structural macro kinds, listed in matching priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MacroKind {
    Subheading,
    ProjectHeading,
    Bullet,
    SectionTitle,
}

/// (command name, kind, argument count) in priority order.
const MACROS: &[(&str, MacroKind, usize)] = &[
    ("resumeSubheading", MacroKind::Subheading, 4),
    ("resumeProjectHeading", MacroKind::ProjectHeading, 2),
    ("resumeItem", MacroKind::Bullet, 1),
    ("resumeSubItem", MacroKind::Bullet, 1),
    ("section", MacroKind::SectionTitle, 1),
];

fn classify(name: &str) -> Option<(MacroKind, usize)> {
    MACROS
        .iter()
        .find(|(macro_name, _, _)| *macro_name == name)
        .map(|(_, kind, arity)| (*kind, *arity))
}

/// One entry inside a raw section, in source order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RawEntry {
    /// A recognized macro with its raw (uncleaned) positional arguments.
    Macro { kind: MacroKind, args: Vec<String> },
    /// A display line recovered from text that matched no macro. Already cleaned.
    Loose(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawSection {
    /// Raw title argument.
    pub title: String,
    pub entries: Vec<RawEntry>,
}

/// Tokenizer output: header anchors, sections and leftover text.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RawDocument {
    pub name: Option<String>,
    pub contact: Option<String>,
    /// Cleaned lines that appear in the body before the first section (header excluded).
    pub leading: Vec<String>,
    pub sections: Vec<RawSection>,
    /// Number of structural macros recognized, section titles included.
    pub macro_count: usize,
    #[serde(skip)]
    pub malformed: Vec<MarkupError>,
}

impl RawDocument {
    /// True when no structural macro was found at all.
    pub fn is_unstructured(&self) -> bool {
        self.macro_count == 0
    }
}

/// Extracts the raw structure of a markup source.
pub fn extract(source: &str) -> RawDocument {
    let source = strip_comments(source);
    let body = document_body(&source);

    let mut raw = RawDocument::default();
    let first_section = find_command(body, "section").unwrap_or(body.len());

    // The header block is only looked for before the first section.
    let header_span = find_center_block(&body[..first_section]).map(|(start, inner, end)| {
        let (name, contact) = extract_header(inner);
        raw.name = name;
        raw.contact = contact;
        (start, end)
    });

    let mut pending = String::new();
    let mut current: Option<RawSection> = None;
    let mut pos = 0;

    while let Some(cmd) = next_command(body, pos) {
        if let Some((start, end)) = header_span {
            if cmd.start >= start && cmd.start < end {
                // An argument read earlier may already have run into the header block.
                if pos <= start {
                    pending.push_str(&body[pos..start]);
                }
                pos = pos.max(end);
                continue;
            }
        }

        let Some((kind, arity)) = classify(cmd.name) else {
            pending.push_str(&body[pos..cmd.end]);
            pos = cmd.end;
            continue;
        };

        match read_args(body, cmd.end, arity, cmd.name) {
            Ok((args, next)) => {
                pending.push_str(&body[pos..cmd.start]);
                flush_pending(&mut pending, current.as_mut(), &mut raw.leading);
                raw.macro_count += 1;

                if kind == MacroKind::SectionTitle {
                    if let Some(done) = current.take() {
                        raw.sections.push(done);
                    }
                    current = Some(RawSection {
                        title: args[0].to_string(),
                        entries: Vec::new(),
                    });
                } else {
                    let entry = RawEntry::Macro {
                        kind,
                        args: args.into_iter().map(str::to_string).collect(),
                    };
                    match current.as_mut() {
                        Some(section) => section.entries.push(entry),
                        // Item macros before any section open an untitled one that
                        // also takes over the leading lines.
                        None => {
                            let mut entries: Vec<RawEntry> =
                                raw.leading.drain(..).map(RawEntry::Loose).collect();
                            entries.push(entry);
                            current = Some(RawSection {
                                title: String::new(),
                                entries,
                            })
                        }
                    }
                }
                pos = next;
            }
            Err(err) => {
                debug!(error = %err, "Recovering malformed macro as plain text");
                raw.malformed.push(err);
                pending.push_str(&body[pos..cmd.end]);
                pos = cmd.end;
            }
        }
    }

    match header_span {
        Some((start, end)) if pos <= start => {
            pending.push_str(&body[pos..start]);
            pending.push_str(&body[end..]);
        }
        Some((_, end)) if pos < end => pending.push_str(&body[end..]),
        _ => pending.push_str(&body[pos..]),
    }
    flush_pending(&mut pending, current.as_mut(), &mut raw.leading);
    if let Some(done) = current.take() {
        raw.sections.push(done);
    }

    raw
}

/// Moves accumulated free text into the current section (or the leading block).
fn flush_pending(pending: &mut String, section: Option<&mut RawSection>, leading: &mut Vec<String>) {
    if pending.trim().is_empty() {
        pending.clear();
        return;
    }
    let lines = clean_lines(pending);
    pending.clear();
    match section {
        Some(section) => section.entries.extend(lines.into_iter().map(RawEntry::Loose)),
        None => leading.extend(lines),
    }
}

/// Returns the text between the body delimiters. Missing delimiters widen the range.
fn document_body(source: &str) -> &str {
    let start = source
        .find(BODY_BEGIN)
        .map(|i| i + BODY_BEGIN.len())
        .unwrap_or(0);
    let end = source[start..]
        .find(BODY_END)
        .map(|i| start + i)
        .unwrap_or(source.len());
    &source[start..end]
}

/// Byte offset of the first `\name` command (exact name match).
fn find_command(src: &str, name: &str) -> Option<usize> {
    let mut pos = 0;
    while let Some(cmd) = next_command(src, pos) {
        if cmd.name == name {
            return Some(cmd.start);
        }
        pos = cmd.end;
    }
    None
}

/// Finds the first center block: (block start, inner text, block end).
fn find_center_block(src: &str) -> Option<(usize, &str, usize)> {
    let start = src.find(CENTER_BEGIN)?;
    let inner_start = start + CENTER_BEGIN.len();
    let inner_len = src[inner_start..].find(CENTER_END)?;
    let end = inner_start + inner_len + CENTER_END.len();
    Some((start, &src[inner_start..inner_start + inner_len], end))
}

/// Pulls the raw name and contact out of the header block.
///
/// Name: the first `\textbf{...}` group, else the first line. Contact: everything after
/// the first `\small`, else whatever follows the name.
fn extract_header(block: &str) -> (Option<String>, Option<String>) {
    let mut name = None;
    let mut after_name = 0;

    if let Some(at) = find_command(block, "textbf") {
        if let Ok((inner, next)) = read_group(block, at + r"\textbf".len(), "textbf") {
            name = Some(inner.to_string());
            after_name = next;
        }
    }

    let small = find_command(block, "small");

    if name.is_none() {
        let head = &block[..small.unwrap_or(block.len())];
        let first_break = head.find(r"\\").unwrap_or(head.len());
        let candidate = &head[..first_break];
        if !candidate.trim().is_empty() {
            name = Some(candidate.to_string());
            after_name = first_break;
        }
    }

    let contact = match small {
        Some(at) => Some(block[at..].to_string()),
        None => Some(block[after_name.min(block.len())..].to_string()),
    }
    .filter(|c| !clean_lines(c).is_empty());

    (name.filter(|n| !n.trim().is_empty()), contact)
}
