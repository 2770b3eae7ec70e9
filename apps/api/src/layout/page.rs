use serde::Serialize;

use crate::layout::font_metrics::FontSpec;

/// One laid-out page. Coordinates are top-down PDF points.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    /// 1-based.
    pub number: usize,
    pub lines: Vec<PlacedLine>,
    pub rules: Vec<Rule>,
}

impl Page {
    pub fn new(number: usize) -> Self {
        Self {
            number,
            lines: Vec::new(),
            rules: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.rules.is_empty()
    }

    /// Display text of every line on the page, in drawing order.
    pub fn texts(&self) -> Vec<String> {
        self.lines.iter().map(PlacedLine::text).collect()
    }
}

/// What a line is, for diagnostics and tests. The writer only looks at the runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    Name,
    Contact,
    SectionTitle,
    Content,
    Placeholder,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedLine {
    /// Baseline position.
    pub y: f32,
    pub kind: LineKind,
    pub runs: Vec<TextRun>,
}

impl PlacedLine {
    /// Runs joined left to right with a single space.
    pub fn text(&self) -> String {
        self.runs
            .iter()
            .map(|r| r.text.as_str())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Align {
    Left,
    Center,
    Right,
}

/// A run of text in a single font. `x` is already resolved to the left edge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextRun {
    pub text: String,
    pub x: f32,
    pub align: Align,
    pub font: FontSpec,
}

/// A horizontal rule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rule {
    pub y: f32,
    pub x_start: f32,
    pub x_end: f32,
    pub thickness: f32,
}
