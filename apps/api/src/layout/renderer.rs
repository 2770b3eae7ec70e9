//! Paginated renderer: lays a `Document` out onto fixed-size pages.
//!
//! # Layout
//! - Header: name centered and bold, contact line centered below it.
//! - Section: bold title, a rule beneath it, then the items.
//! - Subheading: title bold left + date right, then subtitle italic left + location
//!   italic right.
//! - Bullet: marker at the margin, text indented and wrapped.
//! - Plain line: wrapped at the full column width; short upper-case lines are bold.
//!
//! # Page breaks
//! Before any line is drawn, a cursor past `max_content_y` starts a new page and the
//! same line is drawn there. Every drawn baseline therefore sits at or above the
//! threshold, and nothing is dropped.
//!
//! All state lives in a `RenderContext` created per call, so concurrent renders share
//! nothing.

use thiserror::Error;

use crate::layout::font_metrics::{FontFamily, FontSpec, FontStyle};
use crate::layout::geometry::PageGeometry;
use crate::layout::page::{Align, LineKind, Page, PlacedLine, Rule, TextRun};
use crate::layout::wrap::wrap_text;
use crate::models::{Document, Item, Section};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Invalid page geometry: {0}")]
    InvalidGeometry(String),

    #[error("Render task failed: {0}")]
    Task(String),
}

// ────────────────────────────────────────────────────────────────────────────
// Typography
// ────────────────────────────────────────────────────────────────────────────

pub const NAME_SIZE: f32 = 20.0;
pub const CONTACT_SIZE: f32 = 10.0;
pub const SECTION_TITLE_SIZE: f32 = 14.0;
pub const BODY_SIZE: f32 = 11.0;

/// Vertical space after the header block.
const HEADER_GAP: f32 = 8.0;
/// Extra space above a section title (not at the top of a page).
const SECTION_GAP: f32 = 6.0;
/// Distance from a section title's baseline to its rule.
const RULE_OFFSET: f32 = 4.0;
/// Space between the rule and the first item.
const TITLE_GAP: f32 = 6.0;
const RULE_THICKNESS: f32 = 0.6;

const BULLET_MARKER: &str = "\u{2022}";
/// Horizontal offset of the marker and of the bullet text from the margin.
const BULLET_MARKER_OFFSET: f32 = 4.0;
const BULLET_TEXT_INDENT: f32 = 14.0;

/// Minimum space between a left column and a right-aligned column.
const COLUMN_GAP: f32 = 12.0;
/// A right column wider than this share of the column gets its own lines.
const MAX_RIGHT_SHARE: f32 = 0.6;

/// Plain lines shorter than this that are fully upper-case render bold.
const IMPLICIT_HEADER_MAX_LEN: usize = 30;

pub const EMPTY_SECTION_PLACEHOLDER: &str = "No information provided";

/// Renders a document to pages. Always yields at least one page.
pub fn render(doc: &Document, geometry: &PageGeometry, family: FontFamily) -> Result<Vec<Page>, RenderError> {
    geometry.validate()?;

    let mut ctx = RenderContext::new(*geometry, family);
    ctx.draw_header(doc);
    for section in &doc.sections {
        ctx.draw_section(section);
    }
    Ok(ctx.finish())
}

// ────────────────────────────────────────────────────────────────────────────
// Render context
// ────────────────────────────────────────────────────────────────────────────

struct RenderContext {
    geometry: PageGeometry,
    family: FontFamily,
    pages: Vec<Page>,
    page: Page,
    /// Baseline of the next line.
    y: f32,
    font: FontSpec,
}

impl RenderContext {
    fn new(geometry: PageGeometry, family: FontFamily) -> Self {
        let font = FontSpec::new(family, FontStyle::Regular, BODY_SIZE);
        Self {
            geometry,
            family,
            pages: Vec::new(),
            page: Page::new(1),
            y: geometry.top_margin,
            font,
        }
    }

    fn set_font(&mut self, style: FontStyle, size: f32) -> FontSpec {
        self.font = FontSpec::new(self.family, style, size);
        self.font
    }

    fn at_page_top(&self) -> bool {
        self.page.lines.is_empty()
    }

    fn new_page(&mut self) {
        let number = self.page.number + 1;
        let done = std::mem::replace(&mut self.page, Page::new(number));
        self.pages.push(done);
        self.y = self.geometry.top_margin;
    }

    /// Breaks the page when a line of the current font, plus `extra` trailing space,
    /// would end past the threshold.
    fn ensure_room(&mut self, extra: f32) {
        let baseline = self.y + self.font.size;
        if baseline + extra > self.geometry.max_content_y && !self.at_page_top() {
            self.new_page();
        }
    }

    /// Places one line at the cursor and advances by the current line height.
    fn place(&mut self, kind: LineKind, runs: Vec<TextRun>) {
        self.ensure_room(0.0);
        let baseline = self.y + self.font.size;
        self.page.lines.push(PlacedLine {
            y: baseline,
            kind,
            runs,
        });
        self.y += self.font.line_height();
    }

    fn run(&self, text: impl Into<String>, x: f32, align: Align) -> TextRun {
        TextRun {
            text: text.into(),
            x,
            align,
            font: self.font,
        }
    }

    fn left_run(&self, text: impl Into<String>, x: f32) -> TextRun {
        self.run(text, x, Align::Left)
    }

    fn right_run(&self, text: impl Into<String>) -> TextRun {
        let text = text.into();
        let x = self.geometry.right_edge() - self.font.measure(&text);
        self.run(text, x.max(self.geometry.margin), Align::Right)
    }

    fn centered_run(&self, text: impl Into<String>) -> TextRun {
        let text = text.into();
        let x = (self.geometry.width - self.font.measure(&text)) / 2.0;
        self.run(text, x.max(self.geometry.margin), Align::Center)
    }

    // ── Header ──────────────────────────────────────────────────────────────

    fn draw_header(&mut self, doc: &Document) {
        let column = self.geometry.column_width();
        let mut drew = false;

        if let Some(name) = doc.name.as_deref().filter(|n| !n.trim().is_empty()) {
            let font = self.set_font(FontStyle::Bold, NAME_SIZE);
            for line in wrap_text(name, &font, column) {
                let run = self.centered_run(line);
                self.place(LineKind::Name, vec![run]);
            }
            drew = true;
        }

        if let Some(contact) = doc.contact.as_deref().filter(|c| !c.trim().is_empty()) {
            let font = self.set_font(FontStyle::Regular, CONTACT_SIZE);
            for line in wrap_text(contact, &font, column) {
                let run = self.centered_run(line);
                self.place(LineKind::Contact, vec![run]);
            }
            drew = true;
        }

        if drew {
            self.y += HEADER_GAP;
        }
    }

    // ── Sections ────────────────────────────────────────────────────────────

    fn draw_section(&mut self, section: &Section) {
        if !self.at_page_top() {
            self.y += SECTION_GAP;
        }

        // Keep the title, its rule and the first body line together.
        self.set_font(FontStyle::Bold, SECTION_TITLE_SIZE);
        let keep_with_next = RULE_OFFSET + TITLE_GAP + BODY_SIZE * 1.2;
        self.ensure_room(keep_with_next);

        let title_font = self.font;
        let margin = self.geometry.margin;
        for line in wrap_text(&section.title, &title_font, self.geometry.column_width()) {
            let run = self.left_run(line, margin);
            self.place(LineKind::SectionTitle, vec![run]);
        }

        // `place` left the cursor one line height below the last title baseline.
        let rule_y = self.y - title_font.line_height() + title_font.size + RULE_OFFSET;
        self.page.rules.push(Rule {
            y: rule_y,
            x_start: margin,
            x_end: self.geometry.right_edge(),
            thickness: RULE_THICKNESS,
        });
        self.y = rule_y + TITLE_GAP;

        let has_content = section.items.iter().any(|i| !i.leaf_texts().is_empty());
        if !has_content {
            self.set_font(FontStyle::Italic, BODY_SIZE);
            let run = self.left_run(EMPTY_SECTION_PLACEHOLDER, margin);
            self.place(LineKind::Placeholder, vec![run]);
            return;
        }

        for item in &section.items {
            self.draw_item(item);
        }
    }

    fn draw_item(&mut self, item: &Item) {
        match item {
            Item::Subheading {
                title,
                right_date,
                subtitle,
                subtitle_right,
            } => {
                self.two_column(title, FontStyle::Bold, right_date, FontStyle::Regular);
                self.two_column(subtitle, FontStyle::Italic, subtitle_right, FontStyle::Italic);
            }
            Item::ProjectHeading { title, right_date } => {
                self.two_column(title, FontStyle::Regular, right_date, FontStyle::Regular);
            }
            Item::Bullet { text } => self.draw_bullet(text),
            Item::PlainLine { text } => self.draw_plain(text),
        }
    }

    /// Left text at the margin with right text right-aligned on the same baseline.
    /// A row with both sides empty is skipped.
    fn two_column(&mut self, left: &str, left_style: FontStyle, right: &str, right_style: FontStyle) {
        let (left, right) = (left.trim(), right.trim());
        if left.is_empty() && right.is_empty() {
            return;
        }

        let column = self.geometry.column_width();
        let margin = self.geometry.margin;
        let left_font = FontSpec::new(self.family, left_style, BODY_SIZE);
        let right_font = FontSpec::new(self.family, right_style, BODY_SIZE);
        let right_width = right_font.measure(right);

        if right_width > column * MAX_RIGHT_SHARE {
            // Too wide to share a line: stack the right side under the left.
            self.font = left_font;
            for line in wrap_text(left, &left_font, column) {
                let run = self.left_run(line, margin);
                self.place(LineKind::Content, vec![run]);
            }
            self.font = right_font;
            for line in wrap_text(right, &right_font, column) {
                let run = self.right_run(line);
                self.place(LineKind::Content, vec![run]);
            }
            return;
        }

        let left_width = if right.is_empty() {
            column
        } else {
            column - right_width - COLUMN_GAP
        };
        let mut left_lines = wrap_text(left, &left_font, left_width).into_iter();

        // First row carries the right column.
        self.font = left_font;
        let mut runs = Vec::with_capacity(2);
        if let Some(first) = left_lines.next() {
            runs.push(self.left_run(first, margin));
        }
        if !right.is_empty() {
            self.font = right_font;
            runs.push(self.right_run(right));
            self.font = left_font;
        }
        self.place(LineKind::Content, runs);

        for line in left_lines {
            let run = self.left_run(line, margin);
            self.place(LineKind::Content, vec![run]);
        }
    }

    fn draw_bullet(&mut self, text: &str) {
        let font = self.set_font(FontStyle::Regular, BODY_SIZE);
        let margin = self.geometry.margin;
        let text_x = margin + BULLET_TEXT_INDENT;
        let width = self.geometry.column_width() - BULLET_TEXT_INDENT;

        for (i, line) in wrap_text(text, &font, width).into_iter().enumerate() {
            let mut runs = Vec::with_capacity(2);
            if i == 0 {
                runs.push(self.left_run(BULLET_MARKER, margin + BULLET_MARKER_OFFSET));
            }
            runs.push(self.left_run(line, text_x));
            self.place(LineKind::Content, runs);
        }
    }

    fn draw_plain(&mut self, text: &str) {
        let style = if is_implicit_header(text) {
            FontStyle::Bold
        } else {
            FontStyle::Regular
        };
        let font = self.set_font(style, BODY_SIZE);
        let margin = self.geometry.margin;
        for line in wrap_text(text, &font, self.geometry.column_width()) {
            let run = self.left_run(line, margin);
            self.place(LineKind::Content, vec![run]);
        }
    }

    fn finish(mut self) -> Vec<Page> {
        self.pages.push(self.page);
        self.pages
    }
}

/// Short, non-empty, fully upper-case lines.
fn is_implicit_header(text: &str) -> bool {
    let text = text.trim();
    !text.is_empty() && text.chars().count() < IMPLICIT_HEADER_MAX_LEN && text == text.to_uppercase()
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
