//! Greedy word wrap over measured glyph widths.

use crate::layout::font_metrics::FontSpec;

/// Wraps `text` into lines no wider than `max_width` points.
///
/// Whitespace runs collapse to single spaces. A word wider than the whole line is
/// hard-split by characters. Empty or blank input yields no lines.
pub fn wrap_text(text: &str, font: &FontSpec, max_width: f32) -> Vec<String> {
    let space_w = font.space_width();
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_width = 0.0_f32;

    for word in text.split_whitespace() {
        let word_w = font.measure(word);

        if word_w > max_width {
            // Finish the open line, then split the word itself.
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let mut pieces = split_word(word, font, max_width);
            let tail = pieces.pop().unwrap_or_default();
            lines.extend(pieces);
            current_width = font.measure(&tail);
            current = tail;
            continue;
        }

        if current.is_empty() {
            current.push_str(word);
            current_width = word_w;
        } else if current_width + space_w + word_w > max_width {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
            current_width = word_w;
        } else {
            current.push(' ');
            current.push_str(word);
            current_width += space_w + word_w;
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Splits an overlong word into chunks that each fit `max_width`.
/// Every chunk holds at least one char, so this always terminates.
fn split_word(word: &str, font: &FontSpec, max_width: f32) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut piece = String::new();
    let mut width = 0.0_f32;
    let mut buf = [0u8; 4];

    for c in word.chars() {
        let w = font.measure(c.encode_utf8(&mut buf));
        if !piece.is_empty() && width + w > max_width {
            pieces.push(std::mem::take(&mut piece));
            width = 0.0;
        }
        piece.push(c);
        width += w;
    }
    if !piece.is_empty() {
        pieces.push(piece);
    }
    pieces
}
