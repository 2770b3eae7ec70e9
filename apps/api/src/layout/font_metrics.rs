//! Static font-metric tables for the PDF base-14 families the renderer draws with.
//!
//! Character widths are in em units (relative to font size), taken from the Adobe AFM
//! files (width / 1000). Oblique faces share the widths of their upright face, and
//! Courier is monospaced, so three tables cover all eight faces.
//!
//! All tables cover ASCII 0x20..=0x7E (95 printable characters).
//! Index = (char as usize) - 32.

use serde::{Deserialize, Serialize};

/// Line height as a multiple of the font size.
pub const LINE_HEIGHT_FACTOR: f32 = 1.2;

// ────────────────────────────────────────────────────────────────────────────
// Font selection
// ────────────────────────────────────────────────────────────────────────────

/// Base-14 families available without embedding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontFamily {
    /// Proportional sans-serif, the default résumé face.
    #[default]
    Helvetica,
    /// Monospaced; every glyph is 0.6 em wide.
    Courier,
}

impl FontFamily {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "helvetica" => Some(Self::Helvetica),
            "courier" => Some(Self::Courier),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontStyle {
    Regular,
    Bold,
    Italic,
    BoldItalic,
}

impl FontStyle {
    pub fn is_bold(self) -> bool {
        matches!(self, Self::Bold | Self::BoldItalic)
    }
}

/// A concrete font at a concrete size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FontSpec {
    pub family: FontFamily,
    pub style: FontStyle,
    /// Size in points.
    pub size: f32,
}

impl FontSpec {
    pub fn new(family: FontFamily, style: FontStyle, size: f32) -> Self {
        Self { family, style, size }
    }

    /// Width of `text` in points.
    pub fn measure(&self, text: &str) -> f32 {
        get_metrics(self.family, self.style).measure_str(text) * self.size
    }

    /// Width of one space in points.
    pub fn space_width(&self) -> f32 {
        get_metrics(self.family, self.style).space_width * self.size
    }

    pub fn line_height(&self) -> f32 {
        self.size * LINE_HEIGHT_FACTOR
    }

    /// PostScript name of the base-14 face.
    pub fn base_font_name(&self) -> &'static str {
        base_font_name(self.family, self.style)
    }
}

pub fn base_font_name(family: FontFamily, style: FontStyle) -> &'static str {
    match (family, style) {
        (FontFamily::Helvetica, FontStyle::Regular) => "Helvetica",
        (FontFamily::Helvetica, FontStyle::Bold) => "Helvetica-Bold",
        (FontFamily::Helvetica, FontStyle::Italic) => "Helvetica-Oblique",
        (FontFamily::Helvetica, FontStyle::BoldItalic) => "Helvetica-BoldOblique",
        (FontFamily::Courier, FontStyle::Regular) => "Courier",
        (FontFamily::Courier, FontStyle::Bold) => "Courier-Bold",
        (FontFamily::Courier, FontStyle::Italic) => "Courier-Oblique",
        (FontFamily::Courier, FontStyle::BoldItalic) => "Courier-BoldOblique",
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Font metric table
// ────────────────────────────────────────────────────────────────────────────

/// Static character-width table for one face.
///
/// `widths[i]` = width of ASCII character `(i + 32)`, covering 0x20 (space) through 0x7E (~).
///
/// Width array slot layout:
/// ```text
/// [0]=sp  [1]=!   [2]="   [3]=#   [4]=$   [5]=%   [6]=&   [7]='
/// [8]=(   [9]=)   [10]=*  [11]=+  [12]=,  [13]=-  [14]=.  [15]=/
/// [16..25]=0-9
/// [26]=:  [27]=;  [28]=<  [29]==  [30]=>  [31]=?  [32]=@
/// [33..58]=A-Z
/// [59]=[  [60]=\  [61]=]  [62]=^  [63]=_  [64]=`
/// [65..90]=a-z
/// [91]={  [92]=|  [93]=}  [94]=~
/// ```
pub struct FontMetricTable {
    widths: [f32; 95],
    /// Fallback width for non-ASCII characters without an explicit entry.
    pub average_char_width: f32,
    pub space_width: f32,
    /// Widths of the typographic characters résumés use most.
    bullet_width: f32,
    en_dash_width: f32,
    em_dash_width: f32,
}

impl FontMetricTable {
    pub fn char_width(&self, c: char) -> f32 {
        let code = c as usize;
        if (32..=126).contains(&code) {
            return self.widths[code - 32];
        }
        match c {
            '\u{2022}' => self.bullet_width,
            '\u{2013}' => self.en_dash_width,
            '\u{2014}' | '\u{2026}' => self.em_dash_width,
            '\u{2018}' | '\u{2019}' | '\u{b7}' => self.widths[7],
            '\u{201c}' | '\u{201d}' => self.widths[2],
            _ => self.average_char_width,
        }
    }

    /// Measures the rendered width of a string in em units.
    pub fn measure_str(&self, s: &str) -> f32 {
        s.chars().map(|c| self.char_width(c)).sum()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Static width tables  (95 ASCII printable characters each)
// ────────────────────────────────────────────────────────────────────────────

/// Helvetica and Helvetica-Oblique.
static HELVETICA_TABLE: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp     !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
        0.278, 0.278, 0.355, 0.556, 0.556, 0.889, 0.667, 0.191, 0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278,
        // 0      1      2      3      4      5      6      7      8      9
        0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556,
        // :      ;      <      =      >      ?      @
        0.278, 0.278, 0.584, 0.584, 0.584, 0.556, 1.015,
        // A      B      C      D      E      F      G      H      I      J      K      L      M
        0.667, 0.667, 0.722, 0.722, 0.667, 0.611, 0.778, 0.722, 0.278, 0.500, 0.667, 0.556, 0.833,
        // N      O      P      Q      R      S      T      U      V      W      X      Y      Z
        0.722, 0.778, 0.667, 0.778, 0.722, 0.667, 0.611, 0.722, 0.667, 0.944, 0.667, 0.667, 0.611,
        // [      \      ]      ^      _      `
        0.278, 0.278, 0.278, 0.469, 0.556, 0.333,
        // a      b      c      d      e      f      g      h      i      j      k      l      m
        0.556, 0.556, 0.500, 0.556, 0.556, 0.278, 0.556, 0.556, 0.222, 0.222, 0.500, 0.222, 0.833,
        // n      o      p      q      r      s      t      u      v      w      x      y      z
        0.556, 0.556, 0.556, 0.556, 0.333, 0.500, 0.278, 0.556, 0.500, 0.722, 0.500, 0.500, 0.500,
        // {      |      }      ~
        0.334, 0.260, 0.334, 0.584,
    ],
    average_char_width: 0.556,
    space_width: 0.278,
    bullet_width: 0.350,
    en_dash_width: 0.556,
    em_dash_width: 1.000,
};

/// Helvetica-Bold and Helvetica-BoldOblique.
static HELVETICA_BOLD_TABLE: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp     !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
        0.278, 0.333, 0.474, 0.556, 0.556, 0.889, 0.722, 0.238, 0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278,
        // 0      1      2      3      4      5      6      7      8      9
        0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556,
        // :      ;      <      =      >      ?      @
        0.333, 0.333, 0.584, 0.584, 0.584, 0.611, 0.975,
        // A      B      C      D      E      F      G      H      I      J      K      L      M
        0.722, 0.722, 0.722, 0.722, 0.667, 0.611, 0.778, 0.722, 0.278, 0.556, 0.722, 0.611, 0.833,
        // N      O      P      Q      R      S      T      U      V      W      X      Y      Z
        0.722, 0.778, 0.667, 0.778, 0.722, 0.667, 0.611, 0.722, 0.667, 0.944, 0.667, 0.667, 0.611,
        // [      \      ]      ^      _      `
        0.333, 0.278, 0.333, 0.584, 0.556, 0.333,
        // a      b      c      d      e      f      g      h      i      j      k      l      m
        0.556, 0.611, 0.556, 0.611, 0.556, 0.333, 0.611, 0.611, 0.278, 0.278, 0.556, 0.278, 0.889,
        // n      o      p      q      r      s      t      u      v      w      x      y      z
        0.611, 0.611, 0.611, 0.611, 0.389, 0.556, 0.333, 0.611, 0.556, 0.778, 0.556, 0.556, 0.500,
        // {      |      }      ~
        0.389, 0.280, 0.389, 0.584,
    ],
    average_char_width: 0.611,
    space_width: 0.278,
    bullet_width: 0.350,
    en_dash_width: 0.556,
    em_dash_width: 1.000,
};

/// Every Courier face.
static COURIER_TABLE: FontMetricTable = FontMetricTable {
    widths: [0.6; 95],
    average_char_width: 0.6,
    space_width: 0.6,
    bullet_width: 0.6,
    en_dash_width: 0.6,
    em_dash_width: 0.6,
};

/// Returns the static metric table for a face.
pub fn get_metrics(family: FontFamily, style: FontStyle) -> &'static FontMetricTable {
    match family {
        FontFamily::Courier => &COURIER_TABLE,
        FontFamily::Helvetica if style.is_bold() => &HELVETICA_BOLD_TABLE,
        FontFamily::Helvetica => &HELVETICA_TABLE,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn helvetica(style: FontStyle) -> &'static FontMetricTable {
        get_metrics(FontFamily::Helvetica, style)
    }

    #[test]
    fn test_measure_str_empty_returns_zero() {
        assert_eq!(helvetica(FontStyle::Regular).measure_str(""), 0.0);
    }

    #[test]
    fn test_measure_str_ascii_characters() {
        // "Rust" = R(0.722) + u(0.556) + s(0.500) + t(0.278) = 2.056
        let width = helvetica(FontStyle::Regular).measure_str("Rust");
        assert!((width - 2.056).abs() < 1e-3, "Rust width should be ~2.056, got {width}");
    }

    #[test]
    fn test_bold_is_wider_than_regular() {
        let text = "Architected distributed caching layer";
        assert!(
            helvetica(FontStyle::Bold).measure_str(text) > helvetica(FontStyle::Regular).measure_str(text)
        );
    }

    #[test]
    fn test_oblique_shares_upright_widths() {
        let text = "Acme Corporation";
        assert_eq!(
            helvetica(FontStyle::Italic).measure_str(text),
            helvetica(FontStyle::Regular).measure_str(text)
        );
    }

    #[test]
    fn test_non_ascii_falls_back_or_uses_explicit_width() {
        let metrics = helvetica(FontStyle::Regular);
        assert!((metrics.measure_str("é") - metrics.average_char_width).abs() < 1e-4);
        assert!((metrics.measure_str("\u{2022}") - 0.35).abs() < 1e-4);
        assert!((metrics.measure_str("\u{2014}") - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_courier_is_monospaced() {
        let spec = FontSpec::new(FontFamily::Courier, FontStyle::Bold, 10.0);
        assert!((spec.measure("iiii") - spec.measure("WWWW")).abs() < 1e-4);
        assert!((spec.measure("abc") - 18.0).abs() < 1e-4);
    }

    #[test]
    fn test_font_spec_scales_with_size() {
        let small = FontSpec::new(FontFamily::Helvetica, FontStyle::Regular, 10.0);
        let large = FontSpec::new(FontFamily::Helvetica, FontStyle::Regular, 20.0);
        assert!((large.measure("Rust") - 2.0 * small.measure("Rust")).abs() < 1e-3);
        assert!((small.line_height() - 12.0).abs() < 1e-4);
    }

    #[test]
    fn test_base_font_names() {
        assert_eq!(base_font_name(FontFamily::Helvetica, FontStyle::BoldItalic), "Helvetica-BoldOblique");
        assert_eq!(base_font_name(FontFamily::Courier, FontStyle::Italic), "Courier-Oblique");
    }

    #[test]
    fn test_family_parse() {
        assert_eq!(FontFamily::parse(" Courier "), Some(FontFamily::Courier));
        assert_eq!(FontFamily::parse("helvetica"), Some(FontFamily::Helvetica));
        assert_eq!(FontFamily::parse("comic-sans"), None);
    }
}
