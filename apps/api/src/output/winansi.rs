//! Unicode → WinAnsiEncoding (Windows-1252) transcoding for base-14 fonts.
//!
//! Latin-1 code points map to themselves. The 0x80..=0x9F block carries the
//! typographic punctuation résumés use (bullets, dashes, curly quotes).
//! Anything else becomes `?`.

pub const REPLACEMENT: u8 = b'?';

pub fn encode(text: &str) -> Vec<u8> {
    text.chars().map(encode_char).collect()
}

pub fn encode_char(c: char) -> u8 {
    match c {
        '\u{20}'..='\u{7e}' => c as u8,
        '\u{a0}'..='\u{ff}' => c as u32 as u8,
        '\u{20ac}' => 0x80,
        '\u{201a}' => 0x82,
        '\u{201e}' => 0x84,
        '\u{2026}' => 0x85,
        '\u{2020}' => 0x86,
        '\u{2021}' => 0x87,
        '\u{2030}' => 0x89,
        '\u{0160}' => 0x8a,
        '\u{2039}' => 0x8b,
        '\u{0152}' => 0x8c,
        '\u{017d}' => 0x8e,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201c}' => 0x93,
        '\u{201d}' => 0x94,
        '\u{2022}' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '\u{2122}' => 0x99,
        '\u{0161}' => 0x9a,
        '\u{203a}' => 0x9b,
        '\u{0153}' => 0x9c,
        '\u{017e}' => 0x9e,
        '\u{0178}' => 0x9f,
        // Tabs and stray control characters render as spaces.
        '\t' | '\n' | '\r' => b' ',
        _ => REPLACEMENT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_passthrough() {
        assert_eq!(encode("Led X (2020)"), b"Led X (2020)".to_vec());
    }

    #[test]
    fn test_latin1_passthrough() {
        assert_eq!(encode("Zürich"), vec![b'Z', 0xfc, b'r', b'i', b'c', b'h']);
    }

    #[test]
    fn test_typographic_punctuation() {
        assert_eq!(encode("\u{2022}\u{2013}\u{2014}\u{201c}\u{201d}\u{20ac}"), vec![0x95, 0x96, 0x97, 0x93, 0x94, 0x80]);
    }

    #[test]
    fn test_unmappable_becomes_question_mark() {
        assert_eq!(encode("東京"), b"??".to_vec());
    }
}
