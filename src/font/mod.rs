//! # Font Selection
//!
//! The renderer draws everything with the Helvetica family from the 14
//! standard PDF fonts, which need no embedding. Layout only deals in
//! bold/italic flags; this module maps those flags to a concrete face.

/// The Helvetica faces of the standard PDF fonts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    HelveticaBoldOblique,
}

impl StandardFont {
    /// Pick the face for a weight/style combination.
    pub fn for_style(bold: bool, italic: bool) -> Self {
        match (bold, italic) {
            (false, false) => Self::Helvetica,
            (true, false) => Self::HelveticaBold,
            (false, true) => Self::HelveticaOblique,
            (true, true) => Self::HelveticaBoldOblique,
        }
    }

    /// The PDF name for this font.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::HelveticaBold => "Helvetica-Bold",
            Self::HelveticaOblique => "Helvetica-Oblique",
            Self::HelveticaBoldOblique => "Helvetica-BoldOblique",
        }
    }
}

/// Encode text for a WinAnsiEncoding string literal.
///
/// Printable ASCII passes through (with `\`, `(` and `)` escaped). Characters
/// WinAnsi can represent above 0x7F are written as octal escapes. Anything
/// else becomes `?`.
pub fn encode_win_ansi(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '(' => out.push_str("\\("),
            ')' => out.push_str("\\)"),
            ' '..='~' => out.push(ch),
            _ => match win_ansi_byte(ch) {
                Some(b) => out.push_str(&format!("\\{:03o}", b)),
                None => out.push('?'),
            },
        }
    }
    out
}

fn win_ansi_byte(ch: char) -> Option<u8> {
    let code = ch as u32;
    if (0xA0..=0xFF).contains(&code) {
        return Some(code as u8);
    }
    let b = match ch {
        '\u{20AC}' => 0x80, // euro
        '\u{201A}' => 0x82,
        '\u{0192}' => 0x83,
        '\u{201E}' => 0x84,
        '\u{2026}' => 0x85, // ellipsis
        '\u{2020}' => 0x86,
        '\u{2021}' => 0x87,
        '\u{02C6}' => 0x88,
        '\u{2030}' => 0x89,
        '\u{0160}' => 0x8A,
        '\u{2039}' => 0x8B,
        '\u{0152}' => 0x8C,
        '\u{017D}' => 0x8E,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201C}' => 0x93,
        '\u{201D}' => 0x94,
        '\u{2022}' => 0x95, // bullet
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '\u{02DC}' => 0x98,
        '\u{2122}' => 0x99,
        '\u{0161}' => 0x9A,
        '\u{203A}' => 0x9B,
        '\u{0153}' => 0x9C,
        '\u{017E}' => 0x9E,
        '\u{0178}' => 0x9F,
        _ => return None,
    };
    Some(b)
}
