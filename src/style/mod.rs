//! # Style Primitives
//!
//! The small set of visual attributes that survive into positioned output:
//! colors and horizontal alignment. Heading and list styling is resolved by
//! the paragraph layout pass, not here.

use serde::{Deserialize, Serialize};

/// An RGB color with channels in 0.0 - 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };
    pub const PLACEHOLDER_GREY: Color = Color {
        r: 0.9,
        g: 0.9,
        b: 0.9,
    };

    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Parse a `RRGGBB` or `RGB` hex string, with or without a leading `#`.
    ///
    /// Returns `None` for anything else, including the `auto` keyword word
    /// processors use for "default color".
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let (r, g, b) = match hex.len() {
            3 => {
                let r = u8::from_str_radix(&hex[0..1].repeat(2), 16).ok()?;
                let g = u8::from_str_radix(&hex[1..2].repeat(2), 16).ok()?;
                let b = u8::from_str_radix(&hex[2..3].repeat(2), 16).ok()?;
                (r, g, b)
            }
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                (r, g, b)
            }
            _ => return None,
        };
        Some(Self::rgb(
            r as f64 / 255.0,
            g as f64 / 255.0,
            b as f64 / 255.0,
        ))
    }

    /// Like [`Color::from_hex`], falling back to black.
    pub fn hex_or_black(hex: Option<&str>) -> Self {
        hex.and_then(Color::from_hex).unwrap_or(Color::BLACK)
    }
}

/// Horizontal alignment of a paragraph's lines.
///
/// `Justify` is accepted but laid out flush-left: there is no inter-word
/// stretching.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
    #[serde(alias = "both")]
    Justify,
}
