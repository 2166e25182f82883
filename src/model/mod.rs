//! # Document Model
//!
//! The input representation for the layout engine: an ordered list of
//! top-level [`Block`]s, each either a [`Paragraph`] or a [`Table`].
//!
//! The model is produced upstream from parsed word-processor markup, with
//! relationship ids already resolved and image sizes already converted to
//! points. Layout never mutates it.
//!
//! Everything deserializes from JSON with camelCase field names, so a
//! document can be fed straight to the CLI:
//!
//! ```json
//! { "blocks": [
//!     { "type": "paragraph", "style": "heading1",
//!       "runs": [{ "type": "text", "text": "Title" }] }
//! ] }
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::style::Alignment;

/// Twentieths of a point per point.
pub const TWIPS_PER_POINT: f64 = 20.0;
/// English Metric Units per point.
pub const EMU_PER_POINT: f64 = 12700.0;

/// Convert twips (1/20 pt) to points.
pub fn twips_to_pt(twips: f64) -> f64 {
    twips / TWIPS_PER_POINT
}

/// Convert English Metric Units to points.
pub fn emu_to_pt(emu: f64) -> f64 {
    emu / EMU_PER_POINT
}

/// A complete document: content blocks plus what the renderer needs to
/// draw them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Top-level content in document order.
    #[serde(default)]
    pub blocks: Vec<Block>,

    #[serde(default)]
    pub metadata: Metadata,

    /// Resolved relationship table: image reference to image source
    /// (data URI, raw base64, or file path).
    #[serde(default)]
    pub images: HashMap<String, String>,
}

/// Document metadata embedded in the PDF.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
}

/// A top-level content block.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Block {
    Paragraph(Paragraph),
    Table(Table),
}

/// Paragraph-level style tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParagraphStyle {
    #[default]
    Normal,
    Heading1,
    Heading2,
    Heading3,
}

impl ParagraphStyle {
    /// Fixed font size for heading styles; `None` for body text.
    pub fn heading_size(self) -> Option<f64> {
        match self {
            ParagraphStyle::Normal => None,
            ParagraphStyle::Heading1 => Some(24.0),
            ParagraphStyle::Heading2 => Some(18.0),
            ParagraphStyle::Heading3 => Some(14.0),
        }
    }

    pub fn is_heading(self) -> bool {
        self != ParagraphStyle::Normal
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ListKind {
    Bullet,
    Number,
}

/// List membership of a paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListInfo {
    pub kind: ListKind,
    /// Nesting level, 0 for the outermost list.
    #[serde(default)]
    pub level: u32,
}

/// Vertical spacing around a paragraph, in twips.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Spacing {
    #[serde(default)]
    pub before: f64,
    #[serde(default)]
    pub after: f64,
}

impl Spacing {
    pub fn before_pt(&self) -> f64 {
        twips_to_pt(self.before)
    }

    pub fn after_pt(&self) -> f64 {
        twips_to_pt(self.after)
    }
}

/// A paragraph: styled runs plus paragraph-level formatting.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paragraph {
    /// Missing run lists are treated as empty.
    #[serde(default)]
    pub runs: Vec<Run>,
    #[serde(default)]
    pub alignment: Alignment,
    #[serde(default)]
    pub style: ParagraphStyle,
    #[serde(default)]
    pub list: Option<ListInfo>,
    #[serde(default)]
    pub spacing: Spacing,
}

impl Paragraph {
    /// A plain body paragraph holding one text run.
    pub fn text(text: &str) -> Self {
        Self {
            runs: vec![Run::Text(TextRun::new(text))],
            ..Default::default()
        }
    }
}

/// The smallest styled unit inside a paragraph.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Run {
    Text(TextRun),
    Image(ImageRun),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextRun {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub underline: bool,
    /// Font size in points; body text defaults to 12 when absent.
    #[serde(default)]
    pub font_size: Option<f64>,
    /// `RRGGBB` hex color.
    #[serde(default)]
    pub color: Option<String>,
}

impl TextRun {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            ..Default::default()
        }
    }
}

/// An inline image. Width and height are already in points.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRun {
    /// Opaque image reference (a relationship id), resolved by the renderer.
    pub reference: String,
    pub width: f64,
    pub height: f64,
}

impl ImageRun {
    /// Build an image run from extents given in EMU.
    pub fn from_emu(reference: &str, cx: f64, cy: f64) -> Self {
        Self {
            reference: reference.to_string(),
            width: emu_to_pt(cx),
            height: emu_to_pt(cy),
        }
    }
}

/// A table cell. Spans are recorded but not applied to geometry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableCell {
    #[serde(default)]
    pub paragraphs: Vec<Paragraph>,
    #[serde(default = "default_span")]
    pub col_span: u32,
    #[serde(default = "default_span")]
    pub row_span: u32,
}

fn default_span() -> u32 {
    1
}

impl Default for TableCell {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl TableCell {
    pub fn new(paragraphs: Vec<Paragraph>) -> Self {
        Self {
            paragraphs,
            col_span: 1,
            row_span: 1,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableRow {
    #[serde(default)]
    pub cells: Vec<TableCell>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Table {
    #[serde(default)]
    pub rows: Vec<TableRow>,
}

impl Table {
    /// Number of layout columns: the widest row, never less than one.
    pub fn column_count(&self) -> usize {
        self.rows
            .iter()
            .map(|row| row.cells.len())
            .max()
            .unwrap_or(0)
            .max(1)
    }
}
