//! # Pagewright
//!
//! A paginating layout engine for word-processor style documents.
//!
//! Pagewright takes an already-parsed document (styled paragraphs, lists,
//! tables and inline images) and decides where every line, cell border and
//! picture lands on a fixed-size page. Pages are the unit of layout: each
//! line asks whether it still fits above the bottom margin before it is
//! placed, and table rows are measured in full before they are committed so
//! a row never straddles a page boundary.
//!
//! The output is a flat list of positioned items in PDF-native coordinates
//! (points, bottom-left origin). The bundled [`pdf`] module serializes that
//! list, but any backend that can draw text, rectangles and images can
//! consume it.
//!
//! ## Architecture
//!
//! ```text
//! Input (JSON/API)
//!       ↓
//!   [model]    Blocks: paragraphs, runs, tables, images
//!       ↓
//!   [layout]   Cursor-driven pagination (paragraph, table, page_break)
//!       ↓          ↑ [text] line wrapping and width estimates
//!   LayoutResult
//!       ↓
//!   [pdf]      Serialize to PDF bytes ([font], [image_loader])
//! ```

pub mod config;
pub mod error;
pub mod font;
pub mod image_loader;
pub mod layout;
pub mod model;
pub mod pdf;
pub mod style;
pub mod text;

pub use config::LayoutConfig;
pub use error::{PagewrightError, Result};
pub use layout::{LayoutEngine, LayoutResult, PositionedItem};
pub use model::{Block, Document};

use pdf::PdfWriter;

/// Lay out blocks on default A4 pages with 60pt margins.
pub fn layout_document(blocks: &[Block]) -> Result<LayoutResult> {
    LayoutEngine::default().layout(blocks)
}

/// Render a document to PDF bytes.
///
/// This is the primary entry point. Lays the blocks out with `config` and
/// serializes the result, resolving images through `document.images`.
pub fn render(document: &Document, config: &LayoutConfig) -> Result<Vec<u8>> {
    let engine = LayoutEngine::new(config.clone())?;
    let layout = engine.layout(&document.blocks)?;
    let writer = PdfWriter::new();
    Ok(writer.write(&layout, document, config))
}

/// Render a document described as JSON to PDF bytes, using the default
/// configuration.
pub fn render_json(json: &str) -> Result<Vec<u8>> {
    let document: Document = serde_json::from_str(json)?;
    render(&document, &LayoutConfig::default())
}
