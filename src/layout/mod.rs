//! # Page-Bound Layout Engine
//!
//! Turns a list of [`Block`]s into a flat stream of [`PositionedItem`]s,
//! each pinned to a page and a point on it.
//!
//! ## How It Works
//!
//! One cursor (page index + y) threads through the whole document. Every
//! block starts exactly where the previous one ended; there are no implicit
//! page breaks between paragraphs and tables. Before any piece of content is
//! placed, the engine asks the page [`Region`] whether it fits; if it
//! doesn't, the cursor moves to the top of the next page. Because the
//! cursor only ever moves forward, page indices in the output never
//! decrease.
//!
//! Tables are the one place that needs lookahead: a row is as tall as its
//! tallest cell, and that is only known after laying the cells out. The
//! table pass lays every cell out once in a throwaway frame to measure it,
//! then again at real coordinates. See [`table`].
//!
//! Coordinates are PDF-native: origin at the bottom-left corner of the page,
//! y growing upward.

pub mod page_break;
pub mod paragraph;
pub mod table;

use serde::Serialize;

use crate::config::LayoutConfig;
use crate::error::{PagewrightError, Result};
use crate::model::Block;
use crate::style::{Alignment, Color};
use crate::text::{ApproxMeasurer, TextMeasurer};

pub use page_break::{Cursor, Region};

/// A line of text to draw. `y` is the baseline.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextItem {
    pub page: usize,
    pub x: f64,
    pub y: f64,
    pub text: String,
    pub font_size: f64,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub color: Color,
    pub alignment: Alignment,
}

/// An image placement. `(x, y)` is the bottom-left corner.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageItem {
    pub page: usize,
    pub x: f64,
    pub y: f64,
    /// Opaque reference the renderer resolves to image bytes.
    pub reference: String,
    pub width: f64,
    pub height: f64,
}

/// A stroked rectangle (table cell border). `(x, y)` is the bottom-left corner.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RectItem {
    pub page: usize,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub border_color: Color,
}

/// One drawing instruction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PositionedItem {
    Text(TextItem),
    Image(ImageItem),
    Rect(RectItem),
}

impl PositionedItem {
    pub fn page(&self) -> usize {
        match self {
            PositionedItem::Text(t) => t.page,
            PositionedItem::Image(i) => i.page,
            PositionedItem::Rect(r) => r.page,
        }
    }

    pub fn x(&self) -> f64 {
        match self {
            PositionedItem::Text(t) => t.x,
            PositionedItem::Image(i) => i.x,
            PositionedItem::Rect(r) => r.x,
        }
    }

    pub fn y(&self) -> f64 {
        match self {
            PositionedItem::Text(t) => t.y,
            PositionedItem::Image(i) => i.y,
            PositionedItem::Rect(r) => r.y,
        }
    }

    fn set_page(&mut self, page: usize) {
        match self {
            PositionedItem::Text(t) => t.page = page,
            PositionedItem::Image(i) => i.page = page,
            PositionedItem::Rect(r) => r.page = page,
        }
    }

    pub fn as_text(&self) -> Option<&TextItem> {
        match self {
            PositionedItem::Text(t) => Some(t),
            _ => None,
        }
    }

    /// Reject geometry the renderer would draw as garbage.
    fn check_geometry(&self) -> Result<()> {
        let (kind, w, h) = match self {
            PositionedItem::Text(t) => ("text", 0.0, t.font_size),
            PositionedItem::Image(i) => ("image", i.width, i.height),
            PositionedItem::Rect(r) => ("rect", r.width, r.height),
        };
        let (x, y) = (self.x(), self.y());
        if !x.is_finite() || !y.is_finite() {
            return Err(PagewrightError::Geometry(format!(
                "{} item on page {} has non-finite position ({}, {})",
                kind,
                self.page(),
                x,
                y
            )));
        }
        if !(w.is_finite() && h.is_finite() && w >= 0.0 && h >= 0.0) {
            return Err(PagewrightError::Geometry(format!(
                "{} item on page {} has invalid size {} x {}",
                kind,
                self.page(),
                w,
                h
            )));
        }
        Ok(())
    }
}

/// Push an item after checking its geometry.
pub(crate) fn emit(items: &mut Vec<PositionedItem>, item: PositionedItem) -> Result<()> {
    item.check_geometry()?;
    items.push(item);
    Ok(())
}

/// The horizontal band a paragraph is laid out in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub x: f64,
    pub width: f64,
}

/// Items produced by one block plus where the cursor ended up.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockLayout {
    pub items: Vec<PositionedItem>,
    pub end: Cursor,
}

/// The finished layout of a whole document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutResult {
    pub items: Vec<PositionedItem>,
    /// Highest page index touched plus one; at least 1.
    pub page_count: usize,
}

impl LayoutResult {
    pub fn items_on_page(&self, page: usize) -> impl Iterator<Item = &PositionedItem> {
        self.items.iter().filter(move |item| item.page() == page)
    }

    pub fn text_items(&self) -> impl Iterator<Item = &TextItem> {
        self.items.iter().filter_map(PositionedItem::as_text)
    }
}

/// The layout engine. Holds configuration and a text measurer; every layout
/// call is a pure function of its arguments.
pub struct LayoutEngine<M: TextMeasurer = ApproxMeasurer> {
    config: LayoutConfig,
    measurer: M,
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self {
            config: LayoutConfig::default(),
            measurer: ApproxMeasurer::new(),
        }
    }
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> Result<Self> {
        Self::with_measurer(config, ApproxMeasurer::new())
    }
}

impl<M: TextMeasurer> LayoutEngine<M> {
    /// Build an engine around a custom text measurer.
    pub fn with_measurer(config: LayoutConfig, measurer: M) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, measurer })
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn measurer(&self) -> &M {
        &self.measurer
    }

    /// The content area of a real page.
    pub fn page_region(&self) -> Region {
        Region::page(&self.config.page)
    }

    /// The full content width of a page.
    pub fn page_frame(&self) -> Frame {
        Frame {
            x: self.config.page.margin.left,
            width: self.config.page.content_width(),
        }
    }

    /// Main entry point: lay out a document's blocks in order.
    ///
    /// An empty document still has one (blank) page.
    pub fn layout(&self, blocks: &[Block]) -> Result<LayoutResult> {
        let region = self.page_region();
        let frame = self.page_frame();
        let mut cursor = region.start();
        let mut items = Vec::new();

        for block in blocks {
            let placed = match block {
                Block::Paragraph(paragraph) => {
                    self.layout_paragraph_in(paragraph, frame, region, cursor)?
                }
                Block::Table(table) => self.layout_table_in(table, frame, region, cursor)?,
            };
            items.extend(placed.items);
            cursor = placed.end;
        }

        let last_page = items
            .iter()
            .map(PositionedItem::page)
            .max()
            .unwrap_or(0)
            .max(cursor.page);
        let page_count = last_page + 1;

        log::debug!(
            "layout complete: {} items across {} page(s)",
            items.len(),
            page_count
        );
        Ok(LayoutResult { items, page_count })
    }
}
