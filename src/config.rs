//! # Layout Configuration
//!
//! Page geometry and table styling, passed explicitly into the engine.
//! Every field has a default, so a config file only needs to name what it
//! changes:
//!
//! ```json
//! { "page": { "size": "Letter", "margin": { "top": 72, "right": 72, "bottom": 72, "left": 72 } } }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{PagewrightError, Result};
use crate::style::Color;

/// Everything the layout engine needs to know besides the document itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub page: PageConfig,
    pub table: TableConfig,
}

impl LayoutConfig {
    /// Parse a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: LayoutConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject geometry the engine cannot lay out into.
    pub fn validate(&self) -> Result<()> {
        let (w, h) = self.page.size.dimensions();
        if !(w.is_finite() && h.is_finite() && w > 0.0 && h > 0.0) {
            return Err(PagewrightError::Config(format!(
                "page size must be positive and finite, got {} x {}",
                w, h
            )));
        }
        let m = &self.page.margin;
        for (name, v) in [
            ("top", m.top),
            ("right", m.right),
            ("bottom", m.bottom),
            ("left", m.left),
        ] {
            if !(v.is_finite() && v >= 0.0) {
                return Err(PagewrightError::Config(format!(
                    "{} margin must be non-negative, got {}",
                    name, v
                )));
            }
        }
        if self.page.content_width() <= 0.0 {
            return Err(PagewrightError::Config(format!(
                "horizontal margins ({}) leave no room on a {} pt wide page",
                m.horizontal(),
                w
            )));
        }
        if self.page.content_height() <= 0.0 {
            return Err(PagewrightError::Config(format!(
                "vertical margins ({}) leave no room on a {} pt tall page",
                m.vertical(),
                h
            )));
        }
        let t = &self.table;
        if !(t.cell_padding.is_finite() && t.cell_padding >= 0.0) {
            return Err(PagewrightError::Config(format!(
                "cell padding must be non-negative, got {}",
                t.cell_padding
            )));
        }
        if !(t.min_row_height.is_finite() && t.min_row_height >= 0.0) {
            return Err(PagewrightError::Config(format!(
                "minimum row height must be non-negative, got {}",
                t.min_row_height
            )));
        }
        Ok(())
    }
}

/// Configuration for a page: size and margins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageConfig {
    /// Page size. Defaults to A4.
    #[serde(default)]
    pub size: PageSize,

    /// Page margins in points (1/72 inch).
    #[serde(default = "default_margin")]
    pub margin: Edges,
}

fn default_margin() -> Edges {
    Edges::uniform(60.0)
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            size: PageSize::A4,
            margin: default_margin(),
        }
    }
}

impl PageConfig {
    pub fn width(&self) -> f64 {
        self.size.dimensions().0
    }

    pub fn height(&self) -> f64 {
        self.size.dimensions().1
    }

    pub fn content_width(&self) -> f64 {
        self.width() - self.margin.horizontal()
    }

    pub fn content_height(&self) -> f64 {
        self.height() - self.margin.vertical()
    }

    /// Highest y content may reach (bottom-left origin).
    pub fn content_top(&self) -> f64 {
        self.height() - self.margin.top
    }

    /// Lowest y content may reach.
    pub fn content_bottom(&self) -> f64 {
        self.margin.bottom
    }
}

/// Standard page sizes in points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum PageSize {
    #[default]
    A4,
    A5,
    Letter,
    Legal,
    Custom {
        width: f64,
        height: f64,
    },
}

impl PageSize {
    /// Returns (width, height) in points.
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            PageSize::A4 => (595.0, 842.0),
            PageSize::A5 => (420.0, 595.0),
            PageSize::Letter => (612.0, 792.0),
            PageSize::Legal => (612.0, 1008.0),
            PageSize::Custom { width, height } => (*width, *height),
        }
    }
}

/// Edge values (top, right, bottom, left) in points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Edges {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Edges {
    pub fn uniform(v: f64) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}

/// Table cell styling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TableConfig {
    /// Inner padding on every side of a cell.
    pub cell_padding: f64,
    /// Rows are never shorter than this.
    pub min_row_height: f64,
    /// `RRGGBB` hex color of cell borders.
    pub border_color: String,
    /// Stroke width the renderer uses for cell borders.
    pub border_width: f64,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            cell_padding: 4.0,
            min_row_height: 20.0,
            border_color: "888888".to_string(),
            border_width: 0.5,
        }
    }
}

impl TableConfig {
    pub fn border_color(&self) -> Color {
        Color::hex_or_black(Some(&self.border_color))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_a4_with_sixty_point_margins() {
        let config = LayoutConfig::default();
        assert_eq!(config.page.size.dimensions(), (595.0, 842.0));
        assert_eq!(config.page.margin, Edges::uniform(60.0));
        assert_eq!(config.page.content_width(), 475.0);
        assert_eq!(config.page.content_top(), 782.0);
        assert_eq!(config.page.content_bottom(), 60.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = LayoutConfig::from_json(r#"{ "page": { "size": "Letter" } }"#).unwrap();
        assert_eq!(config.page.width(), 612.0);
        assert_eq!(config.page.margin.left, 60.0);
        assert_eq!(config.table.cell_padding, 4.0);
    }

    #[test]
    fn custom_size_from_json() {
        let config = LayoutConfig::from_json(
            r#"{ "page": { "size": { "Custom": { "width": 300, "height": 400 } },
                           "margin": { "top": 10, "right": 10, "bottom": 10, "left": 10 } },
                 "table": { "cellPadding": 2 } }"#,
        )
        .unwrap();
        assert_eq!(config.page.content_width(), 280.0);
        assert_eq!(config.page.content_height(), 380.0);
        assert_eq!(config.table.cell_padding, 2.0);
        assert_eq!(config.table.min_row_height, 20.0);
    }

    #[test]
    fn margins_swallowing_the_page_are_rejected() {
        let mut config = LayoutConfig::default();
        config.page.margin = Edges::uniform(300.0);
        let err = config.validate().unwrap_err();
        assert!(matches!(err, PagewrightError::Config(_)));
    }

    #[test]
    fn negative_margin_is_rejected() {
        let mut config = LayoutConfig::default();
        config.page.margin.left = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn border_color_parses() {
        let c = TableConfig::default().border_color();
        assert!((c.r - 136.0 / 255.0).abs() < 1e-9);
    }
}
