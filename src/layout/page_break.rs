//! # Page Break Decisions
//!
//! The one rule every layout pass shares: if the next piece of content
//! would cross the bottom of the region, move to the top of the next page.
//!
//! Coordinates use a bottom-left origin, so the cursor's `y` decreases as
//! content is placed. A [`Region`] is the vertical band content may occupy.
//! The real page uses the configured margins; the table measurement pass
//! uses an unbounded region so nothing ever breaks while measuring.

use serde::Serialize;

use crate::config::PageConfig;

/// Where the next piece of content goes: a page index and the top of the
/// next line box on that page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cursor {
    pub page: usize,
    pub y: f64,
}

impl Cursor {
    pub fn new(page: usize, y: f64) -> Self {
        Self { page, y }
    }
}

/// A vertical band content may occupy, repeated once per page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub top: f64,
    pub bottom: f64,
}

impl Region {
    /// The content area of a real page.
    pub fn page(config: &PageConfig) -> Self {
        Self {
            top: config.content_top(),
            bottom: config.content_bottom(),
        }
    }

    /// A disposable frame with no bottom: starts at y = 0 and never breaks.
    pub fn unbounded() -> Self {
        Self {
            top: 0.0,
            bottom: f64::NEG_INFINITY,
        }
    }

    /// Cursor at the top of the first page of this region.
    pub fn start(&self) -> Cursor {
        Cursor::new(0, self.top)
    }

    /// Advance to the next page if content of `extent` points placed at the
    /// cursor would reach below the bottom of the region.
    ///
    /// Returns whether a page break happened.
    pub fn ensure_room(&self, cursor: &mut Cursor, extent: f64) -> bool {
        if cursor.y - extent < self.bottom {
            cursor.page += 1;
            cursor.y = self.top;
            log::trace!("page break -> page {}", cursor.page);
            true
        } else {
            false
        }
    }

    /// Make room for `extent` like [`Region::ensure_room`], except that a
    /// cursor already at the top of a page never breaks again: content taller
    /// than the whole region stays where it is.
    ///
    /// Returns how much of `extent` fits between the cursor and the bottom.
    pub fn fit(&self, cursor: &mut Cursor, extent: f64) -> f64 {
        if !self.at_top(cursor) {
            self.ensure_room(cursor, extent);
        }
        extent.min(cursor.y - self.bottom)
    }

    /// True when nothing has been placed on the cursor's page yet.
    pub fn at_top(&self, cursor: &Cursor) -> bool {
        cursor.y >= self.top
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region() -> Region {
        Region {
            top: 782.0,
            bottom: 60.0,
        }
    }

    #[test]
    fn fits_without_break() {
        let mut cursor = Cursor::new(0, 100.0);
        assert!(!region().ensure_room(&mut cursor, 40.0));
        assert_eq!(cursor, Cursor::new(0, 100.0));
    }

    #[test]
    fn exact_fit_does_not_break() {
        let mut cursor = Cursor::new(2, 100.0);
        assert!(!region().ensure_room(&mut cursor, 40.0));
    }

    #[test]
    fn overflow_moves_to_next_page_top() {
        let mut cursor = Cursor::new(1, 70.0);
        assert!(region().ensure_room(&mut cursor, 16.8));
        assert_eq!(cursor, Cursor::new(2, 782.0));
    }

    #[test]
    fn cursor_already_below_bottom_breaks_with_zero_extent() {
        let mut cursor = Cursor::new(0, 59.0);
        assert!(region().ensure_room(&mut cursor, 0.0));
        assert_eq!(cursor.page, 1);
    }

    #[test]
    fn unbounded_region_never_breaks() {
        let r = Region::unbounded();
        let mut cursor = r.start();
        cursor.y = -1.0e9;
        assert!(!r.ensure_room(&mut cursor, 1.0e9));
        assert_eq!(cursor.page, 0);
    }

    #[test]
    fn at_top_detection() {
        let r = region();
        assert!(r.at_top(&r.start()));
        assert!(!r.at_top(&Cursor::new(0, 700.0)));
    }

    #[test]
    fn fit_breaks_mid_page_then_clamps() {
        let r = region();
        let mut cursor = Cursor::new(0, 300.0);
        let room = r.fit(&mut cursor, 1000.0);
        assert_eq!(cursor, Cursor::new(1, 782.0));
        assert_eq!(room, 722.0);
    }

    #[test]
    fn fit_at_page_top_never_breaks() {
        let r = region();
        let mut cursor = r.start();
        assert_eq!(r.fit(&mut cursor, 1000.0), 722.0);
        assert_eq!(cursor, r.start());
        assert_eq!(r.fit(&mut cursor, 16.8), 16.8);
    }
}
