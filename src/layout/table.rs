//! # Table Layout
//!
//! Every row is laid out in two passes.
//!
//! 1. **Measure.** Each cell's paragraphs are laid out in a disposable,
//!    bottomless frame starting at y = 0 on page 0. The distance the cursor
//!    travelled is the cell's content height. Nothing from this pass
//!    survives except that number.
//! 2. **Place.** The row is as tall as its tallest cell plus padding. If it
//!    doesn't fit below the real cursor, the row moves to the next page.
//!    Then each cell gets its border rectangle and its paragraphs are laid
//!    out again, this time at real coordinates inside the cell's frame.
//!
//! Both passes call the same paragraph layout with the same frame width, so
//! the placement pass is an exact vertical translation of the measurement.
//!
//! Columns are uniform: the content width divided by the widest row's cell
//! count. Column and row spans are not applied.

use crate::error::Result;
use crate::model::{Table, TableCell, TableRow};
use crate::text::TextMeasurer;

use super::{emit, BlockLayout, Cursor, Frame, LayoutEngine, PositionedItem, Region, RectItem};

impl<M: TextMeasurer> LayoutEngine<M> {
    /// Lay out a top-level table starting at `start`.
    pub fn layout_table(&self, table: &Table, start: Cursor) -> Result<BlockLayout> {
        self.layout_table_in(table, self.page_frame(), self.page_region(), start)
    }

    pub(crate) fn layout_table_in(
        &self,
        table: &Table,
        frame: Frame,
        region: Region,
        start: Cursor,
    ) -> Result<BlockLayout> {
        let column_width = frame.width / table.column_count() as f64;
        let border_color = self.config().table.border_color();

        let mut items = Vec::new();
        let mut cursor = start;

        for row in &table.rows {
            let row_height = self.measure_row_height(row, column_width)?;

            let visible_height = region.fit(&mut cursor, row_height);
            let row_top = cursor.y;
            if visible_height < row_height {
                log::warn!(
                    "table row of {:.1}pt exceeds the {:.1}pt available on page {}; clipping",
                    row_height,
                    visible_height,
                    cursor.page
                );
            }
            let row_bottom = row_top - visible_height;

            for (index, cell) in row.cells.iter().enumerate() {
                let cell_x = frame.x + index as f64 * column_width;

                emit(
                    &mut items,
                    PositionedItem::Rect(RectItem {
                        page: cursor.page,
                        x: cell_x,
                        y: row_bottom,
                        width: column_width,
                        height: visible_height,
                        border_color,
                    }),
                )?;

                let content_top = row_top - self.config().table.cell_padding;
                let pinned = Region {
                    top: content_top,
                    bottom: f64::NEG_INFINITY,
                };
                let placed = self.layout_cell(
                    cell,
                    self.cell_frame(cell_x, column_width),
                    pinned,
                    Cursor::new(0, content_top),
                )?;

                for mut item in placed.items {
                    if item.y() < region.bottom {
                        continue;
                    }
                    item.set_page(cursor.page);
                    items.push(item);
                }
            }

            cursor.y = row_bottom;
        }

        Ok(BlockLayout { items, end: cursor })
    }

    /// Row height: the tallest cell's content plus padding above and below,
    /// never less than the configured minimum.
    pub fn measure_row_height(&self, row: &TableRow, column_width: f64) -> Result<f64> {
        let padding = self.config().table.cell_padding;
        let mut height: f64 = 0.0;
        for cell in &row.cells {
            height = height.max(self.measure_cell(cell, column_width)? + 2.0 * padding);
        }
        Ok(height.max(self.config().table.min_row_height))
    }

    /// Content height of one cell, measured in a throwaway frame.
    pub fn measure_cell(&self, cell: &TableCell, column_width: f64) -> Result<f64> {
        let scratch = Region::unbounded();
        let layout = self.layout_cell(
            cell,
            self.cell_frame(0.0, column_width),
            scratch,
            scratch.start(),
        )?;
        Ok(scratch.top - layout.end.y)
    }

    fn layout_cell(
        &self,
        cell: &TableCell,
        frame: Frame,
        region: Region,
        start: Cursor,
    ) -> Result<BlockLayout> {
        let mut items = Vec::new();
        let mut cursor = start;
        for paragraph in &cell.paragraphs {
            let placed = self.layout_paragraph_in(paragraph, frame, region, cursor)?;
            items.extend(placed.items);
            cursor = placed.end;
        }
        Ok(BlockLayout { items, end: cursor })
    }

    /// The text frame inside a cell whose left border is at `cell_x`.
    fn cell_frame(&self, cell_x: f64, column_width: f64) -> Frame {
        let padding = self.config().table.cell_padding;
        Frame {
            x: cell_x + padding,
            width: (column_width - 2.0 * padding).max(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::model::{ImageRun, Paragraph, ParagraphStyle, Run};

    fn engine() -> LayoutEngine {
        LayoutEngine::default()
    }

    fn top() -> Cursor {
        Cursor::new(0, 782.0)
    }

    fn cell(text: &str) -> TableCell {
        TableCell::new(vec![Paragraph::text(text)])
    }

    fn grid(rows: usize, cols: usize, text: &str) -> Table {
        Table {
            rows: (0..rows)
                .map(|_| TableRow {
                    cells: (0..cols).map(|_| cell(text)).collect(),
                })
                .collect(),
        }
    }

    fn rects(layout: &BlockLayout) -> Vec<&RectItem> {
        layout
            .items
            .iter()
            .filter_map(|i| match i {
                PositionedItem::Rect(r) => Some(r),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn two_by_two_table_on_one_page() {
        let out = engine().layout_table(&grid(2, 2, "ok"), top()).unwrap();
        let rects = rects(&out);
        assert_eq!(rects.len(), 4);
        for r in &rects {
            assert_eq!(r.width, 475.0 / 2.0);
            assert_eq!(r.page, 0);
        }
        assert_eq!(rects[1].x, 60.0 + 237.5);
        let texts: Vec<_> = out.items.iter().filter_map(PositionedItem::as_text).collect();
        assert_eq!(texts.len(), 4);
        assert!(texts.iter().all(|t| t.page == 0));
    }

    #[test]
    fn short_rows_use_minimum_height() {
        // One 12pt line: 16.8 + 8 = 24.8 > 20
        let row = TableRow {
            cells: vec![cell("x")],
        };
        let h = engine().measure_row_height(&row, 100.0).unwrap();
        assert!((h - 24.8).abs() < 1e-9);

        // An empty cell only has padding, floored to 20
        let empty = TableRow {
            cells: vec![TableCell::default()],
        };
        assert_eq!(engine().measure_row_height(&empty, 100.0).unwrap(), 20.0);
    }

    #[test]
    fn row_height_covers_every_cell() {
        let mut heading = Paragraph::text("Heading in a cell");
        heading.style = ParagraphStyle::Heading1;
        let row = TableRow {
            cells: vec![
                cell("short"),
                TableCell::new(vec![heading, Paragraph::text("and body text that wraps a few times")]),
                TableCell::new(vec![Paragraph {
                    runs: vec![Run::Image(ImageRun {
                        reference: "rId1".into(),
                        width: 40.0,
                        height: 60.0,
                    })],
                    ..Default::default()
                }]),
                TableCell::default(),
            ],
        };
        let e = engine();
        let width = 475.0 / 4.0;
        let h = e.measure_row_height(&row, width).unwrap();
        assert!(h >= 20.0);
        for c in &row.cells {
            assert!(h >= e.measure_cell(c, width).unwrap() + 8.0);
        }
    }

    #[test]
    fn cell_text_wraps_to_column_width() {
        // Each column is 475/3 wide, minus 8 padding: 150.33 => 25 chars at 12pt
        let text = "aaaa bbbb cccc dddd eeee ffff gggg hhhh";
        let table = Table {
            rows: vec![TableRow {
                cells: vec![cell(text), cell("b"), cell("c")],
            }],
        };
        let out = engine().layout_table(&table, top()).unwrap();
        let first_cell_lines: Vec<_> = out
            .items
            .iter()
            .filter_map(PositionedItem::as_text)
            .filter(|t| t.x < 60.0 + 475.0 / 3.0)
            .collect();
        assert_eq!(first_cell_lines.len(), 2);
        assert_eq!(first_cell_lines[0].x, 64.0);

        let rect = rects(&out)[0].clone();
        assert!((rect.height - (2.0 * 16.8 + 8.0)).abs() < 1e-9);
        for line in first_cell_lines {
            assert!(line.y > rect.y && line.y < rect.y + rect.height);
        }
    }

    #[test]
    fn row_that_does_not_fit_moves_to_next_page() {
        let out = engine()
            .layout_table(&grid(1, 2, "x"), Cursor::new(0, 70.0))
            .unwrap();
        assert!(out.items.iter().all(|i| i.page() == 1));
        let rect = rects(&out)[0];
        assert!((rect.y + rect.height - 782.0).abs() < 1e-9);
        assert!((out.end.y - (782.0 - 24.8)).abs() < 1e-9);
        assert_eq!(out.end.page, 1);
    }

    #[test]
    fn measurement_does_not_move_real_cursor() {
        // A cell taller than the disposable frame would ever break on
        let tall = TableCell::new((0..10).map(|i| Paragraph::text(&format!("line {i}"))).collect());
        let e = engine();
        let measured = e.measure_cell(&tall, 200.0).unwrap();
        assert!((measured - 10.0 * 16.8).abs() < 1e-9);

        let table = Table {
            rows: vec![TableRow { cells: vec![tall] }],
        };
        let out = e.layout_table(&table, top()).unwrap();
        assert_eq!(out.end.page, 0);
        assert!((out.end.y - (782.0 - 10.0 * 16.8 - 8.0)).abs() < 1e-9);
    }

    #[test]
    fn zero_cell_rows_do_not_divide_by_zero() {
        let table = Table {
            rows: vec![TableRow { cells: vec![] }],
        };
        let out = engine().layout_table(&table, top()).unwrap();
        assert!(out.items.is_empty());
        assert_eq!(out.end.y, 782.0 - 20.0);

        let out = engine().layout_table(&Table::default(), top()).unwrap();
        assert!(out.items.is_empty());
        assert_eq!(out.end, top());
    }

    #[test]
    fn ragged_rows_share_uniform_columns() {
        let table = Table {
            rows: vec![
                TableRow {
                    cells: vec![cell("a")],
                },
                TableRow {
                    cells: vec![cell("a"), cell("b"), cell("c")],
                },
            ],
        };
        let out = engine().layout_table(&table, top()).unwrap();
        let rects = rects(&out);
        assert_eq!(rects.len(), 4);
        assert!(rects.iter().all(|r| (r.width - 475.0 / 3.0).abs() < 1e-9));
    }

    #[test]
    fn oversized_row_is_clipped_to_the_page() {
        let mut config = LayoutConfig::default();
        config.page.size = crate::config::PageSize::Custom {
            width: 300.0,
            height: 200.0,
        };
        let e = LayoutEngine::new(config).unwrap();
        // 80pt of content height; twelve lines need far more
        let tall = TableCell::new((0..12).map(|i| Paragraph::text(&format!("row {i}"))).collect());
        let table = Table {
            rows: vec![TableRow { cells: vec![tall] }],
        };
        let out = e.layout_table(&table, Cursor::new(0, 140.0)).unwrap();
        let rect = rects(&out)[0];
        assert_eq!(rect.y, 60.0);
        assert!((rect.height - 80.0).abs() < 1e-9);
        for item in &out.items {
            assert_eq!(item.page(), 0);
            assert!(item.y() >= 60.0);
        }
        assert_eq!(out.end.y, 60.0);
    }

    #[test]
    fn following_row_stacks_under_previous() {
        let out = engine().layout_table(&grid(3, 1, "r"), top()).unwrap();
        let rects = rects(&out);
        for pair in rects.windows(2) {
            assert!((pair[0].y - (pair[1].y + pair[1].height)).abs() < 1e-9);
        }
    }
}
