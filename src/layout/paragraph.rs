//! # Paragraph Layout
//!
//! Lays out one paragraph's runs top to bottom: wraps text runs into lines,
//! places inline images on their own line, draws a list marker in front of
//! the first line of list items, and applies heading styling.
//!
//! Runs are wrapped independently; text never reflows across run
//! boundaries.

use crate::error::{PagewrightError, Result};
use crate::model::{ListInfo, ListKind, Paragraph, ParagraphStyle, Run, TextRun};
use crate::style::{Alignment, Color};
use crate::text::TextMeasurer;

use super::{emit, BlockLayout, Cursor, Frame, ImageItem, LayoutEngine, PositionedItem, Region, TextItem};

/// Body text size when a run doesn't specify one.
pub const DEFAULT_FONT_SIZE: f64 = 12.0;
/// Height an empty paragraph occupies.
pub const EMPTY_PARAGRAPH_HEIGHT: f64 = 14.0;
/// Vertical gap after an inline image.
pub const IMAGE_GAP: f64 = 4.0;
/// How far left of the text the list marker sits.
pub const LIST_MARKER_OFFSET: f64 = 15.0;

const LIST_INDENT_BASE: f64 = 20.0;
const LIST_INDENT_STEP: f64 = 15.0;

/// Left indentation of a paragraph's text.
pub fn list_indent(list: Option<&ListInfo>) -> f64 {
    match list {
        Some(info) => LIST_INDENT_BASE + info.level as f64 * LIST_INDENT_STEP,
        None => 0.0,
    }
}

/// Marker drawn before the first line of a list item.
///
/// Numbered items always read "1.": there is no per-list counter.
pub fn list_marker(kind: ListKind) -> &'static str {
    match kind {
        ListKind::Bullet => "\u{2022}",
        ListKind::Number => "1.",
    }
}

/// Font size and weight a run is drawn with, after heading overrides.
pub fn effective_font(style: ParagraphStyle, run: &TextRun) -> (f64, bool) {
    let size = style.heading_size().unwrap_or_else(|| {
        run.font_size
            .filter(|s| s.is_finite() && *s > 0.0)
            .unwrap_or(DEFAULT_FONT_SIZE)
    });
    (size, style.is_heading() || run.bold)
}

impl<M: TextMeasurer> LayoutEngine<M> {
    /// Lay out a top-level paragraph starting at `start`.
    pub fn layout_paragraph(&self, paragraph: &Paragraph, start: Cursor) -> Result<BlockLayout> {
        self.layout_paragraph_in(paragraph, self.page_frame(), self.page_region(), start)
    }

    /// Lay out a paragraph inside an arbitrary frame and region.
    pub(crate) fn layout_paragraph_in(
        &self,
        paragraph: &Paragraph,
        frame: Frame,
        region: Region,
        start: Cursor,
    ) -> Result<BlockLayout> {
        let mut items = Vec::new();
        let mut cursor = start;

        let indent = list_indent(paragraph.list.as_ref());
        let available_width = (frame.width - indent).max(0.0);

        cursor.y -= paragraph.spacing.before_pt();
        region.ensure_room(&mut cursor, 0.0);

        if paragraph.runs.is_empty() {
            cursor.y -= EMPTY_PARAGRAPH_HEIGHT;
            region.ensure_room(&mut cursor, 0.0);
            cursor.y -= paragraph.spacing.after_pt();
            region.ensure_room(&mut cursor, 0.0);
            return Ok(BlockLayout { items, end: cursor });
        }

        let mut marker_drawn = false;

        for run in &paragraph.runs {
            match run {
                Run::Image(image) => {
                    if !(image.height.is_finite() && image.height >= 0.0) {
                        return Err(PagewrightError::Geometry(format!(
                            "image '{}' has invalid height {}",
                            image.reference, image.height
                        )));
                    }
                    let height = region.fit(&mut cursor, image.height);
                    if height < image.height {
                        log::warn!(
                            "image '{}' of {:.1}pt exceeds the {:.1}pt available on page {}; clipping",
                            image.reference,
                            image.height,
                            height,
                            cursor.page
                        );
                    }
                    emit(
                        &mut items,
                        PositionedItem::Image(ImageItem {
                            page: cursor.page,
                            x: frame.x + indent,
                            y: cursor.y - height,
                            reference: image.reference.clone(),
                            width: image.width.min(available_width),
                            height,
                        }),
                    )?;
                    if height < image.height {
                        cursor.y = region.bottom;
                    } else {
                        cursor.y -= height + IMAGE_GAP;
                    }
                }
                Run::Text(text_run) => {
                    if text_run.text.is_empty() {
                        continue;
                    }

                    let (font_size, bold) = effective_font(paragraph.style, text_run);
                    let line_height = self.measurer().line_height(font_size);
                    let ascent = self.measurer().ascent(font_size);
                    let color = Color::hex_or_black(text_run.color.as_deref());

                    let lines = self
                        .measurer()
                        .wrap_lines(&text_run.text, font_size, available_width);

                    for line in lines {
                        let room = region.fit(&mut cursor, line_height);
                        if room < line_height {
                            log::warn!(
                                "{:.1}pt line box exceeds the {:.1}pt available on page {}",
                                line_height,
                                room,
                                cursor.page
                            );
                        }
                        let baseline = (cursor.y - ascent).max(region.bottom);

                        if let Some(list) = paragraph.list {
                            if !marker_drawn {
                                emit(
                                    &mut items,
                                    PositionedItem::Text(TextItem {
                                        page: cursor.page,
                                        x: frame.x + indent - LIST_MARKER_OFFSET,
                                        y: baseline,
                                        text: list_marker(list.kind).to_string(),
                                        font_size,
                                        bold: false,
                                        italic: false,
                                        underline: false,
                                        color,
                                        alignment: Alignment::Left,
                                    }),
                                )?;
                                marker_drawn = true;
                            }
                        }

                        let x = self.line_x(paragraph.alignment, frame, indent, &line, font_size);
                        emit(
                            &mut items,
                            PositionedItem::Text(TextItem {
                                page: cursor.page,
                                x,
                                y: baseline,
                                text: line,
                                font_size,
                                bold,
                                italic: text_run.italic,
                                underline: text_run.underline,
                                color,
                                alignment: paragraph.alignment,
                            }),
                        )?;

                        cursor.y -= room;
                    }
                }
            }
        }

        cursor.y -= paragraph.spacing.after_pt();
        region.ensure_room(&mut cursor, 0.0);

        Ok(BlockLayout { items, end: cursor })
    }

    /// Left edge of a line. Center and right alignment are computed against
    /// the whole frame; justify lays out flush-left.
    fn line_x(&self, alignment: Alignment, frame: Frame, indent: f64, line: &str, font_size: f64) -> f64 {
        let line_width = self.measurer().estimate_width(line, font_size);
        match alignment {
            Alignment::Center => frame.x + (frame.width - line_width) / 2.0,
            Alignment::Right => frame.x + frame.width - line_width,
            Alignment::Left | Alignment::Justify => frame.x + indent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ImageRun, Spacing};

    fn engine() -> LayoutEngine {
        LayoutEngine::default()
    }

    fn top() -> Cursor {
        Cursor::new(0, 782.0)
    }

    fn texts(layout: &BlockLayout) -> Vec<&TextItem> {
        layout.items.iter().filter_map(PositionedItem::as_text).collect()
    }

    #[test]
    fn hello_world_is_one_line_on_first_page() {
        let out = engine()
            .layout_paragraph(&Paragraph::text("Hello world"), top())
            .unwrap();
        let lines = texts(&out);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "Hello world");
        assert_eq!(lines[0].page, 0);
        assert_eq!(lines[0].font_size, 12.0);
        assert_eq!(lines[0].x, 60.0);
        assert!((lines[0].y - (782.0 - 9.6)).abs() < 1e-9);
        assert!((out.end.y - (782.0 - 16.8)).abs() < 1e-9);
    }

    #[test]
    fn heading_forces_size_and_bold() {
        let mut para = Paragraph::text("Title");
        para.style = ParagraphStyle::Heading1;
        if let Run::Text(run) = &mut para.runs[0] {
            run.bold = false;
            run.font_size = Some(9.0);
        }
        let out = engine().layout_paragraph(&para, top()).unwrap();
        let lines = texts(&out);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].font_size, 24.0);
        assert!(lines[0].bold);
    }

    #[test]
    fn body_run_keeps_own_size_and_weight() {
        let run = TextRun {
            text: "x".into(),
            font_size: Some(9.0),
            ..Default::default()
        };
        assert_eq!(effective_font(ParagraphStyle::Normal, &run), (9.0, false));
        let bad = TextRun {
            text: "x".into(),
            font_size: Some(0.0),
            bold: true,
            ..Default::default()
        };
        assert_eq!(effective_font(ParagraphStyle::Normal, &bad), (12.0, true));
        assert_eq!(effective_font(ParagraphStyle::Heading3, &run), (14.0, true));
    }

    #[test]
    fn empty_paragraph_still_takes_space() {
        let out = engine()
            .layout_paragraph(&Paragraph::default(), top())
            .unwrap();
        assert!(out.items.is_empty());
        assert!(out.end.y < 782.0);
        assert_eq!(out.end.y, 782.0 - EMPTY_PARAGRAPH_HEIGHT);
    }

    #[test]
    fn empty_text_runs_are_skipped_without_advancing() {
        let para = Paragraph {
            runs: vec![Run::Text(TextRun::new(""))],
            ..Default::default()
        };
        let out = engine().layout_paragraph(&para, top()).unwrap();
        assert!(out.items.is_empty());
        assert_eq!(out.end, top());
    }

    #[test]
    fn spacing_is_converted_from_twips() {
        let mut para = Paragraph::text("Spaced");
        para.spacing = Spacing {
            before: 240.0,
            after: 120.0,
        };
        let out = engine().layout_paragraph(&para, top()).unwrap();
        let line = texts(&out)[0];
        assert!((line.y - (782.0 - 12.0 - 9.6)).abs() < 1e-9);
        assert!((out.end.y - (782.0 - 12.0 - 16.8 - 6.0)).abs() < 1e-9);
    }

    #[test]
    fn spacing_before_past_bottom_breaks_page() {
        let mut para = Paragraph::text("Late");
        para.spacing.before = 400.0; // 20pt
        let out = engine()
            .layout_paragraph(&para, Cursor::new(3, 75.0))
            .unwrap();
        let line = texts(&out)[0];
        assert_eq!(line.page, 4);
        assert!((line.y - (782.0 - 9.6)).abs() < 1e-9);
    }

    #[test]
    fn bullet_marker_precedes_first_line_only() {
        let mut para = Paragraph::text(&"word ".repeat(200));
        para.list = Some(ListInfo {
            kind: ListKind::Bullet,
            level: 1,
        });
        let out = engine().layout_paragraph(&para, top()).unwrap();
        let lines = texts(&out);
        let markers: Vec<_> = lines.iter().filter(|t| t.text == "\u{2022}").collect();
        assert_eq!(markers.len(), 1);
        // indent = 20 + 15
        assert_eq!(markers[0].x, 60.0 + 35.0 - 15.0);
        assert_eq!(lines[1].x, 95.0);
        assert_eq!(markers[0].y, lines[1].y);
        assert!(!markers[0].bold);
        // Wrapped to the indented width
        for line in &lines[1..] {
            assert!(line.text.trim_end().chars().count() as f64 * 6.0 <= 475.0 - 35.0);
        }
    }

    #[test]
    fn numbered_marker_is_literal() {
        let mut para = Paragraph::text("first");
        para.list = Some(ListInfo {
            kind: ListKind::Number,
            level: 0,
        });
        let out = engine().layout_paragraph(&para, top()).unwrap();
        assert_eq!(texts(&out)[0].text, "1.");
        assert_eq!(texts(&out)[1].text, "first");
    }

    #[test]
    fn marker_waits_for_first_text_bearing_run() {
        let para = Paragraph {
            runs: vec![
                Run::Text(TextRun::new("")),
                Run::Image(ImageRun {
                    reference: "rId1".into(),
                    width: 10.0,
                    height: 10.0,
                }),
                Run::Text(TextRun::new("after")),
            ],
            list: Some(ListInfo {
                kind: ListKind::Bullet,
                level: 0,
            }),
            ..Default::default()
        };
        let out = engine().layout_paragraph(&para, top()).unwrap();
        assert!(matches!(out.items[0], PositionedItem::Image(_)));
        assert_eq!(out.items[1].as_text().unwrap().text, "\u{2022}");
        assert_eq!(out.items[2].as_text().unwrap().text, "after");
    }

    #[test]
    fn center_and_right_alignment() {
        let mut para = Paragraph::text("abcd"); // 24pt wide
        para.alignment = Alignment::Center;
        let out = engine().layout_paragraph(&para, top()).unwrap();
        assert_eq!(texts(&out)[0].x, 60.0 + (475.0 - 24.0) / 2.0);

        para.alignment = Alignment::Right;
        let out = engine().layout_paragraph(&para, top()).unwrap();
        assert_eq!(texts(&out)[0].x, 60.0 + 475.0 - 24.0);

        para.alignment = Alignment::Justify;
        let out = engine().layout_paragraph(&para, top()).unwrap();
        assert_eq!(texts(&out)[0].x, 60.0);
    }

    #[test]
    fn image_is_capped_and_advances() {
        let para = Paragraph {
            runs: vec![Run::Image(ImageRun {
                reference: "rId9".into(),
                width: 900.0,
                height: 100.0,
            })],
            ..Default::default()
        };
        let out = engine().layout_paragraph(&para, top()).unwrap();
        match &out.items[0] {
            PositionedItem::Image(img) => {
                assert_eq!(img.width, 475.0);
                assert_eq!(img.height, 100.0);
                assert_eq!(img.y, 682.0);
                assert_eq!(img.reference, "rId9");
            }
            other => panic!("expected image, got {other:?}"),
        }
        assert_eq!(out.end.y, 782.0 - 104.0);
    }

    #[test]
    fn image_that_would_cross_bottom_moves_to_next_page() {
        let para = Paragraph {
            runs: vec![Run::Image(ImageRun {
                reference: "rId2".into(),
                width: 50.0,
                height: 50.0,
            })],
            ..Default::default()
        };
        let out = engine()
            .layout_paragraph(&para, Cursor::new(0, 100.0))
            .unwrap();
        assert_eq!(out.items[0].page(), 1);
        assert_eq!(out.items[0].y(), 732.0);
    }

    #[test]
    fn negative_image_height_fails_fast() {
        let para = Paragraph {
            runs: vec![Run::Image(ImageRun {
                reference: "rId3".into(),
                width: 10.0,
                height: -5.0,
            })],
            ..Default::default()
        };
        let err = engine().layout_paragraph(&para, top()).unwrap_err();
        assert!(matches!(err, PagewrightError::Geometry(_)));
    }

    #[test]
    fn negative_image_width_fails_fast() {
        let para = Paragraph {
            runs: vec![Run::Image(ImageRun {
                reference: "rId3".into(),
                width: -10.0,
                height: 5.0,
            })],
            ..Default::default()
        };
        assert!(engine().layout_paragraph(&para, top()).is_err());
    }

    #[test]
    fn lines_break_across_pages_mid_paragraph() {
        let para = Paragraph::text(&"lorem ipsum ".repeat(40));
        let out = engine()
            .layout_paragraph(&para, Cursor::new(0, 100.0))
            .unwrap();
        let lines = texts(&out);
        assert!(lines.len() >= 3);
        assert_eq!(lines[0].page, 0);
        assert_eq!(lines[1].page, 0);
        assert_eq!(lines[2].page, 1);
        assert!(lines.iter().all(|l| l.y >= 60.0 && l.y <= 782.0));
    }

    #[test]
    fn run_color_and_flags_carry_through() {
        let para = Paragraph {
            runs: vec![Run::Text(TextRun {
                text: "red".into(),
                italic: true,
                underline: true,
                color: Some("FF0000".into()),
                ..Default::default()
            })],
            ..Default::default()
        };
        let out = engine().layout_paragraph(&para, top()).unwrap();
        let line = texts(&out)[0];
        assert!(line.italic && line.underline && !line.bold);
        assert_eq!(line.color, Color::rgb(1.0, 0.0, 0.0));
    }

    #[test]
    fn image_taller_than_page_is_clipped_on_fresh_page() {
        let para = Paragraph {
            runs: vec![Run::Image(ImageRun {
                reference: "rId4".into(),
                width: 100.0,
                height: 750.0,
            })],
            ..Default::default()
        };
        let out = engine().layout_paragraph(&para, top()).unwrap();
        match &out.items[0] {
            PositionedItem::Image(img) => {
                assert_eq!(img.page, 0);
                assert_eq!(img.y, 60.0);
                assert_eq!(img.height, 722.0);
            }
            other => panic!("expected image, got {other:?}"),
        }
        assert_eq!(out.end, Cursor::new(0, 60.0));
    }

    #[test]
    fn image_taller_than_page_mid_page_moves_once() {
        let para = Paragraph {
            runs: vec![Run::Image(ImageRun {
                reference: "rId4".into(),
                width: 100.0,
                height: 750.0,
            })],
            ..Default::default()
        };
        let out = engine()
            .layout_paragraph(&para, Cursor::new(0, 400.0))
            .unwrap();
        assert_eq!(out.items[0].page(), 1);
        assert_eq!(out.items[0].y(), 60.0);
        assert_eq!(out.end.page, 1);
    }

    #[test]
    fn line_taller_than_page_stays_on_first_page() {
        let para = Paragraph {
            runs: vec![Run::Text(TextRun {
                font_size: Some(600.0),
                ..TextRun::new("A")
            })],
            ..Default::default()
        };
        let out = engine().layout_paragraph(&para, top()).unwrap();
        let lines = texts(&out);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].page, 0);
        assert_eq!(lines[0].y, 782.0 - 480.0);
        assert_eq!(out.end, Cursor::new(0, 60.0));
    }

    #[test]
    fn huge_line_baseline_is_kept_above_bottom() {
        let para = Paragraph {
            runs: vec![Run::Text(TextRun {
                font_size: Some(2000.0),
                ..TextRun::new("A")
            })],
            ..Default::default()
        };
        let out = engine().layout_paragraph(&para, top()).unwrap();
        let line = texts(&out)[0];
        assert_eq!(line.page, 0);
        assert_eq!(line.y, 60.0);
    }
}
