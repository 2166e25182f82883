//! # PDF Serializer
//!
//! Takes a [`LayoutResult`] and writes a PDF 1.7 file. Layout coordinates
//! are already PDF-native (bottom-left origin, points), so each item maps to
//! a handful of content-stream operators.
//!
//! ## PDF Structure (simplified)
//!
//! ```text
//! %PDF-1.7            <- header
//! 1 0 obj ... endobj  <- objects (fonts, images, pages, content streams)
//! 2 0 obj ... endobj
//! ...
//! xref                <- cross-reference table (byte offsets of each object)
//! trailer             <- points to the root object
//! %%EOF
//! ```

use std::collections::{BTreeSet, HashMap};
use std::fmt::Write as FmtWrite;
use std::io::Write as IoWrite;

use miniz_oxide::deflate::compress_to_vec_zlib;

use crate::config::LayoutConfig;
use crate::font::{encode_win_ansi, StandardFont};
use crate::image_loader::{load_image, ImagePixelData, LoadedImage};
use crate::layout::{ImageItem, LayoutResult, PositionedItem, RectItem, TextItem};
use crate::model::{Document, Metadata};
use crate::style::Color;
use crate::text::{ApproxMeasurer, TextMeasurer};

/// Underline offset below the baseline, as a fraction of the font size.
const UNDERLINE_OFFSET: f64 = 0.12;
/// Underline stroke width, as a fraction of the font size.
const UNDERLINE_THICKNESS: f64 = 0.05;

pub struct PdfWriter<M: TextMeasurer = ApproxMeasurer> {
    measurer: M,
}

/// Tracks allocated PDF objects during writing.
struct PdfBuilder {
    objects: Vec<PdfObject>,
    /// Fonts in resource order: /F0, /F1, ...
    font_objects: Vec<(StandardFont, usize)>,
    /// Image reference -> (resource index for /ImN, XObject id).
    /// References that failed to load are absent.
    image_objects: HashMap<String, (usize, usize)>,
}

struct PdfObject {
    data: Vec<u8>,
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfWriter {
    pub fn new() -> Self {
        Self {
            measurer: ApproxMeasurer::new(),
        }
    }
}

impl<M: TextMeasurer> PdfWriter<M> {
    /// Use the same measurer as layout so underlines match line widths.
    pub fn with_measurer(measurer: M) -> Self {
        Self { measurer }
    }

    /// Write a finished layout to a PDF byte vector.
    ///
    /// Images are resolved through `document.images`; any that are missing
    /// or undecodable are drawn as grey placeholders. Items whose page index
    /// is out of range land on the last page.
    pub fn write(&self, layout: &LayoutResult, document: &Document, config: &LayoutConfig) -> Vec<u8> {
        let mut builder = PdfBuilder {
            objects: Vec::new(),
            font_objects: Vec::new(),
            image_objects: HashMap::new(),
        };

        // 0 = placeholder (PDF objects are 1-indexed), 1 = Catalog, 2 = Pages
        for _ in 0..3 {
            builder.objects.push(PdfObject { data: vec![] });
        }

        self.register_fonts(&mut builder, layout);
        self.register_images(&mut builder, layout, &document.images);

        let pages = self.bucket_by_page(layout);
        let (page_w, page_h) = config.page.size.dimensions();
        let font_resources = Self::build_font_resource_dict(&builder.font_objects);
        let mut page_obj_ids: Vec<usize> = Vec::new();

        for page_items in &pages {
            let content = self.build_content_stream(page_items, &builder, config);
            let compressed = compress_to_vec_zlib(content.as_bytes(), 6);

            let content_obj_id = builder.objects.len();
            let mut content_data: Vec<u8> = Vec::new();
            let _ = write!(
                content_data,
                "<< /Length {} /Filter /FlateDecode >>\nstream\n",
                compressed.len()
            );
            content_data.extend_from_slice(&compressed);
            content_data.extend_from_slice(b"\nendstream");
            builder.objects.push(PdfObject { data: content_data });

            let xobjects = Self::build_xobject_resource_dict(page_items, &builder);
            let resources = if xobjects.is_empty() {
                format!("/Font << {} >>", font_resources)
            } else {
                format!("/Font << {} >> /XObject << {} >>", font_resources, xobjects)
            };

            let page_obj_id = builder.objects.len();
            let page_dict = format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                 /Contents {} 0 R /Resources << {} >> >>",
                page_w, page_h, content_obj_id, resources
            );
            builder.objects.push(PdfObject {
                data: page_dict.into_bytes(),
            });
            page_obj_ids.push(page_obj_id);
        }

        builder.objects[1].data = b"<< /Type /Catalog /Pages 2 0 R >>".to_vec();

        let kids: String = page_obj_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ");
        builder.objects[2].data = format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids,
            page_obj_ids.len()
        )
        .into_bytes();

        let info_obj_id = Self::write_info(&mut builder, &document.metadata);

        Self::serialize(&builder, info_obj_id)
    }

    /// Group items by page, clamping out-of-range indices to the last page.
    fn bucket_by_page<'a>(&self, layout: &'a LayoutResult) -> Vec<Vec<&'a PositionedItem>> {
        let page_count = layout.page_count.max(1);
        let mut pages: Vec<Vec<&PositionedItem>> = vec![Vec::new(); page_count];
        for item in &layout.items {
            let page = item.page();
            if page >= page_count {
                log::warn!(
                    "item on page {} but document has {} page(s); drawing on the last page",
                    page,
                    page_count
                );
            }
            pages[page.min(page_count - 1)].push(item);
        }
        pages
    }

    fn build_content_stream(
        &self,
        items: &[&PositionedItem],
        builder: &PdfBuilder,
        config: &LayoutConfig,
    ) -> String {
        let mut stream = String::new();
        for item in items {
            match item {
                PositionedItem::Text(text) => self.write_text(&mut stream, text, builder),
                PositionedItem::Rect(rect) => {
                    Self::write_rect(&mut stream, rect, config.table.border_width)
                }
                PositionedItem::Image(image) => Self::write_image(&mut stream, image, builder),
            }
        }
        stream
    }

    fn write_text(&self, stream: &mut String, item: &TextItem, builder: &PdfBuilder) {
        let font = StandardFont::for_style(item.bold, item.italic);
        let font_idx = Self::font_index(font, &builder.font_objects);
        let Color { r, g, b } = item.color;

        let _ = write!(
            stream,
            "BT\n{:.3} {:.3} {:.3} rg\n/F{} {:.1} Tf\n{:.2} {:.2} Td\n({}) Tj\nET\n",
            r,
            g,
            b,
            font_idx,
            item.font_size,
            item.x,
            item.y,
            encode_win_ansi(&item.text)
        );

        if item.underline {
            let width = self.measurer.estimate_width(&item.text, item.font_size);
            let y = item.y - item.font_size * UNDERLINE_OFFSET;
            let _ = write!(
                stream,
                "q\n{:.3} {:.3} {:.3} RG\n{:.2} w\n{:.2} {:.2} m\n{:.2} {:.2} l\nS\nQ\n",
                r,
                g,
                b,
                item.font_size * UNDERLINE_THICKNESS,
                item.x,
                y,
                item.x + width,
                y
            );
        }
    }

    fn write_rect(stream: &mut String, rect: &RectItem, border_width: f64) {
        let Color { r, g, b } = rect.border_color;
        let _ = write!(
            stream,
            "q\n{:.3} {:.3} {:.3} RG\n{:.2} w\n{:.2} {:.2} {:.2} {:.2} re\nS\nQ\n",
            r, g, b, border_width, rect.x, rect.y, rect.width, rect.height
        );
    }

    fn write_image(stream: &mut String, image: &ImageItem, builder: &PdfBuilder) {
        match builder.image_objects.get(&image.reference) {
            Some((idx, _)) => {
                let _ = write!(
                    stream,
                    "q\n{:.4} 0 0 {:.4} {:.2} {:.2} cm\n/Im{} Do\nQ\n",
                    image.width, image.height, image.x, image.y, idx
                );
            }
            None => {
                let Color { r, g, b } = Color::PLACEHOLDER_GREY;
                let _ = write!(
                    stream,
                    "q\n{:.1} {:.1} {:.1} rg\n{:.2} {:.2} {:.2} {:.2} re\nf\nQ\n",
                    r, g, b, image.x, image.y, image.width, image.height
                );
            }
        }
    }

    /// Each face actually used gets its own font object. Helvetica is always
    /// present so empty documents still have a valid resource dictionary.
    fn register_fonts(&self, builder: &mut PdfBuilder, layout: &LayoutResult) {
        let mut used: BTreeSet<StandardFont> = layout
            .text_items()
            .map(|t| StandardFont::for_style(t.bold, t.italic))
            .collect();
        used.insert(StandardFont::Helvetica);

        for font in used {
            let obj_id = builder.objects.len();
            let font_dict = format!(
                "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                font.pdf_name()
            );
            builder.objects.push(PdfObject {
                data: font_dict.into_bytes(),
            });
            builder.font_objects.push((font, obj_id));
        }
    }

    /// Load every distinct image reference once, in order of first use.
    fn register_images(
        &self,
        builder: &mut PdfBuilder,
        layout: &LayoutResult,
        sources: &HashMap<String, String>,
    ) {
        for item in &layout.items {
            let PositionedItem::Image(image) = item else {
                continue;
            };
            if builder.image_objects.contains_key(&image.reference) {
                continue;
            }
            let Some(src) = sources.get(&image.reference) else {
                log::warn!("no image source for reference '{}'; drawing placeholder", image.reference);
                continue;
            };
            match load_image(src) {
                Ok(loaded) => {
                    let idx = builder.image_objects.len();
                    let xobj_id = Self::write_image_xobject(builder, &loaded);
                    builder
                        .image_objects
                        .insert(image.reference.clone(), (idx, xobj_id));
                }
                Err(e) => {
                    log::warn!("image '{}' could not be loaded: {}", image.reference, e);
                }
            }
        }
    }

    /// Write a single image as one or two XObject PDF objects.
    /// Returns the main XObject ID.
    fn write_image_xobject(builder: &mut PdfBuilder, image: &LoadedImage) -> usize {
        match &image.pixel_data {
            ImagePixelData::Jpeg { data, color_space } => {
                let mut obj_data: Vec<u8> = Vec::new();
                let _ = write!(
                    obj_data,
                    "<< /Type /XObject /Subtype /Image /Width {} /Height {} \
                     /ColorSpace /{} /BitsPerComponent 8 /Filter /DCTDecode \
                     /Length {} >>\nstream\n",
                    image.width_px,
                    image.height_px,
                    color_space.pdf_name(),
                    data.len()
                );
                obj_data.extend_from_slice(data);
                obj_data.extend_from_slice(b"\nendstream");
                let obj_id = builder.objects.len();
                builder.objects.push(PdfObject { data: obj_data });
                obj_id
            }

            ImagePixelData::Decoded { rgb, alpha } => {
                let smask_id = alpha.as_ref().map(|alpha_data| {
                    let compressed_alpha = compress_to_vec_zlib(alpha_data, 6);
                    let mut smask_data: Vec<u8> = Vec::new();
                    let _ = write!(
                        smask_data,
                        "<< /Type /XObject /Subtype /Image /Width {} /Height {} \
                         /ColorSpace /DeviceGray /BitsPerComponent 8 \
                         /Filter /FlateDecode /Length {} >>\nstream\n",
                        image.width_px,
                        image.height_px,
                        compressed_alpha.len()
                    );
                    smask_data.extend_from_slice(&compressed_alpha);
                    smask_data.extend_from_slice(b"\nendstream");
                    let smask_obj_id = builder.objects.len();
                    builder.objects.push(PdfObject { data: smask_data });
                    smask_obj_id
                });

                let compressed_rgb = compress_to_vec_zlib(rgb, 6);
                let smask_ref = smask_id
                    .map(|id| format!(" /SMask {} 0 R", id))
                    .unwrap_or_default();

                let mut obj_data: Vec<u8> = Vec::new();
                let _ = write!(
                    obj_data,
                    "<< /Type /XObject /Subtype /Image /Width {} /Height {} \
                     /ColorSpace /DeviceRGB /BitsPerComponent 8 \
                     /Filter /FlateDecode /Length {}{} >>\nstream\n",
                    image.width_px,
                    image.height_px,
                    compressed_rgb.len(),
                    smask_ref
                );
                obj_data.extend_from_slice(&compressed_rgb);
                obj_data.extend_from_slice(b"\nendstream");
                let obj_id = builder.objects.len();
                builder.objects.push(PdfObject { data: obj_data });
                obj_id
            }
        }
    }

    fn build_font_resource_dict(font_objects: &[(StandardFont, usize)]) -> String {
        font_objects
            .iter()
            .enumerate()
            .map(|(i, (_, obj_id))| format!("/F{} {} 0 R", i, obj_id))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// /ImN entries for the images drawn on one page.
    fn build_xobject_resource_dict(items: &[&PositionedItem], builder: &PdfBuilder) -> String {
        let mut entries: Vec<(usize, usize)> = items
            .iter()
            .filter_map(|item| match item {
                PositionedItem::Image(image) => builder.image_objects.get(&image.reference).copied(),
                _ => None,
            })
            .collect();
        entries.sort_unstable();
        entries.dedup();
        entries
            .iter()
            .map(|(idx, obj_id)| format!("/Im{} {} 0 R", idx, obj_id))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn font_index(font: StandardFont, font_objects: &[(StandardFont, usize)]) -> usize {
        font_objects
            .iter()
            .position(|(f, _)| *f == font)
            .unwrap_or(0)
    }

    fn write_info(builder: &mut PdfBuilder, metadata: &Metadata) -> Option<usize> {
        if metadata.title.is_none() && metadata.author.is_none() && metadata.subject.is_none() {
            return None;
        }
        let mut info = String::from("<< ");
        for (key, value) in [
            ("Title", &metadata.title),
            ("Author", &metadata.author),
            ("Subject", &metadata.subject),
        ] {
            if let Some(value) = value {
                let _ = write!(info, "/{} ({}) ", key, encode_win_ansi(value));
            }
        }
        info.push_str("/Producer (pagewright) >>");
        let id = builder.objects.len();
        builder.objects.push(PdfObject {
            data: info.into_bytes(),
        });
        Some(id)
    }

    /// Serialize all objects into the final PDF byte stream.
    fn serialize(builder: &PdfBuilder, info_obj_id: Option<usize>) -> Vec<u8> {
        let mut output: Vec<u8> = Vec::new();
        let mut offsets: Vec<usize> = vec![0; builder.objects.len()];

        output.extend_from_slice(b"%PDF-1.7\n");
        output.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");

        for (i, obj) in builder.objects.iter().enumerate().skip(1) {
            offsets[i] = output.len();
            let _ = write!(output, "{} 0 obj\n", i);
            output.extend_from_slice(&obj.data);
            output.extend_from_slice(b"\nendobj\n\n");
        }

        let xref_offset = output.len();
        let _ = write!(output, "xref\n0 {}\n", builder.objects.len());
        let _ = write!(output, "0000000000 65535 f \n");
        for offset in offsets.iter().skip(1) {
            let _ = write!(output, "{:010} 00000 n \n", offset);
        }

        let _ = write!(output, "trailer\n<< /Size {} /Root 1 0 R", builder.objects.len());
        if let Some(info_id) = info_obj_id {
            let _ = write!(output, " /Info {} 0 R", info_id);
        }
        let _ = write!(output, " >>\nstartxref\n{}\n%%EOF\n", xref_offset);

        output
    }
}
