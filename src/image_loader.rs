//! # Image Loading and Decoding
//!
//! Resolves an image source from the document's image table and prepares it
//! for PDF embedding. JPEG images pass through without re-encoding (the PDF
//! format supports DCTDecode natively). PNG images are decoded to RGB
//! pixels with a separate alpha channel for SMask transparency.

use std::io::Cursor;

use image::codecs::jpeg::JpegDecoder;
use image::{ColorType, ImageDecoder, ImageFormat};

use crate::error::{PagewrightError, Result};

/// A fully decoded/loaded image ready for PDF embedding.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub pixel_data: ImagePixelData,
    pub width_px: u32,
    pub height_px: u32,
}

/// The pixel data in a format the PDF serializer can consume directly.
#[derive(Debug, Clone)]
pub enum ImagePixelData {
    /// Raw JPEG bytes, embedded with DCTDecode.
    Jpeg {
        data: Vec<u8>,
        color_space: JpegColorSpace,
    },
    /// Decoded RGB pixels + optional alpha channel.
    Decoded {
        /// width * height * 3 bytes (RGB)
        rgb: Vec<u8>,
        /// width * height bytes (grayscale alpha). None if fully opaque.
        alpha: Option<Vec<u8>>,
    },
}

/// JPEG color space for the PDF /ColorSpace entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JpegColorSpace {
    DeviceRGB,
    DeviceGray,
}

impl JpegColorSpace {
    pub fn pdf_name(self) -> &'static str {
        match self {
            JpegColorSpace::DeviceRGB => "DeviceRGB",
            JpegColorSpace::DeviceGray => "DeviceGray",
        }
    }
}

/// Load an image from a source string.
///
/// Supported `src` formats:
/// - `data:image/...;base64,...` data URI
/// - File path starting with `/`, `./` or `../`
/// - Raw base64-encoded image data
pub fn load_image(src: &str) -> Result<LoadedImage> {
    let raw_bytes = read_source_bytes(src)?;
    decode_image_bytes(&raw_bytes)
}

fn read_source_bytes(src: &str) -> Result<Vec<u8>> {
    if let Some(uri) = src.strip_prefix("data:image/") {
        let (_, payload) = uri
            .split_once(',')
            .ok_or_else(|| PagewrightError::Image("invalid data URI: missing comma".into()))?;
        return base64_decode(payload);
    }

    // Base64 text can contain '/', so only explicit path prefixes count.
    let is_path = ["/", "./", "../"].iter().any(|prefix| src.starts_with(prefix));
    if is_path {
        Ok(std::fs::read(src)?)
    } else {
        base64_decode(src)
    }
}

fn base64_decode(input: &str) -> Result<Vec<u8>> {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD
        .decode(input.trim())
        .map_err(|e| PagewrightError::Image(format!("base64 decode error: {}", e)))
}

/// Detect image format from magic bytes and decode accordingly.
pub fn decode_image_bytes(data: &[u8]) -> Result<LoadedImage> {
    if is_jpeg(data) {
        decode_jpeg(data)
    } else if is_png(data) {
        decode_png(data)
    } else {
        Err(PagewrightError::Image(format!(
            "unsupported image data ({} bytes); expected JPEG or PNG",
            data.len()
        )))
    }
}

fn is_jpeg(data: &[u8]) -> bool {
    data.starts_with(&[0xFF, 0xD8])
}

fn is_png(data: &[u8]) -> bool {
    data.starts_with(b"\x89PNG")
}

/// JPEG bytes are embedded untouched; only the header is read for the
/// dimensions and component count.
fn decode_jpeg(data: &[u8]) -> Result<LoadedImage> {
    let decoder = JpegDecoder::new(Cursor::new(data))
        .map_err(|e| PagewrightError::Image(format!("failed to read JPEG header: {}", e)))?;
    let (width_px, height_px) = decoder.dimensions();
    let color_space = match decoder.color_type() {
        ColorType::L8 | ColorType::L16 => JpegColorSpace::DeviceGray,
        _ => JpegColorSpace::DeviceRGB,
    };

    Ok(LoadedImage {
        pixel_data: ImagePixelData::Jpeg {
            data: data.to_vec(),
            color_space,
        },
        width_px,
        height_px,
    })
}

/// PNG: decode to RGBA, then split into an RGB plane and an alpha plane.
/// The alpha plane is dropped when every pixel is opaque.
fn decode_png(data: &[u8]) -> Result<LoadedImage> {
    let rgba = image::load_from_memory_with_format(data, ImageFormat::Png)
        .map_err(|e| PagewrightError::Image(format!("failed to decode PNG: {}", e)))?
        .into_rgba8();
    let (width_px, height_px) = rgba.dimensions();

    let rgb: Vec<u8> = rgba.pixels().flat_map(|p| [p[0], p[1], p[2]]).collect();
    let alpha = rgba
        .pixels()
        .any(|p| p[3] < u8::MAX)
        .then(|| rgba.pixels().map(|p| p[3]).collect());

    Ok(LoadedImage {
        pixel_data: ImagePixelData::Decoded { rgb, alpha },
        width_px,
        height_px,
    })
}
