//! Structured error types for the pagewright layout engine.
//!
//! Layout itself performs no I/O, so most variants cover input parsing,
//! configuration, and geometry sanity checks. Geometry errors mean an item
//! was about to be emitted with coordinates the renderer could not draw.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PagewrightError>;

/// The unified error type returned by all public pagewright API functions.
#[derive(Debug, Error)]
pub enum PagewrightError {
    /// JSON input failed to parse as a valid document.
    #[error("Failed to parse document: {source}{hint}")]
    Parse {
        source: serde_json::Error,
        hint: String,
    },

    /// The layout configuration describes unusable page geometry.
    #[error("Invalid layout configuration: {0}")]
    Config(String),

    /// An item was about to be emitted with non-finite or negative geometry.
    #[error("Invalid geometry: {0}")]
    Geometry(String),

    /// An image source could not be read or decoded.
    #[error("Image error: {0}")]
    Image(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for PagewrightError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters."
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the document schema. Check block types and field names."
            }
            serde_json::error::Category::Eof => "Unexpected end of input. Is the JSON truncated?",
            serde_json::error::Category::Io => "",
        };
        let hint = if hint.is_empty() {
            String::new()
        } else {
            format!("\n  Hint: {}", hint)
        };
        PagewrightError::Parse { source: e, hint }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_error_carries_hint() {
        let err: PagewrightError = serde_json::from_str::<serde_json::Value>("{\"a\": 1,}")
            .unwrap_err()
            .into();
        let msg = err.to_string();
        assert!(msg.starts_with("Failed to parse document"));
        assert!(msg.contains("trailing commas"), "got: {msg}");
    }

    #[test]
    fn eof_error_mentions_truncation() {
        let err: PagewrightError = serde_json::from_str::<serde_json::Value>("[1, 2")
            .unwrap_err()
            .into();
        assert!(err.to_string().contains("truncated"));
    }

    #[test]
    fn parse_error_exposes_source() {
        use std::error::Error;
        let err: PagewrightError = serde_json::from_str::<serde_json::Value>("nope")
            .unwrap_err()
            .into();
        assert!(err.source().is_some());
    }
}
