//! # Text Measurement
//!
//! Width estimation and greedy line breaking.
//!
//! There are no real glyph metrics here. [`ApproxMeasurer`] treats every
//! character as half an em wide, which is close enough for proportional
//! Latin fonts to paginate sensibly. Layout only talks to the
//! [`TextMeasurer`] trait, so a metrics-backed implementation can replace it
//! without touching the layout code.

/// Line box height as a multiple of the font size.
pub const LINE_HEIGHT_FACTOR: f64 = 1.4;

/// Distance from the top of a line box to its baseline, as a multiple of
/// the font size.
pub const ASCENT_FACTOR: f64 = 0.8;

/// Width estimation plus the vertical metrics layout needs.
///
/// Implementations must be deterministic: the same text and size always
/// measure the same, because table rows are measured and then placed in two
/// separate passes.
pub trait TextMeasurer {
    /// Estimated advance width of `text` at `font_size`, in points.
    fn estimate_width(&self, text: &str, font_size: f64) -> f64;

    /// Height of one line box.
    fn line_height(&self, font_size: f64) -> f64 {
        font_size * LINE_HEIGHT_FACTOR
    }

    /// Offset from the top of a line box down to the baseline.
    fn ascent(&self, font_size: f64) -> f64 {
        font_size * ASCENT_FACTOR
    }

    /// Break `text` into lines no wider than `max_width`.
    ///
    /// Words are separated by single spaces and accumulated greedily: a line
    /// closes when adding the next word would exceed `max_width`. A word that
    /// is too wide on its own is force-split into the longest prefixes that
    /// fit (at least one character each, so this always terminates).
    ///
    /// Always returns at least one line (an empty one for empty input), and
    /// no characters other than the spaces consumed by line breaks are lost.
    fn wrap_lines(&self, text: &str, font_size: f64, max_width: f64) -> Vec<String> {
        let mut lines = Vec::new();
        let mut current: Option<String> = None;

        for word in text.split(' ') {
            let candidate = match &current {
                Some(line) => format!("{} {}", line, word),
                None => word.to_string(),
            };
            if self.estimate_width(&candidate, font_size) <= max_width {
                current = Some(candidate);
                continue;
            }

            if let Some(line) = current.take() {
                if !line.is_empty() {
                    lines.push(line);
                }
            }

            let mut remaining = word;
            while self.estimate_width(remaining, font_size) > max_width {
                let split_at = self.fitting_prefix_len(remaining, font_size, max_width);
                let (head, tail) = remaining.split_at(split_at);
                lines.push(head.to_string());
                remaining = tail;
            }
            current = Some(remaining.to_string());
        }

        if let Some(line) = current {
            if !line.is_empty() {
                lines.push(line);
            }
        }

        if lines.is_empty() {
            lines.push(String::new());
        }
        lines
    }

    /// Byte length of the longest prefix of `word` that fits in `max_width`,
    /// never less than one character.
    fn fitting_prefix_len(&self, word: &str, font_size: f64, max_width: f64) -> usize {
        let mut fit = 0;
        for (idx, ch) in word.char_indices() {
            let end = idx + ch.len_utf8();
            if self.estimate_width(&word[..end], font_size) > max_width {
                break;
            }
            fit = end;
        }
        if fit == 0 {
            word.chars().next().map(char::len_utf8).unwrap_or(0)
        } else {
            fit
        }
    }
}

/// Constant-factor width model: every character is `font_size * 0.5` wide.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproxMeasurer;

impl ApproxMeasurer {
    /// Average character width as a fraction of the font size.
    pub const CHAR_WIDTH_FACTOR: f64 = 0.5;

    pub fn new() -> Self {
        Self
    }
}

impl TextMeasurer for ApproxMeasurer {
    fn estimate_width(&self, text: &str, font_size: f64) -> f64 {
        text.chars().count() as f64 * font_size * Self::CHAR_WIDTH_FACTOR
    }

    // Same split point as `fitting_prefix_len`, without the prefix scan.
    fn fitting_prefix_len(&self, word: &str, font_size: f64, max_width: f64) -> usize {
        let per_char = font_size * Self::CHAR_WIDTH_FACTOR;
        let chars = (max_width / per_char).floor();
        let chars = if chars.is_finite() && chars >= 1.0 {
            chars as usize
        } else {
            1
        };
        word.char_indices()
            .nth(chars)
            .map(|(idx, _)| idx)
            .unwrap_or(word.len())
    }
}
