//! Rope leaves: text runs and line breaks.

use crate::text::metrics::{LineMetrics, Measure};
use crate::unicode::{WidthMethod, grapheme_widths, is_simple_ascii, text_width};
use std::fmt;
use std::sync::Arc;

/// Immutable run of text that never contains a line terminator.
///
/// The bytes live in a shared `Arc<str>`; splitting a chunk narrows the byte
/// range instead of copying.
#[derive(Clone)]
pub struct TextChunk {
    source: Arc<str>,
    start: usize,
    end: usize,
    width: usize,
    ascii: bool,
    // Every byte is printable ASCII, so byte offset == column.
    simple: bool,
}

impl TextChunk {
    /// Create a chunk over `source[start..end]`, measuring its width.
    #[must_use]
    pub fn new(
        source: Arc<str>,
        start: usize,
        end: usize,
        method: WidthMethod,
        tab_width: usize,
    ) -> Self {
        let text = &source[start..end];
        let simple = is_simple_ascii(text);
        let width = text_width(text, method, tab_width);
        let ascii = simple || text.is_ascii();
        Self {
            source,
            start,
            end,
            width,
            ascii,
            simple,
        }
    }

    /// Create a chunk from an owned string.
    #[must_use]
    pub fn from_text(text: &str, method: WidthMethod, tab_width: usize) -> Self {
        let source: Arc<str> = Arc::from(text);
        let end = source.len();
        Self::new(source, 0, end, method, tab_width)
    }

    /// The chunk's text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source[self.start..self.end]
    }

    /// Display width in columns.
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Length in bytes.
    #[must_use]
    pub fn len_bytes(&self) -> usize {
        self.end - self.start
    }

    /// Check if the chunk holds no text.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether the chunk is pure ASCII.
    #[must_use]
    pub fn is_ascii(&self) -> bool {
        self.ascii
    }

    /// Whether every byte is one printable ASCII column.
    #[must_use]
    pub fn is_simple(&self) -> bool {
        self.simple
    }

    /// Byte offset and snapped column of the grapheme boundary at or before `col`.
    ///
    /// A column inside a wide grapheme snaps back to that grapheme's start.
    #[must_use]
    pub fn byte_at_col(&self, col: usize, method: WidthMethod, tab_width: usize) -> (usize, usize) {
        if col >= self.width {
            return (self.len_bytes(), self.width);
        }
        if self.simple {
            return (col, col);
        }
        let mut at = 0;
        for (offset, _, w) in grapheme_widths(self.as_str(), method, tab_width) {
            if at + w > col {
                return (offset, at);
            }
            at += w;
        }
        (self.len_bytes(), self.width)
    }

    /// Split at column `col`, snapping to a grapheme boundary.
    ///
    /// Either side is `None` when it would be empty.
    #[must_use]
    pub fn split_at_col(
        &self,
        col: usize,
        method: WidthMethod,
        tab_width: usize,
    ) -> (Option<Self>, Option<Self>) {
        let (byte, snapped) = self.byte_at_col(col, method, tab_width);
        let mid = self.start + byte;
        let left = (mid > self.start).then(|| self.narrowed(self.start, mid, snapped));
        let right = (mid < self.end).then(|| self.narrowed(mid, self.end, self.width - snapped));
        (left, right)
    }

    /// Text covering columns `start_col..end_col`, snapped to grapheme starts.
    #[must_use]
    pub fn slice_cols(
        &self,
        start_col: usize,
        end_col: usize,
        method: WidthMethod,
        tab_width: usize,
    ) -> &str {
        let (a, _) = self.byte_at_col(start_col, method, tab_width);
        let (b, _) = self.byte_at_col(end_col.max(start_col), method, tab_width);
        &self.as_str()[a..b]
    }

    fn narrowed(&self, start: usize, end: usize, width: usize) -> Self {
        let text = &self.source[start..end];
        let simple = self.simple || is_simple_ascii(text);
        Self {
            source: Arc::clone(&self.source),
            start,
            end,
            width,
            ascii: self.ascii || text.is_ascii(),
            simple,
        }
    }
}

impl fmt::Debug for TextChunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextChunk")
            .field("text", &self.as_str())
            .field("width", &self.width)
            .field("ascii", &self.ascii)
            .finish()
    }
}

impl PartialEq for TextChunk {
    fn eq(&self, other: &Self) -> bool {
        self.width == other.width && self.as_str() == other.as_str()
    }
}

impl Eq for TextChunk {}

/// Leaf value stored in the document rope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment {
    /// A run of text on a single line.
    Text(TextChunk),
    /// One line terminator. Zero width.
    Break,
}

impl Segment {
    /// The text chunk, if this is a text segment.
    #[must_use]
    pub fn as_text(&self) -> Option<&TextChunk> {
        match self {
            Self::Text(chunk) => Some(chunk),
            Self::Break => None,
        }
    }

    /// Check if this is a line break.
    #[must_use]
    pub fn is_break(&self) -> bool {
        matches!(self, Self::Break)
    }

    /// Display width (0 for breaks).
    #[must_use]
    pub fn width(&self) -> usize {
        match self {
            Self::Text(chunk) => chunk.width(),
            Self::Break => 0,
        }
    }
}

impl Measure for Segment {
    type Metrics = LineMetrics;

    fn measure(&self) -> LineMetrics {
        match self {
            Self::Text(chunk) => LineMetrics::text(chunk.width, chunk.len_bytes(), chunk.ascii),
            Self::Break => LineMetrics::line_break(),
        }
    }
}
