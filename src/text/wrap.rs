//! Single-pass line wrapping.
//!
//! [`WrapVisitor`] plugs into [`walk_lines_and_segments`] and commits
//! visual lines as segments stream past, so a full rebuild is one walk over
//! the rope regardless of wrap mode.
//!
//! [`walk_lines_and_segments`]: crate::text::traversal::walk_lines_and_segments

use crate::text::scan::ScanOptions;
use crate::text::segment::TextChunk;
use crate::text::traversal::{LineSegmentVisitor, LineSpan};
use crate::unicode::{grapheme_widths, is_whitespace_grapheme, is_wrap_break};

/// Text wrapping mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WrapMode {
    /// No wrapping - lines extend beyond viewport.
    #[default]
    None,
    /// Wrap at character boundaries.
    Char,
    /// Wrap at word boundaries.
    Word,
}

/// A width-bounded slice of one logical line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VisualLine {
    /// Logical line this slice belongs to.
    pub logical_line: usize,
    /// Document offset where the logical line starts.
    pub line_start_offset: usize,
    /// First column of the slice within the logical line.
    pub start_col: usize,
    /// Column just past the slice within the logical line.
    pub end_col: usize,
    /// Display width of the slice.
    pub width: usize,
    /// Whether an earlier slice of the same logical line precedes this one.
    pub is_continuation: bool,
}

impl VisualLine {
    /// Document offset of the slice's first column.
    #[must_use]
    pub fn start_offset(&self) -> usize {
        self.line_start_offset + self.start_col
    }

    /// Document offset just past the slice.
    #[must_use]
    pub fn end_offset(&self) -> usize {
        self.line_start_offset + self.end_col
    }
}

/// Streaming wrap state for one traversal.
#[derive(Debug)]
pub struct WrapVisitor {
    mode: WrapMode,
    width: Option<usize>,
    scan: ScanOptions,
    lines: Vec<VisualLine>,
    line: usize,
    line_start: usize,
    col: usize,
    start_col: usize,
    current: usize,
    // Column just past the last word-break opportunity and the visual width
    // up to it.
    last_break: Option<(usize, usize)>,
    skipping_whitespace: bool,
    emitted: bool,
}

impl WrapVisitor {
    /// Create a visitor. `width` of `None`, or [`WrapMode::None`], disables
    /// wrapping. `Some(0)` wraps as `Some(1)`: one grapheme per line.
    #[must_use]
    pub fn new(mode: WrapMode, width: Option<usize>, scan: ScanOptions) -> Self {
        let width = match mode {
            WrapMode::None => None,
            WrapMode::Char | WrapMode::Word => width.map(|w| w.max(1)),
        };
        Self {
            mode,
            width,
            scan,
            lines: Vec::new(),
            line: 0,
            line_start: 0,
            col: 0,
            start_col: 0,
            current: 0,
            last_break: None,
            skipping_whitespace: false,
            emitted: false,
        }
    }

    /// The committed visual lines.
    #[must_use]
    pub fn into_lines(self) -> Vec<VisualLine> {
        self.lines
    }

    fn commit(&mut self, end_col: usize) {
        self.lines.push(VisualLine {
            logical_line: self.line,
            line_start_offset: self.line_start,
            start_col: self.start_col,
            end_col,
            width: end_col - self.start_col,
            is_continuation: self.emitted,
        });
        self.emitted = true;
    }

    fn start_fresh(&mut self) {
        self.start_col = self.col;
        self.current = 0;
        self.last_break = None;
    }

    fn push_grapheme(&mut self, grapheme: &str, width: usize, wrap_width: usize) {
        if self.skipping_whitespace {
            if is_whitespace_grapheme(grapheme) {
                self.col += width;
                return;
            }
            self.skipping_whitespace = false;
            self.start_fresh();
        }

        while self.current + width > wrap_width {
            if self.current == 0 {
                // Wider than the wrap width on its own.
                self.col += width;
                self.commit(self.col);
                self.start_fresh();
                return;
            }
            if self.mode == WrapMode::Word {
                if is_whitespace_grapheme(grapheme) {
                    self.commit(self.col);
                    self.col += width;
                    self.skipping_whitespace = true;
                    self.last_break = None;
                    return;
                }
                if let Some((break_col, break_width)) = self.last_break.take() {
                    self.commit(break_col);
                    self.start_col = break_col;
                    self.current -= break_width;
                    continue;
                }
            }
            self.commit(self.col);
            self.start_fresh();
        }

        self.col += width;
        self.current += width;
        if self.mode == WrapMode::Word && is_wrap_break(grapheme) {
            self.last_break = Some((self.col, self.current));
        }
    }

    fn push_simple_char_wrapped(&mut self, mut remaining: usize, wrap_width: usize) {
        while remaining > 0 {
            let room = wrap_width - self.current;
            if room == 0 {
                self.commit(self.col);
                self.start_fresh();
                continue;
            }
            let take = room.min(remaining);
            self.col += take;
            self.current += take;
            remaining -= take;
        }
    }
}

impl LineSegmentVisitor for WrapVisitor {
    fn on_segment(&mut self, _line: usize, col: usize, chunk: &TextChunk) {
        debug_assert_eq!(col, self.col);
        let Some(wrap_width) = self.width else {
            self.col += chunk.width();
            self.current += chunk.width();
            return;
        };

        if chunk.is_simple() {
            if self.mode == WrapMode::Char {
                self.push_simple_char_wrapped(chunk.width(), wrap_width);
            } else {
                let text = chunk.as_str();
                for i in 0..text.len() {
                    self.push_grapheme(&text[i..=i], 1, wrap_width);
                }
            }
            return;
        }

        for (_, grapheme, width) in
            grapheme_widths(chunk.as_str(), self.scan.width_method, self.scan.tab_width)
        {
            self.push_grapheme(grapheme, width, wrap_width);
        }
    }

    fn on_line_end(&mut self, line: LineSpan) {
        if !self.skipping_whitespace && (self.current > 0 || !self.emitted) {
            self.commit(self.col);
        }
        self.line = line.index + 1;
        self.line_start = line.end_offset();
        self.col = 0;
        self.start_col = 0;
        self.current = 0;
        self.last_break = None;
        self.skipping_whitespace = false;
        self.emitted = false;
    }
}
