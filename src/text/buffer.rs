//! Document buffer backed by a segment rope.
//!
//! [`TextBuffer`] owns exactly one [`Rope<Segment>`] and everything derived
//! from the document: highlights, a generation counter and the registry of
//! dependent views. Views hold only a weak handle to the buffer and the
//! buffer holds only weak entries back to the views, so neither keeps the
//! other alive. Every successful mutation marks every live view dirty.
//!
//! # Offsets
//!
//! Document offsets count display columns; line breaks have zero width. The
//! offset at the end of one line is therefore also the offset at the start
//! of the next, and offset-based operations resolve it to the later line.
//! Coordinate-based operations (`*_by_coords`) can address either side of a
//! break, which is how a lone line break is selected or deleted.

use crate::error::{Error, Result};
use crate::event::{LogLevel, emit_event, emit_log_with};
use crate::text::highlight::{Highlight, HighlightStore, LineHighlight};
use crate::text::position::{
    Bias, Coords, coords_to_offset, coords_to_position, line_extent, offset_to_coords,
    offset_to_position, split_at_position,
};
use crate::text::rope::Rope;
use crate::text::scan::{ScanOptions, scan_segments};
use crate::text::segment::{Segment, TextChunk};
use crate::text::traversal::{self, LineSpan};
use crate::unicode::WidthMethod;
use std::cell::{Cell, Ref, RefCell, RefMut};
use std::fmt;
use std::ops::ControlFlow;
use std::rc::{Rc, Weak};

/// Line terminator written when the document is read back as text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
    Cr,
}

impl LineEnding {
    /// The terminator as a string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
            Self::Cr => "\r",
        }
    }
}

/// Construction options for [`TextBuffer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextBufferOptions {
    /// How ambiguous-width characters are measured.
    pub width_method: WidthMethod,
    /// Columns occupied by a tab (at least 1).
    pub tab_width: u8,
    /// Terminator used by [`TextBuffer::get_text`].
    pub line_ending: LineEnding,
}

impl Default for TextBufferOptions {
    fn default() -> Self {
        Self {
            width_method: WidthMethod::default(),
            tab_width: 4,
            line_ending: LineEnding::default(),
        }
    }
}

impl TextBufferOptions {
    #[must_use]
    pub fn with_width_method(mut self, method: WidthMethod) -> Self {
        self.width_method = method;
        self
    }

    #[must_use]
    pub fn with_tab_width(mut self, width: u8) -> Self {
        self.tab_width = width.max(1);
        self
    }

    #[must_use]
    pub fn with_line_ending(mut self, ending: LineEnding) -> Self {
        self.line_ending = ending;
        self
    }

    pub(crate) fn scan(self) -> ScanOptions {
        ScanOptions {
            width_method: self.width_method,
            tab_width: usize::from(self.tab_width.max(1)),
        }
    }
}

/// Per-line starts and widths of the whole document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LineTable {
    /// Document offset where each logical line starts.
    pub starts: Vec<usize>,
    /// Display width of each logical line.
    pub widths: Vec<usize>,
    /// Widest line.
    pub max_width: usize,
}

impl LineTable {
    /// Number of logical lines.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.starts.len()
    }
}

/// Dirty flag shared between a view and the buffer's registry.
#[derive(Debug)]
pub(crate) struct ViewFlags {
    dirty: Cell<bool>,
}

impl ViewFlags {
    pub(crate) fn new() -> Rc<Self> {
        Rc::new(Self {
            dirty: Cell::new(true),
        })
    }

    pub(crate) fn mark_dirty(&self) {
        self.dirty.set(true);
    }

    pub(crate) fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    pub(crate) fn clear_dirty(&self) {
        self.dirty.set(false);
    }
}

/// Mutable document state behind the buffer handle.
pub(crate) struct BufferState {
    rope: Rope<Segment>,
    options: TextBufferOptions,
    highlights: HighlightStore,
    generation: u64,
    views: Vec<Weak<ViewFlags>>,
}

impl BufferState {
    fn new(options: TextBufferOptions) -> Self {
        Self {
            rope: Rope::from_items([Self::empty_line(options)]),
            options,
            highlights: HighlightStore::default(),
            generation: 0,
            views: Vec::new(),
        }
    }

    fn empty_line(options: TextBufferOptions) -> Segment {
        let scan = options.scan();
        Segment::Text(TextChunk::from_text("", scan.width_method, scan.tab_width))
    }

    pub(crate) fn rope(&self) -> &Rope<Segment> {
        &self.rope
    }

    pub(crate) fn options(&self) -> TextBufferOptions {
        self.options
    }

    fn len_bytes(&self) -> usize {
        let metrics = self.rope.metrics();
        metrics.byte_len + metrics.break_count * self.options.line_ending.as_str().len()
    }

    fn touch(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.views.retain(|weak| match weak.upgrade() {
            Some(flags) => {
                flags.mark_dirty();
                true
            }
            None => false,
        });
        emit_event("text_buffer:changed", &self.generation.to_string());
    }

    fn set_text(&mut self, text: &str) {
        let segments = scan_segments(text, self.options.scan());
        self.rope = if segments.is_empty() {
            Rope::from_items([Self::empty_line(self.options)])
        } else {
            Rope::from_items(segments)
        };
        self.highlights.clear();
        self.touch();
        emit_log_with(LogLevel::Debug, || {
            format!(
                "text_buffer: set_text {} bytes, {} lines",
                text.len(),
                traversal::line_count(&self.rope)
            )
        });
    }

    fn reset(&mut self) {
        self.rope = Rope::new();
        self.highlights.clear();
        self.touch();
        emit_log_with(LogLevel::Debug, || "text_buffer: reset".to_string());
    }

    fn check_range(&self, start: usize, end: usize) -> Result<()> {
        if start > end {
            return Err(Error::InvalidRange { start, end });
        }
        let len = self.rope.metrics().total_width;
        if end > len {
            return Err(Error::OutOfRange { offset: end, len });
        }
        Ok(())
    }

    fn offset_range_to_positions(&self, start: usize, end: usize) -> Result<(usize, usize)> {
        self.check_range(start, end)?;
        let p0 = offset_to_position(&self.rope, start, Bias::Forward)?;
        let p1 = offset_to_position(&self.rope, end, Bias::Backward)?;
        Ok((p0, p1.max(p0)))
    }

    fn coords_range_to_positions(
        &self,
        start: Coords,
        end: Coords,
    ) -> Result<(usize, usize)> {
        let p0 = coords_to_position(&self.rope, start.row, start.col);
        let p1 = coords_to_position(&self.rope, end.row, end.col);
        if p0 > p1 {
            return Err(Error::InvalidRange { start: p0, end: p1 });
        }
        Ok((p0, p1))
    }

    /// Segments between two positions.
    fn slice_positions(&self, p0: usize, p1: usize) -> Rope<Segment> {
        let scan = self.options.scan();
        let (left, rest) = split_at_position(&self.rope, p0, scan);
        let cut = left.metrics().weight();
        let (middle, _) = split_at_position(&rest, p1.saturating_sub(cut), scan);
        middle
    }

    fn write_segments(&self, rope: &Rope<Segment>, out: &mut String) {
        let ending = self.options.line_ending.as_str();
        let _ = rope.walk(|segment| {
            match segment {
                Segment::Text(chunk) => out.push_str(chunk.as_str()),
                Segment::Break => out.push_str(ending),
            }
            ControlFlow::Continue(())
        });
    }

    pub(crate) fn text_between_positions(&self, p0: usize, p1: usize) -> String {
        let mut out = String::new();
        self.write_segments(&self.slice_positions(p0, p1), &mut out);
        out
    }

    pub(crate) fn text_range(&self, start: usize, end: usize) -> Result<String> {
        let (p0, p1) = self.offset_range_to_positions(start, end)?;
        Ok(self.text_between_positions(p0, p1))
    }

    fn replace_positions(&mut self, p0: usize, p1: usize, text: &str) {
        let scan = self.options.scan();
        let (left, rest) = split_at_position(&self.rope, p0, scan);
        let cut = left.metrics().weight();
        let (_, right) = split_at_position(&rest, p1.saturating_sub(cut), scan);
        let middle = Rope::from_items(scan_segments(text, scan));
        let rope = Rope::concat(Rope::concat(left, middle), right);
        self.rope = if rope.is_empty() {
            Rope::from_items([Self::empty_line(self.options)])
        } else {
            rope
        };
    }

    fn replace(&mut self, start: usize, end: usize, text: &str) -> Result<()> {
        let (p0, p1) = self.offset_range_to_positions(start, end)?;
        let before = self.rope.metrics().total_width;
        self.replace_positions(p0, p1, text);
        let inserted = (self.rope.metrics().total_width + (end - start)).saturating_sub(before);
        self.highlights.apply_edit(start, end, inserted);
        self.touch();
        emit_log_with(LogLevel::Debug, || {
            format!(
                "text_buffer: replace {start}..{end} with {} bytes (generation {})",
                text.len(),
                self.generation
            )
        });
        Ok(())
    }

    fn replace_by_coords(&mut self, start: Coords, end: Coords, text: &str) -> Result<()> {
        let (p0, p1) = self.coords_range_to_positions(start, end)?;
        let start_offset = coords_to_offset(&self.rope, start.row, start.col);
        let end_offset = coords_to_offset(&self.rope, end.row, end.col);
        let before = self.rope.metrics().total_width;
        self.replace_positions(p0, p1, text);
        let removed = end_offset - start_offset;
        let inserted = (self.rope.metrics().total_width + removed).saturating_sub(before);
        self.highlights.apply_edit(start_offset, end_offset, inserted);
        self.touch();
        emit_log_with(LogLevel::Debug, || {
            format!(
                "text_buffer: replace ({}, {})..({}, {}) with {} bytes",
                start.row,
                start.col,
                end.row,
                end.col,
                text.len()
            )
        });
        Ok(())
    }

    fn append(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let middle = Rope::from_items(scan_segments(text, self.options.scan()));
        let rope = std::mem::take(&mut self.rope);
        self.rope = Rope::concat(rope, middle);
        self.touch();
    }

    fn check_line(&self, line: usize) -> Result<()> {
        let count = traversal::line_count(&self.rope);
        if line >= count {
            return Err(Error::LineOutOfRange { line, count });
        }
        Ok(())
    }

    pub(crate) fn line_span(&self, line: usize) -> Result<LineSpan> {
        self.check_line(line)?;
        let (start_offset, width) =
            line_extent(&self.rope, line).ok_or(Error::LineOutOfRange { line, count: 0 })?;
        Ok(LineSpan {
            index: line,
            start_offset,
            width,
        })
    }

    fn line_text(&self, line: usize) -> Result<String> {
        let span = self.line_span(line)?;
        let p0 = span.start_offset + line;
        Ok(self.text_between_positions(p0, p0 + span.width))
    }

    fn register_view(&mut self, flags: &Rc<ViewFlags>) {
        let already = self
            .views
            .iter()
            .any(|weak| weak.upgrade().is_some_and(|f| Rc::ptr_eq(&f, flags)));
        if !already {
            self.views.push(Rc::downgrade(flags));
        }
        flags.mark_dirty();
    }

    fn unregister_view(&mut self, flags: &Rc<ViewFlags>) {
        self.views.retain(|weak| {
            weak.upgrade()
                .is_some_and(|f| !Rc::ptr_eq(&f, flags))
        });
    }
}

pub(crate) type SharedState = Rc<RefCell<BufferState>>;

/// Document buffer: text storage, coordinates, highlights and view registry.
///
/// All operations return [`Error::InvalidState`] once [`destroy`] has been
/// called. The buffer is single-threaded; views borrow it only for the
/// duration of a call.
///
/// [`destroy`]: TextBuffer::destroy
pub struct TextBuffer {
    state: Option<SharedState>,
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TextBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.state.as_ref().and_then(|s| s.try_borrow().ok()) {
            Some(state) => f
                .debug_struct("TextBuffer")
                .field("lines", &traversal::line_count(&state.rope))
                .field("generation", &state.generation)
                .field("views", &state.views.len())
                .finish(),
            None => f.debug_struct("TextBuffer").field("destroyed", &true).finish(),
        }
    }
}

impl TextBuffer {
    /// Create a buffer holding one empty line.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(TextBufferOptions::default())
    }

    /// Create an empty buffer with explicit options.
    #[must_use]
    pub fn with_options(options: TextBufferOptions) -> Self {
        Self {
            state: Some(Rc::new(RefCell::new(BufferState::new(options)))),
        }
    }

    /// Create a buffer with initial text.
    #[must_use]
    pub fn with_text(text: &str) -> Self {
        let buffer = Self::new();
        if let Some(state) = buffer.state.as_ref() {
            state.borrow_mut().set_text(text);
        }
        buffer
    }

    pub(crate) fn shared(&self) -> Result<&SharedState> {
        self.state
            .as_ref()
            .ok_or(Error::InvalidState("text buffer destroyed"))
    }

    fn read(&self) -> Result<Ref<'_, BufferState>> {
        self.shared()?
            .try_borrow()
            .map_err(|_| Error::InvalidState("text buffer is being mutated"))
    }

    fn write(&mut self) -> Result<RefMut<'_, BufferState>> {
        self.shared()?
            .try_borrow_mut()
            .map_err(|_| Error::InvalidState("text buffer is borrowed by a traversal"))
    }

    /// Destroy the buffer. Registered views fail with
    /// [`Error::InvalidState`] from now on.
    pub fn destroy(&mut self) -> Result<()> {
        let state = self
            .state
            .take()
            .ok_or(Error::InvalidState("text buffer destroyed"))?;
        if let Ok(mut state) = state.try_borrow_mut() {
            state.highlights.clear();
            for flags in state.views.drain(..).filter_map(|weak| weak.upgrade()) {
                flags.mark_dirty();
            }
        }
        emit_log_with(LogLevel::Debug, || "text_buffer: destroyed".to_string());
        Ok(())
    }

    /// Check whether [`destroy`](Self::destroy) has been called.
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.state.is_none()
    }

    /// Options the buffer was created with.
    pub fn options(&self) -> Result<TextBufferOptions> {
        Ok(self.read()?.options)
    }

    /// Change the terminator used when reading text back.
    pub fn set_line_ending(&mut self, ending: LineEnding) -> Result<()> {
        self.write()?.options.line_ending = ending;
        Ok(())
    }

    /// Replace the whole document, clearing highlights.
    ///
    /// LF, CR and CRLF are each one line break. Empty text leaves one empty
    /// line.
    pub fn set_text(&mut self, text: &str) -> Result<()> {
        self.write()?.set_text(text);
        Ok(())
    }

    /// Drop all content, leaving zero lines.
    pub fn reset(&mut self) -> Result<()> {
        self.write()?.reset();
        Ok(())
    }

    /// Append text at the end of the document.
    pub fn append(&mut self, text: &str) -> Result<()> {
        self.write()?.append(text);
        Ok(())
    }

    /// Replace the document offsets `start..end` with `text`.
    ///
    /// An offset shared by a line end and the next line start resolves to
    /// the next line for `start` and to the earlier line for `end`.
    pub fn replace(&mut self, start: usize, end: usize, text: &str) -> Result<()> {
        self.write()?.replace(start, end, text)
    }

    /// Replace the range between two coordinates with `text`.
    ///
    /// Rows and columns clamp to the document like
    /// [`coords_to_offset`](Self::coords_to_offset).
    pub fn replace_by_coords(
        &mut self,
        start_row: usize,
        start_col: usize,
        end_row: usize,
        end_col: usize,
        text: &str,
    ) -> Result<()> {
        self.write()?.replace_by_coords(
            Coords::new(start_row, start_col),
            Coords::new(end_row, end_col),
            text,
        )
    }

    /// The document as a string, breaks rendered with the configured ending.
    pub fn get_text(&self) -> Result<String> {
        let mut out = String::new();
        self.get_plain_text_into(&mut out)?;
        Ok(out)
    }

    /// Append the document to `out`, returning the number of bytes written.
    pub fn get_plain_text_into(&self, out: &mut String) -> Result<usize> {
        let state = self.read()?;
        let before = out.len();
        out.reserve(state.len_bytes());
        state.write_segments(&state.rope, out);
        Ok(out.len() - before)
    }

    /// Text between two document offsets.
    pub fn get_text_range(&self, start: usize, end: usize) -> Result<String> {
        self.read()?.text_range(start, end)
    }

    /// Text between two coordinates, including any breaks between them.
    pub fn get_text_range_by_coords(
        &self,
        start_row: usize,
        start_col: usize,
        end_row: usize,
        end_col: usize,
    ) -> Result<String> {
        let state = self.read()?;
        let (p0, p1) = state.coords_range_to_positions(
            Coords::new(start_row, start_col),
            Coords::new(end_row, end_col),
        )?;
        Ok(state.text_between_positions(p0, p1))
    }

    /// Text of one logical line, without its terminator.
    pub fn get_line(&self, line: usize) -> Result<String> {
        self.read()?.line_text(line)
    }

    /// Start offset and width of one logical line.
    pub fn line_span(&self, line: usize) -> Result<LineSpan> {
        self.read()?.line_span(line)
    }

    /// Number of logical lines (0 after [`reset`](Self::reset)).
    pub fn get_line_count(&self) -> Result<usize> {
        Ok(traversal::line_count(&self.read()?.rope))
    }

    /// Width of the widest logical line.
    pub fn max_line_width(&self) -> Result<usize> {
        Ok(traversal::max_line_width(&self.read()?.rope))
    }

    /// Sum of all line widths; also the largest valid offset.
    pub fn total_width(&self) -> Result<usize> {
        Ok(traversal::total_width(&self.read()?.rope))
    }

    /// Total width plus one unit per line break.
    pub fn weight(&self) -> Result<usize> {
        Ok(self.read()?.rope.metrics().weight())
    }

    /// Byte length of [`get_text`](Self::get_text)'s output.
    pub fn len_bytes(&self) -> Result<usize> {
        Ok(self.read()?.len_bytes())
    }

    /// Whether the document is pure ASCII.
    pub fn is_ascii_only(&self) -> Result<bool> {
        Ok(self.read()?.rope.metrics().ascii_only)
    }

    /// Mutation counter; bumps on every successful edit.
    pub fn generation(&self) -> Result<u64> {
        Ok(self.read()?.generation)
    }

    /// Convert `(row, col)` to a document offset, clamping to the document.
    pub fn coords_to_offset(&self, row: usize, col: usize) -> Result<usize> {
        Ok(coords_to_offset(&self.read()?.rope, row, col))
    }

    /// Convert a document offset to `(row, col)`.
    pub fn offset_to_coords(&self, offset: usize) -> Result<Coords> {
        offset_to_coords(&self.read()?.rope, offset)
    }

    /// Start offset and width of every logical line, from one traversal.
    pub fn line_info(&self) -> Result<LineTable> {
        let state = self.read()?;
        let mut table = LineTable::default();
        traversal::walk_lines(&state.rope, |span| {
            table.starts.push(span.start_offset);
            table.widths.push(span.width);
            table.max_width = table.max_width.max(span.width);
        });
        Ok(table)
    }

    /// Add a highlight whose range is in columns of logical line `line`.
    ///
    /// Columns clamp to the line; an empty result is ignored.
    pub fn add_highlight(&mut self, line: usize, highlight: Highlight) -> Result<()> {
        let mut state = self.write()?;
        let span = state.line_span(line)?;
        let start = span.start_offset + highlight.range.start.min(span.width);
        let end = span.start_offset + highlight.range.end.min(span.width);
        state.highlights.add(Highlight {
            range: start..end,
            ..highlight
        });
        Ok(())
    }

    /// Add a highlight over an absolute document range.
    pub fn add_highlight_by_char_range(&mut self, highlight: Highlight) -> Result<()> {
        let mut state = self.write()?;
        state.check_range(highlight.range.start, highlight.range.end)?;
        state.highlights.add(highlight);
        Ok(())
    }

    /// Remove all highlights with a reference ID, returning how many went.
    pub fn remove_highlights_by_ref(&mut self, ref_id: u16) -> Result<usize> {
        Ok(self.write()?.highlights.remove_by_ref(ref_id))
    }

    /// Remove every highlight.
    pub fn clear_highlights(&mut self) -> Result<()> {
        self.write()?.highlights.clear();
        Ok(())
    }

    /// Number of stored highlights.
    pub fn highlight_count(&self) -> Result<usize> {
        Ok(self.read()?.highlights.len())
    }

    /// Highlights touching logical line `line`, in line-local columns.
    pub fn get_line_highlights(&self, line: usize) -> Result<Vec<LineHighlight>> {
        let state = self.read()?;
        let span = state.line_span(line)?;
        Ok(state.highlights.for_line(span.start_offset, span.width))
    }

    /// Register a view's dirty flag. Views register themselves on creation.
    pub(crate) fn register_view(&self, flags: &Rc<ViewFlags>) -> Result<()> {
        self.shared()?
            .try_borrow_mut()
            .map_err(|_| Error::InvalidState("text buffer is borrowed"))?
            .register_view(flags);
        Ok(())
    }

    /// Number of live registered views.
    pub fn view_count(&self) -> Result<usize> {
        Ok(self
            .read()?
            .views
            .iter()
            .filter(|weak| weak.strong_count() > 0)
            .count())
    }
}

/// Remove a view's entry from a buffer's registry, if the buffer is alive.
pub(crate) fn unregister_view(state: &Weak<RefCell<BufferState>>, flags: &Rc<ViewFlags>) {
    if let Some(state) = state.upgrade() {
        if let Ok(mut state) = state.try_borrow_mut() {
            state.unregister_view(flags);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_basic() {
        let buffer = TextBuffer::with_text("Line 1\nLine 2\nLine 3");
        assert_eq!(buffer.get_line_count().unwrap(), 3);
        assert_eq!(
            buffer.get_text_range_by_coords(0, 0, 1, 4).unwrap(),
            "Line 1\nLine"
        );
        assert_eq!(buffer.get_line(1).unwrap(), "Line 2");
        assert_eq!(buffer.max_line_width().unwrap(), 6);
        assert_eq!(buffer.total_width().unwrap(), 18);
    }

    #[test]
    fn test_empty_text_vs_reset() {
        let mut buffer = TextBuffer::new();
        assert_eq!(buffer.get_line_count().unwrap(), 1);
        buffer.set_text("").unwrap();
        assert_eq!(buffer.get_line_count().unwrap(), 1);
        assert_eq!(buffer.get_text().unwrap(), "");

        buffer.reset().unwrap();
        assert_eq!(buffer.get_line_count().unwrap(), 0);
        assert_eq!(buffer.get_text().unwrap(), "");
        assert!(buffer.line_info().unwrap().starts.is_empty());

        buffer.append("x").unwrap();
        assert_eq!(buffer.get_line_count().unwrap(), 1);
    }

    #[test]
    fn test_trailing_terminator() {
        let buffer = TextBuffer::with_text("Hello\n");
        assert_eq!(buffer.get_line_count().unwrap(), 2);
        let info = buffer.line_info().unwrap();
        assert_eq!(info.widths, vec![5, 0]);
        assert_eq!(buffer.get_line(1).unwrap(), "");
    }

    #[test]
    fn test_line_endings_normalized() {
        let mut buffer = TextBuffer::with_text("a\r\nb\rc\n");
        assert_eq!(buffer.get_text().unwrap(), "a\nb\nc\n");
        assert_eq!(buffer.get_line_count().unwrap(), 4);
        assert_eq!(buffer.len_bytes().unwrap(), 6);

        buffer.set_line_ending(LineEnding::CrLf).unwrap();
        assert_eq!(buffer.get_text().unwrap(), "a\r\nb\r\nc\r\n");
        assert_eq!(buffer.len_bytes().unwrap(), 9);
    }

    #[test]
    fn test_plain_text_into_appends() {
        let buffer = TextBuffer::with_text("ab\ncd");
        let mut out = String::from(">");
        let written = buffer.get_plain_text_into(&mut out).unwrap();
        assert_eq!(written, 5);
        assert_eq!(out, ">ab\ncd");
    }

    #[test]
    fn test_replace_within_line() {
        let mut buffer = TextBuffer::with_text("Hello World");
        buffer.replace(6, 11, "Rope").unwrap();
        assert_eq!(buffer.get_text().unwrap(), "Hello Rope");
        buffer.replace(5, 5, ",").unwrap();
        assert_eq!(buffer.get_text().unwrap(), "Hello, Rope");
    }

    #[test]
    fn test_replace_across_lines() {
        let mut buffer = TextBuffer::with_text("AB\nCD\nEF");
        buffer.replace(1, 3, "x\ny").unwrap();
        assert_eq!(buffer.get_text().unwrap(), "Ax\nyD\nEF");
        assert_eq!(buffer.get_line_count().unwrap(), 3);

        buffer.replace(1, 5, "").unwrap();
        assert_eq!(buffer.get_text().unwrap(), "AF");
        assert_eq!(buffer.get_line_count().unwrap(), 1);
    }

    #[test]
    fn test_replace_at_line_boundary_goes_to_next_line() {
        let mut buffer = TextBuffer::with_text("AB\nCD");
        buffer.replace(2, 2, "X").unwrap();
        assert_eq!(buffer.get_text().unwrap(), "AB\nXCD");
    }

    #[test]
    fn test_replace_by_coords_joins_lines() {
        let mut buffer = TextBuffer::with_text("AB\nCD");
        buffer.replace_by_coords(0, 2, 1, 0, "").unwrap();
        assert_eq!(buffer.get_text().unwrap(), "ABCD");

        buffer.replace_by_coords(0, 2, 0, 2, "\n").unwrap();
        assert_eq!(buffer.get_text().unwrap(), "AB\nCD");

        assert!(matches!(
            buffer.replace_by_coords(1, 1, 0, 0, ""),
            Err(Error::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_replace_everything_keeps_one_line() {
        let mut buffer = TextBuffer::with_text("abc\ndef");
        buffer.replace_by_coords(0, 0, 1, 3, "").unwrap();
        assert_eq!(buffer.get_line_count().unwrap(), 1);
        assert_eq!(buffer.get_text().unwrap(), "");
    }

    #[test]
    fn test_replace_out_of_range_leaves_document() {
        let mut buffer = TextBuffer::with_text("abc");
        let generation = buffer.generation().unwrap();
        assert_eq!(
            buffer.replace(1, 9, "x"),
            Err(Error::OutOfRange { offset: 9, len: 3 })
        );
        assert_eq!(
            buffer.replace(2, 1, "x"),
            Err(Error::InvalidRange { start: 2, end: 1 })
        );
        assert_eq!(buffer.get_text().unwrap(), "abc");
        assert_eq!(buffer.generation().unwrap(), generation);
    }

    #[test]
    fn test_text_range_boundaries() {
        let buffer = TextBuffer::with_text("AB\nCD");
        assert_eq!(buffer.get_text_range(0, 2).unwrap(), "AB");
        assert_eq!(buffer.get_text_range(2, 4).unwrap(), "CD");
        assert_eq!(buffer.get_text_range(1, 3).unwrap(), "B\nC");
        assert_eq!(buffer.get_text_range(2, 2).unwrap(), "");
        assert!(buffer.get_text_range(0, 5).is_err());
    }

    #[test]
    fn test_coords_roundtrip() {
        let buffer = TextBuffer::with_text("AB\nCD");
        assert_eq!(buffer.coords_to_offset(0, 2).unwrap(), 2);
        assert_eq!(buffer.offset_to_coords(2).unwrap(), Coords::new(1, 0));
        assert_eq!(buffer.offset_to_coords(4).unwrap(), Coords::new(1, 2));
        assert_eq!(buffer.coords_to_offset(5, 0).unwrap(), 4);
    }

    #[test]
    fn test_wide_characters() {
        let buffer = TextBuffer::with_text("漢字\nab");
        assert_eq!(buffer.line_span(0).unwrap().width, 4);
        assert_eq!(buffer.get_text_range(0, 2).unwrap(), "漢");
        // Offset 1 falls inside 漢 and snaps to its start.
        assert_eq!(buffer.get_text_range(1, 4).unwrap(), "漢字");
        assert!(!buffer.is_ascii_only().unwrap());
    }

    #[test]
    fn test_long_line_edits() {
        let line = "x".repeat(20_000);
        let mut buffer = TextBuffer::with_text(&line);
        buffer.replace(10_000, 10_001, "Y").unwrap();
        let text = buffer.get_text().unwrap();
        assert_eq!(text.len(), 20_000);
        assert_eq!(&text[9_999..10_002], "xYx");
        assert_eq!(buffer.get_text_range(10_000, 10_001).unwrap(), "Y");
    }

    #[test]
    fn test_highlights() {
        let mut buffer = TextBuffer::with_text("Hello\nWorld");
        buffer
            .add_highlight(1, Highlight::new(1..3, 4).with_priority(2).with_ref(7))
            .unwrap();
        buffer
            .add_highlight_by_char_range(Highlight::new(3..7, 5).with_ref(8))
            .unwrap();

        let line0 = buffer.get_line_highlights(0).unwrap();
        assert_eq!(line0.len(), 1);
        assert_eq!((line0[0].col_start, line0[0].col_end), (3, 5));

        let line1 = buffer.get_line_highlights(1).unwrap();
        assert_eq!(line1.len(), 2);
        assert_eq!((line1[0].col_start, line1[0].col_end, line1[0].style_id), (0, 2, 5));
        assert_eq!((line1[1].col_start, line1[1].col_end, line1[1].style_id), (1, 3, 4));

        assert_eq!(buffer.remove_highlights_by_ref(7).unwrap(), 1);
        assert_eq!(buffer.get_line_highlights(1).unwrap().len(), 1);
        assert!(buffer.get_line_highlights(2).is_err());
        assert!(
            buffer
                .add_highlight_by_char_range(Highlight::new(3..70, 5))
                .is_err()
        );
    }

    #[test]
    fn test_highlights_follow_edits() {
        let mut buffer = TextBuffer::with_text("abc def");
        buffer
            .add_highlight_by_char_range(Highlight::new(4..7, 1))
            .unwrap();
        buffer.replace(0, 0, "xx").unwrap();
        let hl = buffer.get_line_highlights(0).unwrap();
        assert_eq!((hl[0].col_start, hl[0].col_end), (6, 9));

        buffer.set_text("new").unwrap();
        assert_eq!(buffer.highlight_count().unwrap(), 0);
    }

    #[test]
    fn test_destroyed_buffer() {
        let mut buffer = TextBuffer::with_text("abc");
        buffer.destroy().unwrap();
        assert!(buffer.is_destroyed());
        assert_eq!(
            buffer.get_text(),
            Err(Error::InvalidState("text buffer destroyed"))
        );
        assert!(buffer.set_text("x").is_err());
        assert!(buffer.destroy().is_err());
    }

    #[test]
    fn test_generation_and_registry() {
        let mut buffer = TextBuffer::with_text("abc");
        let flags = ViewFlags::new();
        buffer.register_view(&flags).unwrap();
        buffer.register_view(&flags).unwrap();
        assert_eq!(buffer.view_count().unwrap(), 1);

        flags.clear_dirty();
        let generation = buffer.generation().unwrap();
        buffer.append("d").unwrap();
        assert!(flags.is_dirty());
        assert_eq!(buffer.generation().unwrap(), generation + 1);

        let weak = Rc::downgrade(buffer.shared().unwrap());
        unregister_view(&weak, &flags);
        assert_eq!(buffer.view_count().unwrap(), 0);
        flags.clear_dirty();
        buffer.append("e").unwrap();
        assert!(!flags.is_dirty());
    }
}
