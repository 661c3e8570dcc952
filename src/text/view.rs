//! Text buffer view with viewport, wrapping and selection.

use crate::error::{Error, Result};
use crate::event::{LogLevel, emit_log_with};
use crate::text::buffer::{BufferState, TextBuffer, ViewFlags, unregister_view};
use crate::text::position::offset_to_coords;
use crate::text::traversal::walk_lines_and_segments;
use crate::text::wrap::{VisualLine, WrapMode, WrapVisitor};
use std::cell::{Ref, RefCell};
use std::ops::Range;
use std::rc::{Rc, Weak};

/// Viewport configuration in visual-line and column units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Viewport {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Viewport {
    /// Create a new viewport.
    #[must_use]
    pub fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Selection between two document offsets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    pub anchor: usize,
    pub focus: usize,
}

impl Selection {
    /// Create a new selection.
    #[must_use]
    pub fn new(anchor: usize, focus: usize) -> Self {
        Self { anchor, focus }
    }

    /// Check if the selection covers nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.anchor == self.focus
    }

    /// Selected offsets with start <= end.
    #[must_use]
    pub fn range(&self) -> Range<usize> {
        self.anchor.min(self.focus)..self.anchor.max(self.focus)
    }
}

/// Cached line layout information for wrapped text.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LineInfo {
    /// Document offset where each virtual line starts.
    pub starts: Vec<usize>,
    /// Document offset where each virtual line ends (exclusive).
    pub ends: Vec<usize>,
    /// Display width of each virtual line.
    pub widths: Vec<usize>,
    /// Source line index for each virtual line.
    pub sources: Vec<usize>,
    /// Whether the line is a wrapped continuation.
    pub wraps: Vec<bool>,
    /// Maximum line width across all virtual lines.
    pub max_width: usize,
}

impl LineInfo {
    /// Get the number of virtual lines.
    #[must_use]
    pub fn virtual_line_count(&self) -> usize {
        self.starts.len()
    }

    /// Map a source (logical) line to its first virtual line index.
    #[must_use]
    pub fn source_to_virtual(&self, source_line: usize) -> Option<usize> {
        let idx = self.sources.partition_point(|&s| s < source_line);
        (self.sources.get(idx) == Some(&source_line)).then_some(idx)
    }

    /// Map a virtual line index to its source (logical) line.
    #[must_use]
    pub fn virtual_to_source(&self, virtual_line: usize) -> Option<usize> {
        self.sources.get(virtual_line).copied()
    }

    /// Count virtual lines for a given source line.
    #[must_use]
    pub fn virtual_lines_for_source(&self, source_line: usize) -> usize {
        self.sources.iter().filter(|&&s| s == source_line).count()
    }
}

/// Measurement result for a given width.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextMeasure {
    pub line_count: usize,
    pub max_width: usize,
}

#[derive(Debug)]
struct WrapCache {
    lines: Vec<VisualLine>,
    max_width: usize,
}

impl WrapCache {
    fn new(lines: Vec<VisualLine>) -> Self {
        let max_width = lines.iter().map(|l| l.width).max().unwrap_or(0);
        Self { lines, max_width }
    }
}

/// Wrapped, scrollable view over a [`TextBuffer`].
///
/// The view holds a weak handle to the buffer and is registered in the
/// buffer's view registry; edits mark it dirty and the next read rebuilds
/// the visual-line cache with one traversal. Once the buffer is destroyed
/// every operation fails with [`Error::InvalidState`].
#[derive(Debug)]
pub struct TextBufferView {
    buffer: Weak<RefCell<BufferState>>,
    flags: Rc<ViewFlags>,
    wrap_mode: WrapMode,
    wrap_width: Option<usize>,
    viewport: Viewport,
    selection: Option<Selection>,
    cache: RefCell<Option<WrapCache>>,
    destroyed: bool,
}

impl TextBufferView {
    /// Create a view of `buffer` with a viewport `width` columns wide.
    pub fn new(buffer: &TextBuffer, wrap_mode: WrapMode, width: usize) -> Result<Self> {
        let shared = buffer.shared()?;
        let flags = ViewFlags::new();
        buffer.register_view(&flags)?;
        Ok(Self {
            buffer: Rc::downgrade(shared),
            flags,
            wrap_mode,
            wrap_width: None,
            viewport: Viewport::new(0, 0, width, 0),
            selection: None,
            cache: RefCell::new(None),
            destroyed: false,
        })
    }

    fn shared(&self) -> Result<Rc<RefCell<BufferState>>> {
        if self.destroyed {
            return Err(Error::InvalidState("text buffer view destroyed"));
        }
        self.buffer
            .upgrade()
            .ok_or(Error::InvalidState("text buffer destroyed"))
    }

    fn with_state<R>(&self, f: impl FnOnce(&BufferState) -> Result<R>) -> Result<R> {
        let shared = self.shared()?;
        let state = shared
            .try_borrow()
            .map_err(|_| Error::InvalidState("text buffer is being mutated"))?;
        f(&state)
    }

    /// An explicit wrap width is floored at 1; a viewport width of 0 with no
    /// explicit width leaves the text unwrapped.
    fn effective_wrap_width_for(&self, width: usize) -> Option<usize> {
        if self.wrap_mode == WrapMode::None {
            return None;
        }
        match self.wrap_width {
            Some(explicit) => Some(explicit.max(1)),
            None if width == 0 => None,
            None => Some(width),
        }
    }

    fn build(&self, state: &BufferState, wrap_width: Option<usize>) -> Vec<VisualLine> {
        let mut visitor = WrapVisitor::new(self.wrap_mode, wrap_width, state.options().scan());
        walk_lines_and_segments(state.rope(), &mut visitor);
        visitor.into_lines()
    }

    fn cache(&self) -> Result<Ref<'_, WrapCache>> {
        let stale = self.flags.is_dirty() || self.cache.borrow().is_none();
        if stale {
            let wrap_width = self.effective_wrap_width_for(self.viewport.width);
            let lines = self.with_state(|state| Ok(self.build(state, wrap_width)))?;
            let count = lines.len();
            *self.cache.borrow_mut() = Some(WrapCache::new(lines));
            self.flags.clear_dirty();
            emit_log_with(LogLevel::Debug, || {
                format!(
                    "text_buffer_view: rebuilt {count} visual lines ({:?}, width {wrap_width:?})",
                    self.wrap_mode
                )
            });
        } else {
            self.shared()?;
        }
        Ref::filter_map(self.cache.borrow(), Option::as_ref)
            .map_err(|_| Error::InvalidState("wrap cache unavailable"))
    }

    /// Destroy the view and remove it from the buffer's registry.
    pub fn destroy(&mut self) -> Result<()> {
        if self.destroyed {
            return Err(Error::InvalidState("text buffer view destroyed"));
        }
        unregister_view(&self.buffer, &self.flags);
        self.destroyed = true;
        self.selection = None;
        *self.cache.borrow_mut() = None;
        emit_log_with(LogLevel::Debug, || "text_buffer_view: destroyed".to_string());
        Ok(())
    }

    /// Check whether [`destroy`](Self::destroy) has been called.
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Whether the next read will rebuild the visual-line cache.
    pub fn is_dirty(&self) -> Result<bool> {
        self.shared()?;
        Ok(self.flags.is_dirty() || self.cache.borrow().is_none())
    }

    /// Current wrap mode.
    pub fn wrap_mode(&self) -> Result<WrapMode> {
        self.shared()?;
        Ok(self.wrap_mode)
    }

    /// Change the wrap mode.
    pub fn set_wrap_mode(&mut self, mode: WrapMode) -> Result<()> {
        self.shared()?;
        if self.wrap_mode != mode {
            self.wrap_mode = mode;
            self.flags.mark_dirty();
        }
        Ok(())
    }

    /// Wrap at `width` columns instead of the viewport width.
    pub fn set_wrap_width(&mut self, width: Option<usize>) -> Result<()> {
        self.shared()?;
        if self.wrap_width != width {
            self.wrap_width = width;
            self.flags.mark_dirty();
        }
        Ok(())
    }

    /// Current viewport.
    pub fn viewport(&self) -> Result<Viewport> {
        self.shared()?;
        Ok(self.viewport)
    }

    /// Set the viewport, clamping the scroll offsets to the content.
    ///
    /// `y` clamps to `[0, visual_lines - height]`. With wrapping off, `x`
    /// clamps to `[0, max_line_width - width]`; both are 0 when the content
    /// fits. With wrapping on, `x` is stored as given and does not affect
    /// the layout. Returns the viewport as stored.
    pub fn set_viewport(&mut self, viewport: Viewport) -> Result<Viewport> {
        self.shared()?;
        if viewport.width != self.viewport.width && self.wrap_width.is_none() {
            self.flags.mark_dirty();
        }
        self.viewport = viewport;
        let (count, max_width) = {
            let cache = self.cache()?;
            (cache.lines.len(), cache.max_width)
        };
        self.viewport.y = viewport.y.min(count.saturating_sub(viewport.height));
        if self.wrap_mode == WrapMode::None {
            self.viewport.x = viewport.x.min(max_width.saturating_sub(viewport.width));
        }
        Ok(self.viewport)
    }

    /// Set the viewport and move `cursor` into it.
    ///
    /// Returns the document offset of the cursor after clamping.
    pub fn set_viewport_with_cursor(&mut self, viewport: Viewport, cursor: usize) -> Result<usize> {
        let vp = self.set_viewport(viewport)?;
        let (mut row, mut col) = self.offset_to_visual(cursor)?;
        if vp.height > 0 {
            row = row.clamp(vp.y, vp.y + vp.height - 1);
        }
        if vp.width > 0 && self.wrap_mode == WrapMode::None {
            col = col.clamp(vp.x, vp.x + vp.width - 1);
        }
        self.visual_to_offset(row, col)
    }

    /// Number of visual lines.
    pub fn get_virtual_line_count(&self) -> Result<usize> {
        Ok(self.cache()?.lines.len())
    }

    /// Visual line at `index`.
    pub fn get_visual_line_at(&self, index: usize) -> Result<VisualLine> {
        let cache = self.cache()?;
        cache
            .lines
            .get(index)
            .copied()
            .ok_or(Error::VisualLineOutOfRange {
                index,
                count: cache.lines.len(),
            })
    }

    /// Text of the visual line at `index`.
    pub fn visual_line_text(&self, index: usize) -> Result<String> {
        let line = self.get_visual_line_at(index)?;
        self.with_state(|state| state.text_range(line.start_offset(), line.end_offset()))
    }

    /// Layout of every visual line.
    pub fn line_info(&self) -> Result<LineInfo> {
        let cache = self.cache()?;
        let mut info = LineInfo::default();
        for line in &cache.lines {
            info.starts.push(line.start_offset());
            info.ends.push(line.end_offset());
            info.widths.push(line.width);
            info.sources.push(line.logical_line);
            info.wraps.push(line.is_continuation);
        }
        info.max_width = cache.max_width;
        Ok(info)
    }

    /// Visual `(row, col)` of a document offset.
    ///
    /// An offset in the whitespace dropped at a word-wrap point maps to the
    /// end of the preceding visual line.
    pub fn offset_to_visual(&self, offset: usize) -> Result<(usize, usize)> {
        let coords = self.with_state(|state| offset_to_coords(state.rope(), offset))?;
        let cache = self.cache()?;
        let lines = &cache.lines;
        let first = lines.partition_point(|l| l.logical_line < coords.row);
        let end = lines.partition_point(|l| l.logical_line <= coords.row);
        if first == end {
            return Ok((0, 0));
        }
        let idx = first
            + lines[first..end]
                .partition_point(|l| l.start_col <= coords.col)
                .saturating_sub(1);
        let line = &lines[idx];
        Ok((idx, coords.col.saturating_sub(line.start_col).min(line.width)))
    }

    /// Document offset of a visual `(row, col)`, clamping to the content.
    pub fn visual_to_offset(&self, row: usize, col: usize) -> Result<usize> {
        let cache = self.cache()?;
        let Some(line) = cache.lines.get(row).or_else(|| cache.lines.last()) else {
            return Ok(0);
        };
        Ok(line.start_offset() + col.min(line.width))
    }

    /// Line count and widest line if the view were `width` columns wide.
    ///
    /// Does not touch the cache.
    pub fn measure_for_dimensions(&self, width: usize) -> Result<TextMeasure> {
        let wrap_width = self.effective_wrap_width_for(width);
        let lines = self.with_state(|state| Ok(self.build(state, wrap_width)))?;
        let cache = WrapCache::new(lines);
        Ok(TextMeasure {
            line_count: cache.lines.len(),
            max_width: cache.max_width,
        })
    }

    /// Select between two document offsets; `anchor > focus` is allowed.
    pub fn set_selection(&mut self, anchor: usize, focus: usize) -> Result<()> {
        let len = self.with_state(|state| Ok(state.rope().metrics().total_width))?;
        if let Some(offset) = [anchor, focus].into_iter().find(|o| *o > len) {
            return Err(Error::OutOfRange { offset, len });
        }
        self.selection = Some(Selection::new(anchor, focus));
        Ok(())
    }

    /// Drop the selection.
    pub fn clear_selection(&mut self) -> Result<()> {
        self.shared()?;
        self.selection = None;
        Ok(())
    }

    /// The current selection, if any.
    pub fn selection(&self) -> Result<Option<Selection>> {
        self.shared()?;
        Ok(self.selection)
    }

    /// Whether anchor and focus differ.
    pub fn has_selection(&self) -> Result<bool> {
        self.shared()?;
        Ok(self.selection.is_some_and(|s| !s.is_empty()))
    }

    /// Selected text, empty without a selection.
    ///
    /// Offsets beyond a document shrunk by later edits clamp to its end.
    pub fn get_selected_text(&self) -> Result<String> {
        let selection = self.selection;
        self.with_state(|state| {
            let Some(selection) = selection.filter(|s| !s.is_empty()) else {
                return Ok(String::new());
            };
            let len = state.rope().metrics().total_width;
            let range = selection.range();
            state.text_range(range.start.min(len), range.end.min(len))
        })
    }

    /// Selected columns of the visual line at `index`, if any.
    pub fn selection_in_visual_line(&self, index: usize) -> Result<Option<(usize, usize)>> {
        let line = self.get_visual_line_at(index)?;
        let Some(selection) = self.selection.filter(|s| !s.is_empty()) else {
            return Ok(None);
        };
        let range = selection.range();
        let start = range.start.max(line.start_offset());
        let end = range.end.min(line.end_offset());
        Ok((start < end).then(|| {
            (
                start - line.start_offset(),
                end - line.start_offset(),
            )
        }))
    }
}

impl Drop for TextBufferView {
    fn drop(&mut self) {
        if !self.destroyed {
            unregister_view(&self.buffer, &self.flags);
        }
    }
}
