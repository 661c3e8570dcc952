//! Single-pass line traversals over the segment rope.
//!
//! Both traversals are driven by one [`Rope::walk`]; neither performs any
//! per-line or per-segment descent. Iterating lines and then looking up each
//! line's segments separately turns an `O(n)` render pass into `O(n·m)`
//! random access, so code that needs both must use
//! [`walk_lines_and_segments`].

use crate::text::rope::Rope;
use crate::text::segment::{Segment, TextChunk};
use std::ops::ControlFlow;

/// One logical line as reported by a traversal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LineSpan {
    /// Zero-based logical line index.
    pub index: usize,
    /// Document offset of the line's first column.
    pub start_offset: usize,
    /// Display width of the line.
    pub width: usize,
}

impl LineSpan {
    /// Document offset just past the line's last column.
    #[must_use]
    pub fn end_offset(&self) -> usize {
        self.start_offset + self.width
    }
}

/// Visitor for [`walk_lines_and_segments`].
pub trait LineSegmentVisitor {
    /// Called for each text segment, in order, before its line ends.
    ///
    /// `col` is the segment's starting column within the logical line.
    fn on_segment(&mut self, line: usize, col: usize, chunk: &TextChunk);

    /// Called once per logical line after all of its segments.
    fn on_line_end(&mut self, line: LineSpan);
}

/// Emit every logical line in order.
///
/// The content after the last break is always emitted, so a document ending
/// in a terminator reports one more line than it has terminators. An empty
/// rope (a reset buffer) emits nothing.
pub fn walk_lines<F>(rope: &Rope<Segment>, mut f: F)
where
    F: FnMut(LineSpan),
{
    if rope.is_empty() {
        return;
    }
    let mut line = LineSpan::default();
    let _ = rope.walk(|segment| {
        match segment {
            Segment::Text(chunk) => line.width += chunk.width(),
            Segment::Break => {
                f(line);
                line = LineSpan {
                    index: line.index + 1,
                    start_offset: line.end_offset(),
                    width: 0,
                };
            }
        }
        ControlFlow::Continue(())
    });
    f(line);
}

/// Emit every text segment and every line end in one pass.
///
/// Line ends arrive with the same [`LineSpan`]s [`walk_lines`] produces.
pub fn walk_lines_and_segments<V>(rope: &Rope<Segment>, visitor: &mut V)
where
    V: LineSegmentVisitor + ?Sized,
{
    if rope.is_empty() {
        return;
    }
    let mut line = LineSpan::default();
    let _ = rope.walk(|segment| {
        match segment {
            Segment::Text(chunk) => {
                visitor.on_segment(line.index, line.width, chunk);
                line.width += chunk.width();
            }
            Segment::Break => {
                visitor.on_line_end(line);
                line = LineSpan {
                    index: line.index + 1,
                    start_offset: line.end_offset(),
                    width: 0,
                };
            }
        }
        ControlFlow::Continue(())
    });
    visitor.on_line_end(line);
}

/// Number of logical lines: breaks + 1, or 0 for an empty rope.
#[must_use]
pub fn line_count(rope: &Rope<Segment>) -> usize {
    if rope.is_empty() {
        0
    } else {
        rope.metrics().break_count + 1
    }
}

/// Width of the widest logical line.
#[must_use]
pub fn max_line_width(rope: &Rope<Segment>) -> usize {
    rope.metrics().max_line_width
}

/// Sum of all text widths; also the largest valid document offset.
#[must_use]
pub fn total_width(rope: &Rope<Segment>) -> usize {
    rope.metrics().total_width
}
