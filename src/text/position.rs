//! Offset, position and coordinate conversions.
//!
//! Three coordinate systems meet here:
//!
//! - **Offset**: public document offset in display columns. Line breaks have
//!   no width, so the end of one line and the start of the next share an
//!   offset.
//! - **Position**: internal rope units where every break counts 1
//!   ([`LineMetrics::weight`]). Positions are unambiguous and are what the
//!   rope is split at.
//! - **Coordinates**: `(row, col)` with `col` in display columns.
//!
//! All conversions descend the rope through cached metrics and are
//! `O(log n)`.

use crate::error::{Error, Result};
use crate::text::metrics::LineMetrics;
use crate::text::rope::Rope;
use crate::text::scan::ScanOptions;
use crate::text::segment::Segment;

/// Which side of a run of zero-width breaks an offset resolves to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bias {
    /// Before the breaks: the end of the earlier line.
    Backward,
    /// After the breaks: the start of the later line.
    Forward,
}

/// Row and column of a document location.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Coords {
    pub row: usize,
    pub col: usize,
}

impl Coords {
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

fn check_offset(rope: &Rope<Segment>, offset: usize) -> Result<LineMetrics> {
    let metrics = rope.metrics();
    if offset > metrics.total_width {
        return Err(Error::OutOfRange {
            offset,
            len: metrics.total_width,
        });
    }
    Ok(metrics)
}

/// Resolve a document offset to a rope position.
pub fn offset_to_position(rope: &Rope<Segment>, offset: usize, bias: Bias) -> Result<usize> {
    let metrics = check_offset(rope, offset)?;
    let column = match bias {
        Bias::Forward => offset,
        Bias::Backward if offset == 0 => return Ok(0),
        Bias::Backward => offset - 1,
    };
    let breaks_before = match rope.locate(column, |m| m.total_width) {
        Some((leaf, _)) => rope.metrics_before(leaf).break_count,
        None => metrics.break_count,
    };
    Ok(offset + breaks_before)
}

/// Convert a document offset to coordinates.
///
/// An offset shared by a line end and the next line's start belongs to the
/// next line; the final offset of the document belongs to the last line.
pub fn offset_to_coords(rope: &Rope<Segment>, offset: usize) -> Result<Coords> {
    let metrics = check_offset(rope, offset)?;
    match rope.locate(offset, |m| m.total_width) {
        Some((leaf, _)) => {
            let before = rope.metrics_before(leaf);
            Ok(Coords {
                row: before.break_count,
                col: before.last_line_width + (offset - before.total_width),
            })
        }
        None => Ok(Coords {
            row: metrics.break_count,
            col: metrics.last_line_width,
        }),
    }
}

/// Leaf index where logical line `row` starts and the metrics before it.
///
/// `row` must be at most the break count.
fn line_start(rope: &Rope<Segment>, row: usize) -> (usize, LineMetrics) {
    if row == 0 {
        return (0, LineMetrics::default());
    }
    let leaf = rope
        .locate(row - 1, |m| m.break_count)
        .map_or(rope.len(), |(leaf, _)| leaf + 1);
    (leaf, rope.metrics_before(leaf))
}

/// Start offset and width of logical line `row`, clamping `row` to the last
/// line. `None` for an empty rope.
#[must_use]
pub fn line_extent(rope: &Rope<Segment>, row: usize) -> Option<(usize, usize)> {
    if rope.is_empty() {
        return None;
    }
    let metrics = rope.metrics();
    let row = row.min(metrics.break_count);
    let (_, before) = line_start(rope, row);
    let end_width = if row < metrics.break_count {
        rope.locate(row, |m| m.break_count)
            .map_or(metrics.total_width, |(leaf, _)| {
                rope.metrics_before(leaf).total_width
            })
    } else {
        metrics.total_width
    };
    Some((before.total_width, end_width - before.total_width))
}

/// Convert coordinates to a document offset.
///
/// A row past the last line clamps to the end of the last line; a column
/// past the line end clamps to the line end.
#[must_use]
pub fn coords_to_offset(rope: &Rope<Segment>, row: usize, col: usize) -> usize {
    let metrics = rope.metrics();
    if row > metrics.break_count {
        return metrics.total_width;
    }
    line_extent(rope, row).map_or(0, |(start, width)| start + col.min(width))
}

/// Convert coordinates to a rope position, with the same clamping as
/// [`coords_to_offset`].
#[must_use]
pub fn coords_to_position(rope: &Rope<Segment>, row: usize, col: usize) -> usize {
    let metrics = rope.metrics();
    if row > metrics.break_count {
        return metrics.weight();
    }
    line_extent(rope, row).map_or(0, |(start, width)| start + row + col.min(width))
}

/// Split the rope at a position, cutting a text segment if needed.
///
/// The cut snaps back to the nearest grapheme boundary.
#[must_use]
pub fn split_at_position(
    rope: &Rope<Segment>,
    position: usize,
    options: ScanOptions,
) -> (Rope<Segment>, Rope<Segment>) {
    let Some((leaf, col)) = rope.locate(position, LineMetrics::weight) else {
        return (rope.clone(), Rope::new());
    };
    if col == 0 {
        return rope.split(leaf);
    }
    let (left, rest) = rope.split(leaf);
    let (middle, right) = rest.split(1);
    let Some(Segment::Text(chunk)) = middle.get(0) else {
        return (Rope::concat(left, middle), right);
    };
    let (a, b) = chunk.split_at_col(col, options.width_method, options.tab_width);
    (
        Rope::concat(left, Rope::from_items(a.map(Segment::Text))),
        Rope::concat(Rope::from_items(b.map(Segment::Text)), right),
    )
}
