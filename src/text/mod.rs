//! Document storage and line layout.
//!
//! The document is one balanced rope whose leaves are [`Segment`]s: text
//! runs and zero-width line breaks. Every node caches [`LineMetrics`], so
//! line counts and widths come from the root and offset lookups descend in
//! `O(log n)`. Anything that needs all lines or all segments goes through
//! the single-pass walks in [`traversal`].
//!
//! Key types:
//!
//! - [`TextBuffer`]: the document, its highlights and its view registry
//! - [`TextBufferView`]: wrapped visual lines, viewport and selection
//! - [`Rope`]: the generic tree, usable with any [`Measure`] leaf
//!
//! # Examples
//!
//! ```
//! use opentui_text::{TextBuffer, TextBufferView, WrapMode};
//!
//! let mut buffer = TextBuffer::with_text("Line 1\nLine 2\nLine 3");
//! assert_eq!(buffer.get_line_count().unwrap(), 3);
//! assert_eq!(buffer.get_text_range_by_coords(0, 0, 1, 4).unwrap(), "Line 1\nLine");
//!
//! let view = TextBufferView::new(&buffer, WrapMode::Char, 3).unwrap();
//! assert_eq!(view.get_virtual_line_count().unwrap(), 6);
//!
//! buffer.replace(0, 4, "Row").unwrap();
//! assert_eq!(buffer.get_line(0).unwrap(), "Row 1");
//! assert_eq!(view.get_virtual_line_count().unwrap(), 6);
//! ```

mod buffer;
mod highlight;
mod metrics;
mod position;
mod rope;
mod scan;
mod segment;
pub mod traversal;
mod view;
mod wrap;

pub use buffer::{LineEnding, LineTable, TextBuffer, TextBufferOptions};
pub use highlight::{Highlight, LineHighlight};
pub use metrics::{LineMetrics, Measure, Metrics};
pub use position::{
    Bias, Coords, coords_to_offset, coords_to_position, line_extent, offset_to_coords,
    offset_to_position, split_at_position,
};
pub use rope::{Rope, WalkControl};
pub use scan::{MAX_CHUNK_BYTES, ScanOptions, scan_segments};
pub use segment::{Segment, TextChunk};
pub use traversal::{LineSegmentVisitor, LineSpan, walk_lines, walk_lines_and_segments};
pub use view::{LineInfo, Selection, TextBufferView, TextMeasure, Viewport};
pub use wrap::{VisualLine, WrapMode, WrapVisitor};
