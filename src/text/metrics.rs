//! Associative per-subtree line metrics.
//!
//! Every rope node caches the [`LineMetrics`] of its subtree. Combining the
//! metrics of two adjacent subtrees yields the metrics of their
//! concatenation, which is what lets line count, maximum line width and
//! offset lookups run without visiting leaves.

/// Monoid contract for rope node summaries.
///
/// `Default::default()` must be the identity of [`combine`](Self::combine),
/// and `combine` must be associative.
pub trait Metrics: Clone + Default {
    /// Summary of `left` followed by `right`.
    #[must_use]
    fn combine(left: &Self, right: &Self) -> Self;
}

/// A rope leaf that can summarize itself.
pub trait Measure {
    type Metrics: Metrics;

    fn measure(&self) -> Self::Metrics;
}

/// Width and line-break summary of a run of segments.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LineMetrics {
    /// Sum of text widths. Breaks contribute 0.
    pub total_width: usize,
    /// Number of line breaks.
    pub break_count: usize,
    /// Width from the start to the first break (or `total_width`).
    pub first_line_width: usize,
    /// Width from the last break to the end (or `total_width`).
    pub last_line_width: usize,
    /// Widest line, counting partial lines at either edge.
    pub max_line_width: usize,
    /// Whether every text run is ASCII.
    pub ascii_only: bool,
    /// Total UTF-8 length of the text runs.
    pub byte_len: usize,
}

impl Default for LineMetrics {
    fn default() -> Self {
        Self {
            total_width: 0,
            break_count: 0,
            first_line_width: 0,
            last_line_width: 0,
            max_line_width: 0,
            ascii_only: true,
            byte_len: 0,
        }
    }
}

impl LineMetrics {
    /// Metrics of a single text run.
    #[must_use]
    pub fn text(width: usize, byte_len: usize, ascii: bool) -> Self {
        Self {
            total_width: width,
            break_count: 0,
            first_line_width: width,
            last_line_width: width,
            max_line_width: width,
            ascii_only: ascii,
            byte_len,
        }
    }

    /// Metrics of a single line break.
    #[must_use]
    pub fn line_break() -> Self {
        Self {
            break_count: 1,
            ..Self::default()
        }
    }

    /// Position-space length: every column plus one unit per break.
    #[must_use]
    pub fn weight(&self) -> usize {
        self.total_width + self.break_count
    }
}

impl Metrics for LineMetrics {
    fn combine(left: &Self, right: &Self) -> Self {
        let first_line_width = if left.break_count == 0 {
            left.total_width + right.first_line_width
        } else {
            left.first_line_width
        };
        let last_line_width = if right.break_count == 0 {
            left.last_line_width + right.total_width
        } else {
            right.last_line_width
        };

        // The line straddling the seam is counted whether or not `left` has a
        // break: with no break on the left it is `left.total_width +
        // right.first_line_width`, which neither child's max covers.
        let boundary_join = left.last_line_width + right.first_line_width;

        Self {
            total_width: left.total_width + right.total_width,
            break_count: left.break_count + right.break_count,
            first_line_width,
            last_line_width,
            max_line_width: left
                .max_line_width
                .max(right.max_line_width)
                .max(boundary_join),
            ascii_only: left.ascii_only && right.ascii_only,
            byte_len: left.byte_len + right.byte_len,
        }
    }
}
