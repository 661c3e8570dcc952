//! Error types for the text engine.

use std::fmt;

/// Result type alias for text engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for text engine operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// Document offset past the end of the document.
    OutOfRange { offset: usize, len: usize },
    /// Range whose start lies after its end.
    InvalidRange { start: usize, end: usize },
    /// Logical line index past the last line.
    LineOutOfRange { line: usize, count: usize },
    /// Visual line index past the end of the wrap cache.
    VisualLineOutOfRange { index: usize, count: usize },
    /// Operation on a destroyed buffer or view.
    InvalidState(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange { offset, len } => {
                write!(f, "offset {offset} out of range for document of width {len}")
            }
            Self::InvalidRange { start, end } => {
                write!(f, "invalid range {start}..{end}")
            }
            Self::LineOutOfRange { line, count } => {
                write!(f, "line {line} out of range ({count} lines)")
            }
            Self::VisualLineOutOfRange { index, count } => {
                write!(f, "visual line {index} out of range ({count} lines)")
            }
            Self::InvalidState(what) => write!(f, "invalid state: {what}"),
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    /// Whether the error is an index past the end of something.
    #[must_use]
    pub fn is_out_of_range(&self) -> bool {
        matches!(
            self,
            Self::OutOfRange { .. } | Self::LineOutOfRange { .. } | Self::VisualLineOutOfRange { .. }
        )
    }
}
