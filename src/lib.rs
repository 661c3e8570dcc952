//! `opentui_text` - segment rope and line-wrap layout for terminal editors
//!
//! Holds arbitrarily large documents in one balanced tree of text runs and
//! line breaks, answers line/column queries from cached metrics, and derives
//! wrapped visual lines for rendering in a single pass.

// Crate-level lint configuration
#![warn(unsafe_code)]
#![allow(clippy::module_name_repetitions)] // TextBuffer in text, etc.
#![allow(clippy::missing_errors_doc)] // Every fallible op documents its Error variants in one place
#![allow(clippy::missing_panics_doc)] // Docs WIP
#![allow(clippy::missing_const_for_fn)] // Many functions could be const, not critical
#![allow(clippy::doc_markdown)] // Allow technical names without backticks
#![allow(clippy::use_self)] // Allow explicit type names in impl blocks
#![allow(clippy::needless_pass_by_value)] // Allow pass by value for small Copy types
#![allow(clippy::collapsible_if)] // Sometimes nested ifs are clearer
#![allow(clippy::items_after_statements)] // Common pattern in tests
#![allow(clippy::redundant_clone)] // Clones in tests for clarity are fine
#![allow(clippy::needless_range_loop)] // Byte-indexed ASCII fast paths

pub mod error;
pub mod event;
pub mod text;
pub mod unicode;

// Re-export core types at crate root
pub use error::{Error, Result};
pub use event::{LogLevel, emit_event, emit_log, set_event_callback, set_log_callback};
pub use text::{
    Coords, Highlight, LineEnding, LineHighlight, LineInfo, Rope, Segment, Selection,
    TextBuffer, TextBufferOptions, TextBufferView, TextMeasure, Viewport, VisualLine, WrapMode,
};
pub use unicode::WidthMethod;
