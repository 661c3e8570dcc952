//! Unicode utilities for grapheme handling and display width.

mod grapheme;
mod search;
mod width;

pub use grapheme::{GraphemeWidths, grapheme_widths, graphemes, is_simple_ascii};
pub use search::{LineBreak, find_line_breaks, is_whitespace_grapheme, is_wrap_break};
pub use width::{
    WidthMethod, display_width_char_with_method, display_width_with_method, grapheme_width,
    text_width,
};
