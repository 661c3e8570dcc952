//! Display width calculation for terminal rendering.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Width calculation method for ambiguous-width characters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum WidthMethod {
    /// POSIX-like wcwidth: ambiguous width = 1.
    #[default]
    WcWidth,
    /// Unicode East Asian Width: ambiguous width = 2.
    Unicode,
}

/// Get the display width of a string in terminal columns using a specific method.
#[must_use]
pub fn display_width_with_method(s: &str, method: WidthMethod) -> usize {
    match method {
        WidthMethod::WcWidth => UnicodeWidthStr::width(s),
        WidthMethod::Unicode => UnicodeWidthStr::width_cjk(s),
    }
}

/// Get the display width of a character in terminal columns using a specific method.
#[must_use]
pub fn display_width_char_with_method(c: char, method: WidthMethod) -> usize {
    match method {
        WidthMethod::WcWidth => UnicodeWidthChar::width(c).unwrap_or(0),
        WidthMethod::Unicode => UnicodeWidthChar::width_cjk(c).unwrap_or(0),
    }
}

/// Width of a single grapheme cluster.
///
/// Tabs occupy a fixed `tab_width` columns rather than advancing to a tab
/// stop, so a grapheme's width never depends on where it sits in the line.
#[inline]
#[must_use]
pub fn grapheme_width(grapheme: &str, method: WidthMethod, tab_width: usize) -> usize {
    match grapheme.as_bytes() {
        [b'\t'] => tab_width,
        [b] if (0x20..=0x7e).contains(b) => 1,
        _ => display_width_with_method(grapheme, method),
    }
}

/// Width of a string as the sum of its grapheme widths.
///
/// Always use this (never `UnicodeWidthStr::width` on the whole run) for
/// anything stored in the rope, so that stored widths agree with per-grapheme
/// scans during wrapping and offset lookup.
#[must_use]
pub fn text_width(s: &str, method: WidthMethod, tab_width: usize) -> usize {
    if super::is_simple_ascii(s) {
        return s.len();
    }
    super::grapheme_widths(s, method, tab_width)
        .map(|(_, _, width)| width)
        .sum()
}
