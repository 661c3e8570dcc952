//! Grapheme cluster iteration.

use crate::unicode::width::{WidthMethod, grapheme_width};
use unicode_segmentation::{GraphemeIndices, UnicodeSegmentation};

/// Iterate over grapheme clusters in a string.
pub fn graphemes(s: &str) -> impl Iterator<Item = &str> {
    s.graphemes(true)
}

/// Check if a string holds only printable ASCII (0x20..=0x7E).
///
/// Such strings need no segmentation: every byte is a grapheme of width 1.
#[inline]
#[must_use]
pub fn is_simple_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7e).contains(&b))
}

/// Iterator over `(byte_offset, grapheme, width)` triples.
///
/// Printable ASCII input is walked byte by byte; anything else goes through
/// extended grapheme segmentation.
pub enum GraphemeWidths<'a> {
    Ascii {
        text: &'a str,
        pos: usize,
    },
    Unicode {
        inner: GraphemeIndices<'a>,
        method: WidthMethod,
        tab_width: usize,
    },
}

impl<'a> Iterator for GraphemeWidths<'a> {
    type Item = (usize, &'a str, usize);

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::Ascii { text, pos } => {
                if *pos >= text.len() {
                    return None;
                }
                let start = *pos;
                *pos += 1;
                Some((start, &text[start..start + 1], 1))
            }
            Self::Unicode {
                inner,
                method,
                tab_width,
            } => inner
                .next()
                .map(|(offset, g)| (offset, g, grapheme_width(g, *method, *tab_width))),
        }
    }
}

/// Iterate graphemes with their display widths.
#[must_use]
pub fn grapheme_widths(s: &str, method: WidthMethod, tab_width: usize) -> GraphemeWidths<'_> {
    if is_simple_ascii(s) {
        GraphemeWidths::Ascii { text: s, pos: 0 }
    } else {
        GraphemeWidths::Unicode {
            inner: s.grapheme_indices(true),
            method,
            tab_width,
        }
    }
}
