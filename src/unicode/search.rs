//! SIMD-assisted text scanning.
//!
//! Line terminators are located with `memchr`, which vectorizes the search
//! on every platform it supports. Wrap-break classification works on single
//! graphemes because the wrap pass already walks graphemes one at a time.

use memchr::memchr2_iter;

/// A line terminator found in raw input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LineBreak {
    /// Byte offset where the terminator starts.
    pub pos: usize,
    /// Terminator length: 1 for LF or lone CR, 2 for CRLF.
    pub len: u8,
}

/// Find all line breaks in a string.
///
/// Detects LF (`\n`), CR (`\r`), and CRLF (`\r\n`) sequences; a CRLF pair is
/// reported once.
#[must_use]
pub fn find_line_breaks(text: &str) -> Vec<LineBreak> {
    let bytes = text.as_bytes();
    let mut breaks = Vec::new();
    let mut skip_lf_at = None;

    for pos in memchr2_iter(b'\n', b'\r', bytes) {
        if skip_lf_at == Some(pos) {
            continue;
        }
        if bytes[pos] == b'\r' && bytes.get(pos + 1) == Some(&b'\n') {
            breaks.push(LineBreak { pos, len: 2 });
            skip_lf_at = Some(pos + 1);
        } else {
            breaks.push(LineBreak { pos, len: 1 });
        }
    }

    breaks
}

/// Check whether a grapheme is whitespace.
#[inline]
#[must_use]
pub fn is_whitespace_grapheme(grapheme: &str) -> bool {
    grapheme.chars().next().is_some_and(char::is_whitespace)
}

/// Check whether word wrap may break after this grapheme.
#[inline]
#[must_use]
pub fn is_wrap_break(grapheme: &str) -> bool {
    let Some(ch) = grapheme.chars().next() else {
        return false;
    };
    ch.is_whitespace()
        || matches!(
            ch,
            '.' | ','
                | ';'
                | ':'
                | '!'
                | '?'
                | '-'
                | '/'
                | '\\'
                | ')'
                | ']'
                | '}'
                | '>'
                | '\u{2010}'
                | '\u{2013}'
                | '\u{2014}'
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_line_breaks() {
        let result = find_line_breaks("a\nb\r\nc\rd");
        assert_eq!(
            result,
            vec![
                LineBreak { pos: 1, len: 1 },
                LineBreak { pos: 3, len: 2 },
                LineBreak { pos: 6, len: 1 },
            ]
        );
    }

    #[test]
    fn test_find_line_breaks_empty() {
        assert!(find_line_breaks("").is_empty());
        assert!(find_line_breaks("no breaks here").is_empty());
    }

    #[test]
    fn test_find_line_breaks_cr_then_crlf() {
        let result = find_line_breaks("\r\r\n\n");
        assert_eq!(
            result,
            vec![
                LineBreak { pos: 0, len: 1 },
                LineBreak { pos: 1, len: 2 },
                LineBreak { pos: 3, len: 1 },
            ]
        );
    }

    #[test]
    fn test_wrap_break_classes() {
        assert!(is_wrap_break(" "));
        assert!(is_wrap_break("\t"));
        assert!(is_wrap_break("-"));
        assert!(is_wrap_break(","));
        assert!(!is_wrap_break("a"));
        assert!(!is_wrap_break("("));
        assert!(!is_wrap_break(""));
    }

    #[test]
    fn test_whitespace_grapheme() {
        assert!(is_whitespace_grapheme(" "));
        assert!(is_whitespace_grapheme("\u{3000}"));
        assert!(!is_whitespace_grapheme("x"));
    }
}
