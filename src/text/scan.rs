//! Raw text ingestion.
//!
//! Incoming text is copied once into a shared `Arc<str>`; every segment
//! produced from it borrows a byte range of that allocation. Line
//! terminators (LF, CR, CRLF) become [`Segment::Break`] and are never stored
//! as text.

use crate::text::segment::{Segment, TextChunk};
use crate::unicode::{WidthMethod, find_line_breaks, graphemes};
use std::sync::Arc;

/// Text runs longer than this are cut into several chunks at grapheme
/// boundaries so edits inside very long lines stay cheap.
pub const MAX_CHUNK_BYTES: usize = 4096;

/// Width settings used while measuring new text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScanOptions {
    pub width_method: WidthMethod,
    pub tab_width: usize,
}

/// Split `text` into alternating text and break segments.
///
/// Empty text yields no segments. Empty lines produce no text segment, so
/// `"a\n\nb"` becomes `[Text("a"), Break, Break, Text("b")]`.
#[must_use]
pub fn scan_segments(text: &str, options: ScanOptions) -> Vec<Segment> {
    if text.is_empty() {
        return Vec::new();
    }
    let source: Arc<str> = Arc::from(text);
    let breaks = find_line_breaks(&source);
    let mut segments = Vec::with_capacity(breaks.len() * 2 + 1);
    let mut line_start = 0;

    for brk in &breaks {
        push_run(&mut segments, &source, line_start, brk.pos, options);
        segments.push(Segment::Break);
        line_start = brk.pos + usize::from(brk.len);
    }
    push_run(&mut segments, &source, line_start, source.len(), options);

    segments
}

fn push_run(
    segments: &mut Vec<Segment>,
    source: &Arc<str>,
    start: usize,
    end: usize,
    options: ScanOptions,
) {
    if start >= end {
        return;
    }
    let ScanOptions {
        width_method,
        tab_width,
    } = options;

    if end - start <= MAX_CHUNK_BYTES {
        segments.push(Segment::Text(TextChunk::new(
            Arc::clone(source),
            start,
            end,
            width_method,
            tab_width,
        )));
        return;
    }

    let mut chunk_start = start;
    let mut pos = start;
    for grapheme in graphemes(&source[start..end]) {
        if pos - chunk_start >= MAX_CHUNK_BYTES {
            segments.push(Segment::Text(TextChunk::new(
                Arc::clone(source),
                chunk_start,
                pos,
                width_method,
                tab_width,
            )));
            chunk_start = pos;
        }
        pos += grapheme.len();
    }
    if chunk_start < end {
        segments.push(Segment::Text(TextChunk::new(
            Arc::clone(source),
            chunk_start,
            end,
            width_method,
            tab_width,
        )));
    }
}
