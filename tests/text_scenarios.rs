//! End-to-end scenarios for the document buffer and wrap view.
//!
//! Engine log callbacks are forwarded into `tracing` so `--nocapture` runs
//! show rebuilds and edits next to the test output.

use opentui_text::text::traversal::{walk_lines, walk_lines_and_segments};
use opentui_text::text::{LineSegmentVisitor, LineSpan, TextChunk};
use opentui_text::{
    Coords, Error, Highlight, LineEnding, LogLevel, TextBuffer, TextBufferOptions,
    TextBufferView, Viewport, WidthMethod, WrapMode, set_log_callback,
};
use tracing::{Level, debug, info, span};

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_target(true)
        .with_test_writer()
        .try_init();
    set_log_callback(|level, message| match level {
        LogLevel::Debug => debug!(target: "opentui_text", "{message}"),
        LogLevel::Info => info!(target: "opentui_text", "{message}"),
        LogLevel::Warn => tracing::warn!(target: "opentui_text", "{message}"),
        LogLevel::Error => tracing::error!(target: "opentui_text", "{message}"),
    });
}

fn render(view: &TextBufferView) -> String {
    let info = view.line_info().unwrap();
    let mut out = String::new();
    for i in 0..info.virtual_line_count() {
        let marker = if info.wraps[i] { "+" } else { ":" };
        let line = format!(
            "{}{marker} {}",
            info.sources[i],
            view.visual_line_text(i).unwrap()
        );
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

// ============================================================================
// Buffer scenarios
// ============================================================================

#[test]
fn scenario_basic() {
    init_logging();
    let _span = span!(Level::INFO, "scenario_basic").entered();

    let mut buffer = TextBuffer::new();
    buffer.set_text("Line 1\nLine 2\nLine 3").unwrap();
    assert_eq!(buffer.get_line_count().unwrap(), 3);
    assert_eq!(
        buffer.get_text_range_by_coords(0, 0, 1, 4).unwrap(),
        "Line 1\nLine"
    );
    info!("basic scenario passed");
}

#[test]
fn scenario_trailing_terminator() {
    init_logging();
    let buffer = TextBuffer::with_text("Hello\n");
    assert_eq!(buffer.get_line_count().unwrap(), 2);
    assert_eq!(buffer.line_span(1).unwrap().width, 0);
    assert_eq!(buffer.line_info().unwrap().widths, vec![5, 0]);
}

#[test]
fn scenario_coordinate_boundary() {
    init_logging();
    let buffer = TextBuffer::with_text("AB\nCD");
    assert_eq!(buffer.coords_to_offset(0, 2).unwrap(), 2);
    assert_eq!(buffer.offset_to_coords(2).unwrap(), Coords::new(1, 0));
    assert_eq!(buffer.offset_to_coords(4).unwrap(), Coords::new(1, 2));
}

#[test]
fn empty_text_is_one_line_reset_is_zero() {
    let mut buffer = TextBuffer::with_text("something");
    buffer.set_text("").unwrap();
    assert_eq!(buffer.get_line_count().unwrap(), 1);
    buffer.reset().unwrap();
    assert_eq!(buffer.get_line_count().unwrap(), 0);
}

#[test]
fn mixed_terminators_round_trip_normalized() {
    let options = TextBufferOptions::default().with_line_ending(LineEnding::CrLf);
    let mut buffer = TextBuffer::with_options(options);
    buffer.set_text("a\nb\r\nc\rd").unwrap();
    assert_eq!(buffer.get_line_count().unwrap(), 4);
    assert_eq!(buffer.get_text().unwrap(), "a\r\nb\r\nc\r\nd");
}

#[test]
fn tab_width_and_width_method_options() {
    let options = TextBufferOptions::default()
        .with_tab_width(8)
        .with_width_method(WidthMethod::Unicode);
    let mut buffer = TextBuffer::with_options(options);
    buffer.set_text("\tx\n±").unwrap();
    assert_eq!(buffer.line_span(0).unwrap().width, 9);
    // Ambiguous-width characters are double width under the Unicode method.
    assert_eq!(buffer.line_span(1).unwrap().width, 2);
    assert_eq!(buffer.options().unwrap().tab_width, 8);
}

#[test]
fn edits_splice_without_rebuilding() {
    init_logging();
    let mut buffer = TextBuffer::with_text("fn main() {\n}\n");
    let end = buffer.total_width().unwrap();
    // Offset 11 is shared with the start of line 1; coordinates pick the
    // end of line 0.
    buffer
        .replace_by_coords(0, 11, 0, 11, "\n    println!(\"hi\");")
        .unwrap();
    assert_eq!(
        buffer.get_text().unwrap(),
        "fn main() {\n    println!(\"hi\");\n}\n"
    );
    assert_eq!(buffer.get_line_count().unwrap(), 4);
    assert_eq!(buffer.total_width().unwrap(), end + 19);

    // Delete the inserted line, including its break, by coordinates.
    buffer.replace_by_coords(0, 11, 1, 19, "").unwrap();
    assert_eq!(buffer.get_text().unwrap(), "fn main() {\n}\n");
}

#[test]
fn streaming_append() {
    let mut buffer = TextBuffer::new();
    for chunk in ["first li", "ne\nsecond", " line\n", "third"] {
        buffer.append(chunk).unwrap();
    }
    assert_eq!(buffer.get_line_count().unwrap(), 3);
    assert_eq!(buffer.get_line(0).unwrap(), "first line");
    assert_eq!(buffer.get_line(2).unwrap(), "third");
}

#[test]
fn out_of_range_is_reported_not_clamped() {
    let mut buffer = TextBuffer::with_text("abc");
    let err = buffer.get_text_range(0, 10).unwrap_err();
    assert!(err.is_out_of_range());
    assert_eq!(err, Error::OutOfRange { offset: 10, len: 3 });
    assert!(buffer.replace(4, 4, "x").is_err());
    assert_eq!(buffer.get_text().unwrap(), "abc");
}

#[test]
fn highlights_are_per_line_on_read() {
    let mut buffer = TextBuffer::with_text("let x = 1;\nlet y = 2;");
    buffer
        .add_highlight_by_char_range(Highlight::new(0..3, 1).with_ref(1))
        .unwrap();
    buffer
        .add_highlight_by_char_range(Highlight::new(10..13, 1).with_ref(1))
        .unwrap();
    buffer
        .add_highlight(1, Highlight::new(8..9, 2).with_priority(5))
        .unwrap();

    let line1 = buffer.get_line_highlights(1).unwrap();
    assert_eq!(line1.len(), 2);
    assert_eq!((line1[0].col_start, line1[0].col_end), (0, 3));
    assert_eq!((line1[1].col_start, line1[1].col_end, line1[1].priority), (8, 9, 5));

    assert_eq!(buffer.remove_highlights_by_ref(1).unwrap(), 2);
    assert_eq!(buffer.highlight_count().unwrap(), 1);
    buffer.clear_highlights().unwrap();
    assert!(buffer.get_line_highlights(0).unwrap().is_empty());
}

#[test]
fn destroyed_handles_fail_explicitly() {
    let mut buffer = TextBuffer::with_text("abc");
    let mut view = TextBufferView::new(&buffer, WrapMode::Word, 10).unwrap();
    view.destroy().unwrap();
    assert!(matches!(
        view.get_selected_text(),
        Err(Error::InvalidState(_))
    ));
    buffer.destroy().unwrap();
    assert!(matches!(buffer.get_line_count(), Err(Error::InvalidState(_))));
}

// ============================================================================
// Traversal
// ============================================================================

struct Collect {
    segments: Vec<(usize, usize, String)>,
    ends: Vec<LineSpan>,
}

impl LineSegmentVisitor for Collect {
    fn on_segment(&mut self, line: usize, col: usize, chunk: &TextChunk) {
        self.segments.push((line, col, chunk.as_str().to_string()));
    }

    fn on_line_end(&mut self, line: LineSpan) {
        self.ends.push(line);
    }
}

#[test]
fn combined_traversal_after_edits() {
    let mut buffer = TextBuffer::with_text("alpha\nbeta\ngamma");
    buffer.replace(2, 2, "XX").unwrap();
    buffer.replace(9, 9, "YY").unwrap();

    let table = buffer.line_info().unwrap();
    assert_eq!(table.line_count(), 3);

    let shared = buffer.get_text().unwrap();
    assert_eq!(shared, "alXXpha\nbeYYta\ngamma");

    // The public traversal works on any segment rope; rebuild one from text.
    let rope = opentui_text::Rope::from_items(opentui_text::text::scan_segments(
        &shared,
        opentui_text::text::ScanOptions {
            width_method: WidthMethod::WcWidth,
            tab_width: 4,
        },
    ));
    let mut collect = Collect {
        segments: Vec::new(),
        ends: Vec::new(),
    };
    walk_lines_and_segments(&rope, &mut collect);
    let mut lines = Vec::new();
    walk_lines(&rope, |span| lines.push(span));
    assert_eq!(collect.ends, lines);
    assert_eq!(table.starts, lines.iter().map(|l| l.start_offset).collect::<Vec<_>>());
    assert_eq!(collect.segments[0], (0, 0, "alXXpha".to_string()));
}

// ============================================================================
// View scenarios
// ============================================================================

#[test]
fn scenario_forced_char_wrap() {
    init_logging();
    let buffer = TextBuffer::with_text("AAAAAAAAAA");
    let view = TextBufferView::new(&buffer, WrapMode::Word, 5).unwrap();
    assert_eq!(view.get_virtual_line_count().unwrap(), 2);
    for i in 0..2 {
        assert_eq!(view.get_visual_line_at(i).unwrap().width, 5);
    }
}

#[test]
fn word_wrap_layout_snapshot() {
    init_logging();
    let buffer = TextBuffer::with_text(
        "The quick brown fox jumps over the lazy dog.\n\nsupercalifragilistic, expialidocious",
    );
    let view = TextBufferView::new(&buffer, WrapMode::Word, 12).unwrap();
    insta::assert_snapshot!(render(&view), @r"
    0: The quick
    0+ brown fox
    0+ jumps over
    0+ the lazy
    0+ dog.
    1:
    2: supercalifra
    2+ gilistic,
    2+ expialidocio
    2+ us
    ");
}

#[test]
fn views_follow_buffer_edits() {
    init_logging();
    let mut buffer = TextBuffer::with_text("one two three");
    let char_view = TextBufferView::new(&buffer, WrapMode::Char, 4).unwrap();
    let word_view = TextBufferView::new(&buffer, WrapMode::Word, 4).unwrap();
    assert_eq!(buffer.view_count().unwrap(), 2);

    assert_eq!(char_view.get_virtual_line_count().unwrap(), 4);
    assert_eq!(word_view.get_virtual_line_count().unwrap(), 4);

    buffer.replace(3, 3, "\n").unwrap();
    assert!(char_view.is_dirty().unwrap());
    assert!(word_view.is_dirty().unwrap());
    assert_eq!(char_view.line_info().unwrap().sources, vec![0, 1, 1, 1]);
    assert_eq!(word_view.visual_line_text(0).unwrap(), "one");
}

#[test]
fn selection_survives_wrap_and_viewport_changes() {
    let buffer = TextBuffer::with_text("0123456789\nabcdefghij");
    let mut view = TextBufferView::new(&buffer, WrapMode::Char, 4).unwrap();
    view.set_selection(12, 3).unwrap();
    assert_eq!(view.get_selected_text().unwrap(), "3456789\nab");

    view.set_wrap_mode(WrapMode::None).unwrap();
    view.set_viewport(Viewport::new(0, 0, 3, 1)).unwrap();
    assert!(view.has_selection().unwrap());
    assert_eq!(view.get_selected_text().unwrap(), "3456789\nab");
    assert_eq!(view.selection_in_visual_line(1).unwrap(), Some((0, 2)));

    view.clear_selection().unwrap();
    assert_eq!(view.selection().unwrap(), None);
}

#[test]
fn viewport_scrolls_within_wrapped_content() {
    let text = "word ".repeat(40);
    let buffer = TextBuffer::with_text(text.trim_end());
    let mut view = TextBufferView::new(&buffer, WrapMode::Word, 10).unwrap();
    let total = view.get_virtual_line_count().unwrap();
    assert_eq!(total, 20);

    let vp = view.set_viewport(Viewport::new(5, 50, 10, 5)).unwrap();
    assert_eq!(vp.y, total - 5);
    // Wrapped content never scrolls horizontally, so x is left as given.
    assert_eq!(vp.x, 5);

    let cursor = view
        .set_viewport_with_cursor(Viewport::new(0, 10, 10, 5), 0)
        .unwrap();
    assert_eq!(view.offset_to_visual(cursor).unwrap().0, 10);
}
