//! Fuzz target for buffer edits and wrap-view rebuilds.
//!
//! Drives a buffer and a view through arbitrary operations and checks that
//! nothing panics and that the cached line metrics keep matching a fresh
//! traversal.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use opentui_text::{TextBuffer, TextBufferView, WrapMode};

#[derive(Arbitrary, Debug)]
enum Op {
    SetText(String),
    Append(String),
    Replace { start: u16, end: u16, text: String },
    ReplaceByCoords { a: (u8, u8), b: (u8, u8), text: String },
    Wrap { mode: u8, width: u8 },
    Select { anchor: u16, focus: u16 },
    Reset,
}

fuzz_target!(|ops: Vec<Op>| {
    let mut buffer = TextBuffer::new();
    let Ok(mut view) = TextBufferView::new(&buffer, WrapMode::Word, 20) else {
        return;
    };

    for op in ops.into_iter().take(64) {
        match op {
            Op::SetText(text) => buffer.set_text(&text).unwrap(),
            Op::Append(text) => buffer.append(&text).unwrap(),
            Op::Replace { start, end, text } => {
                // Out-of-range edits must fail without touching the document.
                let _ = buffer.replace(usize::from(start), usize::from(end), &text);
            }
            Op::ReplaceByCoords { a, b, text } => {
                let _ = buffer.replace_by_coords(
                    usize::from(a.0),
                    usize::from(a.1),
                    usize::from(b.0),
                    usize::from(b.1),
                    &text,
                );
            }
            Op::Wrap { mode, width } => {
                let mode = match mode % 3 {
                    0 => WrapMode::None,
                    1 => WrapMode::Char,
                    _ => WrapMode::Word,
                };
                view.set_wrap_mode(mode).unwrap();
                view.set_wrap_width(Some(usize::from(width))).unwrap();
            }
            Op::Select { anchor, focus } => {
                let _ = view.set_selection(usize::from(anchor), usize::from(focus));
                let _ = view.get_selected_text().unwrap();
            }
            Op::Reset => buffer.reset().unwrap(),
        }

        let table = buffer.line_info().unwrap();
        assert_eq!(table.line_count(), buffer.get_line_count().unwrap());
        assert_eq!(table.max_width, buffer.max_line_width().unwrap());
        let info = view.line_info().unwrap();
        for i in 0..info.virtual_line_count() {
            let _ = view.visual_line_text(i).unwrap();
        }
    }
});
