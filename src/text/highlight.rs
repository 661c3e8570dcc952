//! Highlight ranges kept alongside the document.
//!
//! Highlights are stored as a flat list of absolute document ranges,
//! independent of the rope. Per-line views are derived on demand when a line
//! is rendered; nothing is threaded through rope nodes.

use std::ops::Range;

/// A styled range in document offsets.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Highlight {
    /// Document offset range (columns, breaks have no width).
    pub range: Range<usize>,
    /// Caller-defined style identifier.
    pub style_id: u32,
    /// Priority for overlapping highlights (higher wins).
    pub priority: u8,
    /// Optional highlight reference ID for batch removal.
    pub ref_id: Option<u16>,
}

impl Highlight {
    /// Create a new highlight.
    #[must_use]
    pub fn new(range: Range<usize>, style_id: u32) -> Self {
        Self {
            range,
            style_id,
            priority: 0,
            ref_id: None,
        }
    }

    /// Create a highlight with priority.
    #[must_use]
    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    /// Attach a highlight reference ID.
    #[must_use]
    pub fn with_ref(mut self, ref_id: u16) -> Self {
        self.ref_id = Some(ref_id);
        self
    }

    /// Check if this highlight overlaps a range.
    #[must_use]
    pub fn overlaps(&self, range: &Range<usize>) -> bool {
        self.range.start < range.end && range.start < self.range.end
    }

    /// Check if this highlight contains a position.
    #[must_use]
    pub fn contains(&self, pos: usize) -> bool {
        self.range.contains(&pos)
    }

    /// Check if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.range.start >= self.range.end
    }
}

/// A highlight clipped to one logical line, in line-local columns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineHighlight {
    pub col_start: usize,
    pub col_end: usize,
    pub style_id: u32,
    pub priority: u8,
    pub ref_id: Option<u16>,
}

/// Flat collection of highlights.
#[derive(Clone, Debug, Default)]
pub(crate) struct HighlightStore {
    entries: Vec<Highlight>,
}

impl HighlightStore {
    pub(crate) fn add(&mut self, highlight: Highlight) {
        if !highlight.is_empty() {
            self.entries.push(highlight);
        }
    }

    pub(crate) fn remove_by_ref(&mut self, ref_id: u16) -> usize {
        let before = self.entries.len();
        self.entries.retain(|h| h.ref_id != Some(ref_id));
        before - self.entries.len()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub(crate) fn iter(&self) -> impl Iterator<Item = &Highlight> {
        self.entries.iter()
    }

    /// Highlights intersecting `start..start + width`, clipped to line columns
    /// and ordered by start column then priority.
    ///
    /// Empty lines pick up highlights that strictly span their offset.
    pub(crate) fn for_line(&self, start: usize, width: usize) -> Vec<LineHighlight> {
        let end = start + width;
        let mut out: Vec<LineHighlight> = self
            .entries
            .iter()
            .filter(|h| {
                if width == 0 {
                    h.range.start <= start && start < h.range.end
                } else {
                    h.overlaps(&(start..end))
                }
            })
            .map(|h| LineHighlight {
                col_start: h.range.start.max(start) - start,
                col_end: h.range.end.min(end) - start,
                style_id: h.style_id,
                priority: h.priority,
                ref_id: h.ref_id,
            })
            .collect();
        out.sort_by_key(|h| (h.col_start, h.priority));
        out
    }

    /// Adjust ranges after `start..end` was replaced by `inserted` columns.
    ///
    /// Points after the edit shift; points inside the removed range collapse
    /// to `start`. Highlights left empty are dropped.
    pub(crate) fn apply_edit(&mut self, start: usize, end: usize, inserted: usize) {
        let map = |p: usize| {
            if p <= start {
                p
            } else if p >= end {
                p - (end - start) + inserted
            } else {
                start
            }
        };
        for h in &mut self.entries {
            h.range = map(h.range.start)..map(h.range.end);
        }
        self.entries.retain(|h| !h.is_empty());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highlight_overlap() {
        let a = Highlight::new(0..10, 1);
        assert!(a.overlaps(&(5..15)));
        assert!(!a.overlaps(&(10..20))); // adjacent, not overlapping
    }

    #[test]
    fn test_highlight_contains() {
        let h = Highlight::new(5..10, 1);
        assert!(!h.contains(4));
        assert!(h.contains(5));
        assert!(h.contains(9));
        assert!(!h.contains(10));
    }

    #[test]
    fn test_for_line_clips() {
        let mut store = HighlightStore::default();
        store.add(Highlight::new(3..9, 7).with_priority(2));
        // Line spans offsets 6..10.
        let hl = store.for_line(6, 4);
        assert_eq!(
            hl,
            vec![LineHighlight {
                col_start: 0,
                col_end: 3,
                style_id: 7,
                priority: 2,
                ref_id: None,
            }]
        );
        assert!(store.for_line(0, 3).is_empty());
    }

    #[test]
    fn test_for_line_empty_line() {
        let mut store = HighlightStore::default();
        store.add(Highlight::new(2..5, 1));
        assert_eq!(store.for_line(3, 0).len(), 1);
        assert!(store.for_line(5, 0).is_empty());
    }

    #[test]
    fn test_empty_highlight_ignored() {
        let mut store = HighlightStore::default();
        store.add(Highlight::new(4..4, 1));
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_remove_by_ref() {
        let mut store = HighlightStore::default();
        store.add(Highlight::new(0..2, 1).with_ref(9));
        store.add(Highlight::new(2..4, 1).with_ref(3));
        store.add(Highlight::new(4..6, 1).with_ref(9));
        assert_eq!(store.remove_by_ref(9), 2);
        assert_eq!(store.iter().count(), 1);
    }

    #[test]
    fn test_apply_edit() {
        let mut store = HighlightStore::default();
        store.add(Highlight::new(0..2, 1));
        store.add(Highlight::new(3..5, 2));
        store.add(Highlight::new(6..10, 3));
        store.add(Highlight::new(1..8, 4));

        // Replace 3..5 with 1 column.
        store.apply_edit(3, 5, 1);
        let ranges: Vec<_> = store.iter().map(|h| (h.style_id, h.range.clone())).collect();
        assert_eq!(ranges, vec![(1, 0..2), (2, 3..4), (3, 5..9), (4, 1..7)]);

        // Deleting a range that covers a highlight drops it.
        store.apply_edit(2, 5, 0);
        let ranges: Vec<_> = store.iter().map(|h| (h.style_id, h.range.clone())).collect();
        assert_eq!(ranges, vec![(1, 0..2), (3, 2..6), (4, 1..4)]);
    }
}
