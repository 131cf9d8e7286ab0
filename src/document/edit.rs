//! Edit descriptors, batch coalescing and tree-sitter edit translation
//!
//! A host change event carries a batch of descriptors in pre-edit byte
//! coordinates. The parser only needs one enclosing dirty span, so the batch
//! is reduced to a single `(start, old_end, new_end)` triple first and only
//! then resolved into row/column points.

use ropey::Rope;
use serde::{Deserialize, Serialize};
use tracing::debug;
use tree_sitter::{InputEdit, Point};

use crate::document::coords::to_point;
use crate::document::store::DocumentId;
use crate::errors::{HighlightError, Result};

/// One textual change reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditDescriptor {
    /// Byte offset where the replaced range starts
    pub start: usize,
    /// Byte length of the replaced range
    pub old_len: usize,
    /// Byte length of the replacement text
    pub new_len: usize,
}

impl EditDescriptor {
    pub fn new(start: usize, old_len: usize, new_len: usize) -> Self {
        Self { start, old_len, new_len }
    }

    pub fn insert(start: usize, text: &str) -> Self {
        Self::new(start, 0, text.len())
    }

    pub fn delete(start: usize, old_len: usize) -> Self {
        Self::new(start, old_len, 0)
    }

    /// `None` when the end does not fit in a `usize`.
    pub fn old_end(&self) -> Option<usize> {
        self.start.checked_add(self.old_len)
    }

    pub fn new_end(&self) -> Option<usize> {
        self.start.checked_add(self.new_len)
    }

    fn ends(&self, document_len: usize) -> Result<(usize, usize)> {
        self.old_end()
            .zip(self.new_end())
            .ok_or(HighlightError::OffsetOutOfRange { offset: self.start, len: document_len })
    }
}

/// The union-bounding span of a descriptor batch, in byte offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoalescedEdit {
    pub start_index: usize,
    pub old_end_index: usize,
    pub new_end_index: usize,
}

/// Reduces a batch of descriptors to the smallest span enclosing all of them.
///
/// Returns `None` for an empty batch, which callers treat as "nothing to do".
/// A descriptor whose end overflows is out of range for any document of
/// `document_len` bytes.
pub fn coalesce(edits: &[EditDescriptor], document_len: usize) -> Result<Option<CoalescedEdit>> {
    let Some((first, rest)) = edits.split_first() else {
        return Ok(None);
    };
    let (old_end, new_end) = first.ends(document_len)?;
    let mut span = CoalescedEdit {
        start_index: first.start,
        old_end_index: old_end,
        new_end_index: new_end,
    };
    for edit in rest {
        let (old_end, new_end) = edit.ends(document_len)?;
        span.start_index = span.start_index.min(edit.start);
        span.old_end_index = span.old_end_index.max(old_end);
        span.new_end_index = span.new_end_index.max(new_end);
    }
    Ok(Some(span))
}

/// A coalesced edit with the row/column points tree-sitter needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeEdit {
    pub start_index: usize,
    pub old_end_index: usize,
    pub new_end_index: usize,
    pub start_position: Point,
    pub old_end_position: Point,
    pub new_end_position: Point,
}

impl TreeEdit {
    /// Resolves a coalesced span against the pre-edit snapshot and the
    /// post-edit text.
    ///
    /// Everything after `old_end_index` in the old text reappears shifted by
    /// the document's length delta. When the union-bounded new end disagrees
    /// with that (a shifting insert ahead of another descriptor), the new end
    /// is moved so the edit describes the change exactly.
    pub fn resolve(document: &DocumentId, span: CoalescedEdit, old: &Rope, new: &Rope) -> Result<Self> {
        let start_position = to_point(old, span.start_index)?;
        let old_end_position = to_point(old, span.old_end_index)?;

        let delta = new.len_bytes() as isize - old.len_bytes() as isize;
        let shifted_end = span.old_end_index as isize + delta;
        if shifted_end < span.start_index as isize || shifted_end > new.len_bytes() as isize {
            return Err(HighlightError::InconsistentEdit {
                document: document.clone(),
                reason: format!(
                    "span {}..{} cannot absorb a length change of {} bytes",
                    span.start_index, span.old_end_index, delta
                ),
            });
        }
        let new_end_index = shifted_end as usize;
        if new_end_index != span.new_end_index {
            debug!(
                "Reconciled new end for {}: {} -> {} (length delta {})",
                document, span.new_end_index, new_end_index, delta
            );
        }
        let new_end_position = to_point(new, new_end_index)?;

        Ok(Self {
            start_index: span.start_index,
            old_end_index: span.old_end_index,
            new_end_index,
            start_position,
            old_end_position,
            new_end_position,
        })
    }

    pub fn to_input_edit(&self) -> InputEdit {
        InputEdit {
            start_byte: self.start_index,
            old_end_byte: self.old_end_index,
            new_end_byte: self.new_end_index,
            start_position: self.start_position,
            old_end_position: self.old_end_position,
            new_end_position: self.new_end_position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::{QuickCheck, TestResult};

    fn doc() -> DocumentId {
        DocumentId::from("file:///test.go")
    }

    #[test]
    fn test_empty_batch_is_none() {
        assert_eq!(coalesce(&[], 0).unwrap(), None);
    }

    #[test]
    fn test_single_descriptor_is_exact() {
        let span = coalesce(&[EditDescriptor::new(5, 3, 7)], 100).unwrap().unwrap();
        assert_eq!(span, CoalescedEdit { start_index: 5, old_end_index: 8, new_end_index: 12 });
    }

    #[test]
    fn test_disjoint_descriptors_are_bounded() {
        let span = coalesce(&[EditDescriptor::new(20, 2, 0), EditDescriptor::new(4, 1, 3)], 100).unwrap().unwrap();
        assert_eq!(span.start_index, 4);
        assert_eq!(span.old_end_index, 22);
        assert_eq!(span.new_end_index, 20);
    }

    #[test]
    fn test_coalescing_soundness() {
        fn prop(raw: Vec<(u16, u8, u8)>) -> TestResult {
            if raw.is_empty() {
                return TestResult::discard();
            }
            let edits: Vec<EditDescriptor> = raw
                .iter()
                .map(|&(s, o, n)| EditDescriptor::new(s as usize, o as usize, n as usize))
                .collect();
            let span = coalesce(&edits, 0).unwrap().unwrap();
            let min_start = edits.iter().map(|e| e.start).min().unwrap();
            let max_old = edits.iter().filter_map(|e| e.old_end()).max().unwrap();
            let max_new = edits.iter().filter_map(|e| e.new_end()).max().unwrap();
            TestResult::from_bool(
                span.start_index == min_start
                    && span.old_end_index == max_old
                    && span.new_end_index == max_new
                    && edits.iter().all(|e| span.start_index <= e.start && e.old_end() <= Some(span.old_end_index)),
            )
        }
        QuickCheck::new().tests(200).quickcheck(prop as fn(Vec<(u16, u8, u8)>) -> TestResult);
    }

    #[test]
    fn test_overflowing_descriptor_is_out_of_range() {
        let batch = [EditDescriptor::new(3, 1, 1), EditDescriptor::new(usize::MAX, 1, 0)];
        assert!(matches!(
            coalesce(&batch, 13),
            Err(HighlightError::OffsetOutOfRange { offset: usize::MAX, len: 13 })
        ));
        assert_eq!(EditDescriptor::new(usize::MAX, 0, 2).new_end(), None);
    }

    #[test]
    fn test_resolve_insert_on_one_line() {
        let old = Rope::from_str("func foo() {}");
        let new = Rope::from_str("func bazfoo() {}");
        let span = coalesce(&[EditDescriptor::insert(5, "baz")], 100).unwrap().unwrap();
        let edit = TreeEdit::resolve(&doc(), span, &old, &new).unwrap();
        assert_eq!(edit.start_position, Point { row: 0, column: 5 });
        assert_eq!(edit.old_end_position, Point { row: 0, column: 5 });
        assert_eq!(edit.new_end_index, 8);
        assert_eq!(edit.new_end_position, Point { row: 0, column: 8 });
    }

    #[test]
    fn test_resolve_uses_pre_edit_snapshot_for_old_end() {
        // Delete the newline joining two lines: old end is on row 1 of the old text
        let old = Rope::from_str("ab\ncd");
        let new = Rope::from_str("abcd");
        let span = coalesce(&[EditDescriptor::delete(2, 1)], 100).unwrap().unwrap();
        let edit = TreeEdit::resolve(&doc(), span, &old, &new).unwrap();
        assert_eq!(edit.old_end_position, Point { row: 1, column: 0 });
        assert_eq!(edit.new_end_position, Point { row: 0, column: 2 });
    }

    #[test]
    fn test_resolve_reconciles_shifting_batch() {
        // "0123456789" -> insert "xx" at 0 and replace "8" with "y"
        let old = Rope::from_str("0123456789");
        let new = Rope::from_str("xx01234567y9");
        let span = coalesce(&[EditDescriptor::insert(0, "xx"), EditDescriptor::new(8, 1, 1)], 100).unwrap().unwrap();
        assert_eq!(span.new_end_index, 9);
        let edit = TreeEdit::resolve(&doc(), span, &old, &new).unwrap();
        assert_eq!(edit.old_end_index, 9);
        assert_eq!(edit.new_end_index, 11);
    }

    #[test]
    fn test_resolve_rejects_out_of_range_offsets() {
        let old = Rope::from_str("abc");
        let new = Rope::from_str("abcd");
        let span = coalesce(&[EditDescriptor::new(10, 0, 1)], 100).unwrap().unwrap();
        assert!(matches!(
            TreeEdit::resolve(&doc(), span, &old, &new),
            Err(HighlightError::OffsetOutOfRange { offset: 10, .. })
        ));
    }

    #[test]
    fn test_resolve_rejects_impossible_length_change() {
        let old = Rope::from_str("abcdef");
        let new = Rope::from_str("a");
        // claims only one byte was removed, but the text lost five
        let span = coalesce(&[EditDescriptor::delete(4, 1)], 100).unwrap().unwrap();
        assert!(matches!(
            TreeEdit::resolve(&doc(), span, &old, &new),
            Err(HighlightError::InconsistentEdit { .. })
        ));
    }

    #[test]
    fn test_to_input_edit() {
        let edit = TreeEdit {
            start_index: 10,
            old_end_index: 15,
            new_end_index: 12,
            start_position: Point { row: 1, column: 3 },
            old_end_position: Point { row: 1, column: 8 },
            new_end_position: Point { row: 1, column: 5 },
        };
        let input = edit.to_input_edit();
        assert_eq!(input.start_byte, 10);
        assert_eq!(input.old_end_byte, 15);
        assert_eq!(input.new_end_byte, 12);
        assert_eq!(input.old_end_position, Point { row: 1, column: 8 });
    }
}
