//! Visible line ranges and the pruned tree walk
//!
//! A node is a candidate when its row span touches some visible range widened
//! by `slack` lines. Children never extend past their parent's rows, so a
//! node that fails the test has no candidate below it and its subtree is
//! skipped outright. The cost of a pass therefore tracks the visible part of
//! the document, not its size.

use serde::{Deserialize, Serialize};
use tree_sitter::{Point, Tree};

/// An inclusive range of lines shown in an editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VisibleRange {
    pub start_line: u32,
    pub end_line: u32,
}

impl VisibleRange {
    /// Builds a range, swapping reversed bounds.
    pub fn new(start_line: u32, end_line: u32) -> Self {
        Self {
            start_line: start_line.min(end_line),
            end_line: start_line.max(end_line),
        }
    }

    /// Whether rows `start_row..=end_row` touch this range widened by `slack`.
    pub fn touches(&self, start_row: usize, end_row: usize, slack: u32) -> bool {
        let low = self.start_line.saturating_sub(slack) as usize;
        let high = self.end_line.saturating_add(slack) as usize;
        start_row <= high && low <= end_row
    }
}

/// The visible ranges of one editor, sorted with overlapping and adjacent
/// ranges merged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<VisibleRange>", into = "Vec<VisibleRange>")]
pub struct VisibleRangeSet {
    ranges: Vec<VisibleRange>,
}

impl VisibleRangeSet {
    pub fn new(ranges: impl IntoIterator<Item = VisibleRange>) -> Self {
        let mut ranges: Vec<VisibleRange> = ranges.into_iter().collect();
        ranges.sort_unstable_by_key(|r| (r.start_line, r.end_line));
        let mut merged: Vec<VisibleRange> = Vec::with_capacity(ranges.len());
        for range in ranges {
            match merged.last_mut() {
                Some(last) if range.start_line <= last.end_line.saturating_add(1) => {
                    last.end_line = last.end_line.max(range.end_line);
                }
                _ => merged.push(range),
            }
        }
        Self { ranges: merged }
    }

    /// A single range covering lines `start..=end`.
    pub fn lines(start: u32, end: u32) -> Self {
        Self::new([VisibleRange::new(start, end)])
    }

    pub fn ranges(&self) -> &[VisibleRange] {
        &self.ranges
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn touches(&self, start_row: usize, end_row: usize, slack: u32) -> bool {
        self.ranges.iter().any(|r| r.touches(start_row, end_row, slack))
    }
}

impl From<Vec<VisibleRange>> for VisibleRangeSet {
    fn from(ranges: Vec<VisibleRange>) -> Self {
        Self::new(ranges)
    }
}

impl From<VisibleRangeSet> for Vec<VisibleRange> {
    fn from(set: VisibleRangeSet) -> Self {
        set.ranges
    }
}

/// A visible node with the local ancestry the classifier looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Candidate {
    pub kind: &'static str,
    pub parent: Option<&'static str>,
    pub grandparent: Option<&'static str>,
    pub start: Point,
    pub end: Point,
}

/// Walks `tree` top-down and returns every node that passes the visibility
/// test, in document order.
pub fn collect_candidates(tree: &Tree, visible: &VisibleRangeSet, slack: u32) -> Vec<Candidate> {
    let mut candidates = Vec::new();
    if visible.is_empty() {
        return candidates;
    }

    let mut cursor = tree.walk();
    // kinds of the nodes above the cursor, root first
    let mut ancestors: Vec<&'static str> = Vec::new();
    loop {
        let node = cursor.node();
        let start = node.start_position();
        let end = node.end_position();
        if visible.touches(start.row, end.row, slack) {
            candidates.push(Candidate {
                kind: node.kind(),
                parent: ancestors.last().copied(),
                grandparent: ancestors.iter().rev().nth(1).copied(),
                start,
                end,
            });
            if cursor.goto_first_child() {
                ancestors.push(node.kind());
                continue;
            }
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return candidates;
            }
            ancestors.pop();
        }
    }
}
