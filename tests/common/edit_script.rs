use quickcheck::{Arbitrary, Gen};

use sitter_highlights::document::EditDescriptor;

/// Whole-line Go statements, so random scripts keep the document parseable.
const STATEMENTS: &[&str] = &[
    "\tx.Bar = 1\n",
    "\tvar y int\n",
    "\tp.Count++\n",
    "\tfoo()\n",
    "\tz := T{Name: \"n\"}\n",
    "\treturn\n",
    "\tif p.Ok { q.Run() }\n",
];

pub const HEADER: &str = "package main\n\nfunc f(p *T) {\n";
pub const FOOTER: &str = "}\n";

/// A Go document whose function body is a list of statement lines.
#[derive(Debug, Clone)]
pub struct GoBody {
    pub lines: Vec<&'static str>,
}

impl GoBody {
    pub fn text(&self) -> String {
        let mut text = String::from(HEADER);
        for line in &self.lines {
            text.push_str(line);
        }
        text.push_str(FOOTER);
        text
    }

    /// Byte offset of body line `index` (or of the footer when `index == len`).
    pub fn line_offset(&self, index: usize) -> usize {
        HEADER.len() + self.lines[..index].iter().map(|l| l.len()).sum::<usize>()
    }
}

impl Arbitrary for GoBody {
    fn arbitrary(g: &mut Gen) -> Self {
        let count = usize::arbitrary(g) % 20;
        let lines = (0..count).filter_map(|_| g.choose(STATEMENTS).copied()).collect();
        GoBody { lines }
    }
}

/// Replace `remove` body lines starting at `line` with `insert`.
#[derive(Debug, Clone)]
pub struct LineEdit {
    pub line: usize,
    pub remove: usize,
    pub insert: Vec<&'static str>,
}

impl Arbitrary for LineEdit {
    fn arbitrary(g: &mut Gen) -> Self {
        let inserted = usize::arbitrary(g) % 3;
        LineEdit {
            line: usize::arbitrary(g),
            remove: usize::arbitrary(g) % 3,
            insert: (0..inserted).filter_map(|_| g.choose(STATEMENTS).copied()).collect(),
        }
    }
}

/// Applies a batch of line edits to `body`, all expressed against the
/// original body, and returns the new body with the descriptors the host
/// would report (pre-edit byte offsets).
pub fn apply_batch(body: &GoBody, batch: &[LineEdit]) -> (GoBody, Vec<EditDescriptor>) {
    // clamp into range and drop edits overlapping an earlier one
    let mut accepted: Vec<(usize, usize, &LineEdit)> = Vec::new();
    for edit in batch {
        let line = edit.line % (body.lines.len() + 1);
        let remove = edit.remove.min(body.lines.len() - line);
        let overlaps = accepted.iter().any(|&(l, r, _)| line < l + r.max(1) && l < line + remove.max(1));
        if !overlaps {
            accepted.push((line, remove, edit));
        }
    }

    let descriptors = accepted
        .iter()
        .map(|&(line, remove, edit)| {
            let start = body.line_offset(line);
            let old_len = body.line_offset(line + remove) - start;
            let new_len = edit.insert.iter().map(|l| l.len()).sum();
            EditDescriptor::new(start, old_len, new_len)
        })
        .collect();

    accepted.sort_by_key(|&(line, _, _)| std::cmp::Reverse(line));
    let mut lines = body.lines.clone();
    for (line, remove, edit) in accepted {
        lines.splice(line..line + remove, edit.insert.iter().copied());
    }
    (GoBody { lines }, descriptors)
}
