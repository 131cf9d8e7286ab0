#![allow(dead_code)]

pub mod edit_script;

use tree_sitter::{Point, Tree};

use sitter_highlights::highlight::{Category, EditorId, RecordingSink};

/// Every node of `tree` in preorder as (kind, byte range, point range).
pub fn node_spans(tree: &Tree) -> Vec<(&'static str, usize, usize, Point, Point)> {
    let mut spans = Vec::new();
    let mut cursor = tree.walk();
    loop {
        let node = cursor.node();
        spans.push((node.kind(), node.start_byte(), node.end_byte(), node.start_position(), node.end_position()));
        if cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return spans;
            }
        }
    }
}

/// The text covered by each range currently rendered for `category`.
/// Assumes single-line ranges and UTF-8 (or ASCII) columns.
pub fn rendered<'a>(sink: &RecordingSink, editor: &str, category: Category, text: &'a str) -> Vec<&'a str> {
    let lines: Vec<&str> = text.split('\n').collect();
    sink.current(&EditorId::from(editor), category)
        .unwrap_or_default()
        .iter()
        .map(|r| {
            let line = lines[r.start.line as usize];
            &line[r.start.character as usize..r.end.character as usize]
        })
        .collect()
}
