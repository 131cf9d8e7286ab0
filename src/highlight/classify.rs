//! Node classification
//!
//! Looks only at a node's own kind and the kinds of its parent and
//! grandparent. There is no scope or type resolution.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use tree_sitter::{Point, Tree};

use crate::highlight::visibility::{VisibleRangeSet, collect_candidates};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Type,
    Field,
    Function,
}

impl Category {
    /// Emission order.
    pub const ALL: [Category; 3] = [Category::Type, Category::Field, Category::Function];

    /// Theme color id the host resolves the style from.
    pub fn theme_key(self) -> &'static str {
        match self {
            Category::Type => "treeSitter.type",
            Category::Field => "treeSitter.field",
            Category::Function => "treeSitter.function",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Category::Type => "type",
            Category::Field => "field",
            Category::Function => "function",
        })
    }
}

pub fn classify(kind: &str, parent: Option<&str>, grandparent: Option<&str>) -> Option<Category> {
    match kind {
        "identifier" => match (parent?, grandparent) {
            ("function" | "function_declarator" | "function_declaration", _) => Some(Category::Function),
            ("scoped_identifier", Some("function_declarator")) => Some(Category::Function),
            _ => None,
        },
        "primitive_type" | "type_identifier" | "predefined_type" => Some(Category::Type),
        "property_identifier" | "field_identifier" => Some(Category::Field),
        _ => None,
    }
}

/// A classified node's span in tree coordinates (byte columns).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HighlightSpan {
    pub category: Category,
    pub start: Point,
    pub end: Point,
}

/// Classifies every visible node of `tree`, in document order.
pub fn highlight_pass(tree: &Tree, visible: &VisibleRangeSet, slack: u32) -> Vec<HighlightSpan> {
    let started = Instant::now();
    let candidates = collect_candidates(tree, visible, slack);
    let spans: Vec<HighlightSpan> = candidates
        .iter()
        .filter_map(|c| {
            let category = classify(c.kind, c.parent, c.grandparent)?;
            trace!("{} {} at {}:{}", category, c.kind, c.start.row, c.start.column);
            Some(HighlightSpan { category, start: c.start, end: c.end })
        })
        .collect();
    debug!(
        "Highlight pass: {} visible nodes, {} spans in {:?}",
        candidates.len(),
        spans.len(),
        started.elapsed()
    );
    spans
}
