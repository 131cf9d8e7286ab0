//! Decoration emission
//!
//! Every pass replaces all three categories for the editor. An empty set is
//! still sent so spans from the previous pass disappear.

use std::sync::Arc;

use ropey::Rope;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::document::coords::{PositionEncoding, to_host_range};
use crate::highlight::classify::{Category, HighlightSpan};

/// Identity of one editor (a view onto a document).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EditorId(Arc<str>);

impl EditorId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EditorId {
    fn from(id: &str) -> Self {
        Self(Arc::from(id))
    }
}

impl std::fmt::Display for EditorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Host side of decoration rendering.
pub trait DecorationSink {
    /// Replaces everything previously rendered for `category` in `editor`.
    fn set_decorations(&mut self, editor: &EditorId, category: Category, ranges: Vec<lsp_types::Range>);
}

/// Converts `spans` to host ranges and sends one replace-all per category,
/// in [`Category::ALL`] order.
pub fn emit<S: DecorationSink + ?Sized>(
    sink: &mut S,
    editor: &EditorId,
    spans: &[HighlightSpan],
    text: &Rope,
    encoding: PositionEncoding,
) {
    for category in Category::ALL {
        let ranges = spans
            .iter()
            .filter(|span| span.category == category)
            .map(|span| to_host_range(text, span.start, span.end, encoding))
            .collect();
        sink.set_decorations(editor, category, ranges);
    }
}

/// One `set_decorations` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecorationBatch {
    pub editor: EditorId,
    pub category: Category,
    pub theme_key: String,
    pub ranges: Vec<lsp_types::Range>,
}

/// A sink that remembers what it was told.
#[derive(Debug, Default)]
pub struct RecordingSink {
    current: FxHashMap<(EditorId, Category), Vec<lsp_types::Range>>,
    log: Vec<DecorationBatch>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// What is currently rendered for `category` in `editor`.
    pub fn current(&self, editor: &EditorId, category: Category) -> Option<&[lsp_types::Range]> {
        self.current.get(&(editor.clone(), category)).map(Vec::as_slice)
    }

    pub fn log(&self) -> &[DecorationBatch] {
        &self.log
    }

    /// Takes the calls recorded since the last drain.
    pub fn drain(&mut self) -> Vec<DecorationBatch> {
        std::mem::take(&mut self.log)
    }
}

impl DecorationSink for RecordingSink {
    fn set_decorations(&mut self, editor: &EditorId, category: Category, ranges: Vec<lsp_types::Range>) {
        self.current.insert((editor.clone(), category), ranges.clone());
        self.log.push(DecorationBatch {
            editor: editor.clone(),
            category,
            theme_key: category.theme_key().to_string(),
            ranges,
        });
    }
}
