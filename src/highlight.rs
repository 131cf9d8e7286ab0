//! Visibility-bounded classification and decoration output.

pub mod classify;
pub mod emit;
pub mod visibility;

pub use classify::{Category, HighlightSpan, classify, highlight_pass};
pub use emit::{DecorationBatch, DecorationSink, EditorId, RecordingSink, emit};
pub use visibility::{Candidate, VisibleRange, VisibleRangeSet, collect_candidates};
