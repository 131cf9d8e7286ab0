//! Grammars, the language registry and the incremental parse adapter

pub mod grammar;
pub mod incremental;
pub mod registry;

pub use grammar::{Grammar, TreeSitterGrammar};
pub use incremental::{ParseOutcome, SkipReason};
pub use registry::LanguageRegistry;
