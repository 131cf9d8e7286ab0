//! Grammar capability
//!
//! The pipeline never talks to a concrete grammar; it only needs a fresh
//! parse and a parse that may reuse an already-edited previous tree.

use tracing::trace;
use tree_sitter::{Language, Parser, Tree};

use crate::errors::{HighlightError, Result};

/// A language's parser as seen by the highlighting pipeline.
pub trait Grammar {
    /// Language tag this grammar serves (e.g. `"go"`).
    fn name(&self) -> &str;

    /// Parses `text` from scratch. `None` means the parser gave up.
    fn parse_fresh(&mut self, text: &str) -> Option<Tree>;

    /// Parses `text` using `edited_previous` as a reuse hint.
    ///
    /// The hint must already have had the covering edit applied; the result
    /// is required to match what `parse_fresh(text)` would produce.
    fn parse_incremental(&mut self, text: &str, edited_previous: &Tree) -> Option<Tree>;
}

/// A [`Grammar`] backed by a tree-sitter parser.
pub struct TreeSitterGrammar {
    name: String,
    parser: Parser,
}

impl std::fmt::Debug for TreeSitterGrammar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeSitterGrammar").field("name", &self.name).finish()
    }
}

impl TreeSitterGrammar {
    pub fn new(name: impl Into<String>, language: Language) -> Result<Self> {
        let name = name.into();
        let mut parser = Parser::new();
        parser
            .set_language(&language)
            .map_err(|source| HighlightError::LanguageSetup { language: name.clone(), source })?;
        Ok(Self { name, parser })
    }
}

impl Grammar for TreeSitterGrammar {
    fn name(&self) -> &str {
        &self.name
    }

    fn parse_fresh(&mut self, text: &str) -> Option<Tree> {
        trace!("Fresh {} parse of {} bytes", self.name, text.len());
        self.parser.parse(text, None)
    }

    fn parse_incremental(&mut self, text: &str, edited_previous: &Tree) -> Option<Tree> {
        trace!("Incremental {} parse of {} bytes", self.name, text.len());
        self.parser.parse(text, Some(edited_previous))
    }
}
