//! Language tag to grammar table
//!
//! The pipeline looks grammars up by the host's language tag only, so adding
//! a language is a `register` call and nothing else.

use rustc_hash::FxHashMap;
use tracing::debug;
use tree_sitter::Language;

use crate::config::Config;
use crate::errors::Result;
use crate::parsers::grammar::{Grammar, TreeSitterGrammar};

struct Builtin {
    tag: &'static str,
    language: fn() -> Language,
    extensions: &'static [&'static str],
}

fn go_language() -> Language {
    tree_sitter_go::LANGUAGE.into()
}

fn typescript_language() -> Language {
    tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()
}

fn cpp_language() -> Language {
    tree_sitter_cpp::LANGUAGE.into()
}

const BUILTINS: &[Builtin] = &[
    Builtin { tag: "go", language: go_language, extensions: &["go"] },
    Builtin { tag: "typescript", language: typescript_language, extensions: &["ts"] },
    // .h is ambiguous, default to C++
    Builtin { tag: "cpp", language: cpp_language, extensions: &["cpp", "cc", "cxx", "hpp", "hh", "h"] },
];

/// Grammars keyed by language tag, plus a file extension index.
#[derive(Default)]
pub struct LanguageRegistry {
    grammars: FxHashMap<String, Box<dyn Grammar>>,
    extensions: FxHashMap<String, String>,
}

impl std::fmt::Debug for LanguageRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut languages: Vec<&str> = self.languages().collect();
        languages.sort_unstable();
        f.debug_struct("LanguageRegistry").field("languages", &languages).finish()
    }
}

impl LanguageRegistry {
    /// A registry with no grammars.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A registry with every built-in grammar.
    pub fn with_builtins() -> Result<Self> {
        Self::from_config(&Config::default())
    }

    /// A registry with the built-in grammars `config` enables.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut registry = Self::empty();
        for builtin in BUILTINS.iter().filter(|b| config.language_enabled(b.tag)) {
            let grammar = TreeSitterGrammar::new(builtin.tag, (builtin.language)())?;
            registry.register(builtin.tag, Box::new(grammar), builtin.extensions);
        }
        debug!("Language registry ready: {:?}", registry);
        Ok(registry)
    }

    /// Adds or replaces the grammar for `tag`.
    pub fn register(&mut self, tag: &str, grammar: Box<dyn Grammar>, extensions: &[&str]) {
        for ext in extensions {
            self.extensions.insert(ext.to_string(), tag.to_string());
        }
        self.grammars.insert(tag.to_string(), grammar);
    }

    pub fn supports(&self, tag: &str) -> bool {
        self.grammars.contains_key(tag)
    }

    pub fn grammar_mut(&mut self, tag: &str) -> Option<&mut Box<dyn Grammar>> {
        self.grammars.get_mut(tag)
    }

    /// Language tag for a file extension (without the leading dot).
    pub fn language_for_extension(&self, ext: &str) -> Option<&str> {
        self.extensions
            .get(ext)
            .filter(|tag| self.grammars.contains_key(tag.as_str()))
            .map(String::as_str)
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.grammars.keys().map(String::as_str)
    }
}
