//! Per-document syntax tree ownership
//!
//! The store is an explicit map owned by the session and passed by reference
//! to whatever needs it. An entry lives from the document's first open until
//! its close; every successful parse replaces the entry's tree wholesale.

use std::fmt;
use std::sync::Arc;

use ropey::Rope;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tree_sitter::Tree;
use url::Url;

/// Stable key for an open document, the string form of its URI.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(Arc<str>);

impl DocumentId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&Url> for DocumentId {
    fn from(uri: &Url) -> Self {
        Self(Arc::from(uri.as_str()))
    }
}

impl From<&str> for DocumentId {
    fn from(uri: &str) -> Self {
        Self(Arc::from(uri))
    }
}

impl From<String> for DocumentId {
    fn from(uri: String) -> Self {
        Self(Arc::from(uri))
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A parsed tree tagged with how many times the document has been parsed.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    pub tree: Tree,
    pub version: u64,
}

/// Everything kept for one open document.
#[derive(Debug, Clone)]
pub struct StoredDocument {
    pub language: String,
    /// Text the tree was parsed from; edits resolve their old end against it.
    pub text: Rope,
    pub syntax: SyntaxTree,
}

impl StoredDocument {
    pub fn tree(&self) -> &Tree {
        &self.syntax.tree
    }

    pub fn version(&self) -> u64 {
        self.syntax.version
    }
}

/// Document identity to current tree, at most one entry per document.
#[derive(Debug, Default)]
pub struct TreeStore {
    documents: FxHashMap<DocumentId, StoredDocument>,
}

impl TreeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &DocumentId) -> Option<&StoredDocument> {
        self.documents.get(id)
    }

    /// Stores `document`, returning the entry it replaced.
    pub fn insert(&mut self, id: DocumentId, document: StoredDocument) -> Option<StoredDocument> {
        self.documents.insert(id, document)
    }

    pub fn remove(&mut self, id: &DocumentId) -> Option<StoredDocument> {
        self.documents.remove(id)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
