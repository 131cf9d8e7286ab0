//! Incremental parser adapter
//!
//! Keeps each stored tree in step with its document. An edit batch is
//! coalesced, applied to a clone of the previous tree, and the clone is handed
//! to the grammar as a reuse hint. The stored entry is only replaced once a
//! new tree exists, so a failed pass leaves the last good tree in place.

use std::time::Instant;

use ropey::Rope;
use tracing::{debug, warn};

use crate::document::edit::{EditDescriptor, TreeEdit, coalesce};
use crate::document::store::{DocumentId, StoredDocument, SyntaxTree, TreeStore};
use crate::errors::{HighlightError, Result};
use crate::parsers::registry::LanguageRegistry;

/// Why a parse request did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    EmptyBatch,
    NoStoredTree,
    UnsupportedLanguage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseOutcome {
    Skipped(SkipReason),
    /// The store now holds tree `version`; `reused` is false for fresh parses.
    Parsed { version: u64, reused: bool },
}

/// Parses `text` from scratch and stores it as the document's tree.
///
/// Also used to resynchronize a document that is already open.
pub fn open(
    store: &mut TreeStore,
    registry: &mut LanguageRegistry,
    id: &DocumentId,
    language: &str,
    text: &str,
) -> Result<ParseOutcome> {
    let Some(grammar) = registry.grammar_mut(language) else {
        debug!("No grammar for '{}', ignoring {}", language, id);
        return Ok(ParseOutcome::Skipped(SkipReason::UnsupportedLanguage));
    };

    let started = Instant::now();
    let tree = grammar.parse_fresh(text).ok_or_else(|| HighlightError::ParseFailed {
        document: id.clone(),
        language: language.to_string(),
    })?;
    let version = next_version(store, id);
    store.insert(
        id.clone(),
        StoredDocument {
            language: language.to_string(),
            text: Rope::from_str(text),
            syntax: SyntaxTree { tree, version },
        },
    );
    debug!(
        "Parsed {} ({}, {} bytes) in {:?}, version {}",
        id,
        language,
        text.len(),
        started.elapsed(),
        version
    );
    Ok(ParseOutcome::Parsed { version, reused: false })
}

/// Brings the stored tree up to date with `new_text` after an edit batch.
///
/// A document without a stored tree, or whose language lost its grammar, is
/// skipped. If the batch does not fit the stored snapshot, the edited tree is
/// never used as a hint: the document is reparsed from scratch to resync the
/// store and the inconsistency is still reported to the caller.
pub fn apply_edits(
    store: &mut TreeStore,
    registry: &mut LanguageRegistry,
    id: &DocumentId,
    edits: &[EditDescriptor],
    new_text: &str,
) -> Result<ParseOutcome> {
    if edits.is_empty() {
        return Ok(ParseOutcome::Skipped(SkipReason::EmptyBatch));
    }
    let Some(previous) = store.get(id) else {
        debug!("Edit for {} without a stored tree", id);
        return Ok(ParseOutcome::Skipped(SkipReason::NoStoredTree));
    };
    let language = previous.language.clone();
    let old_text = previous.text.clone();
    let previous_tree = previous.tree().clone();

    let Some(grammar) = registry.grammar_mut(&language) else {
        return Ok(ParseOutcome::Skipped(SkipReason::UnsupportedLanguage));
    };
    let parse_failed = || HighlightError::ParseFailed {
        document: id.clone(),
        language: language.clone(),
    };

    let started = Instant::now();
    let new_rope = Rope::from_str(new_text);
    let resolved = match coalesce(edits, old_text.len_bytes()) {
        Ok(Some(span)) => TreeEdit::resolve(id, span, &old_text, &new_rope),
        Ok(None) => return Ok(ParseOutcome::Skipped(SkipReason::EmptyBatch)),
        Err(err) => Err(err),
    };
    let edit = match resolved {
        Ok(edit) => edit,
        Err(err) => {
            warn!("Discarding reuse hint for {}: {}", id, err);
            let tree = grammar.parse_fresh(new_text).ok_or_else(parse_failed)?;
            let version = next_version(store, id);
            store.insert(id.clone(), StoredDocument { language, text: new_rope, syntax: SyntaxTree { tree, version } });
            return Err(err);
        }
    };

    let mut hint = previous_tree;
    hint.edit(&edit.to_input_edit());
    let (tree, reused) = match grammar.parse_incremental(new_text, &hint) {
        Some(tree) => (tree, true),
        None => {
            warn!("Incremental parse failed for {}, performing full parse", id);
            (grammar.parse_fresh(new_text).ok_or_else(parse_failed)?, false)
        }
    };

    if reused {
        debug!("{} changed range(s) in {}", hint.changed_ranges(&tree).count(), id);
    }
    let version = next_version(store, id);
    store.insert(id.clone(), StoredDocument { language, text: new_rope, syntax: SyntaxTree { tree, version } });
    debug!(
        "Reparsed {} bytes {}..{} -> {} in {:?}, version {}",
        id,
        edit.start_index,
        edit.old_end_index,
        edit.new_end_index,
        started.elapsed(),
        version
    );
    Ok(ParseOutcome::Parsed { version, reused })
}

fn next_version(store: &TreeStore, id: &DocumentId) -> u64 {
    store.get(id).map_or(1, |doc| doc.version() + 1)
}
