//! Error taxonomy for the highlighting pipeline
//!
//! Every failure is scoped to one document or editor. Handlers return these
//! errors to the session, which logs them and carries on with other documents.

use std::path::PathBuf;

use thiserror::Error;

use crate::document::store::DocumentId;

pub type Result<T, E = HighlightError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum HighlightError {
    /// The grammar returned no tree (cancelled or unusable input).
    #[error("{language} parser produced no tree for {document}")]
    ParseFailed { document: DocumentId, language: String },

    /// A byte offset fell outside the text snapshot it was resolved against,
    /// or split a multi-byte character.
    #[error("byte offset {offset} is out of range for a {len}-byte document")]
    OffsetOutOfRange { offset: usize, len: usize },

    /// The coalesced edit cannot describe the change between the stored
    /// snapshot and the new text.
    #[error("edit batch for {document} is inconsistent with the document text: {reason}")]
    InconsistentEdit { document: DocumentId, reason: String },

    #[error("failed to load grammar for '{language}': {source}")]
    LanguageSetup {
        language: String,
        #[source]
        source: tree_sitter::LanguageError,
    },

    #[error("failed to read config {path:?}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path:?}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
