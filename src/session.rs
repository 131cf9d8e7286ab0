//! Host event handling
//!
//! The host reports four kinds of events. Each has its own handler, and
//! [`HighlightSession::dispatch`] is a plain match over them. Handlers run to
//! completion one at a time; a failure is scoped to the document or editor
//! that caused it and never touches any other state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::document::edit::EditDescriptor;
use crate::document::store::{DocumentId, StoredDocument, TreeStore};
use crate::errors::Result;
use crate::highlight::classify::highlight_pass;
use crate::highlight::emit::{DecorationSink, EditorId, emit};
use crate::highlight::visibility::VisibleRangeSet;
use crate::parsers::incremental::{self, ParseOutcome};
use crate::parsers::registry::LanguageRegistry;

/// A notification from the host editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum HostEvent {
    /// An editor started showing a document.
    #[serde(rename = "open")]
    DocumentVisible {
        editor: EditorId,
        document: DocumentId,
        language: String,
        text: String,
        #[serde(default)]
        visible: VisibleRangeSet,
    },
    /// A batch of edits, in pre-edit byte offsets, plus the resulting text.
    #[serde(rename = "change")]
    ContentChanged {
        document: DocumentId,
        edits: Vec<EditDescriptor>,
        text: String,
    },
    #[serde(rename = "close")]
    DocumentClosed { document: DocumentId },
    #[serde(rename = "scroll")]
    VisibleRangesChanged {
        editor: EditorId,
        document: DocumentId,
        visible: VisibleRangeSet,
    },
}

/// What an editor is showing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorView {
    pub document: DocumentId,
    pub visible: VisibleRangeSet,
}

/// Owns all highlighting state for one host.
pub struct HighlightSession<S> {
    config: Config,
    registry: LanguageRegistry,
    store: TreeStore,
    editors: BTreeMap<EditorId, EditorView>,
    sink: S,
}

impl<S: DecorationSink> HighlightSession<S> {
    /// A session with the built-in grammars `config` enables.
    pub fn new(config: Config, sink: S) -> Result<Self> {
        let registry = LanguageRegistry::from_config(&config)?;
        Ok(Self::with_registry(config, registry, sink))
    }

    pub fn with_registry(config: Config, registry: LanguageRegistry, sink: S) -> Self {
        info!(
            "Highlight session: slack {}, {:?} columns, {:?}",
            config.visibility_slack, config.position_encoding, registry
        );
        Self {
            config,
            registry,
            store: TreeStore::new(),
            editors: BTreeMap::new(),
            sink,
        }
    }

    pub fn store(&self) -> &TreeStore {
        &self.store
    }

    pub fn document(&self, id: &DocumentId) -> Option<&StoredDocument> {
        self.store.get(id)
    }

    pub fn editor(&self, id: &EditorId) -> Option<&EditorView> {
        self.editors.get(id)
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Handles one event, logging instead of propagating failures.
    pub fn dispatch(&mut self, event: HostEvent) {
        let result = match event {
            HostEvent::DocumentVisible { editor, document, language, text, visible } => {
                self.on_document_visible(editor, document, &language, &text, visible)
            }
            HostEvent::ContentChanged { document, edits, text } => self.on_content_changed(&document, &edits, &text),
            HostEvent::DocumentClosed { document } => {
                self.on_document_closed(&document);
                Ok(())
            }
            HostEvent::VisibleRangesChanged { editor, document, visible } => {
                self.on_visible_ranges_changed(editor, document, visible)
            }
        };
        if let Err(e) = result {
            warn!("Highlight pass aborted: {}", e);
        }
    }

    /// Parses the document from scratch and recolors every editor showing it.
    ///
    /// The editor's view is only kept while the document has a stored tree.
    pub fn on_document_visible(
        &mut self,
        editor: EditorId,
        document: DocumentId,
        language: &str,
        text: &str,
        visible: VisibleRangeSet,
    ) -> Result<()> {
        let outcome = incremental::open(&mut self.store, &mut self.registry, &document, language, text);
        self.track_view(editor, EditorView { document: document.clone(), visible });
        match outcome? {
            ParseOutcome::Parsed { .. } => self.recolor_document(&document),
            ParseOutcome::Skipped(reason) => debug!("Not highlighting {}: {:?}", document, reason),
        }
        Ok(())
    }

    /// Brings the document's tree up to date and recolors every editor
    /// showing it. A failed pass leaves the previous decorations in place.
    pub fn on_content_changed(&mut self, document: &DocumentId, edits: &[EditDescriptor], text: &str) -> Result<()> {
        match incremental::apply_edits(&mut self.store, &mut self.registry, document, edits, text)? {
            ParseOutcome::Parsed { .. } => self.recolor_document(document),
            ParseOutcome::Skipped(reason) => debug!("Change to {} skipped: {:?}", document, reason),
        }
        Ok(())
    }

    /// Drops the document's tree and every editor view onto it.
    pub fn on_document_closed(&mut self, document: &DocumentId) {
        let had_tree = self.store.remove(document).is_some();
        let before = self.editors.len();
        self.editors.retain(|_, view| &view.document != document);
        debug!(
            "Closed {} (tree: {}, editors: {})",
            document,
            had_tree,
            before - self.editors.len()
        );
    }

    /// Records the editor's new visible ranges and recolors only that editor.
    /// A scroll over a document with no stored tree forgets the editor.
    pub fn on_visible_ranges_changed(
        &mut self,
        editor: EditorId,
        document: DocumentId,
        visible: VisibleRangeSet,
    ) -> Result<()> {
        let view = EditorView { document, visible };
        if let Some(stored) = self.store.get(&view.document) {
            paint(&mut self.sink, &self.config, &editor, &view, stored);
        }
        self.track_view(editor, view);
        Ok(())
    }

    fn track_view(&mut self, editor: EditorId, view: EditorView) {
        if self.store.get(&view.document).is_some() {
            self.editors.insert(editor, view);
        } else if let Some(stale) = self.editors.remove(&editor) {
            debug!("Dropped view of {} in {}: no stored tree for {}", stale.document, editor, view.document);
        }
    }

    fn recolor_document(&mut self, document: &DocumentId) {
        let Some(stored) = self.store.get(document) else {
            return;
        };
        for (editor, view) in self.editors.iter().filter(|(_, view)| &view.document == document) {
            paint(&mut self.sink, &self.config, editor, view, stored);
        }
    }
}

fn paint<S: DecorationSink>(sink: &mut S, config: &Config, editor: &EditorId, view: &EditorView, stored: &StoredDocument) {
    let spans = highlight_pass(stored.tree(), &view.visible, config.visibility_slack);
    debug!("Painting {} spans in {} ({})", spans.len(), editor, view.document);
    emit(sink, editor, &spans, &stored.text, config.position_encoding);
}
