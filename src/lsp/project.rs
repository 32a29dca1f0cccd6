//! Workspace state management
//!
//! Tracks the latest snapshot of every open document.

use std::sync::Arc;

use dashmap::DashMap;
use tower_lsp::lsp_types::Url;

use super::analysis::document::DocumentState;
use crate::dsl::{ParseOptions, ParseResult};
use crate::enhancer::{self, SemanticEnhancer};

/// Open documents and the settings used to parse them.
pub struct ProjectState {
    /// Open documents, keyed by URI.
    pub documents: DashMap<Url, DocumentState>,
    options: ParseOptions,
    enhancer: Option<Arc<dyn SemanticEnhancer>>,
}

impl ProjectState {
    /// Create a project state that serves structural snapshots only.
    pub fn new(options: ParseOptions) -> Self {
        Self {
            documents: DashMap::new(),
            options,
            enhancer: None,
        }
    }

    /// Create a project state that enriches snapshots with `enhancer`.
    pub fn with_enhancer(options: ParseOptions, enhancer: Arc<dyn SemanticEnhancer>) -> Self {
        Self {
            enhancer: Some(enhancer),
            ..Self::new(options)
        }
    }

    pub fn has_enhancer(&self) -> bool {
        self.enhancer.is_some()
    }

    /// Re-parse a document and store its structural snapshot.
    pub fn update_document(&self, uri: Url, version: i32, source: String) {
        let doc = DocumentState::new(uri.clone(), version, source, &self.options);
        self.documents.insert(uri, doc);
    }

    /// Run the enhancer for `version` of a document and store the result if
    /// that version is still current.
    ///
    /// Returns whether the enhanced snapshot was stored.
    pub async fn enhance_document(&self, uri: &Url, version: i32) -> bool {
        let Some(enhancer) = &self.enhancer else {
            return false;
        };

        // Copy what the enhancer needs so no map guard is held across the await.
        let Some((document, structural)) = self
            .documents
            .get(uri)
            .filter(|doc| doc.version == version)
            .map(|doc| (doc.document(), doc.result.clone()))
        else {
            return false;
        };

        let enhanced = enhancer::enhance(structural, &document, enhancer.as_ref()).await;
        self.apply_enhanced(uri, version, enhanced)
    }

    /// Replace the snapshot of `version` of a document. Stale versions and
    /// closed documents are ignored.
    pub fn apply_enhanced(&self, uri: &Url, version: i32, result: ParseResult) -> bool {
        match self.documents.get_mut(uri) {
            Some(mut doc) if doc.version == version => {
                doc.result = result;
                true
            }
            _ => {
                tracing::debug!(%uri, version, "discarding stale enhancement");
                false
            }
        }
    }

    /// Remove a document.
    pub fn remove_document(&self, uri: &Url) {
        self.documents.remove(uri);
    }

    /// Get a document by URI.
    pub fn get_document(
        &self,
        uri: &Url,
    ) -> Option<dashmap::mapref::one::Ref<'_, Url, DocumentState>> {
        self.documents.get(uri)
    }
}
