//! LSP Backend - implements tower_lsp::LanguageServer
//!
//! This module contains the language server implementation. It only reads
//! parse snapshots: every open or change re-parses the whole document, and
//! requests are answered from the latest snapshot.

use std::sync::Arc;

use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};

use super::capabilities::definition;
use super::capabilities::symbols;
use super::project::ProjectState;

/// The LSP backend state.
pub struct LspBackend {
    /// The LSP client for sending notifications back to the editor.
    client: Client,
    /// Open documents and their snapshots.
    project: Arc<ProjectState>,
}

impl LspBackend {
    /// Create a new LSP backend.
    pub fn new(client: Client, project: Arc<ProjectState>) -> Self {
        Self { client, project }
    }

    /// Store the structural snapshot, then enhance it in the background.
    fn update(&self, uri: Url, version: i32, text: String) {
        self.project.update_document(uri.clone(), version, text);

        if self.project.has_enhancer() {
            let project = Arc::clone(&self.project);
            tokio::spawn(async move {
                project.enhance_document(&uri, version).await;
            });
        }
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for LspBackend {
    async fn initialize(&self, _params: InitializeParams) -> Result<InitializeResult> {
        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                // Full document sync - we get the entire document on each change
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                // Document symbols for outline view
                document_symbol_provider: Some(OneOf::Left(true)),
                // Go-to-definition for view, explore, and field references
                definition_provider: Some(OneOf::Left(true)),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "lkml-lsp".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _params: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "LookML language server initialized")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri;
        let version = params.text_document.version;

        self.update(uri.clone(), version, params.text_document.text);

        self.client
            .log_message(MessageType::LOG, format!("Opened: {}", uri))
            .await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let version = params.text_document.version;

        // With FULL sync, the last change carries the entire document
        if let Some(change) = params.content_changes.into_iter().last() {
            self.update(uri, version, change.text);
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;

        self.project.remove_document(&uri);

        self.client
            .log_message(MessageType::LOG, format!("Closed: {}", uri))
            .await;
    }

    async fn document_symbol(
        &self,
        params: DocumentSymbolParams,
    ) -> Result<Option<DocumentSymbolResponse>> {
        let uri = &params.text_document.uri;

        let Some(doc) = self.project.get_document(uri) else {
            return Ok(None);
        };

        Ok(Some(symbols::get_document_symbols(&doc.result)))
    }

    async fn goto_definition(
        &self,
        params: GotoDefinitionParams,
    ) -> Result<Option<GotoDefinitionResponse>> {
        let uri = &params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;

        let Some(doc) = self.project.get_document(uri) else {
            return Ok(None);
        };

        Ok(definition::get_definition(&doc, position))
    }
}
