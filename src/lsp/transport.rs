//! Transport layer - stdio
//!
//! Native editors (Neovim, VS Code, Zed) talk to the server over stdin and
//! stdout. Logging must go to stderr so it never corrupts the stream.

use std::sync::Arc;

use tower_lsp::{LspService, Server};

use super::backend::LspBackend;
use super::project::ProjectState;

/// Run the LSP server over stdio until the client disconnects.
pub async fn run_stdio(project: ProjectState) {
    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let project = Arc::new(project);
    let (service, socket) = LspService::new(move |client| LspBackend::new(client, project));

    Server::new(stdin, stdout, socket).serve(service).await;
}
