//! Semantic enhancement of structural parse results.
//!
//! A semantic enhancer is an external tool that re-parses the same document
//! with a fuller grammar and reports extra derived properties. Its output is
//! merged additively into the structural snapshot (see [`merge`]).
//!
//! Enhancement is strictly optional. The structural result is computed first
//! and stands on its own; if the enhancer fails for any reason the failure is
//! logged and the structural result is returned unchanged.
//!
//! # Example
//!
//! ```ignore
//! use lkml::dsl::{Document, ParseOptions};
//! use lkml::enhancer::{parse_and_enhance, ProcessEnhancer};
//!
//! let enhancer = ProcessEnhancer::new("lookml-json");
//! let doc = Document::new("orders.view.lkml", source);
//! let result = parse_and_enhance(&doc, &ParseOptions::default(), &enhancer).await;
//! ```

mod error;
pub mod merge;
mod process;
pub mod protocol;

pub use error::{EnhanceError, EnhanceResult};
pub use merge::merge;
pub use process::{ProcessEnhancer, DEFAULT_TIMEOUT_SECS};
pub use protocol::EnhancedProject;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::{EnhancerSettings, SettingsError};
use crate::dsl::{self, Document, ParseOptions, ParseResult};

/// Source of additional derived properties for a document.
#[async_trait]
pub trait SemanticEnhancer: Send + Sync {
    async fn enhance(&self, document: &Document) -> EnhanceResult<EnhancedProject>;
}

/// Enhancer used when enhancement is switched off.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEnhancer;

#[async_trait]
impl SemanticEnhancer for NoopEnhancer {
    async fn enhance(&self, _document: &Document) -> EnhanceResult<EnhancedProject> {
        Ok(EnhancedProject::default())
    }
}

/// Build the enhancer described by configuration.
///
/// # Errors
///
/// Returns an error if enhancement is enabled without a usable command.
pub fn from_settings(settings: &EnhancerSettings) -> Result<Arc<dyn SemanticEnhancer>, SettingsError> {
    if !settings.enabled {
        return Ok(Arc::new(NoopEnhancer));
    }
    let command = settings.resolved_command()?;
    Ok(Arc::new(
        ProcessEnhancer::new(command)
            .with_args(settings.args.clone())
            .with_timeout(Duration::from_secs(settings.timeout_secs)),
    ))
}

/// Parse a document, then enrich the result with the enhancer's output.
pub async fn parse_and_enhance(
    document: &Document,
    options: &ParseOptions,
    enhancer: &dyn SemanticEnhancer,
) -> ParseResult {
    let structural = dsl::parse_with_options(document, options);
    enhance(structural, document, enhancer).await
}

/// Enrich an existing structural result.
///
/// Returns `structural` unchanged when the enhancer fails.
pub async fn enhance(
    structural: ParseResult,
    document: &Document,
    enhancer: &dyn SemanticEnhancer,
) -> ParseResult {
    match enhancer.enhance(document).await {
        Ok(project) if project.is_empty() => structural,
        Ok(project) => merge(&structural, &project),
        Err(err) => {
            tracing::warn!(
                document = %document.identifier,
                error = %err,
                "semantic enhancement failed, keeping structural result"
            );
            structural
        }
    }
}
