//! Enhancer error types.

use std::io;
use thiserror::Error;

/// Result type for enhancer operations.
pub type EnhanceResult<T> = Result<T, EnhanceError>;

/// Errors raised while running the semantic enhancer.
///
/// None of these ever reach the user: the parse pipeline logs them and falls
/// back to the structural result.
#[derive(Error, Debug)]
pub enum EnhanceError {
    /// Failed to spawn the enhancer process.
    #[error("failed to spawn enhancer `{command}`: {source}")]
    SpawnFailed {
        command: String,
        #[source]
        source: io::Error,
    },

    /// Failed to stage the document for the enhancer.
    #[error("failed to stage document: {0}")]
    StagingFailed(#[source] io::Error),

    /// Failed to read the enhancer's output.
    #[error("failed to read from enhancer: {0}")]
    ReadFailed(#[source] io::Error),

    /// The enhancer ran longer than allowed.
    #[error("enhancer timed out after {0} seconds")]
    Timeout(u64),

    /// The enhancer exited with a failure status.
    #[error("enhancer exited with status {status}: {stderr}")]
    Exited { status: String, stderr: String },

    /// The enhancer's output was not a valid project tree.
    #[error("failed to deserialize enhancer output: {0}")]
    DeserializeFailed(#[source] serde_json::Error),
}

impl EnhanceError {
    /// Whether retrying the same document could succeed.
    pub fn is_retriable(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::ReadFailed(_))
    }
}

impl From<serde_json::Error> for EnhanceError {
    fn from(err: serde_json::Error) -> Self {
        Self::DeserializeFailed(err)
    }
}
