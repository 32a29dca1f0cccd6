//! Enhancer backed by an external command.
//!
//! The command receives the path of a staged copy of the document as its last
//! argument and must print an [`EnhancedProject`] as JSON on stdout:
//!
//! ```text
//! ┌──────────────┐  stage  ┌──────────────────────────────┐
//! │  Document    │ ──────▶ │ $TMP/lkml-<uuid>/<file name> │
//! └──────────────┘         └──────────────────────────────┘
//!                                        │ argv
//!                                        ▼
//!                          ┌──────────────────────────────┐
//!                          │ enhancer command (child)     │
//!                          └──────────────────────────────┘
//!                                        │ stdout (JSON)
//!                                        ▼
//!                                 EnhancedProject
//! ```
//!
//! The staging directory is removed whether or not the command succeeds.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use super::error::{EnhanceError, EnhanceResult};
use super::protocol::EnhancedProject;
use super::SemanticEnhancer;
use crate::dsl::Document;

/// Default time allowed for one enhancer run (10 seconds).
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// File name used when the document identifier has none.
const FALLBACK_FILE_NAME: &str = "document.lkml";

/// Runs an external command per document.
#[derive(Debug, Clone)]
pub struct ProcessEnhancer {
    command: PathBuf,
    args: Vec<String>,
    timeout: Duration,
}

impl ProcessEnhancer {
    pub fn new(command: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Arguments placed before the document path.
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn command(&self) -> &Path {
        &self.command
    }

    async fn run_in(&self, dir: &Path, document: &Document) -> EnhanceResult<EnhancedProject> {
        let file_name = match document.file_name() {
            "" => FALLBACK_FILE_NAME,
            name => name,
        };
        let staged = dir.join(file_name);
        tokio::fs::write(&staged, &document.text)
            .await
            .map_err(EnhanceError::StagingFailed)?;

        let child = Command::new(&self.command)
            .args(&self.args)
            .arg(&staged)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| EnhanceError::SpawnFailed {
                command: self.command.display().to_string(),
                source,
            })?;

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(output) => output.map_err(EnhanceError::ReadFailed)?,
            Err(_) => return Err(EnhanceError::Timeout(self.timeout.as_secs())),
        };

        if !output.status.success() {
            return Err(EnhanceError::Exited {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(serde_json::from_slice(&output.stdout)?)
    }
}

#[async_trait]
impl SemanticEnhancer for ProcessEnhancer {
    async fn enhance(&self, document: &Document) -> EnhanceResult<EnhancedProject> {
        let dir = std::env::temp_dir().join(format!("lkml-{}", uuid::Uuid::new_v4()));
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(EnhanceError::StagingFailed)?;

        let result = self.run_in(&dir, document).await;

        if let Err(e) = tokio::fs::remove_dir_all(&dir).await {
            tracing::debug!(dir = %dir.display(), error = %e, "failed to remove staging directory");
        }
        result
    }
}
