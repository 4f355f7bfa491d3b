//! The Butane-to-Ignition translation boundary.
//!
//! Translation is an external concern; this module only defines the
//! interface the Ignition handler consumes and a subprocess-backed
//! implementation that shells out to the `butane` binary. Tests substitute
//! their own translator.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// The result of a successful translation.
#[derive(Clone, Debug)]
pub struct TranslateOutput {
    /// The Ignition config, as JSON bytes.
    pub ignition: Vec<u8>,
    /// Warnings the translator reported alongside success.
    pub diagnostics: String,
}

#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("failed to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("translator I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("translation failed: {diagnostics}")]
    Failed { diagnostics: String },
}

/// Translates a Butane document into an Ignition config.
#[async_trait]
pub trait ButaneTranslator: Send + Sync {
    /// Translate `document`, resolving `local` file references against
    /// `files_dir`.
    async fn translate(
        &self,
        document: &[u8],
        files_dir: &Path,
    ) -> Result<TranslateOutput, TranslateError>;
}

/// Runs the external `butane` binary.
pub struct ButaneCommand {
    binary: PathBuf,
}

impl ButaneCommand {
    pub fn new() -> Self {
        Self {
            binary: PathBuf::from("butane"),
        }
    }

    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }
}

impl Default for ButaneCommand {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ButaneTranslator for ButaneCommand {
    async fn translate(
        &self,
        document: &[u8],
        files_dir: &Path,
    ) -> Result<TranslateOutput, TranslateError> {
        let mut child = Command::new(&self.binary)
            .arg("--files-dir")
            .arg(files_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| TranslateError::Spawn {
                command: self.binary.display().to_string(),
                source,
            })?;

        // Feed stdin from a task while the output pipes drain, so a
        // translator that emits before consuming its input cannot deadlock
        // on pipe buffers. A translator that exits early reports through its
        // status, so write failures are ignored.
        let stdin = child.stdin.take();
        let document = document.to_vec();
        let writer = tokio::spawn(async move {
            if let Some(mut stdin) = stdin {
                let _ = stdin.write_all(&document).await;
            }
        });

        let output = child.wait_with_output().await?;
        let _ = writer.await;
        let diagnostics = String::from_utf8_lossy(&output.stderr).into_owned();
        if !output.status.success() {
            return Err(TranslateError::Failed { diagnostics });
        }
        Ok(TranslateOutput {
            ignition: output.stdout,
            diagnostics,
        })
    }
}
