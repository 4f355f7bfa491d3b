use thiserror::Error;

/// Errors produced by the image mirror and stream-metadata cache.
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("upstream request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream returned {status}: {body}")]
    Remote {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid stream metadata: {0}")]
    Metadata(#[from] serde_json::Error),

    #[error("unknown stream: {0}")]
    UnknownStream(String),

    #[error("unknown architecture: {0}")]
    UnknownArchitecture(String),

    #[error("stream publishes no {name} artifact")]
    MissingArtifact { name: String },
}

impl MirrorError {
    /// Returns `true` if the failure should map to "not found" at the
    /// serving boundary.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            MirrorError::UnknownStream(_)
                | MirrorError::UnknownArchitecture(_)
                | MirrorError::MissingArtifact { .. }
        )
    }
}

/// Convert a non-success response into [`MirrorError::Remote`], keeping a
/// short excerpt of the body for diagnostics.
pub(crate) async fn error_for_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, MirrorError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let excerpt: String = body.chars().take(100).collect();
    Err(MirrorError::Remote {
        status,
        body: excerpt,
    })
}
