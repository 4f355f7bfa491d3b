use ironpxe_doc::{DocError, Kind};
use thiserror::Error;

/// Conflict between two layers at a single position in the tree.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConflictError {
    /// The layers disagree on the structural kind of a key.
    #[error("kind mismatch at {context_path}: overlay {src_kind} vs base {dst_kind}")]
    KindMismatch {
        context_path: String,
        dst_kind: Kind,
        src_kind: Kind,
    },

    /// Both layers define the same scalar key with different values while
    /// overwriting is disabled.
    #[error("duplicate key at {context_path} (overwrite disabled)")]
    DuplicateKey { context_path: String },
}

impl ConflictError {
    /// The dotted context path at which the conflict occurred.
    pub fn context_path(&self) -> &str {
        match self {
            ConflictError::KindMismatch { context_path, .. }
            | ConflictError::DuplicateKey { context_path } => context_path,
        }
    }
}

/// What went wrong inside a single layer.
#[derive(Debug, Error)]
pub enum LayerCause {
    #[error(transparent)]
    Document(#[from] DocError),

    #[error(transparent)]
    Conflict(#[from] ConflictError),
}

/// Errors returned by the layer orchestrator. Any failure aborts the whole
/// composition; no partial document is ever produced.
#[derive(Debug, Error)]
pub enum ComposeError {
    /// A layer failed to load, resolve, or merge.
    #[error("layer {layer}: {source}")]
    Layer {
        layer: String,
        #[source]
        source: LayerCause,
    },

    /// The final accumulator failed to serialize.
    #[error("failed to serialize composed document: {0}")]
    Serialize(#[from] serde_yaml::Error),
}

impl ComposeError {
    pub(crate) fn layer(layer: &str, cause: impl Into<LayerCause>) -> Self {
        ComposeError::Layer {
            layer: layer.to_owned(),
            source: cause.into(),
        }
    }

    /// Returns `true` if the failure was a missing layer file, which the
    /// serving boundary maps to "not found".
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ComposeError::Layer {
                source: LayerCause::Document(doc),
                ..
            } if doc.is_not_found()
        )
    }
}
