use std::path::PathBuf;

use thiserror::Error;

use crate::value::Kind;

/// Errors produced while loading a document from disk.
#[derive(Debug, Error)]
pub enum DocError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("document root in {} is a {kind}, expected a mapping", path.display())]
    RootNotMapping { path: PathBuf, kind: Kind },
}

impl DocError {
    /// Returns `true` if the underlying cause is a missing file.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DocError::Read { source, .. } if source.kind() == std::io::ErrorKind::NotFound
        )
    }
}
