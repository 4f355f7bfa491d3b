//! Reading layer files into the document tree.

use std::fs;
use std::path::Path;

use crate::error::DocError;
use crate::value::{Mapping, Scalar, Value};

/// Load `base_dir/relative_path` and decode it into a mapping-rooted document.
///
/// Fails with [`DocError::Read`] when the file is missing or unreadable and
/// with [`DocError::Parse`] / [`DocError::RootNotMapping`] when the content
/// does not decode into the generic document shape. No side effects beyond
/// the read.
pub fn load_document(base_dir: &Path, relative_path: &str) -> Result<Mapping, DocError> {
    let path = base_dir.join(relative_path);
    let text = fs::read_to_string(&path).map_err(|source| DocError::Read {
        path: path.clone(),
        source,
    })?;
    parse_document(&text, &path)
}

/// Decode document text, requiring a mapping at the root.
pub fn parse_document(text: &str, path: &Path) -> Result<Mapping, DocError> {
    let value: Value = serde_yaml::from_str(text).map_err(|source| DocError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    match value {
        Value::Mapping(map) => Ok(map),
        // An empty document decodes as null; treat it as an empty mapping.
        Value::Scalar(Scalar::Null) => Ok(Mapping::new()),
        other => Err(DocError::RootNotMapping {
            path: path.to_path_buf(),
            kind: other.kind(),
        }),
    }
}
