//! Relative-path rewriting for file-reference fields.
//!
//! Layer files name other files (scripts, unit contents, authorized keys)
//! by paths relative to the layer file itself. Before merging, those leaves
//! are rewritten to be relative to the composition base directory so the
//! downstream translator finds them regardless of which layer contributed
//! them.

use std::path::{Component, Path, PathBuf};

use ironpxe_doc::{Mapping, Scalar, Value};

use crate::observer::RewriteObserver;

/// Context path of the document root.
pub const ROOT_CONTEXT: &str = "$";

/// The set of matchers identifying which fields hold file references.
///
/// A matcher beginning with `.` matches as a suffix of the dotted context
/// path; any other matcher must equal the context path exactly.
#[derive(Clone, Debug, Default)]
pub struct PathKeys {
    matchers: Vec<String>,
}

impl PathKeys {
    pub fn new<I, S>(matchers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            matchers: matchers.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns `true` if a string leaf at `context_path` denotes a file
    /// reference.
    pub fn matches(&self, context_path: &str) -> bool {
        self.matchers.iter().any(|matcher| {
            if matcher.starts_with('.') {
                context_path.ends_with(matcher.as_str())
            } else {
                matcher == context_path
            }
        })
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }
}

/// Rewrite every matched file-reference leaf in `doc` to be relative to the
/// directory containing the layer file at `layer_path`.
///
/// The walk threads an explicit dotted context path rooted at [`ROOT_CONTEXT`].
/// Sequence elements share their parent's context path. Never fails;
/// unmatched values pass through unchanged.
pub fn resolve_paths(
    doc: &mut Mapping,
    layer_path: &str,
    keys: &PathKeys,
    observer: &dyn RewriteObserver,
) {
    resolve_mapping(doc, layer_path, ROOT_CONTEXT, keys, observer);
}

fn resolve_mapping(
    map: &mut Mapping,
    layer_path: &str,
    context_path: &str,
    keys: &PathKeys,
    observer: &dyn RewriteObserver,
) {
    for (key, value) in map.iter_mut() {
        let cpath = format!("{context_path}.{key}");
        if let Some(replacement) = resolve_value(value, layer_path, &cpath, keys, observer) {
            *value = replacement;
        }
    }
}

/// Resolve one node. Returns `Some` when the node itself was rewritten;
/// mapping nodes are mutated in place and always return `None`.
fn resolve_value(
    value: &mut Value,
    layer_path: &str,
    context_path: &str,
    keys: &PathKeys,
    observer: &dyn RewriteObserver,
) -> Option<Value> {
    match value {
        Value::Sequence(items) => {
            let mut rewritten = Vec::with_capacity(items.len());
            for item in items.iter_mut() {
                if let Some(replacement) =
                    resolve_value(item, layer_path, context_path, keys, observer)
                {
                    rewritten.push(replacement);
                }
            }
            // All-or-nothing: the sequence is replaced only when every
            // element was individually rewritten. A single unmatched element
            // leaves the whole sequence untouched, and an empty sequence
            // trivially qualifies.
            if rewritten.len() == items.len() {
                Some(Value::Sequence(rewritten))
            } else {
                None
            }
        }
        Value::Mapping(map) => {
            resolve_mapping(map, layer_path, context_path, keys, observer);
            None
        }
        Value::Scalar(Scalar::String(leaf)) if keys.matches(context_path) => {
            let resolved = join_layer_relative(layer_path, leaf);
            observer.rewrote(layer_path, context_path, leaf, &resolved);
            Some(Value::string(resolved))
        }
        Value::Scalar(_) => None,
    }
}

/// Join `value` onto the directory containing `layer_path`, lexically
/// normalizing `.` and `..` components. An absolute `value` is treated as
/// relative, so the result always stays under the layer directory.
fn join_layer_relative(layer_path: &str, value: &str) -> String {
    let dir = Path::new(layer_path).parent().unwrap_or_else(|| Path::new(""));
    let mut out = PathBuf::new();
    for component in dir.components().chain(Path::new(value).components()) {
        match component {
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other),
        }
    }
    out.to_string_lossy().into_owned()
}
