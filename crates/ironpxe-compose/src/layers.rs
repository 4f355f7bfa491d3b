//! Layer orchestration: Load, Resolve, Merge, serialize.

use std::path::{Path, PathBuf};

use ironpxe_doc::{load_document, Mapping, Value};

use crate::error::ComposeError;
use crate::merge::{merge_into, MergePolicy};
use crate::observer::{NoopObserver, RewriteObserver};
use crate::resolve::{resolve_paths, PathKeys, ROOT_CONTEXT};

/// Sequences Load → Resolve → Merge across an ordered list of layers and
/// serializes the result for the Butane translator.
///
/// Each `compose` invocation owns a private accumulator, so a single
/// `Composer` may serve concurrent compositions without locking.
pub struct Composer {
    base_dir: PathBuf,
    policy: MergePolicy,
    path_keys: PathKeys,
    observer: Box<dyn RewriteObserver + Send + Sync>,
}

impl Composer {
    /// A composer over `base_dir` with a default (strict, replacing) policy,
    /// no path-key matchers, and no rewrite observer.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            policy: MergePolicy::default(),
            path_keys: PathKeys::default(),
            observer: Box::new(NoopObserver),
        }
    }

    pub fn with_policy(mut self, policy: MergePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_path_keys(mut self, path_keys: PathKeys) -> Self {
        self.path_keys = path_keys;
        self
    }

    pub fn with_observer(mut self, observer: Box<dyn RewriteObserver + Send + Sync>) -> Self {
        self.observer = observer;
        self
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Compose the given layers, in order, into a single document.
    ///
    /// The first layer seeds the accumulator verbatim (after path
    /// resolution); every later layer is resolved against its own location
    /// and merged in. Any failure aborts immediately, reporting the
    /// offending layer.
    pub fn compose_document<I, S>(&self, layers: I) -> Result<Mapping, ComposeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut accumulator: Option<Mapping> = None;
        for layer in layers {
            let layer = layer.as_ref();
            let mut doc = load_document(&self.base_dir, layer)
                .map_err(|e| ComposeError::layer(layer, e))?;
            resolve_paths(&mut doc, layer, &self.path_keys, self.observer.as_ref());
            match accumulator.as_mut() {
                None => accumulator = Some(doc),
                Some(acc) => merge_into(acc, doc, ROOT_CONTEXT, self.policy)
                    .map_err(|e| ComposeError::layer(layer, e))?,
            }
        }
        Ok(accumulator.unwrap_or_default())
    }

    /// [`Self::compose_document`], serialized to YAML for the downstream
    /// translator.
    pub fn compose<I, S>(&self, layers: I) -> Result<String, ComposeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let document = self.compose_document(layers)?;
        Ok(serde_yaml::to_string(&Value::from(document))?)
    }
}
