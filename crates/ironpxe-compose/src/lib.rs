//! Layered configuration composition for ironpxe.
//!
//! Composes a final Butane document from an ordered stack of partial
//! configuration layers: each layer is loaded, its file-reference fields are
//! rewritten relative to the layer's own location, and the result is folded
//! into an accumulator under a configurable conflict/overwrite/append
//! policy.
//!
//! # Example
//!
//! ```no_run
//! use ironpxe_compose::{Composer, MergePolicy, PathKeys};
//!
//! let composer = Composer::new("/etc/ironpxe/configs/coreos")
//!     .with_policy(MergePolicy::default())
//!     .with_path_keys(PathKeys::new([".local", ".contents_local"]));
//! let butane = composer.compose(["base/base.yaml", "web01/host.yaml"])?;
//! # Ok::<(), ironpxe_compose::ComposeError>(())
//! ```

pub mod error;
pub mod layers;
pub mod merge;
pub mod observer;
pub mod resolve;

pub use error::{ComposeError, ConflictError, LayerCause};
pub use layers::Composer;
pub use merge::{merge_into, MergePolicy};
pub use observer::{NoopObserver, RewriteObserver, TraceObserver};
pub use resolve::{resolve_paths, PathKeys, ROOT_CONTEXT};
