//! Generic configuration document model for ironpxe.
//!
//! Layer files are untyped YAML documents. This crate gives them a typed
//! shape, [`Value`] with its `Scalar` / `Sequence` / `Mapping` variants,
//! and handles loading them from disk. The merge and path-rewrite logic
//! lives in `ironpxe-compose`.

pub mod error;
pub mod loader;
pub mod value;

pub use error::DocError;
pub use loader::{load_document, parse_document};
pub use value::{Kind, Mapping, Scalar, Value};
