//! Boot-image mirroring for ironpxe.
//!
//! Two collaborators for the HTTP layer: [`ImageMirror`], a serve-or-fetch
//! cache of upstream boot images, and [`StreamCache`], a three-level cache
//! of CoreOS stream metadata used to resolve which image a PXE request
//! needs. The composition core never touches this crate; all network I/O
//! lives here.

pub mod error;
pub mod mirror;
pub mod streams;

pub use error::MirrorError;
pub use mirror::ImageMirror;
pub use streams::{Media, PxeFileType, Stream, StreamCache, KNOWN_STREAMS, STREAMS_BASE_URL};
