//! HTTP boot-provisioning server.
//!
//! Serves per-host Ignition configs composed from layered Butane fragments,
//! iPXE boot scripts rendered from templates, and CoreOS boot images
//! mirrored from the upstream builds server.

pub mod butane;
pub mod config;
pub mod error;
pub mod ignition;
pub mod images;
pub mod ipxe;
pub mod router;
pub mod server;
pub mod state;

pub use butane::{ButaneCommand, ButaneTranslator, TranslateError, TranslateOutput};
pub use config::{default_path_keys, ServerConfig};
pub use error::{ServerError, ServerResult};
pub use server::IronpxeServer;
pub use state::AppState;
