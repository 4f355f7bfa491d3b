use std::sync::Arc;

use ironpxe_mirror::{ImageMirror, StreamCache};

use crate::butane::{ButaneCommand, ButaneTranslator};
use crate::config::ServerConfig;

/// Shared state handed to every request handler.
pub struct AppState {
    pub config: ServerConfig,
    pub translator: Arc<dyn ButaneTranslator>,
    pub mirror: ImageMirror,
    pub streams: StreamCache,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self::with_translator(config, Arc::new(ButaneCommand::new()))
    }

    pub fn with_translator(config: ServerConfig, translator: Arc<dyn ButaneTranslator>) -> Self {
        let mirror = ImageMirror::new(&config.image_dir);
        let streams = StreamCache::new(config.image_dir.join("coreos"));
        Self {
            config,
            translator,
            mirror,
            streams,
        }
    }
}
