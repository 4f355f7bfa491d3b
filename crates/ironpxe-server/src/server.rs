use std::sync::Arc;

use tokio::net::TcpListener;

use crate::butane::ButaneTranslator;
use crate::config::ServerConfig;
use crate::error::ServerResult;
use crate::router::build_router;
use crate::state::AppState;

/// Boot-provisioning server.
pub struct IronpxeServer {
    state: Arc<AppState>,
}

impl IronpxeServer {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            state: Arc::new(AppState::new(config)),
        }
    }

    /// Construct with an explicit translator. Tests use this to avoid
    /// shelling out to `butane`.
    pub fn with_translator(config: ServerConfig, translator: Arc<dyn ButaneTranslator>) -> Self {
        Self {
            state: Arc::new(AppState::with_translator(config, translator)),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.state.config
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(Arc::clone(&self.state))
    }

    /// Start serving requests.
    pub async fn serve(self) -> ServerResult<()> {
        let bind_addr = self.state.config.bind_addr;
        let app = self.router();
        let listener = TcpListener::bind(bind_addr).await?;
        tracing::info!("ironpxe server listening on {bind_addr}");
        axum::serve(listener, app).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;

    #[test]
    fn server_construction() {
        let server = IronpxeServer::new(ServerConfig::default());
        assert_eq!(
            server.config().bind_addr,
            SocketAddr::from(([0, 0, 0, 0], 8086))
        );
    }

    #[test]
    fn router_builds() {
        let server = IronpxeServer::new(ServerConfig::default());
        let _router = server.router();
    }
}
