use std::sync::Arc;

use axum::response::Json;
use axum::routing::get;
use axum::Router;
use serde_json::json;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::ignition::ignition_handler;
use crate::images::image_handler;
use crate::ipxe::ipxe_handler;
use crate::state::AppState;

/// Build the axum router with all ironpxe endpoints.
pub fn build_router(state: Arc<AppState>) -> Router {
    // Raw config files (certificates, scripts, Ignition payloads referenced
    // by other configs) are served read-only under a separate prefix so they
    // never shadow the composed-config routes.
    let files = ServeDir::new(&state.config.config_dir);

    Router::new()
        .route("/healthz", get(health_handler))
        .route("/configs/ipxe/:name", get(ipxe_handler))
        .route("/configs/:osname/:host", get(ignition_handler))
        .route("/images/coreos/:filetype", get(image_handler))
        .nest_service("/files", files)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({
        "name": "ironpxe-server",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
