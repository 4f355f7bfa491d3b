//! Per-host Ignition config endpoint.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use ironpxe_compose::{Composer, PathKeys, TraceObserver};
use serde::Deserialize;

use crate::error::{ServerError, ServerResult};
use crate::state::AppState;

/// Layers composed for every host, relative to the OS config root. The base
/// layer applies to all hosts; the host layer overrides it.
const LAYERS: [&str; 2] = ["base/base.yaml", "{host}/host.yaml"];

#[derive(Debug, Default, Deserialize)]
pub struct IgnitionQuery {
    /// When present, return the composed Butane YAML instead of translating.
    pub debug: Option<String>,
}

/// `GET /configs/:osname/:host`: compose the host's layered Butane config
/// and translate it to Ignition JSON.
pub async fn ignition_handler(
    State(state): State<Arc<AppState>>,
    Path((osname, host)): Path<(String, String)>,
    Query(query): Query<IgnitionQuery>,
) -> ServerResult<Response> {
    let os_dir = state.config.config_dir.join(&osname);
    match tokio::fs::metadata(&os_dir).await {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => return Err(ServerError::UnknownOs(osname)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(ServerError::UnknownOs(osname));
        }
        Err(err) => return Err(err.into()),
    }

    let composer = Composer::new(&os_dir)
        .with_policy(state.config.policy)
        .with_path_keys(PathKeys::new(state.config.path_keys.clone()))
        .with_observer(Box::new(TraceObserver));
    let layers = LAYERS.map(|layer| layer.replace("{host}", &host));
    let butane = composer.compose(layers)?;

    if query.debug.is_some() {
        return Ok(([(CONTENT_TYPE, "text/yaml")], butane).into_response());
    }

    let output = state.translator.translate(butane.as_bytes(), &os_dir).await?;
    if !output.diagnostics.is_empty() {
        tracing::warn!(
            os = %osname,
            host = %host,
            diagnostics = %output.diagnostics,
            "translator reported diagnostics"
        );
    }
    Ok(([(CONTENT_TYPE, "application/json")], output.ignition).into_response())
}
