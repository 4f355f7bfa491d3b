//! Boot-image endpoint backed by the local mirror.

use std::sync::Arc;

use axum::extract::{Path, Query, Request, State};
use axum::response::{IntoResponse, Response};
use ironpxe_mirror::PxeFileType;
use serde::Deserialize;
use tower::ServiceExt;
use tower_http::services::ServeFile;

use crate::error::{ServerError, ServerResult};
use crate::state::AppState;

fn default_stream() -> String {
    "stable".to_owned()
}

fn default_arch() -> String {
    "x86_64".to_owned()
}

#[derive(Debug, Deserialize)]
pub struct ImageQuery {
    #[serde(default = "default_stream")]
    pub stream: String,
    #[serde(default = "default_arch")]
    pub arch: String,
}

/// `GET /images/coreos/:filetype`: resolve the artifact through stream
/// metadata and serve it from the mirror, fetching upstream on a miss.
pub async fn image_handler(
    State(state): State<Arc<AppState>>,
    Path(file_type): Path<String>,
    Query(query): Query<ImageQuery>,
    request: Request,
) -> ServerResult<Response> {
    let file_type: PxeFileType = file_type
        .parse()
        .map_err(|_| ServerError::BadRequest(format!("unknown image file type: {file_type}")))?;

    let stream = state.streams.get(&query.stream).await?;
    let media = stream.pxe_artifact(&query.arch, file_type)?;
    let file_name = media.file_name()?;

    let local = state
        .mirror
        .serve_or_fetch(&format!("coreos/{file_name}"), &media.location)
        .await?;

    // ServeFile handles range requests and conditional headers for us.
    match ServeFile::new(local).oneshot(request).await {
        Ok(response) => Ok(response.into_response()),
        Err(infallible) => match infallible {},
    }
}
