use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use ironpxe_compose::ComposeError;
use ironpxe_mirror::MirrorError;
use thiserror::Error;

use crate::butane::TranslateError;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("unknown os: {0}")]
    UnknownOs(String),

    #[error("unknown boot template: {0}")]
    UnknownTemplate(String),

    #[error("invalid request: {0}")]
    BadRequest(String),

    #[error("configuration error: {0}")]
    Compose(#[from] ComposeError),

    #[error(transparent)]
    Mirror(#[from] MirrorError),

    #[error(transparent)]
    Translate(#[from] TranslateError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ServerResult<T> = Result<T, ServerError>;

impl ServerError {
    fn status(&self) -> StatusCode {
        match self {
            ServerError::UnknownOs(_) | ServerError::UnknownTemplate(_) => StatusCode::NOT_FOUND,
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Compose(err) if err.is_not_found() => StatusCode::NOT_FOUND,
            ServerError::Mirror(err) if err.is_not_found() => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_os_maps_to_not_found() {
        assert_eq!(
            ServerError::UnknownOs("plan9".into()).status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn bad_request_maps_to_400() {
        assert_eq!(
            ServerError::BadRequest("nope".into()).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn translation_failure_is_internal() {
        let err = ServerError::Translate(TranslateError::Failed {
            diagnostics: "error at $.storage".into(),
        });
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
