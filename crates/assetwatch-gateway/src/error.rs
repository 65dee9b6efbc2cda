//! HTTP mapping for `AssetWatchError`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use assetwatch_core::error::{AssetWatchError, ClientCode};

/// Handler-level error; every variant terminates only its own request.
#[derive(Debug)]
pub struct ApiError(pub AssetWatchError);

impl From<AssetWatchError> for ApiError {
    fn from(e: AssetWatchError) -> Self {
        Self(e)
    }
}

pub fn status_for(code: ClientCode) -> StatusCode {
    match code {
        ClientCode::BadRequest => StatusCode::BAD_REQUEST,
        ClientCode::NotFound => StatusCode::NOT_FOUND,
        ClientCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        match &err {
            AssetWatchError::NotFound => {}
            AssetWatchError::Probe { path, source } => {
                tracing::warn!(%path, error = %source, "asset probe failed");
            }
            AssetWatchError::ClientIdentifier(msg) => {
                tracing::warn!(error = %msg, "client identifier rejected");
            }
            AssetWatchError::Render(msg) => {
                tracing::error!(error = %msg, "metrics report render failed");
            }
            other => {
                tracing::warn!(error = %other, "request failed");
            }
        }
        (status_for(err.client_code()), err.to_string()).into_response()
    }
}
