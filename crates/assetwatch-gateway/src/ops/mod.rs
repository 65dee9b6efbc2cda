//! Operational HTTP endpoints.
//!
//! - `/healthz` : liveness
//! - `/metrics` : rendered metrics report (`?format=html|text|minimal|json`)

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::app_state::AppState;
use crate::error::ApiError;
use crate::report::ReportFormat;

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    pub format: Option<String>,
}

pub async fn metrics(
    State(state): State<AppState>,
    Query(q): Query<ReportQuery>,
) -> Result<Response, ApiError> {
    let reporter = state.reporter();
    let report = match q.format.as_deref() {
        Some(name) => {
            reporter.render_as(ReportFormat::parse(name, state.cfg().metrics.refresh_secs)?)?
        }
        None => reporter.render()?,
    };

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, report.content_type),
            (header::CACHE_CONTROL, "no-store"),
        ],
        report.body,
    )
        .into_response())
}
