use std::sync::Arc;

use axum::{
    extract::{Request, State},
    response::Response,
};
use percent_encoding::percent_decode_str;

use assetwatch_core::error::{AssetWatchError, Result};
use assetwatch_core::MetricsStore;

use crate::app_state::AppState;
use crate::context::ClientSource;
use crate::error::ApiError;

use super::files::{self, FileServer, Probe};

/// Wraps a `FileServer`, attributing every outcome to the metrics store
/// without changing the response the file server would have produced.
///
/// The probe and the delegated serve open the file independently; a file
/// removed in between is counted as a hit and then served as whatever the
/// file server answers (usually 404).
pub struct InstrumentedDispatcher {
    files: Arc<dyn FileServer>,
    metrics: Arc<MetricsStore>,
    clients: ClientSource,
}

impl InstrumentedDispatcher {
    pub fn new(
        files: Arc<dyn FileServer>,
        metrics: Arc<MetricsStore>,
        clients: ClientSource,
    ) -> Self {
        Self {
            files,
            metrics,
            clients,
        }
    }

    /// Handle one asset request.
    ///
    /// Records at most one client touch plus one of hit/miss. Nothing is
    /// recorded when the path or the client identity cannot be parsed, or
    /// when the probe fails for a reason other than absence.
    pub async fn dispatch(&self, req: Request) -> Result<Response> {
        let path = decoded_path(&req)?;

        if self.metrics.tracks_clients() {
            let client = self.clients.identify(&req)?;
            self.metrics.record_client(&client);
        }

        match self.files.probe(&path).await {
            Probe::Found => {}
            Probe::Missing => {
                self.metrics.record_miss();
                tracing::debug!(%path, "asset miss");
                return Err(AssetWatchError::NotFound);
            }
            Probe::Failed(source) => return Err(AssetWatchError::Probe { path, source }),
        }

        let key = files::clean(&path).unwrap_or(path);
        self.metrics.record_hit(&key);
        Ok(self.files.serve(req).await)
    }
}

/// Percent-decoded request path, as handed to the probe.
fn decoded_path(req: &Request) -> Result<String> {
    percent_decode_str(req.uri().path())
        .decode_utf8()
        .map(|p| p.into_owned())
        .map_err(|e| AssetWatchError::BadRequest(format!("invalid path encoding: {e}")))
}

/// Fallback route: every path not claimed by another route is an asset.
pub async fn serve_asset(
    State(app): State<AppState>,
    req: Request,
) -> std::result::Result<Response, ApiError> {
    app.dispatcher().dispatch(req).await.map_err(ApiError)
}
