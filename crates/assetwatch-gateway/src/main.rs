//! assetwatch gateway
//!
//! Serves a directory of static assets, counting hits, misses and requests
//! per client, and exposes the counts on `/metrics`.
//!
//! Usage: `assetwatch-gateway [config.yaml]` (default `assetwatch.yaml`).

use std::net::SocketAddr;

use tracing_subscriber::{fmt, EnvFilter};

use assetwatch_core::error::{AssetWatchError, Result};
use assetwatch_gateway::{app_state, config, router};

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let path = std::env::args().nth(1).unwrap_or_else(|| "assetwatch.yaml".into());
    let cfg = config::load_from_file(&path)?;
    let listen = cfg.server.listen_addr()?;

    let state = app_state::AppState::new(cfg)?;
    if let Some(limiter) = state.client_limiter() {
        let c = limiter.config();
        tracing::info!(
            window_ms = c.window.as_millis() as u64,
            max_requests = c.max_requests,
            burst = c.burst,
            "rate limiting enabled"
        );
        limiter.spawn_cleanup();
    }

    tracing::info!(
        %listen,
        assets = %state.cfg().server.assets_dir,
        track_clients = state.cfg().metrics.track_clients,
        "assetwatch-gateway starting"
    );
    let app = router::build_router(state);

    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| AssetWatchError::Internal(format!("bind {listen}: {e}")))?;

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .map_err(|e| AssetWatchError::Internal(format!("server failed: {e}")))
}
