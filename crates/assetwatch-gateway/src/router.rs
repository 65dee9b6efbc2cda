//! Axum router wiring.
//!
//! `/metrics` and `/healthz` are explicit routes; every other path falls back
//! to the instrumented asset dispatcher. The limiter wraps the whole chain.

use axum::{routing::get, Router};

use crate::{app_state::AppState, dispatch, ops};

pub fn build_router(state: AppState) -> Router {
    let limiter = state.limiter();
    let app = Router::new()
        .route("/metrics", get(ops::metrics))
        .route("/healthz", get(ops::healthz))
        .fallback(dispatch::serve_asset)
        .with_state(state);
    limiter.rate_limit(app)
}
