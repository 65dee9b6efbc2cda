//! Request admission (rate limiting).
//!
//! The rest of the gateway only sees the `RateLimiter` trait: one call at
//! wiring time to wrap the router, and a stats read for the metrics report.

pub mod limiter;

use std::collections::HashMap;
use std::sync::Arc;

use axum::Router;

pub use limiter::{ClientRateLimiter, LimiterConfig};

/// Admission control layered around the whole handler chain.
pub trait RateLimiter: Send + Sync + 'static {
    /// Wrap `app` so every request passes admission before reaching it.
    fn rate_limit(self: Arc<Self>, app: Router) -> Router;

    /// Per-client remaining allowance. Must not block.
    fn stats(&self) -> HashMap<String, u64>;
}

/// Admits every request and reports nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct AdmitAll;

impl RateLimiter for AdmitAll {
    fn rate_limit(self: Arc<Self>, app: Router) -> Router {
        app
    }

    fn stats(&self) -> HashMap<String, u64> {
        HashMap::new()
    }
}
