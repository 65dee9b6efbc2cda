//! Shared application state for the assetwatch gateway.
//!
//! Everything is constructed once here and shared by `Arc`: the metrics store
//! is handed to both the dispatcher and the reporter, so there is no ambient
//! global state and tests can build as many independent instances as needed.

use std::sync::Arc;

use assetwatch_core::error::Result;
use assetwatch_core::MetricsStore;

use crate::config::GatewayConfig;
use crate::context::ClientSource;
use crate::dispatch::{DirServer, FileServer, InstrumentedDispatcher};
use crate::policy::{AdmitAll, ClientRateLimiter, LimiterConfig, RateLimiter};
use crate::report::{ReportFormat, Reporter};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: GatewayConfig,
    metrics: Arc<MetricsStore>,
    dispatcher: InstrumentedDispatcher,
    reporter: Reporter,
    limiter: Arc<dyn RateLimiter>,
    client_limiter: Option<Arc<ClientRateLimiter>>,
}

impl AppState {
    /// Build application state from config: assets from `server.assets_dir`,
    /// per-client limiter when `rate_limit.enabled`.
    pub fn new(cfg: GatewayConfig) -> Result<Self> {
        let files: Arc<dyn FileServer> = Arc::new(DirServer::new(&cfg.server.assets_dir));
        let clients = ClientSource::from_config(cfg.metrics.client_header.as_deref())?;

        let client_limiter = cfg.rate_limit.enabled.then(|| {
            Arc::new(ClientRateLimiter::new(
                LimiterConfig::from(&cfg.rate_limit),
                clients.clone(),
            ))
        });
        let limiter = client_limiter.clone().map(|l| l as Arc<dyn RateLimiter>);

        Ok(Self::build(cfg, files, clients, limiter, client_limiter))
    }

    /// Build from explicit collaborators. `limiter = None` admits everything
    /// and leaves the rate-limit section out of the report.
    pub fn with_parts(
        cfg: GatewayConfig,
        files: Arc<dyn FileServer>,
        limiter: Option<Arc<dyn RateLimiter>>,
    ) -> Result<Self> {
        let clients = ClientSource::from_config(cfg.metrics.client_header.as_deref())?;
        Ok(Self::build(cfg, files, clients, limiter, None))
    }

    fn build(
        cfg: GatewayConfig,
        files: Arc<dyn FileServer>,
        clients: ClientSource,
        limiter: Option<Arc<dyn RateLimiter>>,
        client_limiter: Option<Arc<ClientRateLimiter>>,
    ) -> Self {
        let metrics = Arc::new(MetricsStore::new(cfg.metrics.track_clients));
        let dispatcher = InstrumentedDispatcher::new(files, Arc::clone(&metrics), clients);
        let reporter = Reporter::new(
            Arc::clone(&metrics),
            limiter.clone(),
            ReportFormat::from_config(cfg.metrics.report_format, cfg.metrics.refresh_secs),
        );

        Self {
            inner: Arc::new(AppStateInner {
                cfg,
                metrics,
                dispatcher,
                reporter,
                limiter: limiter.unwrap_or_else(|| Arc::new(AdmitAll) as Arc<dyn RateLimiter>),
                client_limiter,
            }),
        }
    }

    pub fn cfg(&self) -> &GatewayConfig {
        &self.inner.cfg
    }

    pub fn metrics(&self) -> Arc<MetricsStore> {
        Arc::clone(&self.inner.metrics)
    }

    pub fn dispatcher(&self) -> &InstrumentedDispatcher {
        &self.inner.dispatcher
    }

    pub fn reporter(&self) -> &Reporter {
        &self.inner.reporter
    }

    pub fn limiter(&self) -> Arc<dyn RateLimiter> {
        Arc::clone(&self.inner.limiter)
    }

    /// The built-in limiter, when enabled; its idle-client sweep must be
    /// started once a runtime is available.
    pub fn client_limiter(&self) -> Option<Arc<ClientRateLimiter>> {
        self.inner.client_limiter.clone()
    }
}
