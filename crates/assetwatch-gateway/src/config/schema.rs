use std::net::SocketAddr;
use std::time::Duration;

use serde::Deserialize;

use assetwatch_core::error::{AssetWatchError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub metrics: MetricsSection,

    #[serde(default)]
    pub rate_limit: RateLimitSection,
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(AssetWatchError::UnsupportedVersion);
        }
        self.server.validate()?;
        self.rate_limit.validate()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default = "default_assets_dir")]
    pub assets_dir: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            assets_dir: default_assets_dir(),
        }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr()?;
        if self.assets_dir.trim().is_empty() {
            return Err(AssetWatchError::BadConfig(
                "server.assets_dir must not be empty".into(),
            ));
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|e| {
            AssetWatchError::BadConfig(format!("server.listen {:?}: {e}", self.listen))
        })
    }
}

fn default_listen() -> String {
    "0.0.0.0:8000".into()
}
fn default_assets_dir() -> String {
    "./assets".into()
}

/// Output format of the `/metrics` report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormatName {
    #[default]
    Html,
    Text,
    Minimal,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsSection {
    #[serde(default = "default_true")]
    pub track_clients: bool,

    /// Take the client identity from this request header instead of the peer
    /// address (e.g. `x-forwarded-for` behind a proxy).
    #[serde(default)]
    pub client_header: Option<String>,

    #[serde(default)]
    pub report_format: ReportFormatName,

    /// HTML auto-refresh period; 0 disables.
    #[serde(default = "default_refresh_secs")]
    pub refresh_secs: u32,
}

impl Default for MetricsSection {
    fn default() -> Self {
        Self {
            track_clients: true,
            client_header: None,
            report_format: ReportFormatName::default(),
            refresh_secs: default_refresh_secs(),
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_refresh_secs() -> u32 {
    1
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RateLimitSection {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_window_ms")]
    pub window_ms: u64,

    #[serde(default = "default_max_requests")]
    pub max_requests: u32,

    #[serde(default = "default_burst")]
    pub burst: u32,

    #[serde(default = "default_cleanup_interval_ms")]
    pub cleanup_interval_ms: u64,
}

impl Default for RateLimitSection {
    fn default() -> Self {
        Self {
            enabled: true,
            window_ms: default_window_ms(),
            max_requests: default_max_requests(),
            burst: default_burst(),
            cleanup_interval_ms: default_cleanup_interval_ms(),
        }
    }
}

impl RateLimitSection {
    pub fn validate(&self) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }
        if self.window_ms == 0 || self.max_requests == 0 || self.burst == 0 {
            return Err(AssetWatchError::BadConfig(
                "rate_limit.window_ms, max_requests and burst must be >= 1".into(),
            ));
        }
        if self.cleanup_interval_ms < 1000 {
            return Err(AssetWatchError::BadConfig(
                "rate_limit.cleanup_interval_ms must be >= 1000".into(),
            ));
        }
        Ok(())
    }

    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_millis(self.cleanup_interval_ms)
    }
}

fn default_window_ms() -> u64 {
    100
}
fn default_max_requests() -> u32 {
    30
}
fn default_burst() -> u32 {
    30
}
fn default_cleanup_interval_ms() -> u64 {
    60_000
}
