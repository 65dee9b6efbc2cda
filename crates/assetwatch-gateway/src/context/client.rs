use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Request};
use axum::http::HeaderName;

use assetwatch_core::client;
use assetwatch_core::error::{AssetWatchError, Result};

/// Where a request's client identity comes from.
#[derive(Debug, Clone)]
pub enum ClientSource {
    /// Peer socket address (needs `into_make_service_with_connect_info`).
    Peer,
    /// First entry of a forwarding header set by a trusted proxy.
    Header(HeaderName),
}

impl ClientSource {
    /// Build from the optional `metrics.client_header` config value.
    pub fn from_config(header: Option<&str>) -> Result<Self> {
        match header {
            None => Ok(Self::Peer),
            Some(h) => HeaderName::try_from(h)
                .map(Self::Header)
                .map_err(|e| {
                    AssetWatchError::BadConfig(format!("metrics.client_header {h:?}: {e}"))
                }),
        }
    }

    /// Resolve the client identifier for `req`, port stripped.
    pub fn identify(&self, req: &Request) -> Result<String> {
        match self {
            Self::Peer => req
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| client::from_socket_addr(addr))
                .ok_or_else(|| {
                    AssetWatchError::ClientIdentifier("peer address unavailable".into())
                }),
            Self::Header(name) => {
                let raw = req
                    .headers()
                    .get(name)
                    .ok_or_else(|| {
                        AssetWatchError::ClientIdentifier(format!("missing {name} header"))
                    })?
                    .to_str()
                    .map_err(|e| AssetWatchError::ClientIdentifier(format!("{name}: {e}")))?;
                client::parse(raw)
            }
        }
    }
}
