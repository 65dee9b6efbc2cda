//! Client identity extraction.
//!
//! A client is identified by its IP address alone; the port is stripped so a
//! client reconnecting from a new ephemeral port keeps the same identity.

use std::net::{IpAddr, SocketAddr};

use crate::error::{AssetWatchError, Result};

/// Identity of a connected peer.
pub fn from_socket_addr(addr: &SocketAddr) -> String {
    addr.ip().to_string()
}

/// Parse a textual remote address (`ip`, `ip:port`, `[v6]:port`, or a
/// forwarding-header list whose first entry is one of those).
pub fn parse(raw: &str) -> Result<String> {
    let first = raw.split(',').next().unwrap_or_default().trim();
    if first.is_empty() {
        return Err(AssetWatchError::ClientIdentifier(
            "empty remote address".into(),
        ));
    }

    if let Ok(sa) = first.parse::<SocketAddr>() {
        return Ok(from_socket_addr(&sa));
    }

    let bare = first
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .unwrap_or(first);
    bare.parse::<IpAddr>()
        .map(|ip| ip.to_string())
        .map_err(|e| AssetWatchError::ClientIdentifier(format!("{first:?}: {e}")))
}
