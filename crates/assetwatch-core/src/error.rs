//! Shared error type across assetwatch crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Invalid input / malformed request.
    BadRequest,
    /// Requested asset does not exist.
    NotFound,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in logs and tests.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::NotFound => "NOT_FOUND",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, AssetWatchError>;

/// Unified error type used by core and gateway.
#[derive(Debug, Error)]
pub enum AssetWatchError {
    /// Asset absent. Counted as a miss; expected traffic, not a fault.
    #[error("File not found")]
    NotFound,
    /// Existence probe failed for a reason other than absence.
    #[error("open {path}: {source}")]
    Probe {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("client identifier: {0}")]
    ClientIdentifier(String),
    #[error("render failed: {0}")]
    Render(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("bad config: {0}")]
    BadConfig(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl AssetWatchError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            AssetWatchError::NotFound => ClientCode::NotFound,
            AssetWatchError::BadRequest(_)
            | AssetWatchError::BadConfig(_)
            | AssetWatchError::UnsupportedVersion => ClientCode::BadRequest,
            AssetWatchError::Probe { .. }
            | AssetWatchError::ClientIdentifier(_)
            | AssetWatchError::Render(_)
            | AssetWatchError::Internal(_) => ClientCode::Internal,
        }
    }
}
