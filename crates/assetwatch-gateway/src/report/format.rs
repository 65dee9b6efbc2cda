use assetwatch_core::error::{AssetWatchError, Result};

use crate::config::ReportFormatName;

/// Output strategy for the metrics report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// HTML page, auto-refreshing every `refresh_secs` (0 = never).
    Html { refresh_secs: u32 },
    /// Plain text with columns aligned to the longest key.
    Text,
    /// One `key value` pair per line under `[section]` headers.
    Minimal,
    Json,
}

impl ReportFormat {
    pub fn from_config(name: ReportFormatName, refresh_secs: u32) -> Self {
        match name {
            ReportFormatName::Html => Self::Html { refresh_secs },
            ReportFormatName::Text => Self::Text,
            ReportFormatName::Minimal => Self::Minimal,
            ReportFormatName::Json => Self::Json,
        }
    }

    /// Parse a `?format=` override. HTML keeps the configured refresh period.
    pub fn parse(name: &str, refresh_secs: u32) -> Result<Self> {
        match name {
            "html" => Ok(Self::Html { refresh_secs }),
            "text" => Ok(Self::Text),
            "minimal" => Ok(Self::Minimal),
            "json" => Ok(Self::Json),
            other => Err(AssetWatchError::BadRequest(format!(
                "unknown report format: {other} (expected html, text, minimal or json)"
            ))),
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Self::Html { .. } => "text/html; charset=utf-8",
            Self::Text | Self::Minimal => "text/plain; charset=utf-8",
            Self::Json => "application/json",
        }
    }
}
