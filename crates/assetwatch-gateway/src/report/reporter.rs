use std::collections::BTreeMap;
use std::fmt::Write;
use std::sync::Arc;

use askama::Template;
use serde::Serialize;

use assetwatch_core::error::{AssetWatchError, Result};
use assetwatch_core::MetricsStore;

use crate::policy::RateLimiter;

use super::format::ReportFormat;

/// Rendered report body plus its content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub content_type: &'static str,
    pub body: String,
}

/// Everything a report shows, collected once and sorted by key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportView {
    pub misses: u64,
    pub hits: Vec<(String, u64)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clients: Option<Vec<(String, u64)>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limiter: Option<Vec<(String, u64)>>,
    #[serde(skip)]
    pub max_path_len: usize,
}

#[derive(Template)]
#[template(path = "metrics.html")]
struct MetricsPage<'a> {
    refresh_secs: u32,
    misses: u64,
    hits: &'a [(String, u64)],
    show_clients: bool,
    clients: &'a [(String, u64)],
    show_limiter: bool,
    limiter: &'a [(String, u64)],
}

pub struct Reporter {
    metrics: Arc<MetricsStore>,
    limiter: Option<Arc<dyn RateLimiter>>,
    format: ReportFormat,
}

impl Reporter {
    pub fn new(
        metrics: Arc<MetricsStore>,
        limiter: Option<Arc<dyn RateLimiter>>,
        format: ReportFormat,
    ) -> Self {
        Self { metrics, limiter, format }
    }

    /// Take one snapshot of each source.
    pub fn collect(&self) -> ReportView {
        let snap = self.metrics.snapshot();
        let limiter = self.limiter.as_ref().map(|l| {
            let sorted: BTreeMap<String, u64> = l.stats().into_iter().collect();
            sorted.into_iter().collect()
        });
        ReportView {
            misses: snap.misses,
            hits: snap.hits.into_iter().collect(),
            clients: snap.clients.map(|c| c.into_iter().collect()),
            limiter,
            max_path_len: snap.max_path_len,
        }
    }

    pub fn render(&self) -> Result<Report> {
        self.render_as(self.format)
    }

    pub fn render_as(&self, format: ReportFormat) -> Result<Report> {
        let view = self.collect();
        let body = render_view(&view, format)?;
        Ok(Report {
            content_type: format.content_type(),
            body,
        })
    }
}

/// Render an already collected view.
pub fn render_view(view: &ReportView, format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Html { refresh_secs } => render_html(view, refresh_secs),
        ReportFormat::Text => Ok(render_text(view)),
        ReportFormat::Minimal => Ok(render_minimal(view)),
        ReportFormat::Json => serde_json::to_string_pretty(view)
            .map_err(|e| AssetWatchError::Render(format!("json: {e}"))),
    }
}

fn render_html(view: &ReportView, refresh_secs: u32) -> Result<String> {
    let page = MetricsPage {
        refresh_secs,
        misses: view.misses,
        hits: &view.hits,
        show_clients: view.clients.is_some(),
        clients: view.clients.as_deref().unwrap_or_default(),
        show_limiter: view.limiter.is_some(),
        limiter: view.limiter.as_deref().unwrap_or_default(),
    };
    page.render()
        .map_err(|e| AssetWatchError::Render(format!("metrics template: {e}")))
}

fn render_text(view: &ReportView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Misses: {}", view.misses);
    let _ = writeln!(out, "\nHits:");
    write_aligned(&mut out, &view.hits, view.max_path_len);
    if let Some(clients) = &view.clients {
        let _ = writeln!(out, "\nClients:");
        write_aligned(&mut out, clients, key_width(clients));
    }
    if let Some(limiter) = &view.limiter {
        let _ = writeln!(out, "\nRate limit:");
        write_aligned(&mut out, limiter, key_width(limiter));
    }
    out
}

fn key_width(rows: &[(String, u64)]) -> usize {
    rows.iter().map(|(k, _)| k.chars().count()).max().unwrap_or(0)
}

fn write_aligned(out: &mut String, rows: &[(String, u64)], width: usize) {
    for (k, v) in rows {
        let _ = writeln!(out, "  {k:<width$}  {v:>8}");
    }
}

fn render_minimal(view: &ReportView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "misses {}", view.misses);
    let _ = writeln!(out, "[hits]");
    for (k, v) in &view.hits {
        let _ = writeln!(out, "{k} {v}");
    }
    if let Some(clients) = &view.clients {
        let _ = writeln!(out, "[clients]");
        for (k, v) in clients {
            let _ = writeln!(out, "{k} {v}");
        }
    }
    if let Some(limiter) = &view.limiter {
        let _ = writeln!(out, "[limiter]");
        for (k, v) in limiter {
            let _ = writeln!(out, "{k} {v}");
        }
    }
    out
}
