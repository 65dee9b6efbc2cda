//! Metrics report rendering.
//!
//! A `Reporter` takes one metrics snapshot (plus one rate-limiter stats read)
//! per call and renders it with the selected `ReportFormat`. Nothing is cached
//! between calls, and every list is sorted by key so identical state renders
//! byte-identical output.

pub mod format;
pub mod reporter;

pub use format::ReportFormat;
pub use reporter::{Report, ReportView, Reporter};
