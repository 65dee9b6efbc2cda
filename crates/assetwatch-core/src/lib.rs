//! assetwatch core: the shared metrics store, client identity parsing and
//! error types.
//!
//! This crate carries no transport or runtime dependencies so the counters can
//! be exercised from plain threads in tests and reused behind any HTTP stack.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Every operation on the metrics store is total; fallible parsing surfaces as
//! `AssetWatchError`/`Result`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod client;
pub mod error;
pub mod metrics;

/// Shared result type.
pub use error::{AssetWatchError, Result};
pub use metrics::{MetricsSnapshot, MetricsStore};
