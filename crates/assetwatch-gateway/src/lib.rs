//! assetwatch gateway library entry.
//!
//! This crate wires the config, rate limiter, instrumented asset dispatcher
//! and metrics reporter into one axum router. It is consumed by the binary
//! (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod ops;
pub mod policy;
pub mod report;
pub mod router;
