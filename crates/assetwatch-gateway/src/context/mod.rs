//! Per-request context shared across layers.
//!
//! Client identity is resolved here once so the rate limiter and the
//! instrumented dispatcher agree on who a request came from.

pub mod client;

pub use client::ClientSource;
