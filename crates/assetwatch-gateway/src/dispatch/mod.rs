//! Instrumented asset dispatch.
//!
//! Re-exports the dispatcher and the file-serving seam so downstream consumers
//! can depend on this module directly.

pub mod dispatcher;
pub mod files;

pub use dispatcher::{serve_asset, InstrumentedDispatcher};
pub use files::{DirServer, FileServer, Probe};
