//! Top-level facade crate for assetwatch.
//!
//! Re-exports the metrics core and the gateway library so users can depend on a single crate.

pub mod core {
    pub use assetwatch_core::*;
}

pub mod gateway {
    pub use assetwatch_gateway::*;
}
