//! Common utilities for the Sable document engine.
//!
//! This crate provides shared infrastructure used by all engine components:
//! - **Warning System** - deduplicated diagnostics routed through `tracing`

pub mod warning;
