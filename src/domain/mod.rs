//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the series registry (display label ↔ FRED code ↔ native frequency)
//! - dated observation series (`Series`)
//! - the immutable per-run configuration (`DashConfig`)
//! - non-fatal fetch failure records (`FetchFailure`)

pub mod types;

pub use types::*;
