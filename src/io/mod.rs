//! Input/output helpers.
//!
//! - aligned-table CSV export (`export`)

pub mod export;

pub use export::*;
