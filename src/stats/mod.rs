//! Derived metrics over the aligned table.
//!
//! - per-series KPIs: latest value + percent change vs window start (`kpi`)
//! - pairwise Pearson correlation of period-over-period returns (`corr`)

pub mod corr;
pub mod kpi;

pub use corr::*;
pub use kpi::*;
