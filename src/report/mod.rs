//! Reporting utilities: formatted terminal output for KPIs, correlations and
//! fetch warnings.
//!
//! We keep formatting code in one place so:
//! - the alignment/statistics code stays clean and testable
//! - output changes are localized (important for future snapshot tests)

pub mod format;

pub use format::*;
