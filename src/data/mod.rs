//! Data access.
//!
//! - FRED observations client (`fred`)
//! - pure memoization of fetches (`cache`)

pub mod cache;
pub mod fred;

pub use cache::*;
pub use fred::*;
