//! Calendar alignment.
//!
//! - quarterly → month-end resampling (`normalize`)
//! - the daily-domain aligned table, forward-fill, and windowing (`table`)

pub mod normalize;
pub mod table;

pub use normalize::*;
pub use table::*;
