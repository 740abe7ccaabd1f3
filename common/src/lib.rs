//! fxconv Common Types
//!
//! Shared types used across the fxconv workspace: currency codes, exchange
//! rate tables, fetch identifiers and time utilities.

pub mod identifiers;
pub mod monetary;
pub mod time;

pub use identifiers::*;
pub use monetary::*;
pub use time::*;
