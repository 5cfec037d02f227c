//! Locale catalog and fallback chain resolution.
//!
//! - `catalog`: the shared locale-data catalog (fallbacks + text direction)
//! - `fallback`: ordered list of locales consulted when resolving a string

pub mod catalog;
pub mod fallback;

pub use catalog::*;
pub use fallback::*;
