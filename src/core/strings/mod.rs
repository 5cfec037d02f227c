//! Translatable string discovery and resolution.
//!
//! ## Module Structure
//!
//! - `usage`: lexical scan for the string keys compiled modules reference
//! - `loader`: per-(repository, locale) string file loading and caching
//! - `map`: resolution of used keys into the per-locale string map

pub mod loader;
pub mod map;
pub mod usage;

pub use loader::*;
pub use map::*;
pub use usage::*;
