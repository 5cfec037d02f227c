//! Chipper - localized HTML build pipeline for interactive simulations
//!
//! Chipper compiles a simulation repository into static HTML artifacts: one
//! document per locale, a combined all-locales document, a debug document, an
//! XHTML package, and the JSON and extras that ship next to them.
//!
//! ## Module Structure
//!
//! - `cli`: Command-line interface layer (argument parsing, commands, summaries)
//! - `config`: Configuration file loading and parsing
//! - `core`: The build pipeline (strings, licenses, document assembly, artifacts)
//! - `utils`: Shared utility functions

pub mod cli;
pub mod config;
pub mod core;
pub mod utils;
