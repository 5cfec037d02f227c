//! Build pipeline.
//!
//! Leaf modules first:
//!
//! - `locale`: locale catalog and fallback chains
//! - `strings`: string usage scanning, string file loading, the string map
//! - `licenses`: license lookups and the third-party report
//! - `manifest`, `dependencies`, `bundler`, `thumbnails`: collaborators
//! - `html`: document assembly and packaging
//! - `assemble`: the phased build that writes every artifact

pub mod assemble;
pub mod bundler;
pub mod dependencies;
pub mod error;
pub mod html;
pub mod licenses;
pub mod locale;
pub mod manifest;
pub mod strings;
pub mod thumbnails;

pub use assemble::{
    ArtifactAssembler, BuildOptions, BuildPhase, BuildReport, Collaborators, LocaleSelection,
};
pub use error::BuildError;
