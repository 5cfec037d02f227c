//! HTML and XHTML packaging.
//!
//! - `minify`: production and debug minification profiles
//! - `scripts`: header, license, initialization and startup scripts
//! - `document`: the parameterized document assembly
//! - `xhtml`: the `xhtml/` package
//! - `extras`: iframe test pages, the a11y view, copied extras

pub mod document;
pub mod extras;
pub mod minify;
pub mod scripts;
pub mod xhtml;

pub use document::{
    DocumentConfig, DocumentInputs, DocumentParts, PreparedScripts, assemble_document,
    document_parts,
};
pub use minify::MinifyOptions;
