//! Typed failures of the build pipeline.
//!
//! Every variant aborts the build. Plumbing failures (I/O, JSON) travel as
//! `anyhow::Error` with context; these variants carry the domain conditions a
//! caller may want to match on.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("Unsupported locale: {0} (no entry in the locale catalog)")]
    UnknownLocale(String),

    #[error("The fallback locale '{0}' is required but was not among the requested locales")]
    MissingFallbackLocale(String),

    #[error("Unable to find the string \"{key}\" in {repo}")]
    MissingString { repo: String, key: String },

    #[error("Repository '{0}' uses strings but its package.json has no phet.requirejsNamespace")]
    MissingNamespace(String),

    #[error("Module '{module}' belongs to '{repo}', which is not a declared dependency")]
    UndeclaredDependency { module: String, repo: String },

    #[error("Brand '{brand}' requires the '{repo}' repository, which was not found")]
    MissingRestrictedRepo { brand: String, repo: String },

    #[error("Unknown brand: {0}")]
    UnknownBrand(String),

    #[error("License entry for library '{0}' not found in sherpa/lib/license.json")]
    MissingLicenseKey(String),

    #[error("Bundler failed: {0}")]
    Bundler(String),
}
