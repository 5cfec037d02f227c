use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;

/// The parts of a repository's `package.json` the build reads.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageManifest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub phet: PhetSection,
    /// The whole manifest, embedded in the generated HTML.
    #[serde(skip)]
    pub raw: Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhetSection {
    /// Prefix of every full string key owned by this repository, e.g. `JOIST`.
    #[serde(default)]
    pub requirejs_namespace: Option<String>,
    #[serde(default)]
    pub sim_features: SimFeatures,
    /// Paths, relative to the repository, copied next to the build output.
    #[serde(default)]
    pub package_with_build: Vec<String>,
    /// Sibling repositories this repository depends on.
    #[serde(default)]
    pub phet_libs: Vec<String>,
    /// Scripts, relative to the build root, run before the bundle.
    #[serde(default)]
    pub preload: Vec<String>,
    /// Extra keys into the third-party library license table.
    #[serde(default)]
    pub license_keys: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimFeatures {
    #[serde(default)]
    pub supports_interactive_description: bool,
}

fn default_version() -> String {
    "0.0.0".to_string()
}

pub fn manifest_path(root: &Path, repo: &str) -> std::path::PathBuf {
    root.join(repo).join("package.json")
}

/// True if `repo` is a sibling repository with a readable, parseable manifest.
pub fn manifest_exists(root: &Path, repo: &str) -> bool {
    read_manifest(root, repo).is_ok()
}

pub fn read_manifest(root: &Path, repo: &str) -> Result<PackageManifest> {
    let path = manifest_path(root, repo);
    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read package manifest: {:?}", path))?;
    let raw: Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse package manifest: {:?}", path))?;
    let mut manifest: PackageManifest = serde_json::from_value(raw.clone())
        .with_context(|| format!("Unexpected package manifest layout: {:?}", path))?;
    manifest.raw = raw;
    Ok(manifest)
}
