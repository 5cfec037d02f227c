use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};

use super::{CollectedLicenses, LicenseEntry};
use crate::core::{error::BuildError, manifest::PackageManifest};

/// Name of the per-directory license table.
pub const LICENSE_FILE_NAME: &str = "license.json";

/// Directory whose scripts are keyed in the static library license table.
const LIBRARY_DIR: &str = "sherpa/lib";

/// Looks up the license entry for a root-relative resource path.
pub trait LicenseLookup {
    fn license_entry(&self, relative_path: &str) -> Option<LicenseEntry>;
}

/// Reads entries from the `license.json` next to the resource.
pub struct LicenseFileLookup {
    root: PathBuf,
}

impl LicenseFileLookup {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl LicenseLookup for LicenseFileLookup {
    fn license_entry(&self, relative_path: &str) -> Option<LicenseEntry> {
        let path = self.root.join(relative_path);
        let file_name = path.file_name()?.to_str()?;
        let license_path = path.parent()?.join(LICENSE_FILE_NAME);

        let content = fs::read_to_string(&license_path).ok()?;
        let mut table: BTreeMap<String, LicenseEntry> = match serde_json::from_str(&content) {
            Ok(table) => table,
            Err(err) => {
                tracing::warn!(path = %license_path.display(), error = %err, "unreadable license table");
                return None;
            }
        };
        table.remove(file_name)
    }
}

/// Restore the media file a modulified resource was generated from.
///
/// `joist/images/phet-logo_png.js` -> `joist/images/phet-logo.png`
pub fn media_path_for_module(module: &str) -> Option<String> {
    let (dir, file) = module.rsplit_once('/').unwrap_or(("", module));
    let (stem, _module_ext) = file.rsplit_once('.')?;
    let (name, media_ext) = stem.rsplit_once('_')?;
    if name.is_empty() || media_ext.is_empty() {
        return None;
    }

    Some(if dir.is_empty() {
        format!("{}.{}", name, media_ext)
    } else {
        format!("{}/{}.{}", dir, name, media_ext)
    })
}

/// License entries for every media resource among the used modules.
///
/// A module is a media resource when its second path segment names a media
/// type. Every media type gets a bucket even when nothing uses it.
pub fn collect_media_license_entries(
    used_modules: &[String],
    media_types: &[String],
    lookup: &dyn LicenseLookup,
) -> CollectedLicenses {
    let mut collected: CollectedLicenses = media_types
        .iter()
        .map(|media_type| (media_type.clone(), BTreeMap::new()))
        .collect();

    for module in used_modules {
        let Some(segment) = module.split('/').nth(1) else {
            continue;
        };
        let Some(bucket) = collected.get_mut(segment) else {
            continue;
        };

        match media_path_for_module(module) {
            Some(resource) => {
                let entry = lookup.license_entry(&resource);
                bucket.insert(resource, entry);
            }
            None => {
                tracing::debug!(module = %module, "media module without a media file suffix");
            }
        }
    }

    collected
}

/// Keys into the static library table: preloaded library scripts plus the
/// manifest's explicit `licenseKeys`.
pub fn library_license_keys(manifest: &PackageManifest) -> Vec<String> {
    let mut keys: Vec<String> = manifest
        .phet
        .preload
        .iter()
        .filter(|preload| preload.contains(LIBRARY_DIR))
        .filter_map(|preload| {
            Path::new(preload)
                .file_stem()
                .and_then(|stem| stem.to_str())
                .map(str::to_string)
        })
        .chain(manifest.phet.license_keys.iter().cloned())
        .collect();
    keys.sort();
    keys.dedup();
    keys
}

/// The `lib` bucket: entries of `sherpa/lib/license.json` for `keys`.
pub fn load_library_entries(root: &Path, keys: &[String]) -> Result<BTreeMap<String, LicenseEntry>> {
    if keys.is_empty() {
        return Ok(BTreeMap::new());
    }

    let path = root.join(LIBRARY_DIR).join(LICENSE_FILE_NAME);
    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read library licenses: {:?}", path))?;
    let mut table: BTreeMap<String, LicenseEntry> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse library licenses: {:?}", path))?;

    keys.iter()
        .map(|key| {
            table
                .remove(key)
                .map(|entry| (key.clone(), entry))
                .ok_or_else(|| BuildError::MissingLicenseKey(key.clone()).into())
        })
        .collect()
}
