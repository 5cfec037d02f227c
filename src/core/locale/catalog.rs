use std::{collections::BTreeMap, fs, path::Path};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::core::error::BuildError;

/// Locale identifier, e.g. `en` or `ar_AE`.
pub type Locale = String;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Ltr,
    Rtl,
}

/// Catalog entry for a single locale.
///
/// Only the fields the build consumes are typed; the rest of the entry is
/// carried through untouched so it can be embedded in the generated HTML.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocaleInfo {
    #[serde(default)]
    pub fallback_locales: Vec<Locale>,
    #[serde(default)]
    pub direction: Direction,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Read-only locale catalog, loaded once per process.
#[derive(Debug, Clone)]
pub struct LocaleCatalog {
    entries: BTreeMap<Locale, LocaleInfo>,
    fallback_locale: Locale,
}

impl LocaleCatalog {
    /// Build a catalog from parsed entries.
    ///
    /// The global fallback locale must have an entry; it is the one locale the
    /// build can always resolve.
    pub fn new(entries: BTreeMap<Locale, LocaleInfo>, fallback_locale: &str) -> Result<Self> {
        if !entries.contains_key(fallback_locale) {
            bail!(
                "Locale catalog has no entry for the fallback locale '{}'",
                fallback_locale
            );
        }
        Ok(Self {
            entries,
            fallback_locale: fallback_locale.to_string(),
        })
    }

    pub fn load(path: &Path, fallback_locale: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read locale catalog: {:?}", path))?;
        let entries: BTreeMap<Locale, LocaleInfo> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse locale catalog: {:?}", path))?;
        Self::new(entries, fallback_locale)
    }

    pub fn fallback_locale(&self) -> &str {
        &self.fallback_locale
    }

    pub fn get(&self, locale: &str) -> Result<&LocaleInfo, BuildError> {
        self.entries
            .get(locale)
            .ok_or_else(|| BuildError::UnknownLocale(locale.to_string()))
    }

    pub fn contains(&self, locale: &str) -> bool {
        self.entries.contains_key(locale)
    }

    pub fn is_rtl(&self, locale: &str) -> Result<bool, BuildError> {
        Ok(self.get(locale)?.direction == Direction::Rtl)
    }
}
