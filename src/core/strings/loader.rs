use std::{
    collections::{BTreeMap, BTreeSet},
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde_json::{Map, Value};

use crate::{
    config::Config,
    core::locale::{Locale, LocaleCatalog, resolve_fallback_chain},
};

/// Left-to-right embedding mark.
pub const LTR_MARK: char = '\u{202a}';
/// Right-to-left embedding mark.
pub const RTL_MARK: char = '\u{202b}';
/// Pop directional formatting.
pub const POP_MARK: char = '\u{202c}';

/// Repository -> locale -> parsed string file.
pub type StringFiles = BTreeMap<String, BTreeMap<Locale, Value>>;

/// A single resolved entry of a string file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StringEntry<'a> {
    pub value: &'a str,
    pub metadata: Option<&'a Value>,
}

/// Loads string files for (repository, locale) pairs and caches them for one build.
///
/// The fallback locale's file lives inside the repository
/// (`{root}/{repo}/{repo}-strings_en.json`); every other locale lives in the
/// translations repository (`{root}/babel/{repo}/{repo}-strings_es.json`).
pub struct StringFileLoader<'a> {
    root: PathBuf,
    translations_repo: String,
    catalog: &'a LocaleCatalog,
    cache: StringFiles,
}

impl<'a> StringFileLoader<'a> {
    pub fn new(root: impl Into<PathBuf>, config: &Config, catalog: &'a LocaleCatalog) -> Self {
        Self {
            root: root.into(),
            translations_repo: config.translations_repo.clone(),
            catalog,
            cache: StringFiles::new(),
        }
    }

    pub fn catalog(&self) -> &LocaleCatalog {
        self.catalog
    }

    pub fn string_file_path(&self, repo: &str, locale: &str) -> PathBuf {
        let file_name = format!("{}-strings_{}.json", repo, locale);
        if locale == self.catalog.fallback_locale() {
            self.root.join(repo).join(file_name)
        } else {
            self.root
                .join(&self.translations_repo)
                .join(repo)
                .join(file_name)
        }
    }

    /// Load every file needed to resolve `locales` (including each locale's
    /// fallback chain) for every repository in `repos`.
    ///
    /// Missing or unparseable files are expected for partially translated
    /// repositories and load as empty objects.
    pub fn load_all(&mut self, repos: &[String], locales: &[Locale]) -> Result<&StringFiles> {
        let mut needed_locales = BTreeSet::new();
        for locale in locales {
            needed_locales.extend(resolve_fallback_chain(self.catalog, locale)?);
        }

        let mut pending = Vec::new();
        for repo in repos {
            for locale in &needed_locales {
                let cached = self
                    .cache
                    .get(repo)
                    .is_some_and(|files| files.contains_key(locale));
                if !cached {
                    let is_rtl = self.catalog.is_rtl(locale)?;
                    let path = self.string_file_path(repo, locale);
                    pending.push((repo.clone(), locale.clone(), path, is_rtl));
                }
            }
        }

        let loaded: Vec<_> = pending
            .into_par_iter()
            .map(|(repo, locale, path, is_rtl)| {
                let contents = match read_string_file(&path) {
                    Ok(mut contents) => {
                        format_string_values(&mut contents, is_rtl);
                        contents
                    }
                    Err(err) => {
                        tracing::debug!(
                            repo = %repo,
                            locale = %locale,
                            "missing string file, translate later: {:#}",
                            err
                        );
                        Value::Object(Map::new())
                    }
                };
                (repo, locale, contents)
            })
            .collect();

        for (repo, locale, contents) in loaded {
            self.cache.entry(repo).or_default().insert(locale, contents);
        }

        Ok(&self.cache)
    }

    pub fn get(&self, repo: &str, locale: &str) -> Option<&Value> {
        self.cache.get(repo).and_then(|files| files.get(locale))
    }

    /// Locales with a translation file for `repo`, plus the fallback locale.
    pub fn available_locales(&self, repo: &str) -> Result<Vec<Locale>> {
        let pattern = self
            .root
            .join(&self.translations_repo)
            .join(repo)
            .join(format!("{}-strings_*.json", repo));
        let pattern = pattern.to_string_lossy().to_string();
        let file_prefix = format!("{}-strings_", repo);

        let mut locales = vec![self.catalog.fallback_locale().to_string()];
        for path in glob::glob(&pattern)
            .with_context(|| format!("Invalid translation file pattern: {}", pattern))?
        {
            let path = path?;
            let locale = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(|stem| stem.strip_prefix(&file_prefix))
                .map(|locale| locale.to_string());
            if let Some(locale) = locale
                && !locales.contains(&locale)
            {
                locales.push(locale);
            }
        }
        locales[1..].sort();
        Ok(locales)
    }
}

fn read_string_file(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read string file: {:?}", path))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse string file: {:?}", path))
}

/// Wrap every string value with embedding marks for the locale's direction.
pub fn format_string_values(contents: &mut Value, is_rtl: bool) {
    let Value::Object(map) = contents else {
        return;
    };

    if let Some(Value::String(value)) = map.get_mut("value") {
        *value = add_directional_formatting(value, is_rtl);
        return;
    }

    for child in map.values_mut() {
        format_string_values(child, is_rtl);
    }
}

pub fn add_directional_formatting(text: &str, is_rtl: bool) -> String {
    let mark = if is_rtl { RTL_MARK } else { LTR_MARK };
    format!("{}{}{}", mark, text, POP_MARK)
}

pub fn strip_embedding_marks(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(*c, LTR_MARK | RTL_MARK | POP_MARK))
        .collect()
}

/// Find the entry for `key` in a string file.
///
/// The whole key is tried as a flat key first, then the key is split on `.`
/// boundaries and nested objects are walked, so files may mix
/// `{"a.b": {...}}` and `{"a": {"b": {...}}}` layouts.
pub fn lookup_string_entry<'v>(contents: &'v Value, key: &str) -> Option<StringEntry<'v>> {
    let map = contents.as_object()?;

    if let Some(entry) = map.get(key).and_then(as_string_entry) {
        return Some(entry);
    }

    key.match_indices('.').find_map(|(idx, _)| {
        let (head, rest) = (&key[..idx], &key[idx + 1..]);
        map.get(head)
            .filter(|child| as_string_entry(child).is_none())
            .and_then(|child| lookup_string_entry(child, rest))
    })
}

fn as_string_entry(value: &Value) -> Option<StringEntry<'_>> {
    let map = value.as_object()?;
    let text = map.get("value")?.as_str()?;
    Some(StringEntry {
        value: text,
        metadata: map.get("metadata"),
    })
}
