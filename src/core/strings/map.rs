use std::collections::BTreeMap;

use anyhow::Result;
use serde_json::Value;

use super::{
    loader::{StringFileLoader, lookup_string_entry},
    usage::{LIVE_REFERENCE_SUFFIX, UsageScan},
};
use crate::core::{
    error::BuildError,
    locale::{Locale, resolve_fallback_chain},
};

/// Locale -> full string key (`JOIST/ResetAllButton.name`) -> value.
pub type StringMap = BTreeMap<Locale, BTreeMap<String, String>>;

/// Full string key -> metadata of the fallback locale's entry.
pub type StringMetadata = BTreeMap<String, Value>;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct StringMapResult {
    pub string_map: StringMap,
    pub string_metadata: StringMetadata,
}

pub fn full_string_key(namespace: &str, partial_key: &str) -> String {
    format!("{}/{}", namespace, partial_key)
}

/// Resolve every used string for every requested locale.
///
/// Resolution walks the locale's fallback chain and takes the first file that
/// has the key; translations are never merged across chain levels. A used key
/// that resolves nowhere fails the build unless it is a live-reference key,
/// which is left out of the map instead.
///
/// `namespaces` maps each repository to its `requirejsNamespace`.
pub fn build_string_map(
    locales: &[Locale],
    usage: &UsageScan,
    namespaces: &BTreeMap<String, String>,
    loader: &mut StringFileLoader<'_>,
) -> Result<StringMapResult> {
    let fallback_locale = loader.catalog().fallback_locale().to_string();
    if !locales.contains(&fallback_locale) {
        return Err(BuildError::MissingFallbackLocale(fallback_locale).into());
    }

    let repos: Vec<String> = usage.keys().cloned().collect();
    loader.load_all(&repos, locales)?;

    let mut result = StringMapResult {
        string_map: locales
            .iter()
            .map(|locale| (locale.clone(), BTreeMap::new()))
            .collect(),
        string_metadata: StringMetadata::new(),
    };

    let chains = locales
        .iter()
        .map(|locale| Ok((locale, resolve_fallback_chain(loader.catalog(), locale)?)))
        .collect::<Result<Vec<_>, BuildError>>()?;

    for (repo, partial_keys) in usage {
        let namespace = namespaces
            .get(repo)
            .ok_or_else(|| BuildError::MissingNamespace(repo.clone()))?;

        for partial_key in partial_keys {
            let full_key = full_string_key(namespace, partial_key);

            for (locale, chain) in &chains {
                let entry = chain.iter().find_map(|chain_locale| {
                    loader
                        .get(repo, chain_locale)
                        .and_then(|contents| lookup_string_entry(contents, partial_key))
                });

                let Some(entry) = entry else {
                    if partial_key.ends_with(LIVE_REFERENCE_SUFFIX) {
                        continue;
                    }
                    return Err(BuildError::MissingString {
                        repo: repo.clone(),
                        key: partial_key.clone(),
                    }
                    .into());
                };

                if let Some(strings) = result.string_map.get_mut(*locale) {
                    strings.insert(full_key.clone(), entry.value.to_string());
                }

                if **locale == fallback_locale
                    && let Some(metadata) = entry.metadata
                {
                    result
                        .string_metadata
                        .insert(full_key.clone(), metadata.clone());
                }
            }
        }
    }

    tracing::debug!(
        locales = locales.len(),
        keys = result.string_map.get(&fallback_locale).map_or(0, |m| m.len()),
        "string map built"
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use std::{collections::BTreeSet, fs, path::Path};

    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::{TempDir, tempdir};

    use super::*;
    use crate::{
        config::Config,
        core::strings::usage::scan_usages,
        core::locale::{LocaleCatalog, LocaleInfo},
    };

    const LTR: char = '\u{202a}';
    const POP: char = '\u{202c}';

    fn ltr(text: &str) -> String {
        format!("{}{}{}", LTR, text, POP)
    }

    fn catalog() -> LocaleCatalog {
        let entries = BTreeMap::from([
            ("en".to_string(), LocaleInfo::default()),
            ("es".to_string(), LocaleInfo::default()),
            ("fr".to_string(), LocaleInfo::default()),
            (
                "es_MX".to_string(),
                LocaleInfo {
                    fallback_locales: vec!["es".to_string()],
                    ..Default::default()
                },
            ),
        ]);
        LocaleCatalog::new(entries, "en").unwrap()
    }

    fn write(root: &Path, path: &str, content: &str) {
        let path = root.join(path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn fixture() -> TempDir {
        let dir = tempdir().unwrap();
        write(
            dir.path(),
            "joist/joist-strings_en.json",
            r#"{"a": {"value": "A-en", "metadata": {"limit": 5}}, "b": {"value": "B-en"}}"#,
        );
        write(
            dir.path(),
            "babel/joist/joist-strings_es.json",
            r#"{"a": {"value": "A-es", "metadata": {"ignored": true}}}"#,
        );
        dir
    }

    fn usage(repo: &str, keys: &[&str]) -> UsageScan {
        UsageScan::from([(
            repo.to_string(),
            keys.iter().map(|k| k.to_string()).collect::<BTreeSet<_>>(),
        )])
    }

    fn namespaces() -> BTreeMap<String, String> {
        BTreeMap::from([("joist".to_string(), "JOIST".to_string())])
    }

    fn locales(items: &[&str]) -> Vec<Locale> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_first_match_wins() {
        let dir = fixture();
        let catalog = catalog();
        let mut loader = StringFileLoader::new(dir.path(), &Config::default(), &catalog);

        let result = build_string_map(
            &locales(&["en", "es"]),
            &usage("joist", &["a"]),
            &namespaces(),
            &mut loader,
        )
        .unwrap();

        assert_eq!(result.string_map["es"]["JOIST/a"], ltr("A-es"));
        assert_eq!(result.string_map["en"]["JOIST/a"], ltr("A-en"));
    }

    #[test]
    fn test_fallback_substitution() {
        let dir = fixture();
        let catalog = catalog();
        let mut loader = StringFileLoader::new(dir.path(), &Config::default(), &catalog);

        let result = build_string_map(
            &locales(&["en", "fr", "es_MX"]),
            &usage("joist", &["a", "b"]),
            &namespaces(),
            &mut loader,
        )
        .unwrap();

        assert_eq!(result.string_map["fr"]["JOIST/a"], ltr("A-en"));
        assert_eq!(result.string_map["es_MX"]["JOIST/a"], ltr("A-es"));
        assert_eq!(result.string_map["es_MX"]["JOIST/b"], ltr("B-en"));
    }

    #[test]
    fn test_metadata_only_from_fallback_locale() {
        let dir = fixture();
        let catalog = catalog();
        let mut loader = StringFileLoader::new(dir.path(), &Config::default(), &catalog);

        let result = build_string_map(
            &locales(&["en", "es"]),
            &usage("joist", &["a", "b"]),
            &namespaces(),
            &mut loader,
        )
        .unwrap();

        assert_eq!(
            result.string_metadata,
            StringMetadata::from([("JOIST/a".to_string(), json!({"limit": 5}))])
        );
    }

    #[test]
    fn test_missing_string_is_fatal() {
        let dir = fixture();
        let catalog = catalog();
        let mut loader = StringFileLoader::new(dir.path(), &Config::default(), &catalog);

        let err = build_string_map(
            &locales(&["en", "es"]),
            &usage("joist", &["a", "nope"]),
            &namespaces(),
            &mut loader,
        )
        .unwrap_err();

        assert_eq!(
            err.downcast_ref::<BuildError>(),
            Some(&BuildError::MissingString {
                repo: "joist".to_string(),
                key: "nope".to_string()
            })
        );
    }

    #[test]
    fn test_live_reference_key_may_be_unresolved() {
        let dir = fixture();
        let catalog = catalog();
        let mut loader = StringFileLoader::new(dir.path(), &Config::default(), &catalog);

        let result = build_string_map(
            &locales(&["en"]),
            &usage("joist", &["a", "nameStringProperty"]),
            &namespaces(),
            &mut loader,
        )
        .unwrap();

        assert_eq!(result.string_map["en"].len(), 1);
        assert!(!result.string_map["en"].contains_key("JOIST/nameStringProperty"));
    }

    fn scanned(source: &str) -> UsageScan {
        let modules = BTreeMap::from([("joist/js/Sim.js".to_string(), source.to_string())]);
        scan_usages(&modules, |_| true)
    }

    #[test]
    fn test_scanned_live_reference_value_resolves() {
        let dir = fixture();
        let catalog = catalog();
        let mut loader = StringFileLoader::new(dir.path(), &Config::default(), &catalog);

        let usage = scanned(
            "import JoistStrings from './JoistStrings.js';\nx(JoistStrings.aStringProperty.value);\n",
        );
        let result = build_string_map(&locales(&["en"]), &usage, &namespaces(), &mut loader).unwrap();

        assert_eq!(result.string_map["en"]["JOIST/a"], ltr("A-en"));
    }

    #[test]
    fn test_scanned_live_reference_collapses_to_required_key() {
        let dir = fixture();
        let catalog = catalog();
        let mut loader = StringFileLoader::new(dir.path(), &Config::default(), &catalog);

        let usage = scanned(
            "import JoistStrings from './JoistStrings.js';\nx(JoistStrings.missingStringProperty);\n",
        );
        let err = build_string_map(&locales(&["en"]), &usage, &namespaces(), &mut loader).unwrap_err();

        assert_eq!(
            err.downcast_ref::<BuildError>(),
            Some(&BuildError::MissingString {
                repo: "joist".to_string(),
                key: "missing".to_string()
            })
        );
    }

    #[test]
    fn test_fallback_locale_required() {
        let dir = fixture();
        let catalog = catalog();
        let mut loader = StringFileLoader::new(dir.path(), &Config::default(), &catalog);

        let err = build_string_map(
            &locales(&["es"]),
            &usage("joist", &["a"]),
            &namespaces(),
            &mut loader,
        )
        .unwrap_err();

        assert_eq!(
            err.downcast_ref::<BuildError>(),
            Some(&BuildError::MissingFallbackLocale("en".to_string()))
        );
    }

    #[test]
    fn test_empty_usage_yields_empty_locale_maps() {
        let dir = fixture();
        let catalog = catalog();
        let mut loader = StringFileLoader::new(dir.path(), &Config::default(), &catalog);

        let result = build_string_map(
            &locales(&["en", "es"]),
            &UsageScan::new(),
            &namespaces(),
            &mut loader,
        )
        .unwrap();

        assert_eq!(
            result,
            StringMapResult {
                string_map: StringMap::from([
                    ("en".to_string(), BTreeMap::new()),
                    ("es".to_string(), BTreeMap::new()),
                ]),
                string_metadata: StringMetadata::new(),
            }
        );
    }

    #[test]
    fn test_missing_namespace() {
        let dir = fixture();
        let catalog = catalog();
        let mut loader = StringFileLoader::new(dir.path(), &Config::default(), &catalog);

        let err = build_string_map(
            &locales(&["en"]),
            &usage("joist", &["a"]),
            &BTreeMap::new(),
            &mut loader,
        )
        .unwrap_err();

        assert_eq!(
            err.downcast_ref::<BuildError>(),
            Some(&BuildError::MissingNamespace("joist".to_string()))
        );
    }
}
