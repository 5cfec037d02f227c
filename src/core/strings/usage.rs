//! Lexical scan for string-namespace usage in compiled modules.
//!
//! This is deliberately regex-based rather than parser-based: it can report
//! property accesses that merely share a namespace prefix, and it misses
//! computed accesses. Which strings count as "used" decides which strings end
//! up in the build, so the heuristic must stay stable. Everything downstream
//! consumes only [`UsageScan`], so a syntax-tree scanner can replace
//! [`scan_usages`] without touching other components.

use std::{
    collections::{BTreeMap, BTreeSet},
    sync::LazyLock,
};

use regex::Regex;

use crate::utils::{strings_namespace_prefix, to_kebab_case};

/// Suffix of an access that denotes a reactive handle rather than a string value.
pub const LIVE_REFERENCE_SUFFIX: &str = "StringProperty";

/// Minified output produces `FooStrings.js` from the import path itself.
const ESCAPE_TOKEN: &str = "js";

/// Repository name -> partial string keys referenced in the compiled modules.
pub type UsageScan = BTreeMap<String, BTreeSet<String>>;

/// `import FooStrings from '../../foo/js/FooStrings.js';`
static STRINGS_IMPORT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"import [a-zA-Z_$][a-zA-Z0-9_$]*Strings from ['"][^\n\r]+Strings\.(?:js|ts)['"];"#)
        .unwrap()
});

/// Captures the file-name stem before the `Strings` suffix of the import path.
static IMPORT_NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([\w-]+)Strings\.(?:js|ts)").unwrap());

/// One `.identifier` or `['text']` path segment of a normalized access.
static ACCESS_TOKEN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\.([a-zA-Z_$][a-zA-Z0-9_$]*)|\['([^']+)'\]").unwrap()
});

static BRACKET_OPEN_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[ *'").unwrap());
static BRACKET_CLOSE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"' *\]").unwrap());

/// Scan module texts for the string keys each repository's namespace is accessed with.
///
/// `repo_exists` decides whether a candidate repository name derived from an
/// import path refers to a real, loadable repository. Candidates it rejects
/// are dropped silently. Repositories with no surviving keys are omitted.
pub fn scan_usages<F>(file_contents_by_module: &BTreeMap<String, String>, repo_exists: F) -> UsageScan
where
    F: Fn(&str) -> bool,
{
    let contents: Vec<&str> = file_contents_by_module.values().map(String::as_str).collect();

    let mut result = UsageScan::new();
    for repo in repos_with_string_imports(&contents) {
        if !repo_exists(&repo) {
            tracing::debug!(repo = %repo, "ignoring strings import that does not name a repository");
            continue;
        }

        let keys = scan_repo_keys(&repo, &contents);
        if !keys.is_empty() {
            result.insert(repo, keys);
        }
    }
    result
}

/// Candidate repository names from every `import XStrings from '...XStrings.js'` statement.
fn repos_with_string_imports(contents: &[&str]) -> BTreeSet<String> {
    contents
        .iter()
        .flat_map(|content| STRINGS_IMPORT_REGEX.find_iter(content))
        .filter_map(|statement| {
            IMPORT_NAME_REGEX
                .captures(statement.as_str())
                .and_then(|caps| caps.get(1))
                .map(|name| to_kebab_case(name.as_str()))
        })
        .collect()
}

fn scan_repo_keys(repo: &str, contents: &[&str]) -> BTreeSet<String> {
    let prefix = strings_namespace_prefix(repo);
    let import_marker = format!("import {} from", prefix);

    let pattern = format!(
        r"{}(?:\.[a-zA-Z_$][a-zA-Z0-9_$]*|\[ *'[^']+' *\])+[^.\[]",
        regex::escape(&prefix)
    );
    let access_regex = match Regex::new(&pattern) {
        Ok(regex) => regex,
        Err(err) => {
            tracing::warn!(repo = %repo, error = %err, "skipping string usage scan");
            return BTreeSet::new();
        }
    };

    contents
        .iter()
        .filter(|content| content.contains(&import_marker))
        .flat_map(|content| access_regex.find_iter(content))
        .map(|access| normalize_access(access.as_str()))
        .map(|access| access_to_partial_key(&access[prefix.len()..]))
        .filter(|key| !key.is_empty() && key != ESCAPE_TOKEN)
        .collect()
}

/// Drop the terminating character, normalize bracket spacing and collapse
/// live-reference accesses back onto the key they belong to.
///
/// `JoistStrings[ 'a-bStringProperty' ];` -> `JoistStrings['a-b']`
fn normalize_access(access: &str) -> String {
    let without_terminator = match access.char_indices().last() {
        Some((idx, _)) => &access[..idx],
        None => access,
    };

    let spaced = BRACKET_OPEN_REGEX.replace_all(without_terminator, "['");
    let normalized = BRACKET_CLOSE_REGEX.replace_all(&spaced, "']").into_owned();

    collapse_live_reference(&normalized)
}

/// Cut a live-reference access and whatever is read off it (`.value`, ...)
/// back to the owning key, keeping the bracket form.
///
/// `JoistStrings.aStringProperty.value` -> `JoistStrings.a`
fn collapse_live_reference(access: &str) -> String {
    let mut search_from = 0;
    while let Some(offset) = access[search_from..].find(LIVE_REFERENCE_SUFFIX) {
        let start = search_from + offset;
        let stem = &access[..start];
        let rest = &access[start + LIVE_REFERENCE_SUFFIX.len()..];
        if rest.starts_with("']") {
            return format!("{}']", stem);
        }
        if rest.is_empty() || rest.starts_with(['.', '[']) {
            return stem.to_string();
        }
        search_from = start + LIVE_REFERENCE_SUFFIX.len();
    }
    access.to_string()
}

/// `.a['b-c'].d` -> `a.b-c.d`
fn access_to_partial_key(path: &str) -> String {
    ACCESS_TOKEN_REGEX
        .captures_iter(path)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|segment| segment.as_str())
        .collect::<Vec<_>>()
        .join(".")
}
