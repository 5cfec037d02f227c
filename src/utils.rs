//! Common utility functions shared across the codebase.

/// Converts an identifier to kebab-case, splitting words on case changes,
/// letter/digit boundaries and the separators `-`, `_` and space.
///
/// # Examples
///
/// ```
/// use chipper::utils::to_kebab_case;
///
/// assert_eq!(to_kebab_case("Joist"), "joist");
/// assert_eq!(to_kebab_case("SceneryPhet"), "scenery-phet");
/// assert_eq!(to_kebab_case("vector_addition"), "vector-addition");
/// ```
pub fn to_kebab_case(text: &str) -> String {
    split_words(text)
        .iter()
        .map(|word| word.to_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}

/// Converts a repository name to PascalCase.
///
/// # Examples
///
/// ```
/// use chipper::utils::to_pascal_case;
///
/// assert_eq!(to_pascal_case("joist"), "Joist");
/// assert_eq!(to_pascal_case("scenery-phet"), "SceneryPhet");
/// ```
pub fn to_pascal_case(text: &str) -> String {
    split_words(text)
        .iter()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect()
}

/// Name of the string-namespace object a repository exports, e.g. `SceneryPhetStrings`.
pub fn strings_namespace_prefix(repo: &str) -> String {
    format!("{}Strings", to_pascal_case(repo))
}

fn split_words(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if matches!(c, '-' | '_' | ' ' | '.') {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }

        if let Some(prev) = current.chars().last() {
            let next = chars.get(i + 1).copied();
            let boundary = (c.is_uppercase() && (prev.is_lowercase() || prev.is_ascii_digit()))
                || (c.is_uppercase()
                    && prev.is_uppercase()
                    && next.is_some_and(|n| n.is_lowercase()))
                || (c.is_ascii_digit() != prev.is_ascii_digit());
            if boundary {
                words.push(std::mem::take(&mut current));
            }
        }
        current.push(c);
    }

    if !current.is_empty() {
        words.push(current);
    }
    words
}
