use super::{Locale, LocaleCatalog};
use crate::core::error::BuildError;

/// Ordered locales to consult when resolving a string for `locale`.
///
/// The chain is `[locale, ...catalog fallbacks, global fallback]`. Repeats are
/// kept; callers stop at the first hit. The global fallback locale resolves to
/// itself alone.
pub fn resolve_fallback_chain(
    catalog: &LocaleCatalog,
    locale: &str,
) -> Result<Vec<Locale>, BuildError> {
    let fallback = catalog.fallback_locale();
    if locale == fallback {
        return Ok(vec![fallback.to_string()]);
    }

    let info = catalog.get(locale)?;
    let mut chain = Vec::with_capacity(info.fallback_locales.len() + 2);
    chain.push(locale.to_string());
    chain.extend(info.fallback_locales.iter().cloned());
    chain.push(fallback.to_string());
    Ok(chain)
}
