//! Document assembly.
//!
//! Every HTML variant of a build (per-locale, all-locales, debug, and the
//! XHTML package) is produced from the same [`DocumentInputs`] by choosing a
//! [`DocumentConfig`]. Nothing here writes to disk.

use anyhow::Result;
use serde_json::Value;

use super::{
    minify::{MinifyOptions, minify_script},
    scripts::initialization_script,
};
use crate::core::{
    dependencies::Dependencies,
    locale::{Direction, Locale, LocaleCatalog},
    strings::{StringMapResult, full_string_key, strip_embedding_marks},
};

/// Which view of the shared build data a document gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentConfig<'a> {
    /// Locale the document starts in.
    pub locale: &'a str,
    /// Embed strings for every built locale rather than just `locale`.
    pub include_all_locales: bool,
    pub is_debug_build: bool,
    pub allow_locale_switching: bool,
}

impl<'a> DocumentConfig<'a> {
    pub fn single_locale(locale: &'a str) -> Self {
        Self {
            locale,
            include_all_locales: false,
            is_debug_build: false,
            allow_locale_switching: false,
        }
    }

    pub fn all_locales(locale: &'a str) -> Self {
        Self {
            locale,
            include_all_locales: true,
            is_debug_build: false,
            allow_locale_switching: true,
        }
    }

    pub fn debug(locale: &'a str) -> Self {
        Self {
            is_debug_build: true,
            ..Self::all_locales(locale)
        }
    }
}

/// Build data shared by every document of one build.
#[derive(Debug, Clone)]
pub struct DocumentInputs<'a> {
    pub repo: &'a str,
    pub brand: &'a str,
    pub version: &'a str,
    /// `requirejsNamespace` of the repository being built.
    pub namespace: &'a str,
    pub timestamp: &'a str,
    /// Built locales, fallback locale first.
    pub locales: &'a [Locale],
    pub strings: &'a StringMapResult,
    pub catalog: &'a LocaleCatalog,
    pub dependencies: &'a Dependencies,
    pub package_object: &'a Value,
    pub html_header: &'a str,
    pub license_script: &'a str,
}

impl DocumentInputs<'_> {
    /// Simulation title in `locale`, falling back to the repository name.
    pub fn title(&self, locale: &str) -> String {
        let key = full_string_key(self.namespace, &format!("{}.title", self.repo));
        self.strings
            .string_map
            .get(locale)
            .and_then(|strings| strings.get(&key))
            .map(|title| strip_embedding_marks(title))
            .unwrap_or_else(|| self.repo.to_string())
    }
}

/// Startup scripts run through one minification profile.
#[derive(Debug, Clone)]
pub struct PreparedScripts {
    options: MinifyOptions,
    code: String,
}

impl PreparedScripts {
    pub fn prepare(scripts: &[String], options: MinifyOptions) -> Result<Self> {
        let code = scripts
            .iter()
            .map(|script| minify_script(script, &options))
            .collect::<Result<Vec<_>>>()?
            .join("\n");
        Ok(Self { options, code })
    }

    pub fn options(&self) -> &MinifyOptions {
        &self.options
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentParts {
    pub title: String,
    pub lang: String,
    pub direction: Direction,
    /// Kept un-minified so license notices survive.
    pub license_script: String,
    /// Initialization script followed by the prepared startup scripts.
    pub code: String,
}

pub fn document_parts(
    inputs: &DocumentInputs<'_>,
    config: &DocumentConfig<'_>,
    scripts: &PreparedScripts,
) -> Result<DocumentParts> {
    let init = minify_script(&initialization_script(inputs, config)?, scripts.options())?;
    let direction = match inputs.catalog.is_rtl(config.locale) {
        Ok(true) => Direction::Rtl,
        _ => Direction::Ltr,
    };

    Ok(DocumentParts {
        title: inputs.title(config.locale),
        lang: config.locale.replace('_', "-"),
        direction,
        license_script: inputs.license_script.to_string(),
        code: format!("{}\n{}", init, scripts.code),
    })
}

pub fn assemble_document(
    inputs: &DocumentInputs<'_>,
    config: &DocumentConfig<'_>,
    scripts: &PreparedScripts,
) -> Result<String> {
    let parts = document_parts(inputs, config, scripts)?;
    let dir = match parts.direction {
        Direction::Ltr => "ltr",
        Direction::Rtl => "rtl",
    };

    Ok(format!(
        "<!DOCTYPE HTML>\n\
         <!--\n{header}-->\n\
         <html lang=\"{lang}\" dir=\"{dir}\">\n\
         <head>\n\
         <meta charset=\"utf-8\"/>\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0, maximum-scale=1.0, user-scalable=no\"/>\n\
         <meta name=\"apple-mobile-web-app-capable\" content=\"yes\">\n\
         <meta name=\"phet-sim-level\" content=\"{level}\">\n\
         <title>{title}</title>\n\
         </head>\n\
         <body>\n\
         <script type=\"text/javascript\">\n{license}</script>\n\
         <script type=\"text/javascript\">\n{code}\n</script>\n\
         </body>\n\
         </html>\n",
        header = inputs.html_header.replace("--", "- -"),
        lang = escape_markup(&parts.lang),
        dir = dir,
        level = if config.is_debug_build { "debug" } else { "production" },
        title = escape_markup(&parts.title),
        license = parts.license_script,
        code = parts.code,
    ))
}

/// Escape text for HTML and XML character data and attribute values.
pub fn escape_markup(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
