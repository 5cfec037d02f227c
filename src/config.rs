use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Ok, Result, bail};
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE_NAME: &str = ".chipperrc.json";

/// Brand that ships per-locale HTML, the iframe test page and the a11y view.
pub const PRIMARY_BRAND: &str = "phet";

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Locale every fallback chain ends in. Its string files live inside each repo.
    #[serde(default = "default_fallback_locale")]
    pub fallback_locale: String,
    /// Sibling repository holding translated string files.
    #[serde(default = "default_translations_repo")]
    pub translations_repo: String,
    /// Locale catalog, relative to the build root.
    #[serde(default = "default_locale_data_path")]
    pub locale_data_path: String,
    /// License `projectURL` values that mark in-house content.
    #[serde(default = "default_first_party_urls")]
    pub first_party_urls: Vec<String>,
    /// Brands for which a missing license entry is reported as an error.
    #[serde(default = "default_release_brands")]
    pub release_brands: Vec<String>,
    /// Brands that only ship the combined all-locales HTML.
    #[serde(default = "default_combined_only_brands")]
    pub combined_only_brands: Vec<String>,
    /// Brands that require a proprietary sibling repository (brand -> repo).
    #[serde(default = "default_restricted_brands")]
    pub restricted_brands: BTreeMap<String, String>,
    /// Extra paths (relative to the build root) copied into a brand's build directory.
    #[serde(default)]
    pub brand_supplements: BTreeMap<String, Vec<String>>,
    /// Libraries every simulation depends on, in addition to its own `phetLibs`.
    #[serde(default = "default_common_libs")]
    pub common_libs: Vec<String>,
    /// Second path segment of a used module that marks it as a media resource.
    #[serde(default = "default_media_types")]
    pub media_types: Vec<String>,
    /// Command producing `{ "js": ..., "usedModules": [...] }` on stdout.
    #[serde(default = "default_bundler_command")]
    pub bundler_command: Vec<String>,
    /// Image resize command used for thumbnails.
    #[serde(default = "default_thumbnail_command")]
    pub thumbnail_command: Vec<String>,
    #[serde(default = "default_thumbnail_sizes")]
    pub thumbnail_sizes: Vec<[u32; 2]>,
    #[serde(default = "default_twitter_card_size")]
    pub twitter_card_size: [u32; 2],
}

fn default_fallback_locale() -> String {
    "en".to_string()
}

fn default_translations_repo() -> String {
    "babel".to_string()
}

fn default_locale_data_path() -> String {
    "babel/localeData.json".to_string()
}

fn default_first_party_urls() -> Vec<String> {
    ["https://phet.colorado.edu", "http://phet.colorado.edu"]
        .map(String::from)
        .to_vec()
}

fn default_release_brands() -> Vec<String> {
    ["phet", "phet-io"].map(String::from).to_vec()
}

fn default_combined_only_brands() -> Vec<String> {
    vec!["phet-io".to_string()]
}

fn default_restricted_brands() -> BTreeMap<String, String> {
    BTreeMap::from([("phet-io".to_string(), "phet-io".to_string())])
}

fn default_common_libs() -> Vec<String> {
    [
        "assert",
        "axon",
        "brand",
        "chipper",
        "dot",
        "joist",
        "kite",
        "phet-core",
        "phetcommon",
        "scenery",
        "scenery-phet",
        "sherpa",
        "sun",
        "tandem",
        "utterance-queue",
    ]
    .map(String::from)
    .to_vec()
}

fn default_media_types() -> Vec<String> {
    ["images", "mipmaps", "sounds"].map(String::from).to_vec()
}

fn default_bundler_command() -> Vec<String> {
    ["node", "chipper/js/scripts/bundle.js"]
        .map(String::from)
        .to_vec()
}

fn default_thumbnail_command() -> Vec<String> {
    vec!["convert".to_string()]
}

fn default_thumbnail_sizes() -> Vec<[u32; 2]> {
    vec![[128, 84], [600, 394], [900, 591]]
}

fn default_twitter_card_size() -> [u32; 2] {
    [800, 400]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fallback_locale: default_fallback_locale(),
            translations_repo: default_translations_repo(),
            locale_data_path: default_locale_data_path(),
            first_party_urls: default_first_party_urls(),
            release_brands: default_release_brands(),
            combined_only_brands: default_combined_only_brands(),
            restricted_brands: default_restricted_brands(),
            brand_supplements: BTreeMap::new(),
            common_libs: default_common_libs(),
            media_types: default_media_types(),
            bundler_command: default_bundler_command(),
            thumbnail_command: default_thumbnail_command(),
            thumbnail_sizes: default_thumbnail_sizes(),
            twitter_card_size: default_twitter_card_size(),
        }
    }
}

impl Config {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.fallback_locale.trim().is_empty() {
            bail!("'fallbackLocale' must not be empty");
        }

        if self.bundler_command.is_empty() {
            bail!("'bundlerCommand' must name a program to run");
        }

        for [width, height] in self
            .thumbnail_sizes
            .iter()
            .chain(std::iter::once(&self.twitter_card_size))
        {
            if *width == 0 || *height == 0 {
                bail!("Invalid thumbnail size {}x{}", width, height);
            }
        }

        Ok(())
    }

    pub fn is_combined_only_brand(&self, brand: &str) -> bool {
        self.combined_only_brands.iter().any(|b| b == brand)
    }

    /// Brands this build knows how to produce.
    pub fn known_brands(&self) -> Vec<&str> {
        let mut brands = vec![PRIMARY_BRAND, "adapted-from-phet"];
        brands.extend(self.restricted_brands.keys().map(String::as_str));
        brands.extend(self.release_brands.iter().map(String::as_str));
        brands.sort_unstable();
        brands.dedup();
        brands
    }
}

pub fn default_config_json() -> Result<String> {
    let config = Config::default();
    serde_json::to_string_pretty(&config).context("Failed to generate default config.")
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Result of loading configuration.
pub struct ConfigLoadResult {
    pub config: Config,
    /// True if config was loaded from a file, false if using defaults.
    pub from_file: bool,
}

pub fn load_config(start_dir: &Path) -> Result<ConfigLoadResult> {
    match find_config_file(start_dir) {
        Some(path) => {
            let content = fs::read_to_string(&path)?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            config.validate()?;
            Ok(ConfigLoadResult {
                config,
                from_file: true,
            })
        }
        None => Ok(ConfigLoadResult {
            config: Config::default(),
            from_file: false,
        }),
    }
}
