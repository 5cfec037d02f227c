//! The build itself: one repository, one brand, every artifact.
//!
//! [`ArtifactAssembler::build`] runs the phases of [`BuildPhase`] in order.
//! All validation that can fail without touching the filesystem happens before
//! the build directory is recreated; after that any error aborts the build and
//! leaves whatever was written so far.

use std::{
    collections::BTreeMap,
    fmt,
    fs,
    io::Write,
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, Utc};
use flate2::{Compression, GzBuilder};
use rayon::prelude::*;
use serde::Serialize;

use super::{
    bundler::{BundleOptions, Bundler},
    dependencies::{DependencySource, check_used_modules_declared},
    error::BuildError,
    html::{
        DocumentConfig, DocumentInputs, MinifyOptions, PreparedScripts, assemble_document,
        document_parts,
        extras::{copy_into, write_a11y_view, write_iframe},
        scripts::{html_header, license_script, startup_scripts},
        xhtml::write_xhtml,
    },
    licenses::{
        LicenseLookup, LicensePolicy, aggregate, collect_media_license_entries,
        library_license_keys, load_library_entries,
    },
    locale::{Locale, LocaleCatalog},
    manifest::{PackageManifest, manifest_exists, read_manifest},
    strings::{StringFileLoader, UsageScan, build_string_map, scan_usages},
    thumbnails::{ThumbnailGenerator, generate_thumbnails},
};
use crate::config::{Config, PRIMARY_BRAND};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildPhase {
    Start,
    BundleCompiled,
    UsageAndLicensesResolved,
    StringsResolved,
    PerLocaleHtmlWritten,
    AllLocalesHtmlWritten,
    DebugHtmlWritten,
    XhtmlWritten,
    AuxiliaryFilesWritten,
    OptionalExtrasWritten,
    Done,
}

impl fmt::Display for BuildPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BuildPhase::Start => "start",
            BuildPhase::BundleCompiled => "bundle compiled",
            BuildPhase::UsageAndLicensesResolved => "string usage and licenses resolved",
            BuildPhase::StringsResolved => "strings resolved",
            BuildPhase::PerLocaleHtmlWritten => "per-locale HTML written",
            BuildPhase::AllLocalesHtmlWritten => "all-locales HTML written",
            BuildPhase::DebugHtmlWritten => "debug HTML written",
            BuildPhase::XhtmlWritten => "XHTML written",
            BuildPhase::AuxiliaryFilesWritten => "auxiliary files written",
            BuildPhase::OptionalExtrasWritten => "optional extras written",
            BuildPhase::Done => "done",
        };
        write!(f, "{}", name)
    }
}

/// Locales requested on the command line: a list, or `*` for every translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocaleSelection {
    Explicit(Vec<Locale>),
    All,
}

impl FromStr for LocaleSelection {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim() == "*" {
            return Ok(LocaleSelection::All);
        }
        Ok(LocaleSelection::Explicit(
            s.split(',')
                .map(str::trim)
                .filter(|locale| !locale.is_empty())
                .map(str::to_string)
                .collect(),
        ))
    }
}

#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub repo: String,
    pub brand: String,
    pub locales: LocaleSelection,
    /// Write the all-locales HTML for brands that do not always ship it.
    pub all_html: bool,
    pub minify: bool,
    /// Ask the bundler to report per-module output sizes.
    pub profile_file_size: bool,
    pub timestamp: DateTime<Utc>,
}

/// External programs and lookups the build delegates to.
pub struct Collaborators<'a> {
    pub bundler: &'a dyn Bundler,
    pub dependencies: &'a dyn DependencySource,
    pub licenses: &'a dyn LicenseLookup,
    pub thumbnails: &'a dyn ThumbnailGenerator,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BuildReport {
    pub repo: String,
    pub brand: String,
    pub build_dir: PathBuf,
    /// Written files, in the order they were written.
    pub artifacts: Vec<PathBuf>,
    pub locales: Vec<Locale>,
    /// Resources without a license entry (release brands only).
    pub missing_licenses: Vec<String>,
    /// Strings resolved for the fallback locale.
    pub string_count: usize,
}

pub struct ArtifactAssembler<'a> {
    root: PathBuf,
    config: &'a Config,
    catalog: &'a LocaleCatalog,
    collaborators: Collaborators<'a>,
    phase: BuildPhase,
}

impl<'a> ArtifactAssembler<'a> {
    pub fn new(
        root: impl Into<PathBuf>,
        config: &'a Config,
        catalog: &'a LocaleCatalog,
        collaborators: Collaborators<'a>,
    ) -> Self {
        Self {
            root: root.into(),
            config,
            catalog,
            collaborators,
            phase: BuildPhase::Start,
        }
    }

    pub fn phase(&self) -> BuildPhase {
        self.phase
    }

    pub fn build_dir(&self, repo: &str, brand: &str) -> PathBuf {
        self.root.join(repo).join("build").join(brand)
    }

    fn advance(&mut self, phase: BuildPhase) {
        tracing::info!("{}", phase);
        self.phase = phase;
    }

    fn check_preconditions(&self, options: &BuildOptions) -> Result<PackageManifest> {
        let brand = options.brand.as_str();
        if !self.config.known_brands().contains(&brand) {
            return Err(BuildError::UnknownBrand(brand.to_string()).into());
        }

        if let Some(repo) = self.config.restricted_brands.get(brand)
            && !self.root.join(repo).is_dir()
        {
            return Err(BuildError::MissingRestrictedRepo {
                brand: brand.to_string(),
                repo: repo.clone(),
            }
            .into());
        }

        if let LocaleSelection::Explicit(locales) = &options.locales
            && let Some(unknown) = locales.iter().find(|locale| !self.catalog.contains(locale))
        {
            return Err(BuildError::UnknownLocale(unknown.clone()).into());
        }

        read_manifest(&self.root, &options.repo)
    }

    pub fn build(&mut self, options: &BuildOptions) -> Result<BuildReport> {
        let config = self.config;
        let catalog = self.catalog;
        let repo = options.repo.as_str();
        let brand = options.brand.as_str();
        self.phase = BuildPhase::Start;
        tracing::info!(repo = %repo, brand = %brand, "building");

        let manifest = self.check_preconditions(options)?;

        let build_dir = self.build_dir(repo, brand);
        if build_dir.exists() {
            fs::remove_dir_all(&build_dir)
                .with_context(|| format!("Failed to clear build directory {:?}", build_dir))?;
        }
        fs::create_dir_all(&build_dir)
            .with_context(|| format!("Failed to create build directory {:?}", build_dir))?;

        let bundle = self
            .collaborators
            .bundler
            .bundle(
                repo,
                brand,
                &BundleOptions {
                    profile_file_size: options.profile_file_size,
                },
            )?;
        self.advance(BuildPhase::BundleCompiled);

        let collected = collect_media_license_entries(
            &bundle.used_modules,
            &config.media_types,
            self.collaborators.licenses,
        );
        let lib_entries = load_library_entries(&self.root, &library_license_keys(&manifest))?;
        let licenses = aggregate(
            &lib_entries,
            &collected,
            brand,
            &LicensePolicy::from_config(config),
        );

        let module_contents = read_modules(&self.root, &bundle.used_modules);
        let usage = scan_usages(&module_contents, |candidate| {
            manifest_exists(&self.root, candidate)
        });
        self.advance(BuildPhase::UsageAndLicensesResolved);

        let mut loader = StringFileLoader::new(&self.root, config, catalog);
        let locales = self.resolve_locales(&options.locales, repo, &loader)?;
        let dependencies = self
            .collaborators
            .dependencies
            .dependencies(repo, &manifest)?;
        check_used_modules_declared(&bundle.used_modules, &dependencies)?;
        let namespaces = self.namespaces(repo, &manifest, &usage)?;
        let strings = build_string_map(&locales, &usage, &namespaces, &mut loader)?;
        drop(loader);
        self.advance(BuildPhase::StringsResolved);

        let fallback_locale = catalog.fallback_locale();
        let timestamp = options.timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string();
        let license_js = license_script(&licenses.third_party)?;
        let startup = startup_scripts(&self.root, brand, &manifest.phet.preload, &bundle.js)?;
        let production =
            PreparedScripts::prepare(&startup, MinifyOptions::production(options.minify))?;

        let untitled = DocumentInputs {
            repo,
            brand,
            version: &manifest.version,
            namespace: manifest.phet.requirejs_namespace.as_deref().unwrap_or_default(),
            timestamp: &timestamp,
            locales: &locales,
            strings: &strings,
            catalog,
            dependencies: &dependencies,
            package_object: &manifest.raw,
            html_header: "",
            license_script: &license_js,
        };
        let title = untitled.title(fallback_locale);
        let header = html_header(&title, &manifest.version, brand, options.timestamp.year());
        let inputs = DocumentInputs {
            html_header: &header,
            ..untitled
        };

        let mut artifacts = Vec::new();

        let combined_only = config.is_combined_only_brand(brand);
        if combined_only {
            tracing::debug!(brand = %brand, "brand ships only the combined HTML");
        } else {
            for locale in &locales {
                let html = assemble_document(
                    &inputs,
                    &DocumentConfig::single_locale(locale),
                    &production,
                )?;
                let name = format!("{}_{}_{}.html", repo, locale, brand);
                artifacts.push(write_artifact(&build_dir, &name, html.as_bytes())?);
            }
        }
        self.advance(BuildPhase::PerLocaleHtmlWritten);

        let write_all_html = combined_only || options.all_html;
        if write_all_html {
            let html = assemble_document(
                &inputs,
                &DocumentConfig::all_locales(fallback_locale),
                &production,
            )?;
            let name = format!("{}_all_{}.html", repo, brand);
            artifacts.push(write_artifact(&build_dir, &name, html.as_bytes())?);
            artifacts.push(write_artifact(
                &build_dir,
                &format!("{}.gz", name),
                &gzip(html.as_bytes())?,
            )?);
        }
        self.advance(BuildPhase::AllLocalesHtmlWritten);

        let debug = PreparedScripts::prepare(&startup, MinifyOptions::debug(false))?;
        let html = assemble_document(&inputs, &DocumentConfig::debug(fallback_locale), &debug)?;
        let name = format!("{}_all_{}_debug.html", repo, brand);
        artifacts.push(write_artifact(&build_dir, &name, html.as_bytes())?);
        self.advance(BuildPhase::DebugHtmlWritten);

        let parts = document_parts(
            &inputs,
            &DocumentConfig::all_locales(fallback_locale),
            &production,
        )?;
        artifacts.extend(write_xhtml(&build_dir, repo, &parts)?);
        self.advance(BuildPhase::XhtmlWritten);

        artifacts.push(write_json(&build_dir, "dependencies.json", &dependencies)?);
        artifacts.push(write_json(&build_dir, "string-map.json", &strings.string_map)?);
        let fallback_strings = strings
            .string_map
            .get(fallback_locale)
            .cloned()
            .unwrap_or_default();
        artifacts.push(write_json(
            &build_dir,
            "english-string-map.json",
            &fallback_strings,
        )?);
        self.advance(BuildPhase::AuxiliaryFilesWritten);

        if brand == PRIMARY_BRAND && locales.iter().any(|l| l == fallback_locale) {
            artifacts.push(write_iframe(&build_dir, repo, fallback_locale, brand, &title)?);
            if write_all_html {
                artifacts.push(write_iframe(&build_dir, repo, "all", brand, &title)?);
            }
        }
        if brand == PRIMARY_BRAND && manifest.phet.sim_features.supports_interactive_description {
            artifacts.push(write_a11y_view(&build_dir, repo, fallback_locale, brand, &title)?);
        }
        for path in &manifest.phet.package_with_build {
            artifacts.push(copy_into(&self.root.join(repo).join(path), &build_dir)?);
        }
        for path in config.brand_supplements.get(brand).into_iter().flatten() {
            artifacts.push(copy_into(&self.root.join(path), &build_dir)?);
        }
        artifacts.extend(generate_thumbnails(
            &self.root,
            repo,
            &build_dir,
            &config.thumbnail_sizes,
            config.twitter_card_size,
            self.collaborators.thumbnails,
        )?);
        self.advance(BuildPhase::OptionalExtrasWritten);

        self.advance(BuildPhase::Done);
        Ok(BuildReport {
            repo: repo.to_string(),
            brand: brand.to_string(),
            build_dir,
            artifacts,
            string_count: fallback_strings.len(),
            locales,
            missing_licenses: licenses.missing,
        })
    }

    /// Fallback locale first, then the requested locales without repeats.
    fn resolve_locales(
        &self,
        selection: &LocaleSelection,
        repo: &str,
        loader: &StringFileLoader<'_>,
    ) -> Result<Vec<Locale>> {
        let requested = match selection {
            LocaleSelection::Explicit(locales) => locales.clone(),
            LocaleSelection::All => loader
                .available_locales(repo)?
                .into_iter()
                .filter(|locale| {
                    let known = self.catalog.contains(locale);
                    if !known {
                        tracing::debug!(locale = %locale, "translation file for a locale outside the catalog");
                    }
                    known
                })
                .collect(),
        };

        let mut locales = vec![self.catalog.fallback_locale().to_string()];
        for locale in requested {
            if !locales.contains(&locale) {
                locales.push(locale);
            }
        }
        Ok(locales)
    }

    /// `requirejsNamespace` of every repository with used strings.
    fn namespaces(
        &self,
        repo: &str,
        manifest: &PackageManifest,
        usage: &UsageScan,
    ) -> Result<BTreeMap<String, String>> {
        let mut namespaces = BTreeMap::new();
        for used_repo in usage.keys() {
            let namespace = if used_repo == repo {
                manifest.phet.requirejs_namespace.clone()
            } else {
                read_manifest(&self.root, used_repo)?.phet.requirejs_namespace
            };
            if let Some(namespace) = namespace {
                namespaces.insert(used_repo.clone(), namespace);
            }
        }
        Ok(namespaces)
    }
}

/// Contents of every readable used module, keyed by module path.
fn read_modules(root: &Path, used_modules: &[String]) -> BTreeMap<String, String> {
    used_modules
        .par_iter()
        .filter_map(|module| match fs::read_to_string(root.join(module)) {
            Ok(content) => Some((module.clone(), content)),
            Err(err) => {
                tracing::debug!(module = %module, error = %err, "module not scanned for strings");
                None
            }
        })
        .collect()
}

fn write_artifact(build_dir: &Path, name: &str, contents: &[u8]) -> Result<PathBuf> {
    let path = build_dir.join(name);
    fs::write(&path, contents).with_context(|| format!("Failed to write {:?}", path))?;
    tracing::debug!(path = %path.display(), "wrote artifact");
    Ok(path)
}

fn write_json<T: Serialize + ?Sized>(build_dir: &Path, name: &str, value: &T) -> Result<PathBuf> {
    let json = serde_json::to_string_pretty(value)
        .with_context(|| format!("Failed to serialize {}", name))?;
    write_artifact(build_dir, name, json.as_bytes())
}

/// Gzip with a zeroed timestamp so rebuilds are byte-identical.
fn gzip(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzBuilder::new()
        .mtime(0)
        .write(Vec::new(), Compression::default());
    encoder.write_all(bytes)?;
    Ok(encoder.finish()?)
}
