use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Utc;

use super::{BuildSummary, CommandResult, CommandSummary, ExitStatus};
use crate::{
    cli::args::BuildCommand,
    config::{Config, find_config_file, load_config},
    core::{
        ArtifactAssembler, BuildOptions, BuildReport, Collaborators, LocaleSelection,
        bundler::CommandBundler,
        dependencies::GitDependencies,
        licenses::LicenseFileLookup,
        locale::LocaleCatalog,
        thumbnails::CommandThumbnailer,
    },
};

pub fn build(cmd: &BuildCommand, cwd: &Path) -> Result<CommandResult> {
    let loaded = load_config(cwd)?;
    let mut config = loaded.config;
    if let Some(locale) = &cmd.common.fallback_locale {
        config.fallback_locale = locale.clone();
        config.validate()?;
    }
    if !loaded.from_file {
        tracing::debug!("no config file found, using defaults");
    }

    let root = resolve_root(cmd.common.root.as_deref(), cwd);
    tracing::debug!(root = %root.display(), "build root");

    let catalog = LocaleCatalog::load(&root.join(&config.locale_data_path), &config.fallback_locale)?;
    let locales: LocaleSelection = cmd.locales.as_deref().unwrap_or_default().parse()?;
    let timestamp = Utc::now();

    let reports = cmd
        .brands
        .iter()
        .map(|brand| {
            let options = BuildOptions {
                repo: cmd.repo.clone(),
                brand: brand.clone(),
                locales: locales.clone(),
                all_html: cmd.all_html,
                minify: !cmd.no_minify,
                profile_file_size: cmd.profile_file_size,
                timestamp,
            };
            build_brand(&root, &config, &catalog, &options)
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CommandResult {
        summary: CommandSummary::Build(BuildSummary { reports }),
        status: ExitStatus::Success,
    })
}

/// Explicit `--root`, else the directory holding the config file, else `cwd`.
fn resolve_root(explicit: Option<&Path>, cwd: &Path) -> PathBuf {
    if let Some(root) = explicit {
        return cwd.join(root);
    }
    find_config_file(cwd)
        .and_then(|path| path.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| cwd.to_path_buf())
}

fn build_brand(
    root: &Path,
    config: &Config,
    catalog: &LocaleCatalog,
    options: &BuildOptions,
) -> Result<BuildReport> {
    let bundler = CommandBundler::new(root, config.bundler_command.clone());
    let dependencies = GitDependencies::new(root, config.common_libs.clone());
    let licenses = LicenseFileLookup::new(root);
    let thumbnails = CommandThumbnailer::new(config.thumbnail_command.clone());

    let mut assembler = ArtifactAssembler::new(
        root,
        config,
        catalog,
        Collaborators {
            bundler: &bundler,
            dependencies: &dependencies,
            licenses: &licenses,
            thumbnails: &thumbnails,
        },
    );
    assembler.build(options)
}
