use std::{
    path::{Path, PathBuf},
    process::Command,
};

use anyhow::{Context, Result, bail};

/// Resizes the repository screenshot into the published thumbnail sizes.
pub trait ThumbnailGenerator {
    fn resize(&self, src: &Path, dest: &Path, width: u32, height: u32) -> Result<()>;
}

/// Runs an external resize program as `<cmd> <src> -resize WxH! <dest>`.
pub struct CommandThumbnailer {
    command: Vec<String>,
}

impl CommandThumbnailer {
    pub fn new(command: Vec<String>) -> Self {
        Self { command }
    }
}

impl ThumbnailGenerator for CommandThumbnailer {
    fn resize(&self, src: &Path, dest: &Path, width: u32, height: u32) -> Result<()> {
        let Some((program, args)) = self.command.split_first() else {
            bail!("No thumbnail command configured");
        };

        let status = Command::new(program)
            .args(args)
            .arg(src)
            .arg("-resize")
            .arg(format!("{}x{}!", width, height))
            .arg(dest)
            .status()
            .with_context(|| format!("Failed to run thumbnail command '{}'", program))?;

        if !status.success() {
            bail!("Thumbnail command failed for {:?} ({})", dest, status);
        }
        Ok(())
    }
}

pub fn screenshot_path(root: &Path, repo: &str) -> PathBuf {
    root.join(repo)
        .join("assets")
        .join(format!("{}-screenshot.png", repo))
}

/// Write `{repo}-{width}.png` per size and `{repo}-twitter-card.png`.
///
/// Returns nothing when the repository has no screenshot.
pub fn generate_thumbnails(
    root: &Path,
    repo: &str,
    build_dir: &Path,
    sizes: &[[u32; 2]],
    twitter_card_size: [u32; 2],
    generator: &dyn ThumbnailGenerator,
) -> Result<Vec<PathBuf>> {
    let src = screenshot_path(root, repo);
    if !src.is_file() {
        tracing::debug!(repo = %repo, "no screenshot, skipping thumbnails");
        return Ok(Vec::new());
    }

    let targets = sizes
        .iter()
        .map(|&[width, height]| (format!("{}-{}.png", repo, width), width, height))
        .chain(std::iter::once((
            format!("{}-twitter-card.png", repo),
            twitter_card_size[0],
            twitter_card_size[1],
        )));

    let mut written = Vec::new();
    for (name, width, height) in targets {
        let dest = build_dir.join(name);
        generator.resize(&src, &dest, width, height)?;
        written.push(dest);
    }
    Ok(written)
}
