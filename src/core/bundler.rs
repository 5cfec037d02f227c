use std::{path::PathBuf, process::Command};

use anyhow::{Context, Result};
use serde::Deserialize;

use super::error::BuildError;

/// What the bundler hands back: the compiled program and the modules it contains.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleOutput {
    pub js: String,
    /// Root-relative paths of every source module included in `js`.
    pub used_modules: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BundleOptions {
    /// Ask the bundler to report per-module output sizes.
    pub profile_file_size: bool,
}

/// Compiles a repository into a single script.
pub trait Bundler {
    fn bundle(&self, repo: &str, brand: &str, options: &BundleOptions) -> Result<BundleOutput>;
}

/// Runs an external bundler program from the build root.
///
/// The program receives `<repo> <brand>` and must print the [`BundleOutput`]
/// JSON on stdout.
pub struct CommandBundler {
    root: PathBuf,
    command: Vec<String>,
}

impl CommandBundler {
    pub fn new(root: impl Into<PathBuf>, command: Vec<String>) -> Self {
        Self {
            root: root.into(),
            command,
        }
    }
}

impl Bundler for CommandBundler {
    fn bundle(&self, repo: &str, brand: &str, options: &BundleOptions) -> Result<BundleOutput> {
        let Some((program, args)) = self.command.split_first() else {
            return Err(BuildError::Bundler("no bundler command configured".to_string()).into());
        };

        let mut command = Command::new(program);
        command.args(args).arg(repo).arg(brand).current_dir(&self.root);
        if options.profile_file_size {
            command.arg("--profile-file-size");
        }

        tracing::debug!(program = %program, repo = %repo, brand = %brand, "running bundler");
        let output = command
            .output()
            .with_context(|| format!("Failed to run bundler '{}'", program))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(BuildError::Bundler(format!("{} ({})", stderr, output.status)).into());
        }

        serde_json::from_slice(&output.stdout).context("Failed to parse bundler output")
    }
}
