use std::{
    collections::{BTreeMap, BTreeSet},
    path::{Path, PathBuf},
    process::Command,
};

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

use super::{error::BuildError, manifest::PackageManifest};

/// Checked-out revision of one dependency repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct DependencyInfo {
    pub sha: Option<String>,
    pub branch: Option<String>,
}

/// Repository -> revision, written verbatim to `dependencies.json`.
pub type Dependencies = BTreeMap<String, DependencyInfo>;

/// Source of the dependency manifest for a build.
pub trait DependencySource {
    fn dependencies(&self, repo: &str, manifest: &PackageManifest) -> Result<Dependencies>;
}

/// Reads revisions from the sibling git checkouts under the build root.
pub struct GitDependencies {
    root: PathBuf,
    common_libs: Vec<String>,
}

impl GitDependencies {
    pub fn new(root: impl Into<PathBuf>, common_libs: Vec<String>) -> Self {
        Self {
            root: root.into(),
            common_libs,
        }
    }
}

impl DependencySource for GitDependencies {
    fn dependencies(&self, repo: &str, manifest: &PackageManifest) -> Result<Dependencies> {
        let repos: BTreeSet<&str> = std::iter::once(repo)
            .chain(manifest.phet.phet_libs.iter().map(String::as_str))
            .chain(self.common_libs.iter().map(String::as_str))
            .collect();

        let mut dependencies = Dependencies::new();
        for dependency in repos {
            let dir = self.root.join(dependency);
            if !dir.is_dir() {
                bail!(
                    "Dependency repository '{}' not found at {}",
                    dependency,
                    dir.display()
                );
            }

            let info = DependencyInfo {
                sha: git_output(&dir, &["rev-parse", "HEAD"]),
                branch: git_output(&dir, &["rev-parse", "--abbrev-ref", "HEAD"]),
            };
            if info.sha.is_none() {
                tracing::warn!(repo = %dependency, "could not determine git revision");
            }
            dependencies.insert(dependency.to_string(), info);
        }
        Ok(dependencies)
    }
}

fn git_output(dir: &Path, args: &[&str]) -> Option<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!text.is_empty()).then_some(text)
}

/// Repository that owns a root-relative module path (`joist/js/Sim.js` -> `joist`).
pub fn module_repo(module: &str) -> &str {
    let module = module.trim_start_matches("./");
    module.split('/').next().unwrap_or(module)
}

/// Every used module must come from a declared dependency.
pub fn check_used_modules_declared(
    used_modules: &[String],
    dependencies: &Dependencies,
) -> Result<(), BuildError> {
    for module in used_modules {
        let repo = module_repo(module);
        if !dependencies.contains_key(repo) {
            return Err(BuildError::UndeclaredDependency {
                module: module.clone(),
                repo: repo.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;
    use crate::core::manifest::PhetSection;

    #[test]
    fn test_module_repo() {
        assert_eq!(module_repo("joist/js/Sim.js"), "joist");
        assert_eq!(module_repo("./scenery/js/Node.js"), "scenery");
        assert_eq!(module_repo("standalone.js"), "standalone.js");
    }

    #[test]
    fn test_check_used_modules_declared() {
        let dependencies = Dependencies::from([
            ("joist".to_string(), DependencyInfo::default()),
            ("sun".to_string(), DependencyInfo::default()),
        ]);

        assert!(
            check_used_modules_declared(
                &["joist/js/Sim.js".to_string(), "sun/js/Panel.js".to_string()],
                &dependencies
            )
            .is_ok()
        );

        assert_eq!(
            check_used_modules_declared(&["twixt/js/Animation.js".to_string()], &dependencies),
            Err(BuildError::UndeclaredDependency {
                module: "twixt/js/Animation.js".to_string(),
                repo: "twixt".to_string(),
            })
        );
    }

    #[test]
    fn test_git_dependencies_collects_all_repos() {
        let dir = tempdir().unwrap();
        for repo in ["sim", "joist", "twixt"] {
            fs::create_dir_all(dir.path().join(repo)).unwrap();
        }
        let manifest = PackageManifest {
            phet: PhetSection {
                phet_libs: vec!["twixt".to_string()],
                ..Default::default()
            },
            ..Default::default()
        };

        let source = GitDependencies::new(dir.path(), vec!["joist".to_string()]);
        let dependencies = source.dependencies("sim", &manifest).unwrap();
        assert_eq!(
            dependencies.keys().collect::<Vec<_>>(),
            vec!["joist", "sim", "twixt"]
        );
    }

    #[test]
    fn test_git_dependencies_missing_repo() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("sim")).unwrap();

        let source = GitDependencies::new(dir.path(), vec!["joist".to_string()]);
        let err = source
            .dependencies("sim", &PackageManifest::default())
            .unwrap_err()
            .to_string();
        assert!(err.contains("'joist'"));
    }
}
