use std::{
    fs,
    path::{Path, PathBuf},
    process::{Command, Output},
};

use anyhow::{Context, Ok, Result};
use insta_cmd::get_cargo_bin;
use tempfile::TempDir;

mod build;
mod init;

const BIN_NAME: &str = "chipper";

const LOCALE_DATA: &str = r#"{
  "en": { "direction": "ltr", "englishName": "English" },
  "es": { "direction": "ltr", "englishName": "Spanish" },
  "es_MX": { "direction": "ltr", "fallbackLocales": ["es"] },
  "ar": { "direction": "rtl", "englishName": "Arabic" }
}"#;

/// Prints the `bundle.json` of the repository being built, standing in for the real bundler.
const BUNDLER_SCRIPT: &str = "#!/bin/sh\ncat \"$1/bundle.json\"\n";

pub struct CliTest {
    _temp_dir: TempDir,
    project_dir: PathBuf,
}

impl CliTest {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let project_dir = temp_dir.path().canonicalize()?;
        Ok(Self {
            _temp_dir: temp_dir,
            project_dir,
        })
    }

    /// A build root with a config, a locale catalog, a stub bundler and one
    /// simulation repository `repo` whose main module uses `title` and `hello`.
    pub fn with_sim(repo: &str) -> Result<Self> {
        let test = Self::new()?;
        test.write_file(
            ".chipperrc.json",
            r#"{ "bundlerCommand": ["sh", "bundle.sh"], "commonLibs": [], "thumbnailCommand": ["true"] }"#,
        )?;
        test.write_file("bundle.sh", BUNDLER_SCRIPT)?;
        test.write_file("babel/localeData.json", LOCALE_DATA)?;

        test.write_file(
            &format!("{}/package.json", repo),
            r#"{ "name": "friction", "version": "1.0.0", "phet": { "requirejsNamespace": "FRICTION" } }"#,
        )?;
        test.write_file(
            &format!("{}/bundle.json", repo),
            &format!(
                r#"{{ "js": "window.started = true;", "usedModules": ["{0}/js/{0}-main.js"] }}"#,
                repo
            ),
        )?;
        test.write_file(
            &format!("{0}/js/{0}-main.js", repo),
            "import FrictionStrings from './FrictionStrings.js';\n\
             document.title = FrictionStrings.friction.title;\n\
             say( FrictionStrings.helloStringProperty );\n",
        )?;
        test.write_file(
            &format!("{0}/{0}-strings_en.json", repo),
            r#"{ "friction": { "title": { "value": "Friction" } }, "hello": { "value": "Hello" } }"#,
        )?;
        test.write_file(
            &format!("babel/{0}/{0}-strings_es.json", repo),
            r#"{ "hello": { "value": "Hola" } }"#,
        )?;
        Ok(test)
    }

    pub fn write_file(&self, path: &str, content: &str) -> Result<()> {
        let file_path = self.project_dir.join(path);

        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory:{}", parent.display()))?;
        }

        fs::write(&file_path, content)
            .with_context(|| format!("Failed to write file: {}", file_path.display()))?;

        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.project_dir
    }

    pub fn command(&self) -> Command {
        let mut cmd = Command::new(get_cargo_bin(BIN_NAME));
        cmd.current_dir(&self.project_dir);
        cmd.env_clear();
        cmd.env("PATH", std::env::var_os("PATH").unwrap_or_default());
        cmd.env("NO_COLOR", "1"); // Disable colors for consistent test output
        cmd
    }

    pub fn build_command(&self, repo: &str) -> Command {
        let mut cmd = self.command();
        cmd.arg("build").arg(repo).arg("--no-minify");
        cmd
    }

    pub fn read_file(&self, path: &str) -> Result<String> {
        let file_path = self.project_dir.join(path);
        fs::read_to_string(&file_path)
            .with_context(|| format!("Failed to read file: {}", file_path.display()))
    }
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}
