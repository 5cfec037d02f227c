//! CLI argument definitions using clap.
//!
//! ## Commands
//!
//! - `build`: build one repository for one or more brands
//! - `init`: write a default `.chipperrc.json`

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Arguments {
    /// Check if a command was provided, otherwise print help and return None.
    pub fn with_command_or_help(self) -> Option<Self> {
        if self.command.is_none() {
            Self::command().print_help().ok();
            None
        } else {
            Some(self)
        }
    }

    pub fn verbose(&self) -> bool {
        match &self.command {
            Some(Command::Build(cmd)) => cmd.common.verbose,
            Some(Command::Init) | None => false,
        }
    }
}

/// Common arguments shared by all commands.
#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// Directory holding the sibling repositories (defaults to the config file's directory)
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Locale every fallback chain ends in (overrides config file)
    #[arg(long)]
    pub fallback_locale: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Args)]
pub struct BuildCommand {
    /// Repository to build
    pub repo: String,

    /// Brands to build, one after another
    #[arg(long, value_delimiter = ',', default_value = "phet")]
    pub brands: Vec<String>,

    /// Locales to build, comma separated, or `*` for every translated locale.
    /// The fallback locale is always built.
    #[arg(long)]
    pub locales: Option<String>,

    /// Also write the all-locales HTML for brands that do not always ship it
    #[arg(long)]
    pub all_html: bool,

    /// Skip minification (assertions and logging are still stripped)
    #[arg(long)]
    pub no_minify: bool,

    /// Ask the bundler to report per-module output sizes
    #[arg(long)]
    pub profile_file_size: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build HTML artifacts for a simulation repository
    Build(BuildCommand),
    /// Initialize a new .chipperrc.json configuration file
    Init,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_defaults() {
        let args = Arguments::try_parse_from(["chipper", "build", "friction"]).unwrap();
        let Some(Command::Build(cmd)) = args.command else {
            panic!("expected build command");
        };
        assert_eq!(cmd.repo, "friction");
        assert_eq!(cmd.brands, vec!["phet"]);
        assert_eq!(cmd.locales, None);
        assert!(!cmd.all_html);
        assert!(!cmd.no_minify);
        assert!(!cmd.profile_file_size);
    }

    #[test]
    fn test_build_flags() {
        let args = Arguments::try_parse_from([
            "chipper",
            "build",
            "friction",
            "--brands",
            "phet,phet-io",
            "--locales",
            "*",
            "--all-html",
            "--no-minify",
            "--profile-file-size",
            "--root",
            "/work",
            "-v",
        ])
        .unwrap();
        assert!(args.verbose());

        let Some(Command::Build(cmd)) = args.command else {
            panic!("expected build command");
        };
        assert_eq!(cmd.brands, vec!["phet", "phet-io"]);
        assert_eq!(cmd.locales.as_deref(), Some("*"));
        assert!(cmd.all_html);
        assert!(cmd.no_minify);
        assert!(cmd.profile_file_size);
        assert_eq!(cmd.common.root, Some(PathBuf::from("/work")));
    }

    #[test]
    fn test_command_factory() {
        Arguments::command().debug_assert();
    }
}
