//! Human-readable command summaries.
//!
//! Kept apart from the build so chipper can be used as a library.

use std::io::{self, Write};

use colored::Colorize;

use super::commands::{BuildSummary, CommandResult, CommandSummary, InitSummary};
use crate::core::BuildReport;

/// Success mark for consistent output formatting.
pub const SUCCESS_MARK: &str = "\u{2713}"; // ✓

/// Failure mark for consistent output formatting.
pub const FAILURE_MARK: &str = "\u{2718}"; // ✘

pub fn print(result: &CommandResult, verbose: bool) {
    print_to(
        result,
        verbose,
        &mut io::stdout().lock(),
        &mut io::stderr().lock(),
    );
}

/// Print a command result; warnings and failures go to `err`.
pub fn print_to<W: Write, E: Write>(result: &CommandResult, verbose: bool, out: &mut W, err: &mut E) {
    match &result.summary {
        CommandSummary::Build(summary) => print_build_summary(summary, verbose, out, err),
        CommandSummary::Init(summary) => print_init_summary(summary, out, err),
    }
}

fn print_build_summary<W: Write, E: Write>(summary: &BuildSummary, verbose: bool, out: &mut W, err: &mut E) {
    for report in &summary.reports {
        print_build_report(report, verbose, out);
        print_missing_licenses(report, err);
    }
}

fn print_build_report<W: Write>(report: &BuildReport, verbose: bool, out: &mut W) {
    let _ = writeln!(
        out,
        "{} {}",
        SUCCESS_MARK.green(),
        format!(
            "Built {} ({}): {} {}, {} {}, {} {}",
            report.repo,
            report.brand,
            report.artifacts.len(),
            plural(report.artifacts.len(), "artifact", "artifacts"),
            report.locales.len(),
            plural(report.locales.len(), "locale", "locales"),
            report.string_count,
            plural(report.string_count, "string", "strings"),
        )
        .green()
    );
    let _ = writeln!(out, "  {} {}", "-->".blue(), report.build_dir.display());

    if verbose {
        for artifact in &report.artifacts {
            let shown = artifact
                .strip_prefix(&report.build_dir)
                .unwrap_or(artifact);
            let _ = writeln!(out, "    {}", shown.display().to_string().dimmed());
        }
    }
}

fn print_missing_licenses<E: Write>(report: &BuildReport, err: &mut E) {
    if report.missing_licenses.is_empty() {
        return;
    }

    let _ = writeln!(
        err,
        "{} {} {} without a license entry ({})",
        "warning:".bold().yellow(),
        report.missing_licenses.len(),
        plural(report.missing_licenses.len(), "resource", "resources"),
        report.brand
    );
    for resource in &report.missing_licenses {
        let _ = writeln!(err, "  {} {}", "-".yellow(), resource);
    }
}

fn print_init_summary<W: Write, E: Write>(summary: &InitSummary, out: &mut W, err: &mut E) {
    let name = summary
        .path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();

    if summary.created {
        let _ = writeln!(
            out,
            "{} {}",
            SUCCESS_MARK.green(),
            format!("Created {}", name).green()
        );
    } else {
        let _ = writeln!(
            err,
            "{} {}",
            FAILURE_MARK.red(),
            format!("{} already exists", name).red()
        );
    }
}

fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 { one } else { many }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::cli::commands::ExitStatus;

    fn strip_ansi(s: &str) -> String {
        let mut result = String::new();
        let mut chars = s.chars().peekable();
        while let Some(c) = chars.next() {
            if c == '\x1b' {
                while let Some(&next) = chars.peek() {
                    chars.next();
                    if next == 'm' {
                        break;
                    }
                }
            } else {
                result.push(c);
            }
        }
        result
    }

    fn report(missing: Vec<String>) -> BuildReport {
        let build_dir = PathBuf::from("/work/friction/build/phet-io");
        BuildReport {
            repo: "friction".to_string(),
            brand: "phet-io".to_string(),
            artifacts: vec![
                build_dir.join("friction_all_phet-io.html"),
                build_dir.join("dependencies.json"),
            ],
            build_dir,
            locales: vec!["en".to_string()],
            missing_licenses: missing,
            string_count: 12,
        }
    }

    fn render(result: &CommandResult, verbose: bool) -> (String, String) {
        let mut out = Vec::new();
        let mut err = Vec::new();
        print_to(result, verbose, &mut out, &mut err);
        (
            strip_ansi(&String::from_utf8(out).unwrap()),
            strip_ansi(&String::from_utf8(err).unwrap()),
        )
    }

    fn build_result(missing: Vec<String>) -> CommandResult {
        CommandResult {
            summary: CommandSummary::Build(BuildSummary {
                reports: vec![report(missing)],
            }),
            status: ExitStatus::Success,
        }
    }

    #[test]
    fn test_build_summary() {
        let (out, err) = render(&build_result(Vec::new()), false);
        assert!(out.contains("Built friction (phet-io): 2 artifacts, 1 locale, 12 strings"));
        assert!(out.contains("--> /work/friction/build/phet-io"));
        assert!(!out.contains("dependencies.json"));
        assert!(err.is_empty());
    }

    #[test]
    fn test_build_summary_verbose_lists_artifacts() {
        let (out, _) = render(&build_result(Vec::new()), true);
        assert!(out.contains("    friction_all_phet-io.html\n"));
        assert!(out.contains("    dependencies.json\n"));
    }

    #[test]
    fn test_missing_licenses_go_to_stderr() {
        let (out, err) = render(&build_result(vec!["friction/images/a.png".to_string()]), false);
        assert!(!out.contains("license"));
        assert!(err.contains("warning: 1 resource without a license entry (phet-io)"));
        assert!(err.contains("- friction/images/a.png"));
    }

    #[test]
    fn test_init_summary() {
        let created = CommandResult {
            summary: CommandSummary::Init(InitSummary {
                path: PathBuf::from("/work/.chipperrc.json"),
                created: true,
            }),
            status: ExitStatus::Success,
        };
        let (out, _) = render(&created, false);
        assert!(out.contains("Created .chipperrc.json"));

        let existing = CommandResult {
            summary: CommandSummary::Init(InitSummary {
                path: PathBuf::from("/work/.chipperrc.json"),
                created: false,
            }),
            status: ExitStatus::Failure,
        };
        let (out, err) = render(&existing, false);
        assert!(out.is_empty());
        assert!(err.contains(".chipperrc.json already exists"));
    }
}
