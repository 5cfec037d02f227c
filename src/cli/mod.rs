//! Command-line layer: argument parsing, command dispatch, summaries.

use std::process::ExitCode;

use anyhow::Result;

mod args;
mod commands;
mod report;
mod run;

pub use args::{Arguments, BuildCommand, Command, CommonArgs};
pub use commands::{CommandResult, CommandSummary, ExitStatus};

pub fn run_cli(args: Arguments) -> Result<ExitCode> {
    let verbose = args.verbose();

    let Some(args) = args.with_command_or_help() else {
        return Ok(ExitStatus::Success.into());
    };

    let result = run::run(args)?;
    report::print(&result, verbose);

    Ok(result.status.into())
}
