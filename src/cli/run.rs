use std::env;

use anyhow::{Context, Result, bail};

use super::{
    args::{Arguments, Command},
    commands::{CommandResult, build::build, init::init},
};

/// Dispatch to the command handler, resolving paths against the working directory.
pub fn run(Arguments { command }: Arguments) -> Result<CommandResult> {
    let cwd = env::current_dir().context("Failed to read the current directory")?;

    match command {
        Some(Command::Build(cmd)) => build(&cmd, &cwd),
        Some(Command::Init) => init(&cwd),
        None => bail!("No command provided. Use --help to see available commands."),
    }
}
