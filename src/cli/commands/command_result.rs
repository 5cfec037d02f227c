use std::{path::PathBuf, process::ExitCode};

use crate::core::BuildReport;

/// Process exit status.
///
/// A build that logged missing licenses still succeeds; `Failure` is for
/// commands that refused to act, `Error` for anything that aborted.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitStatus {
    Success = 0,
    Failure = 1,
    Error = 2,
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        ExitCode::from(status as u8)
    }
}

#[derive(Debug)]
pub enum CommandSummary {
    Build(BuildSummary),
    Init(InitSummary),
}

#[derive(Debug)]
pub struct BuildSummary {
    /// One report per brand, in build order.
    pub reports: Vec<BuildReport>,
}

impl BuildSummary {
    pub fn missing_license_count(&self) -> usize {
        self.reports.iter().map(|r| r.missing_licenses.len()).sum()
    }
}

#[derive(Debug)]
pub struct InitSummary {
    pub path: PathBuf,
    pub created: bool,
}

/// Result of running a chipper command.
#[derive(Debug)]
pub struct CommandResult {
    pub summary: CommandSummary,
    pub status: ExitStatus,
}
