use std::{fs, path::Path};

use anyhow::{Context, Result};

use super::{CommandResult, CommandSummary, ExitStatus, InitSummary};
use crate::config::{CONFIG_FILE_NAME, default_config_json};

/// Write the default configuration into `dir`, refusing to overwrite.
pub fn init(dir: &Path) -> Result<CommandResult> {
    let path = dir.join(CONFIG_FILE_NAME);

    if path.exists() {
        return Ok(CommandResult {
            summary: CommandSummary::Init(InitSummary {
                path,
                created: false,
            }),
            status: ExitStatus::Failure,
        });
    }

    fs::write(&path, default_config_json()?)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(CommandResult {
        summary: CommandSummary::Init(InitSummary {
            path,
            created: true,
        }),
        status: ExitStatus::Success,
    })
}
