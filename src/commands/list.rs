use anyhow::{Context, Result};
use colored::Colorize;

use super::Workspace;

pub fn execute(config_path: &str) -> Result<()> {
    let workspace = Workspace::open(config_path)?;
    let ids = workspace
        .storage
        .list()
        .with_context(|| format!("Failed to list {}", workspace.storage.dir().display()))?;

    if ids.is_empty() {
        println!("{} No designer projects in {}", "info:".blue().bold(), workspace.storage.dir().display());
        return Ok(());
    }
    for id in ids {
        println!("{}", id);
    }
    Ok(())
}
