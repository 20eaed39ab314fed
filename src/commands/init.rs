use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::Path;

use super::Workspace;
use crate::project::Project;
use crate::storage::StorageAdapter;

const CONFIG_TEMPLATE: &str = include_str!("../../templates/designer.toml");

pub fn execute(config_path: &str, id: &str) -> Result<()> {
    // First run writes the default config
    if !Path::new(config_path).exists() {
        fs::write(config_path, CONFIG_TEMPLATE)
            .with_context(|| format!("Failed to write {}", config_path))?;
        println!("     {} {}", "Created".green().bold(), config_path);
    }

    let mut workspace = Workspace::open(config_path)?;
    if workspace.storage.exists(id) {
        anyhow::bail!("Project '{}' already exists", id);
    }

    let mut project = Project::new();
    project.set_config([
        ("namespace", workspace.config.project.namespace.as_str()),
        ("runnamespace", workspace.config.project.runnamespace.as_str()),
    ]);
    workspace.save(id, &project)?;

    println!(
        "     {} designer project `{}` in {}",
        "Created".green().bold(),
        id,
        workspace.storage.dir().display()
    );
    Ok(())
}
