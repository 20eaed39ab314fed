use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;

use super::Workspace;
use crate::codegen::code_hash;

pub fn execute(config_path: &str, id: &str, object: Option<&str>, out: Option<&str>) -> Result<()> {
    let workspace = Workspace::open(config_path)?;
    let project = workspace.load(id)?;
    let replacements = workspace.config.replacements();

    let code = match object {
        Some(name) => project
            .get_object_code(name, &replacements)
            .with_context(|| format!("Failed to generate code for '{}'", name))?,
        None => project.get_code(&replacements),
    };

    match out {
        Some(path) => {
            fs::write(path, &code).with_context(|| format!("Failed to write {}", path))?;
            println!(
                "   {} {} ({})",
                "Generated".green().bold(),
                path,
                &code_hash(&code)[..12]
            );
        }
        None => print!("{}", code),
    }
    Ok(())
}
