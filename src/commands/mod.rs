pub mod behavior;
pub mod code;
pub mod init;
pub mod list;
pub mod object;
pub mod tree;

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::capabilities::CapabilityTable;
use crate::config::{load_config, Config};
use crate::project::Project;
use crate::storage::{FileAdapter, StorageAdapter};

/// Loaded configuration plus the storage it points at
pub struct Workspace {
    pub config: Config,
    pub storage: FileAdapter,
}

impl Workspace {
    pub fn open(config_path: &str) -> Result<Self> {
        let config = load_config(config_path)?;
        let storage = FileAdapter::new(config.storage_dir(), Arc::new(CapabilityTable::builtin()));
        Ok(Workspace { config, storage })
    }

    pub fn load(&self, id: &str) -> Result<Project> {
        self.storage
            .load(id)
            .with_context(|| format!("Failed to load project '{}'", id))
    }

    pub fn save(&mut self, id: &str, project: &Project) -> Result<()> {
        self.storage
            .save(id, project, false)
            .with_context(|| format!("Failed to save project '{}'", id))
    }

    /// Load, apply `change`, save. Nothing is written when `change` fails.
    pub fn update<F>(&mut self, id: &str, change: F) -> Result<()>
    where
        F: FnOnce(&mut Project) -> Result<()>,
    {
        let mut project = self.load(id)?;
        change(&mut project)?;
        self.save(id, &project)
    }
}

/// Split a `key=value` command line argument
pub fn parse_key_value(raw: &str) -> Result<(String, String)> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => anyhow::bail!("Invalid property '{}'. Expected key=value", raw),
    }
}
