use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

use crate::capabilities::CapabilityProvider;
use crate::error::{DesignerError, Entity, Result};
use crate::project::Project;

const PROJECT_SUFFIX: &str = ".designer.json";
const EXPORT_SUFFIX: &str = ".export.json";

/// Snapshot persistence for designer projects
pub trait StorageAdapter {
    /// Restore the working snapshot of `id`
    fn load(&self, id: &str) -> Result<Project>;

    /// Restore the exported copy of `id`, `None` when it was never exported
    fn import(&self, id: &str) -> Result<Option<Project>>;

    /// Persist `project`; with `export` also refresh the exported copy
    fn save(&mut self, id: &str, project: &Project, export: bool) -> Result<()>;

    fn delete(&mut self, id: &str) -> Result<()>;

    fn exists(&self, id: &str) -> bool;
}

/// Parse a snapshot and check it before handing it out
fn restore(content: &str, capabilities: &Arc<dyn CapabilityProvider>) -> Result<Project> {
    let mut project: Project = serde_json::from_str(content)
        .map_err(|e| DesignerError::DataCorruption(format!("unreadable snapshot: {}", e)))?;
    project.set_capabilities(Arc::clone(capabilities));
    project.validate()?;
    Ok(project)
}

/// JSON snapshots in a directory: `<id>.designer.json` plus `<id>.export.json`
#[derive(Debug)]
pub struct FileAdapter {
    dir: PathBuf,
    capabilities: Arc<dyn CapabilityProvider>,
}

impl FileAdapter {
    pub fn new(dir: impl Into<PathBuf>, capabilities: Arc<dyn CapabilityProvider>) -> Self {
        FileAdapter {
            dir: dir.into(),
            capabilities,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn project_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}{}", id, PROJECT_SUFFIX))
    }

    pub fn export_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}{}", id, EXPORT_SUFFIX))
    }

    /// Ids of every stored project, sorted
    pub fn list(&self) -> Result<Vec<String>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut ids = Vec::new();
        for entry in WalkDir::new(&self.dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| {
                DesignerError::Io(e.into_io_error().unwrap_or_else(|| {
                    std::io::Error::new(std::io::ErrorKind::Other, "directory walk failed")
                }))
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(id) = entry
                .file_name()
                .to_str()
                .and_then(|name| name.strip_suffix(PROJECT_SUFFIX))
            {
                ids.push(id.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }

    fn check_id(id: &str) -> Result<()> {
        if id.is_empty() || id.contains(|c: char| c == '/' || c == '\\') || id.starts_with('.') {
            return Err(DesignerError::invalid(format!("'{}' is not a valid project id", id)));
        }
        Ok(())
    }

    /// Write through a temp file in the same directory so readers never see half a snapshot
    fn write_atomic(&self, path: &Path, content: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, content)?;
        if let Err(e) = fs::rename(&tmp, path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }
}

impl StorageAdapter for FileAdapter {
    fn load(&self, id: &str) -> Result<Project> {
        Self::check_id(id)?;
        let path = self.project_path(id);
        let content = fs::read_to_string(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                DesignerError::not_found(Entity::Project, id)
            } else {
                e.into()
            }
        })?;
        let project = restore(&content, &self.capabilities)?;
        tracing::info!(id, path = %path.display(), "project loaded");
        Ok(project)
    }

    fn import(&self, id: &str) -> Result<Option<Project>> {
        Self::check_id(id)?;
        let path = self.export_path(id);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        let project = restore(&content, &self.capabilities)?;
        tracing::info!(id, path = %path.display(), "project imported");
        Ok(Some(project))
    }

    fn save(&mut self, id: &str, project: &Project, export: bool) -> Result<()> {
        Self::check_id(id)?;
        let path = self.project_path(id);
        self.write_atomic(&path, &serde_json::to_string(project)?)?;
        if export {
            self.write_atomic(&self.export_path(id), &serde_json::to_string_pretty(project)?)?;
        }
        tracing::info!(id, export, path = %path.display(), "project saved");
        Ok(())
    }

    fn delete(&mut self, id: &str) -> Result<()> {
        Self::check_id(id)?;
        let path = self.project_path(id);
        if !path.exists() {
            return Err(DesignerError::not_found(Entity::Project, id));
        }
        fs::remove_file(&path)?;
        let export = self.export_path(id);
        if export.exists() {
            fs::remove_file(&export)?;
        }
        tracing::info!(id, "project deleted");
        Ok(())
    }

    fn exists(&self, id: &str) -> bool {
        self.project_path(id).exists()
    }
}

/// In-memory snapshots, serialized the same way as on disk
#[derive(Debug)]
pub struct MemoryAdapter {
    projects: BTreeMap<String, String>,
    exports: BTreeMap<String, String>,
    capabilities: Arc<dyn CapabilityProvider>,
}

impl MemoryAdapter {
    pub fn new(capabilities: Arc<dyn CapabilityProvider>) -> Self {
        MemoryAdapter {
            projects: BTreeMap::new(),
            exports: BTreeMap::new(),
            capabilities,
        }
    }

    /// Store a raw snapshot as-is
    pub fn insert_raw(&mut self, id: &str, content: impl Into<String>) {
        self.projects.insert(id.to_string(), content.into());
    }

    pub fn ids(&self) -> Vec<String> {
        self.projects.keys().cloned().collect()
    }
}

impl StorageAdapter for MemoryAdapter {
    fn load(&self, id: &str) -> Result<Project> {
        let content = self
            .projects
            .get(id)
            .ok_or_else(|| DesignerError::not_found(Entity::Project, id))?;
        restore(content, &self.capabilities)
    }

    fn import(&self, id: &str) -> Result<Option<Project>> {
        self.exports
            .get(id)
            .map(|content| restore(content, &self.capabilities))
            .transpose()
    }

    fn save(&mut self, id: &str, project: &Project, export: bool) -> Result<()> {
        let content = serde_json::to_string(project)?;
        if export {
            self.exports.insert(id.to_string(), content.clone());
        }
        self.projects.insert(id.to_string(), content);
        Ok(())
    }

    fn delete(&mut self, id: &str) -> Result<()> {
        self.exports.remove(id);
        self.projects
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| DesignerError::not_found(Entity::Project, id))
    }

    fn exists(&self, id: &str) -> bool {
        self.projects.contains_key(id)
    }
}
