use anyhow::Result;
use regex::Regex;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::codegen::Replacement;
use crate::project::{DEFAULT_NAMESPACE, DEFAULT_RUN_NAMESPACE};

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub templates: TemplatesConfig,
    #[serde(default)]
    pub application: ApplicationConfig,
    #[serde(default)]
    pub project: ProjectDefaults,
    /// Directory the config was loaded from; relative paths resolve against it
    #[serde(skip)]
    pub base_dir: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_storage_dir")]
    pub dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: default_storage_dir(),
        }
    }
}

fn default_storage_dir() -> String {
    "layouts".to_string()
}

/// Placeholders written into generated code
#[derive(Debug, Deserialize)]
pub struct TemplatesConfig {
    #[serde(default = "default_wwwroot_placeholder")]
    pub wwwroot: String,
    #[serde(default = "default_adminpath_placeholder")]
    pub adminpath: String,
    #[serde(default = "default_urldelimiter_placeholder")]
    pub urldelimiter: String,
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            wwwroot: default_wwwroot_placeholder(),
            adminpath: default_adminpath_placeholder(),
            urldelimiter: default_urldelimiter_placeholder(),
        }
    }
}

fn default_wwwroot_placeholder() -> String {
    "[%wroot%]".to_string()
}

fn default_adminpath_placeholder() -> String {
    "[%admp%]".to_string()
}

fn default_urldelimiter_placeholder() -> String {
    "[%-%]".to_string()
}

/// Literal values substituted for the placeholders
#[derive(Debug, Deserialize)]
pub struct ApplicationConfig {
    #[serde(default = "default_wwwroot")]
    pub wwwroot: String,
    #[serde(default = "default_admin_path")]
    pub admin_path: String,
    #[serde(default = "default_url_delimiter")]
    pub url_delimiter: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            wwwroot: default_wwwroot(),
            admin_path: default_admin_path(),
            url_delimiter: default_url_delimiter(),
        }
    }
}

fn default_wwwroot() -> String {
    "/".to_string()
}

fn default_admin_path() -> String {
    "admin".to_string()
}

fn default_url_delimiter() -> String {
    "/".to_string()
}

/// Namespaces given to newly created projects
#[derive(Debug, Deserialize)]
pub struct ProjectDefaults {
    #[serde(default = "default_namespace")]
    pub namespace: String,
    #[serde(default = "default_runnamespace")]
    pub runnamespace: String,
}

impl Default for ProjectDefaults {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            runnamespace: default_runnamespace(),
        }
    }
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

fn default_runnamespace() -> String {
    DEFAULT_RUN_NAMESPACE.to_string()
}

impl Config {
    /// Storage directory resolved against the config file location
    pub fn storage_dir(&self) -> PathBuf {
        let dir = Path::new(&self.storage.dir);
        if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            self.base_dir.join(dir)
        }
    }

    /// Placeholder map for the code generator
    pub fn replacements(&self) -> Vec<Replacement> {
        vec![
            Replacement::new(&self.templates.wwwroot, &self.application.wwwroot),
            Replacement::new(&self.templates.adminpath, &self.application.admin_path),
            Replacement::new(&self.templates.urldelimiter, &self.application.url_delimiter),
        ]
    }
}

/// Load and parse designer.toml. A missing file yields the defaults.
pub fn load_config(path: &str) -> Result<Config> {
    let base_dir = Path::new(path)
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();

    let mut config: Config = match fs::read_to_string(path) {
        Ok(content) => toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("failed to parse `{}`: {}", path, e))?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path, "no config file, using defaults");
            Config::default()
        }
        Err(e) => anyhow::bail!("failed to read `{}`: {}", path, e),
    };
    config.base_dir = base_dir;

    validate_namespace(&config.project.namespace)?;
    validate_namespace(&config.project.runnamespace)?;
    validate_placeholders(&config.templates)?;

    Ok(config)
}

/// Namespaces are dotted JavaScript identifiers, e.g. `app.components`
fn validate_namespace(namespace: &str) -> Result<()> {
    let pattern = Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*(\.[A-Za-z_$][A-Za-z0-9_$]*)*$").unwrap();
    if !pattern.is_match(namespace) {
        anyhow::bail!(
            "Invalid namespace '{}'. Must be a JavaScript identifier or a dotted path of them",
            namespace
        );
    }
    Ok(())
}

/// Placeholders are replaced one after another, so none may contain another
fn validate_placeholders(templates: &TemplatesConfig) -> Result<()> {
    let placeholders = [
        ("wwwroot", &templates.wwwroot),
        ("adminpath", &templates.adminpath),
        ("urldelimiter", &templates.urldelimiter),
    ];

    for (key, value) in &placeholders {
        if value.is_empty() {
            anyhow::bail!("Template placeholder '{}' must not be empty", key);
        }
    }
    for (i, (key, value)) in placeholders.iter().enumerate() {
        for (other_key, other) in placeholders.iter().skip(i + 1) {
            if value.contains(other.as_str()) || other.contains(value.as_str()) {
                anyhow::bail!(
                    "Template placeholders '{}' and '{}' overlap ('{}' / '{}')",
                    key,
                    other_key,
                    value,
                    other
                );
            }
        }
    }
    Ok(())
}
