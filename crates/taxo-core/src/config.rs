//! Configuration for hierarchy resolution and table layout.
//!
//! Load order: `taxo.toml` (or an explicit file) → environment variables → defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

const CONFIG_FILE: &str = "taxo.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxoConfig {
    pub hierarchy: HierarchyConfig,
    pub columns: ColumnConfig,
    pub progress: ProgressConfig,
}

/// Resolver behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HierarchyConfig {
    /// Separator placed between labels in a rendered path.
    pub separator: String,
    /// Stop enumerating a node's paths after this many. Unlimited when unset.
    pub max_paths: Option<usize>,
    /// Reject cyclic hierarchies up front instead of containing cycles.
    pub strict_acyclic: bool,
}

/// Column names of the skills taxonomy tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnConfig {
    pub id: String,
    pub label: String,
    pub child: String,
    pub parent: String,
    pub skill_type: String,
    /// Appended by `levels`.
    pub level: String,
    /// Appended by `paths`.
    pub path: String,
}

/// Row progress reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressConfig {
    pub enabled: bool,
    /// Rows between `info` log lines.
    pub interval: usize,
}

impl Default for HierarchyConfig {
    fn default() -> Self {
        Self {
            separator: " ; ".to_string(),
            max_paths: None,
            strict_acyclic: false,
        }
    }
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            id: "ID".to_string(),
            label: "PREFERREDLABEL".to_string(),
            child: "CHILDID".to_string(),
            parent: "PARENTID".to_string(),
            skill_type: "SKILLTYPE".to_string(),
            level: "LEVEL".to_string(),
            path: "hierarchy_path".to_string(),
        }
    }
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval: 1000,
        }
    }
}

/// Helper to parse an env var and apply it to a config field.
fn env_override<T: std::str::FromStr>(var: &str, target: &mut T) {
    if let Ok(v) = std::env::var(var)
        && let Ok(n) = v.parse()
    {
        *target = n;
    }
}

impl TaxoConfig {
    /// Load `taxo.toml` from `dir`, with env var overrides.
    /// Falls back to defaults if no config file exists.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE);
        if path.exists() {
            Self::load_file(&path)
        } else {
            Self::default().finish()
        }
    }

    /// Load an explicit config file, with env var overrides.
    pub fn load_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config from {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        config.finish()
    }

    fn finish(mut self) -> Result<Self> {
        env_override("TAXO_PATH_SEPARATOR", &mut self.hierarchy.separator);
        env_override("TAXO_STRICT_ACYCLIC", &mut self.hierarchy.strict_acyclic);
        env_override("TAXO_PROGRESS_INTERVAL", &mut self.progress.interval);
        if let Ok(v) = std::env::var("TAXO_MAX_PATHS")
            && let Ok(n) = v.parse()
        {
            self.hierarchy.max_paths = Some(n);
        }

        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.hierarchy.separator.is_empty() {
            anyhow::bail!("hierarchy.separator must not be empty");
        }
        if self.hierarchy.max_paths == Some(0) {
            anyhow::bail!("hierarchy.max_paths must be at least 1 when set");
        }
        if self.progress.interval == 0 {
            anyhow::bail!("progress.interval must be at least 1");
        }
        Ok(())
    }
}
