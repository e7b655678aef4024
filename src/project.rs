use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::pattern::normalize_pattern;

/// Directory (relative to the project root) holding per-project state.
pub const PROJECT_STATE_DIR: &str = ".claudesync";

const PROJECT_CONFIG_FILE: &str = "project.json";

/// Project configuration for syncing a file tree with a remote project.
///
/// This is an immutable value type: edits go through
/// [`crate::editor::apply`], which returns a new config, so a scan holding
/// one snapshot and an edit producing the next never interfere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Remote project name
    #[serde(rename = "project_name")]
    pub name: String,

    /// Remote project description
    #[serde(rename = "project_description", default)]
    pub description: String,

    /// Glob patterns selecting files to sync (insertion order preserved)
    #[serde(default)]
    pub includes: Vec<String>,

    /// Glob patterns excluding files from sync; an exclude always overrides
    /// an include for the same path
    #[serde(default)]
    pub excludes: Vec<String>,

    /// Hard scope boundary: when non-empty, only files under one of these
    /// directories are ever considered
    #[serde(default)]
    pub push_roots: Vec<String>,

    /// Honor `.gitignore`/`.claudeignore` files during scans
    #[serde(default = "default_use_ignore_files")]
    pub use_ignore_files: bool,
}

fn default_use_ignore_files() -> bool {
    true
}

impl Default for ProjectConfig {
    fn default() -> Self {
        ProjectConfig {
            name: String::new(),
            description: String::new(),
            includes: Vec::new(),
            excludes: Vec::new(),
            push_roots: Vec::new(),
            use_ignore_files: true,
        }
    }
}

impl ProjectConfig {
    /// Load the project configuration stored under `root`.
    pub fn load(root: &Path) -> Result<Self> {
        let config_path = Self::config_path(root);

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read project config: {}", config_path.display()))?;

        let config: ProjectConfig =
            serde_json::from_str(&content).context("Failed to parse project config")?;

        Ok(config.normalized())
    }

    /// Save the project configuration under `root`, creating the state
    /// directory if needed.
    pub fn save(&self, root: &Path) -> Result<()> {
        let config_path = Self::config_path(root);

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create state directory: {}", parent.display())
            })?;
        }

        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&config_path, content)
            .with_context(|| format!("Failed to write project config: {}", config_path.display()))?;

        Ok(())
    }

    /// Path of the config file for a project root.
    pub fn config_path(root: &Path) -> PathBuf {
        root.join(PROJECT_STATE_DIR).join(PROJECT_CONFIG_FILE)
    }

    /// Apply load-boundary normalization: trim and slash-normalize patterns
    /// and roots, drop entries that normalize to empty, dedupe preserving
    /// first occurrence. Nested push roots collapse into their ancestor so no
    /// subtree is walked twice.
    pub fn normalized(&self) -> Self {
        let mut config = self.clone();
        config.includes = normalize_list(&self.includes, normalize_pattern);
        config.excludes = normalize_list(&self.excludes, normalize_pattern);
        config.push_roots = normalize_list(&self.push_roots, normalize_root);
        config.push_roots = drop_nested_roots(config.push_roots);
        config
    }

    /// True when `path` (a `/`-separated relative path) falls under at least
    /// one push root, or when no push roots are configured.
    pub fn within_push_roots(&self, path: &str) -> bool {
        if self.push_roots.is_empty() {
            return true;
        }
        self.push_roots
            .iter()
            .any(|root| path == root || path.starts_with(&format!("{root}/")))
    }
}

/// Normalize a push-root path: trim, forward slashes, strip `./` prefix and
/// any trailing slash.
pub fn normalize_root(raw: &str) -> String {
    let mut root = normalize_pattern(raw);
    while let Some(rest) = root.strip_prefix("./") {
        root = rest.to_string();
    }
    root.trim_matches('/').to_string()
}

fn normalize_list(items: &[String], normalize: impl Fn(&str) -> String) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        let normalized = normalize(item);
        if !normalized.is_empty() && !out.contains(&normalized) {
            out.push(normalized);
        }
    }
    out
}

/// Collapse push roots nested under another root so no subtree is walked
/// twice. Input order is preserved.
pub(crate) fn drop_nested_roots(roots: Vec<String>) -> Vec<String> {
    let mut kept: Vec<String> = Vec::with_capacity(roots.len());
    for root in &roots {
        if !roots
            .iter()
            .any(|other| other != root && root.starts_with(&format!("{other}/")))
        {
            kept.push(root.clone());
        }
    }
    kept
}
