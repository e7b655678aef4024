use anyhow::{bail, Result};
use std::str::FromStr;

use crate::pattern::normalize_pattern;
use crate::project::ProjectConfig;

/// A single-pattern edit to a project config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigAction {
    AddInclude,
    RemoveInclude,
    AddExclude,
    RemoveExclude,
}

impl FromStr for ConfigAction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "add-include" => Ok(ConfigAction::AddInclude),
            "remove-include" => Ok(ConfigAction::RemoveInclude),
            "add-exclude" => Ok(ConfigAction::AddExclude),
            "remove-exclude" => Ok(ConfigAction::RemoveExclude),
            other => bail!(
                "invalid config action {other:?} (expected add-include, remove-include, \
                 add-exclude or remove-exclude)"
            ),
        }
    }
}

/// Apply a single add/remove pattern edit, returning a new config.
///
/// The input is never mutated, so a scan holding the old snapshot keeps
/// running against it unchanged. Edits are idempotent: adding a pattern that
/// is already present and removing one that is not are both no-ops. The
/// pattern is normalized (trim, forward slashes) before comparison, so
/// equivalent spellings dedupe.
pub fn apply(config: &ProjectConfig, action: ConfigAction, pattern: &str) -> Result<ProjectConfig> {
    let pattern = normalize_pattern(pattern);
    if pattern.is_empty() {
        bail!("pattern must not be empty");
    }

    let mut next = config.clone();
    match action {
        ConfigAction::AddInclude => add(&mut next.includes, pattern),
        ConfigAction::RemoveInclude => remove(&mut next.includes, &pattern),
        ConfigAction::AddExclude => add(&mut next.excludes, pattern),
        ConfigAction::RemoveExclude => remove(&mut next.excludes, &pattern),
    }
    Ok(next)
}

fn add(patterns: &mut Vec<String>, pattern: String) {
    if !patterns.contains(&pattern) {
        patterns.push(pattern);
    }
}

fn remove(patterns: &mut Vec<String>, pattern: &str) {
    patterns.retain(|p| p != pattern);
}
