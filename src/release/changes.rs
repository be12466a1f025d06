//! Components touched by a change range, matched through `path_globs`
//!
//! The change set is a JSON artifact so CI can compute it once and hand it to
//! `relver plan --changed`.

use crate::core::error::{RelverError, RelverResult, ResultExt};
use crate::release::registry::ComponentRegistry;
use crate::utils::{path_to_git_format, write_atomic};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Files and components that changed between two revisions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet {
  pub base: String,
  pub head: String,
  /// Every changed file, sorted
  #[serde(default)]
  pub files: Vec<String>,
  /// Canonical names of the components with at least one matching file
  #[serde(default)]
  pub components: Vec<String>,
  #[serde(default)]
  pub component_files: BTreeMap<String, Vec<String>>,
}

impl ChangeSet {
  /// Match `files` against every component's path globs
  pub fn detect(registry: &ComponentRegistry, base: &str, head: &str, files: &[PathBuf]) -> Self {
    let mut all: Vec<String> = files.iter().map(|f| path_to_git_format(f)).collect();
    all.sort();
    all.dedup();

    let component_files = registry.match_files(files);
    debug!(files = all.len(), components = component_files.len(), "detected changed components");

    Self {
      base: base.to_string(),
      head: head.to_string(),
      files: all,
      components: component_files.keys().cloned().collect(),
      component_files,
    }
  }

  /// Pretty JSON with a trailing newline
  pub fn to_json(&self) -> RelverResult<String> {
    let mut out = serde_json::to_string_pretty(self)?;
    out.push('\n');
    Ok(out)
  }

  pub fn write(&self, path: &Path) -> RelverResult<()> {
    write_atomic(path, self.to_json()?.as_bytes())
  }

  pub fn load(path: &Path) -> RelverResult<Self> {
    if !path.exists() {
      return Err(RelverError::with_help(
        format!("Change set not found: {}", path.display()),
        "Generate one with `relver changed --base <REV> --output <PATH>`.",
      ));
    }
    let content = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).map_err(|e| RelverError::schema(path, e.to_string()))
  }

  /// Canonical names of the changed components
  ///
  /// Names are resolved through the registry so a stale change set fails
  /// instead of silently filtering everything out.
  pub fn component_filter(&self, registry: &ComponentRegistry, origin: &str) -> RelverResult<BTreeSet<String>> {
    self
      .components
      .iter()
      .map(|name| registry.resolve_from(name, origin).map(|c| c.name.clone()))
      .collect()
  }
}
