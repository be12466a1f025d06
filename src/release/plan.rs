//! Release plan: the deterministic record of resolved version transitions
//!
//! The serialized form is JSON, sorted by component name, with no timestamps,
//! so identical inputs produce byte-identical files.

use crate::core::error::{ComponentError, RelverError, RelverResult, ResultExt, ValidationError};
use crate::release::bump::{Bump, ResolvedBump};
use crate::release::registry::ComponentRegistry;
use crate::utils::write_atomic;
use semver::Version;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Ordered set of version transitions for one release
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReleasePlan {
  pub components: Vec<ResolvedBump>,
}

/// On-disk shape; `bump` stays a string so bad values get a precise error
#[derive(Deserialize)]
struct RawPlan {
  #[serde(default)]
  components: Vec<RawEntry>,
}

#[derive(Deserialize)]
struct RawEntry {
  name: String,
  current_version: Version,
  bump: String,
  next_version: Version,
  #[serde(default)]
  reasons: Vec<String>,
}

impl ReleasePlan {
  /// Build a plan, sorting by name and rejecting duplicate entries
  pub fn from_resolved(mut components: Vec<ResolvedBump>) -> RelverResult<Self> {
    components.sort_by(|a, b| a.name.cmp(&b.name));
    if let Some(pair) = components.windows(2).find(|w| w[0].name == w[1].name) {
      return Err(RelverError::message(format!(
        "Component '{}' appears twice in the release plan",
        pair[0].name
      )));
    }
    Ok(Self { components })
  }

  pub fn is_empty(&self) -> bool {
    self.components.is_empty()
  }

  /// Pretty JSON with a trailing newline
  pub fn to_json(&self) -> RelverResult<String> {
    let mut out = serde_json::to_string_pretty(self)?;
    out.push('\n');
    Ok(out)
  }

  /// Write atomically to `path`
  pub fn write(&self, path: &Path) -> RelverResult<()> {
    write_atomic(path, self.to_json()?.as_bytes())?;
    debug!(path = %path.display(), components = self.components.len(), "wrote release plan");
    Ok(())
  }

  pub fn load(path: &Path) -> RelverResult<Self> {
    if !path.exists() {
      return Err(RelverError::with_help(
        format!("Release plan not found: {}", path.display()),
        "Generate one with `relver plan`.",
      ));
    }
    let content = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Self::parse(&content, path)
  }

  pub fn parse(content: &str, origin: &Path) -> RelverResult<Self> {
    let raw: RawPlan = serde_json::from_str(content).map_err(|e| RelverError::schema(origin, e.to_string()))?;
    let origin_str = origin.display().to_string();

    let mut seen = BTreeSet::new();
    let mut components = Vec::with_capacity(raw.components.len());
    for entry in raw.components {
      if !seen.insert(entry.name.clone()) {
        return Err(RelverError::schema(
          origin,
          format!("component '{}' appears more than once", entry.name),
        ));
      }
      let bump = Bump::parse_from(&entry.bump, &origin_str)?;
      components.push(ResolvedBump {
        name: entry.name,
        current_version: entry.current_version,
        bump,
        next_version: entry.next_version,
        reasons: entry.reasons,
      });
    }

    components.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(Self { components })
  }

  /// Check every entry against the live sources without writing
  ///
  /// `origin` names the plan file in unknown-component errors. Runtime
  /// version files must still carry a readable `__version__` assignment.
  pub fn verify_current(&self, registry: &ComponentRegistry, origin: &str) -> RelverResult<()> {
    for entry in &self.components {
      let component = registry.get(&entry.name).ok_or_else(|| {
        RelverError::Component(ComponentError::Unknown {
          name: entry.name.clone(),
          origin: Some(origin.to_string()),
        })
      })?;
      let found = registry.read_version(component)?;
      if found != entry.current_version {
        return Err(RelverError::Validation(ValidationError::PlanStale {
          component: entry.name.clone(),
          expected: entry.current_version.to_string(),
          found: found.to_string(),
        }));
      }
      registry.read_runtime_versions(component)?;
    }
    Ok(())
  }

  /// Write every next_version to its sources
  ///
  /// All entries are checked for staleness and every file is rendered before
  /// the first write. Returns the files that were rewritten.
  pub fn apply(&self, registry: &ComponentRegistry, origin: &str) -> RelverResult<Vec<PathBuf>> {
    self.verify_current(registry, origin)?;

    let mut staged = Vec::new();
    for entry in &self.components {
      if let Some(component) = registry.get(&entry.name) {
        staged.extend(registry.stage_version(component, &entry.next_version)?);
      }
    }

    let changed = registry.commit(staged)?;
    for entry in &self.components {
      info!(component = %entry.name, from = %entry.current_version, to = %entry.next_version, "applied bump");
    }
    Ok(changed)
  }
}
