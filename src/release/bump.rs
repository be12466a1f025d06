//! SemVer bump severity and next-version resolution

use crate::core::error::{RelverError, RelverResult, ValidationError};
use crate::release::registry::ComponentRegistry;
use semver::Version;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Version bump severity
///
/// Variant order is the severity order: `Patch < Minor < Major`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bump {
  /// Bug fixes
  Patch,
  /// Backwards-compatible features
  Minor,
  /// Breaking changes
  Major,
}

impl Bump {
  /// Apply the bump, dropping any pre-release or build metadata
  ///
  /// Fails instead of wrapping when the bumped field is already `u64::MAX`.
  pub fn apply(self, component: &str, version: &Version) -> RelverResult<Version> {
    let next = match self {
      Bump::Major => version.major.checked_add(1).map(|major| Version::new(major, 0, 0)),
      Bump::Minor => version
        .minor
        .checked_add(1)
        .map(|minor| Version::new(version.major, minor, 0)),
      Bump::Patch => version
        .patch
        .checked_add(1)
        .map(|patch| Version::new(version.major, version.minor, patch)),
    };
    next.ok_or_else(|| {
      RelverError::Validation(ValidationError::VersionOverflow {
        component: component.to_string(),
        version: version.to_string(),
        bump: self.as_str().to_string(),
      })
    })
  }

  /// Parse a severity, naming `origin` in the error
  pub fn parse_from(value: &str, origin: &str) -> RelverResult<Self> {
    value.parse().map_err(|_| {
      RelverError::Validation(ValidationError::InvalidBump {
        value: value.to_string(),
        origin: origin.to_string(),
      })
    })
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Bump::Major => "major",
      Bump::Minor => "minor",
      Bump::Patch => "patch",
    }
  }
}

impl fmt::Display for Bump {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.pad(self.as_str())
  }
}

impl FromStr for Bump {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim() {
      "patch" => Ok(Bump::Patch),
      "minor" => Ok(Bump::Minor),
      "major" => Ok(Bump::Major),
      other => Err(format!("unsupported bump type: {}", other)),
    }
  }
}

/// Aggregated intent to release one component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BumpIntent {
  pub component: String,
  pub severity: Bump,
  /// `"<note file>: <summary>"` per contributing note, in note order
  pub reasons: Vec<String>,
}

/// One resolved version transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedBump {
  pub name: String,
  pub current_version: Version,
  pub bump: Bump,
  pub next_version: Version,
  #[serde(default)]
  pub reasons: Vec<String>,
}

/// Resolve next versions for every component that has an intent
///
/// Components without an intent are not part of the result. Output is in
/// canonical-name order.
pub fn resolve(
  intents: &BTreeMap<String, BumpIntent>,
  registry: &ComponentRegistry,
) -> RelverResult<Vec<ResolvedBump>> {
  let mut resolved = Vec::with_capacity(intents.len());

  for (name, intent) in intents {
    let component = registry.resolve(name)?;
    let current_version = registry.read_version(component)?;
    let next_version = intent.severity.apply(&component.name, &current_version)?;
    debug!(
      component = %component.name,
      current = %current_version,
      next = %next_version,
      bump = %intent.severity,
      "resolved bump"
    );

    resolved.push(ResolvedBump {
      name: component.name.clone(),
      current_version,
      bump: intent.severity,
      next_version,
      reasons: intent.reasons.clone(),
    });
  }

  resolved.sort_by(|a, b| a.name.cmp(&b.name));
  Ok(resolved)
}
