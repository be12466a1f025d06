//! Platform manifest: model, consistency gate, and regeneration
//!
//! The manifest is externally owned data. `check` is a pure comparison of the
//! manifest against the authoritative version sources; it never writes.

use crate::core::error::{Drift, RelverError, RelverResult, ResultExt, ValidationError};
use crate::release::registry::ComponentRegistry;
use crate::utils::{path_to_git_format, write_atomic};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Current manifest schema written by `generate`
pub const MANIFEST_SCHEMA_VERSION: u32 = 2;

/// Snapshot of every component version in one platform release
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub schema_version: Option<u32>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub generated_at: Option<String>,
  #[serde(default)]
  pub platform_release: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub git_sha: Option<String>,
  #[serde(default)]
  pub components: BTreeMap<String, ManifestEntry>,
}

/// A manifest entry: either a bare version string or a detailed record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ManifestEntry {
  Version(String),
  Detailed(ManifestComponent),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestComponent {
  pub version: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub kind: Option<String>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub version_sources: Vec<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub version_sources_digest: Option<String>,
}

impl ManifestEntry {
  pub fn version(&self) -> &str {
    match self {
      ManifestEntry::Version(v) => v.trim(),
      ManifestEntry::Detailed(c) => c.version.trim(),
    }
  }

  /// Recorded kind; `None` for bare version entries, which carry no metadata
  pub fn kind(&self) -> Option<Option<&str>> {
    match self {
      ManifestEntry::Version(_) => None,
      ManifestEntry::Detailed(c) => Some(c.kind.as_deref()),
    }
  }
}

impl Manifest {
  /// Load a manifest from YAML
  pub fn load(path: &Path) -> RelverResult<Self> {
    if !path.exists() {
      return Err(RelverError::with_help(
        format!("Manifest not found: {}", path.display()),
        "Generate one with `relver manifest`.",
      ));
    }
    let content = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Self::parse(&content, path)
  }

  /// Parse manifest YAML; `origin` is used for error messages
  pub fn parse(content: &str, origin: &Path) -> RelverResult<Self> {
    serde_yaml::from_str(content).map_err(|e| RelverError::schema(origin, e.to_string()))
  }

  /// Write atomically as YAML
  pub fn save(&self, path: &Path) -> RelverResult<()> {
    let content = serde_yaml::to_string(self)?;
    write_atomic(path, content.as_bytes())
  }

  /// Recorded version for a component
  pub fn version_of(&self, name: &str) -> Option<&str> {
    self.components.get(name).map(ManifestEntry::version)
  }
}

/// Outcome of one consistency check
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
  /// Registry components absent from the manifest
  pub missing: Vec<String>,
  /// Manifest entries that name no registry component
  pub extra: Vec<String>,
  /// Version disagreements
  pub drifts: Vec<Drift>,
  /// Number of registry components examined
  pub checked: usize,
}

impl SyncReport {
  pub fn is_clean(&self) -> bool {
    self.missing.is_empty() && self.extra.is_empty() && self.drifts.is_empty()
  }

  /// Turn the report into the gate verdict
  ///
  /// Coverage failures take precedence over drift for the error category;
  /// drift found alongside them is still printed.
  pub fn into_result(self) -> RelverResult<()> {
    if !self.missing.is_empty() || !self.extra.is_empty() {
      for drift in &self.drifts {
        eprintln!("   ⚠️  {}", drift);
      }
      return Err(RelverError::Validation(ValidationError::ManifestCoverage {
        missing: self.missing,
        extra: self.extra,
      }));
    }
    if !self.drifts.is_empty() {
      return Err(RelverError::Validation(ValidationError::ManifestDrift { drifts: self.drifts }));
    }
    Ok(())
  }
}

/// Compare the manifest against the authoritative sources
///
/// Pure: reads version sources, writes nothing. Unreadable sources are an
/// error rather than a drift entry.
pub fn check(registry: &ComponentRegistry, manifest: &Manifest) -> RelverResult<SyncReport> {
  let components: Vec<_> = registry.components().collect();

  let live: Vec<(String, String, Vec<(PathBuf, String)>)> = components
    .par_iter()
    .map(|component| -> RelverResult<(String, String, Vec<(PathBuf, String)>)> {
      let version = registry.read_version(component)?.to_string();
      let runtime = registry.read_runtime_versions(component)?;
      Ok((component.name.clone(), version, runtime))
    })
    .collect::<RelverResult<_>>()?;

  let mut report = SyncReport {
    checked: live.len(),
    ..SyncReport::default()
  };

  for (component, (name, source_version, runtime)) in components.iter().zip(&live) {
    let Some(entry) = manifest.components.get(name) else {
      report.missing.push(name.clone());
      continue;
    };

    if entry.version() != source_version {
      report.drifts.push(Drift {
        component: name.clone(),
        recorded_in: "manifest".to_string(),
        recorded: entry.version().to_string(),
        source: source_version.clone(),
      });
    }

    if let Some(recorded_kind) = entry.kind()
      && recorded_kind != component.kind.as_deref()
    {
      report.drifts.push(Drift {
        component: name.clone(),
        recorded_in: "manifest kind".to_string(),
        recorded: recorded_kind.unwrap_or("<none>").to_string(),
        source: component.kind.as_deref().unwrap_or("<none>").to_string(),
      });
    }

    for (file, runtime_version) in runtime {
      if runtime_version != source_version {
        report.drifts.push(Drift {
          component: name.clone(),
          recorded_in: path_to_git_format(file),
          recorded: runtime_version.clone(),
          source: source_version.clone(),
        });
      }
    }
  }

  report.extra = manifest
    .components
    .keys()
    .filter(|name| registry.get(name).is_none())
    .cloned()
    .collect();

  debug!(
    checked = report.checked,
    missing = report.missing.len(),
    extra = report.extra.len(),
    drifts = report.drifts.len(),
    "manifest sync check"
  );
  Ok(report)
}

/// Next `platform-YYYY.MM.DD.N` identifier for `today`
///
/// N continues from the existing manifest when it was cut the same day.
pub fn next_platform_release_id(existing: Option<&Manifest>, today: NaiveDate) -> String {
  let prefix = today.format("platform-%Y.%m.%d").to_string();

  let previous = existing
    .map(|m| m.platform_release.trim())
    .and_then(|current| current.strip_prefix(&format!("{}.", prefix)))
    .and_then(|n| n.parse::<u32>().ok());

  match previous {
    Some(n) => format!("{}.{}", prefix, n + 1),
    None => format!("{}.1", prefix),
  }
}

/// Build a fresh manifest from the authoritative sources
pub fn generate(
  registry: &ComponentRegistry,
  platform_release: &str,
  git_sha: Option<String>,
  now: DateTime<Utc>,
) -> RelverResult<Manifest> {
  let components: Vec<_> = registry.components().collect();

  let entries: Vec<(String, ManifestEntry)> = components
    .par_iter()
    .map(|component| -> RelverResult<(String, ManifestEntry)> {
      let version = registry.read_version(component)?.to_string();
      let files = registry.source_files(component);
      let digest = digest_files(registry.root(), &files)?;
      Ok((
        component.name.clone(),
        ManifestEntry::Detailed(ManifestComponent {
          version,
          kind: component.kind.clone(),
          version_sources: files.iter().map(|f| path_to_git_format(f)).collect(),
          version_sources_digest: Some(digest),
        }),
      ))
    })
    .collect::<RelverResult<_>>()?;

  if platform_release.trim().is_empty() {
    warn!("generating manifest with an empty platform_release");
  }

  Ok(Manifest {
    schema_version: Some(MANIFEST_SCHEMA_VERSION),
    generated_at: Some(now.to_rfc3339_opts(SecondsFormat::Secs, true)),
    platform_release: platform_release.trim().to_string(),
    git_sha,
    components: entries.into_iter().collect(),
  })
}

/// SHA-256 over (path, contents) pairs in sorted path order
fn digest_files(root: &Path, files: &[PathBuf]) -> RelverResult<String> {
  let mut sorted: Vec<&PathBuf> = files.iter().collect();
  sorted.sort();

  let mut hasher = Sha256::new();
  for file in sorted {
    let bytes = std::fs::read(root.join(file)).with_context(|| format!("Missing file for digest: {}", file.display()))?;
    hasher.update(path_to_git_format(file).as_bytes());
    hasher.update([0u8]);
    hasher.update(&bytes);
    hasher.update([0u8]);
  }
  Ok(format!("{:x}", hasher.finalize()))
}
