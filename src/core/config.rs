use crate::core::error::{ConfigError, RelverError, RelverResult, ResultExt};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Configuration for relver
/// Searched in order: relver.toml, .relver.toml, .config/relver.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelverConfig {
  #[serde(default)]
  pub release: ReleaseSettings,
  #[serde(default)]
  pub components: Vec<ComponentConfig>,
}

/// Locations of the release artifacts, relative to the repository root
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseSettings {
  /// Pending change notes (default: ".changes")
  #[serde(default = "default_notes_dir")]
  pub notes_dir: PathBuf,

  /// Archive root for consumed notes (default: ".changes/archive")
  #[serde(default = "default_archive_dir")]
  pub archive_dir: PathBuf,

  /// Platform manifest (default: "manifest.yaml")
  #[serde(default = "default_manifest")]
  pub manifest: PathBuf,

  /// Release plan artifact (default: "release-plan.json")
  #[serde(default = "default_plan")]
  pub plan: PathBuf,

  /// Remote that tags are pushed to (default: "origin")
  #[serde(default = "default_remote")]
  pub remote: String,
}

fn default_notes_dir() -> PathBuf {
  PathBuf::from(".changes")
}

fn default_archive_dir() -> PathBuf {
  PathBuf::from(".changes/archive")
}

fn default_manifest() -> PathBuf {
  PathBuf::from("manifest.yaml")
}

fn default_plan() -> PathBuf {
  PathBuf::from("release-plan.json")
}

fn default_remote() -> String {
  "origin".to_string()
}

impl Default for ReleaseSettings {
  fn default() -> Self {
    Self {
      notes_dir: default_notes_dir(),
      archive_dir: default_archive_dir(),
      manifest: default_manifest(),
      plan: default_plan(),
      remote: default_remote(),
    }
  }
}

/// One independently versioned component
///
/// # Example
///
/// ```toml
/// [[components]]
/// name = "tentacle"
/// aliases = ["tent"]
/// kind = "app"
/// path_globs = ["apps/tentacle/*"]
/// version = { file = "apps/tentacle/VERSION", kind = "plain" }
/// runtime_version_files = ["apps/tentacle/src/__init__.py"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentConfig {
  /// Canonical component name (unique)
  pub name: String,

  /// Alternative names accepted in change notes
  #[serde(default)]
  pub aliases: Vec<String>,

  /// Free-form label recorded in the manifest (e.g. "app", "library")
  #[serde(default)]
  pub kind: Option<String>,

  /// Authoritative version location
  pub version: VersionSource,

  /// Files carrying a `__version__ = "x.y.z"` mirror of the source version
  #[serde(default)]
  pub runtime_version_files: Vec<PathBuf>,

  /// Repository paths owned by the component, for change detection
  #[serde(default)]
  pub path_globs: Vec<String>,
}

/// Where a component's authoritative version lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionSource {
  pub file: PathBuf,
  pub kind: VersionSourceKind,
}

/// File format of a version source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VersionSourceKind {
  /// `[package].version` in Cargo.toml
  Cargo,
  /// `[project].version` in pyproject.toml
  Pyproject,
  /// `"version"` in package.json
  PackageJson,
  /// `version="..."` keyword in setup.py
  SetupPy,
  /// Whole file is the version
  Plain,
}

impl RelverConfig {
  /// Find config file in search order: relver.toml, .relver.toml, .config/relver.toml
  pub fn find_config_path(path: &Path) -> Option<PathBuf> {
    let candidates = [
      path.join("relver.toml"),
      path.join(".relver.toml"),
      path.join(".config").join("relver.toml"),
    ];

    candidates.into_iter().find(|p| p.exists())
  }

  /// Resolve the config file: an explicit path wins, otherwise search the root
  pub fn locate(repo_root: &Path, explicit: Option<&Path>) -> RelverResult<PathBuf> {
    match explicit {
      Some(path) if path.is_absolute() => Ok(path.to_path_buf()),
      Some(path) => Ok(repo_root.join(path)),
      None => Self::find_config_path(repo_root).ok_or_else(|| {
        RelverError::Config(ConfigError::NotFound {
          repo_root: repo_root.to_path_buf(),
        })
      }),
    }
  }

  /// Load config from a file
  pub fn load(config_path: &Path) -> RelverResult<Self> {
    let content = fs::read_to_string(config_path)
      .with_context(|| format!("Failed to read config from {}", config_path.display()))?;
    let config = Self::parse(&content, config_path)?;
    debug!(
      path = %config_path.display(),
      components = config.components.len(),
      "loaded relver config"
    );
    Ok(config)
  }

  /// Parse config text; `origin` is only used for error messages
  pub fn parse(content: &str, origin: &Path) -> RelverResult<Self> {
    let config: RelverConfig =
      toml_edit::de::from_str(content).map_err(|e| RelverError::schema(origin, e.to_string()))?;
    config.settings_valid(origin)?;
    Ok(config)
  }

  fn settings_valid(&self, origin: &Path) -> RelverResult<()> {
    if self.release.remote.trim().is_empty() {
      return Err(RelverError::schema(origin, "release.remote cannot be empty"));
    }
    if self.release.notes_dir == self.release.archive_dir {
      return Err(RelverError::schema(
        origin,
        "release.archive_dir must differ from release.notes_dir",
      ));
    }
    Ok(())
  }
}
