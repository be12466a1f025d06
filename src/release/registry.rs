//! Component registry: canonical names, aliases and version sources
//!
//! Alias resolution is a plain map lookup. The registry is built once per
//! invocation from `[[components]]` and never mutated afterwards.

use crate::core::config::{ComponentConfig, RelverConfig};
use crate::core::error::{ComponentError, RelverError, RelverResult};
use crate::release::sources;
use crate::utils::{path_to_git_format, write_atomic};
use glob::Pattern;
use semver::Version;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Declared components keyed by canonical name
#[derive(Debug, Clone)]
pub struct ComponentRegistry {
  root: PathBuf,
  components: BTreeMap<String, ComponentConfig>,
  aliases: HashMap<String, String>,
  /// Compiled `path_globs` per component
  patterns: BTreeMap<String, Vec<Pattern>>,
}

/// New content for one version file, rendered but not yet written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedWrite {
  /// Path relative to the registry root
  pub file: PathBuf,
  pub content: String,
}

impl ComponentRegistry {
  /// Build the registry, rejecting duplicate names and colliding aliases
  pub fn from_config(root: &Path, config: &RelverConfig, origin: &Path) -> RelverResult<Self> {
    let mut components = BTreeMap::new();

    for component in &config.components {
      let name = component.name.trim();
      if name.is_empty() {
        return Err(RelverError::schema(origin, "component name cannot be empty"));
      }
      if name != component.name || name.contains('@') || name.chars().any(char::is_whitespace) {
        return Err(RelverError::schema(
          origin,
          format!("component name '{}' may not contain '@' or whitespace", component.name),
        ));
      }
      if components.insert(name.to_string(), component.clone()).is_some() {
        return Err(RelverError::schema(origin, format!("duplicate component '{}'", name)));
      }
    }

    let mut aliases: HashMap<String, String> = HashMap::new();
    for component in components.values() {
      for alias in &component.aliases {
        let alias = alias.trim();
        if alias.is_empty() || alias == component.name {
          continue;
        }
        if components.contains_key(alias) {
          return Err(RelverError::schema(
            origin,
            format!(
              "alias '{}' of '{}' collides with a component name",
              alias, component.name
            ),
          ));
        }
        if let Some(owner) = aliases.insert(alias.to_string(), component.name.clone())
          && owner != component.name
        {
          return Err(RelverError::schema(
            origin,
            format!("alias '{}' is declared by both '{}' and '{}'", alias, owner, component.name),
          ));
        }
      }
    }

    let mut patterns = BTreeMap::new();
    for component in components.values() {
      let compiled = component
        .path_globs
        .iter()
        .map(|glob| {
          Pattern::new(glob).map_err(|e| {
            RelverError::schema(
              origin,
              format!("invalid path glob '{}' for '{}': {}", glob, component.name, e),
            )
          })
        })
        .collect::<RelverResult<Vec<_>>>()?;
      patterns.insert(component.name.clone(), compiled);
    }

    debug!(components = components.len(), aliases = aliases.len(), "built component registry");

    Ok(Self {
      root: root.to_path_buf(),
      components,
      aliases,
      patterns,
    })
  }

  /// Repository root that version-source paths are relative to
  pub fn root(&self) -> &Path {
    &self.root
  }

  /// Look up by canonical name only
  pub fn get(&self, name: &str) -> Option<&ComponentConfig> {
    self.components.get(name)
  }

  /// Look up by canonical name or alias
  pub fn resolve(&self, name_or_alias: &str) -> RelverResult<&ComponentConfig> {
    self.lookup(name_or_alias, None)
  }

  /// Like `resolve`, naming where the reference came from in the error
  pub fn resolve_from(&self, name_or_alias: &str, origin: &str) -> RelverResult<&ComponentConfig> {
    self.lookup(name_or_alias, Some(origin))
  }

  fn lookup(&self, name_or_alias: &str, origin: Option<&str>) -> RelverResult<&ComponentConfig> {
    let key = name_or_alias.trim();
    let canonical = if self.components.contains_key(key) {
      Some(key)
    } else {
      self.aliases.get(key).map(String::as_str)
    };

    canonical.and_then(|name| self.components.get(name)).ok_or_else(|| {
      RelverError::Component(ComponentError::Unknown {
        name: key.to_string(),
        origin: origin.map(str::to_string),
      })
    })
  }

  /// Components in canonical-name order
  pub fn components(&self) -> impl Iterator<Item = &ComponentConfig> {
    self.components.values()
  }

  /// Canonical names in sorted order
  pub fn names(&self) -> impl Iterator<Item = &str> {
    self.components.keys().map(String::as_str)
  }

  pub fn is_empty(&self) -> bool {
    self.components.is_empty()
  }

  /// Read the live current version from the component's version source
  pub fn read_version(&self, component: &ComponentConfig) -> RelverResult<Version> {
    let path = self.root.join(&component.version.file);
    let unreadable = |reason: String| {
      RelverError::Component(ComponentError::VersionSourceUnreadable {
        component: component.name.clone(),
        path: component.version.file.clone(),
        reason,
      })
    };

    if !path.exists() {
      return Err(unreadable("file does not exist".to_string()));
    }
    let raw = sources::read_version(&path, component.version.kind).map_err(unreadable)?;
    Version::parse(raw.trim()).map_err(|e| unreadable(format!("'{}' is not SemVer: {}", raw, e)))
  }

  /// Versions recorded in each runtime version file, in declaration order
  pub fn read_runtime_versions(&self, component: &ComponentConfig) -> RelverResult<Vec<(PathBuf, String)>> {
    component
      .runtime_version_files
      .iter()
      .map(|file| {
        let path = self.root.join(file);
        sources::read_runtime_version(&path)
          .map(|version| (file.clone(), version))
          .map_err(|reason| {
            RelverError::Component(ComponentError::VersionSourceUnreadable {
              component: component.name.clone(),
              path: file.clone(),
              reason,
            })
          })
      })
      .collect()
  }

  /// Source file followed by runtime files, relative to the root
  pub fn source_files(&self, component: &ComponentConfig) -> Vec<PathBuf> {
    let mut files = vec![component.version.file.clone()];
    files.extend(component.runtime_version_files.iter().cloned());
    files
  }

  /// Render `version` into the source and every runtime file without writing
  pub fn stage_version(&self, component: &ComponentConfig, version: &Version) -> RelverResult<Vec<StagedWrite>> {
    let rendered = version.to_string();
    let mut staged = vec![StagedWrite {
      file: component.version.file.clone(),
      content: sources::render_version(&self.root, &component.version, &rendered)?,
    }];
    for file in &component.runtime_version_files {
      staged.push(StagedWrite {
        file: file.clone(),
        content: sources::render_runtime_version(&self.root, file, &rendered)?,
      });
    }
    Ok(staged)
  }

  /// Write staged content, each file atomically; returns the written files
  pub fn commit(&self, staged: Vec<StagedWrite>) -> RelverResult<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(staged.len());
    for write in staged {
      write_atomic(&self.root.join(&write.file), write.content.as_bytes())?;
      written.push(write.file);
    }
    Ok(written)
  }

  /// Write `version` to the source and every runtime file; returns changed files
  ///
  /// Every file is rendered before the first one is written.
  pub fn write_version(&self, component: &ComponentConfig, version: &Version) -> RelverResult<Vec<PathBuf>> {
    let staged = self.stage_version(component, version)?;
    let written = self.commit(staged)?;
    debug!(component = %component.name, version = %version, "wrote version sources");
    Ok(written)
  }

  /// Components whose `path_globs` match any of `files`, with the matching files
  ///
  /// Globs follow shell rules where `*` also crosses `/`.
  pub fn match_files(&self, files: &[PathBuf]) -> BTreeMap<String, Vec<String>> {
    let mut matched: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for file in files {
      let file = path_to_git_format(file);
      for (name, patterns) in &self.patterns {
        if patterns.iter().any(|p| p.matches(&file)) {
          matched.entry(name.clone()).or_default().push(file.clone());
        }
      }
    }
    for files in matched.values_mut() {
      files.sort();
      files.dedup();
    }
    matched
  }
}
