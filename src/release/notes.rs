//! Pending change notes: loading, validation and severity aggregation
//!
//! One YAML record per file:
//!
//! ```yaml
//! component: tentacle
//! bump: minor
//! summary: Add inbox filters
//! ```
//!
//! File names start with a UTC timestamp, so sorting by name is sorting by
//! creation time. Names beginning with `_` (templates) are ignored.

use crate::core::error::{RelverError, RelverResult, ResultExt};
use crate::release::bump::{Bump, BumpIntent};
use crate::release::registry::ComponentRegistry;
use crate::utils::{slugify, write_new_atomic};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// One validated pending release intent
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeNote {
  /// File name; doubles as the creation-order sort key
  pub file: String,
  /// Canonical component name (aliases already resolved)
  pub component: String,
  pub bump: Bump,
  pub summary: String,
}

impl ChangeNote {
  /// Reason line recorded in the release plan
  pub fn reason(&self) -> String {
    format!("{}: {}", self.file, self.summary)
  }
}

#[derive(Serialize)]
struct NoteRecord<'a> {
  component: &'a str,
  bump: Bump,
  summary: &'a str,
}

/// Reader and writer for the pending notes directory
pub struct ChangeNoteStore {
  dir: PathBuf,
}

impl ChangeNoteStore {
  pub fn new(dir: impl Into<PathBuf>) -> Self {
    Self { dir: dir.into() }
  }

  pub fn dir(&self) -> &Path {
    &self.dir
  }

  /// Pending note files in name order
  pub fn pending_files(&self) -> RelverResult<Vec<PathBuf>> {
    if !self.dir.is_dir() {
      return Err(RelverError::with_help(
        format!("Change notes directory does not exist: {}", self.dir.display()),
        "Create it, or point release.notes_dir in relver.toml at the right place.",
      ));
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(&self.dir).with_context(|| format!("Failed to list {}", self.dir.display()))? {
      let path = entry?.path();
      if !path.is_file() {
        continue;
      }
      let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        continue;
      };
      let is_yaml = matches!(path.extension().and_then(|e| e.to_str()), Some("yaml" | "yml"));
      if is_yaml && !name.starts_with('_') {
        files.push(path);
      }
    }
    files.sort();
    Ok(files)
  }

  /// Load and validate every pending note
  ///
  /// Fails on the first malformed note or unknown component; nothing is
  /// partially returned.
  pub fn load(&self, registry: &ComponentRegistry) -> RelverResult<Vec<ChangeNote>> {
    let files = self.pending_files()?;
    let mut notes = Vec::with_capacity(files.len());
    for path in &files {
      notes.push(parse_note(path, registry)?);
    }
    debug!(dir = %self.dir.display(), notes = notes.len(), "loaded change notes");
    Ok(notes)
  }

  /// Write a new note; returns its path
  pub fn create(
    &self,
    registry: &ComponentRegistry,
    component: &str,
    bump: Bump,
    summary: &str,
    now: DateTime<Utc>,
  ) -> RelverResult<PathBuf> {
    let component = registry.resolve(component)?;
    let summary = summary.trim();
    if summary.is_empty() {
      return Err(RelverError::message("Change note summary cannot be empty"));
    }

    let mut slug = slugify(summary, 40);
    if slug.is_empty() {
      slug = "change".to_string();
    }
    let file_name = format!("{}-{}-{}.yaml", now.format("%Y%m%d%H%M%S"), component.name, slug);
    let path = self.dir.join(file_name);

    let body = serde_yaml::to_string(&NoteRecord {
      component: &component.name,
      bump,
      summary,
    })?;

    write_new_atomic(&path, body.as_bytes())?;

    info!(path = %path.display(), component = %component.name, %bump, "created change note");
    Ok(path)
  }

  /// Move every pending note to `<archive_root>/<platform_release>/`
  pub fn archive(&self, archive_root: &Path, platform_release: &str) -> RelverResult<Vec<PathBuf>> {
    let release = platform_release.trim();
    if release.is_empty() || release.contains(['/', '\\']) || release == "." || release == ".." {
      return Err(RelverError::message(format!(
        "Invalid platform release identifier for archiving: '{}'",
        platform_release
      )));
    }

    let files = self.pending_files()?;
    let dest_dir = archive_root.join(release);

    // Refuse before moving anything so a clash never leaves a half-archived set.
    for path in &files {
      if let Some(name) = path.file_name()
        && dest_dir.join(name).exists()
      {
        return Err(RelverError::message(format!(
          "Archived note already exists: {}",
          dest_dir.join(name).display()
        )));
      }
    }

    std::fs::create_dir_all(&dest_dir).with_context(|| format!("Failed to create {}", dest_dir.display()))?;
    let mut archived = Vec::with_capacity(files.len());
    for path in files {
      let Some(name) = path.file_name() else {
        continue;
      };
      let dest = dest_dir.join(name);
      std::fs::rename(&path, &dest)
        .with_context(|| format!("Failed to move {} to {}", path.display(), dest.display()))?;
      archived.push(dest);
    }

    info!(count = archived.len(), dest = %dest_dir.display(), "archived change notes");
    Ok(archived)
  }
}

/// Group notes per canonical component, preserving note order
pub fn group_by_component(notes: &[ChangeNote]) -> BTreeMap<String, Vec<&ChangeNote>> {
  let mut grouped: BTreeMap<String, Vec<&ChangeNote>> = BTreeMap::new();
  for note in notes {
    grouped.entry(note.component.clone()).or_default().push(note);
  }
  grouped
}

/// Reduce notes to one intent per component carrying the highest severity
pub fn aggregate(notes: &[ChangeNote]) -> BTreeMap<String, BumpIntent> {
  group_by_component(notes)
    .into_iter()
    .filter_map(|(component, notes)| {
      let severity = notes.iter().map(|n| n.bump).max()?;
      Some((
        component.clone(),
        BumpIntent {
          component,
          severity,
          reasons: notes.iter().map(|n| n.reason()).collect(),
        },
      ))
    })
    .collect()
}

fn parse_note(path: &Path, registry: &ComponentRegistry) -> RelverResult<ChangeNote> {
  let file = path
    .file_name()
    .map(|n| n.to_string_lossy().to_string())
    .unwrap_or_default();
  let content = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
  let value: serde_yaml::Value =
    serde_yaml::from_str(&content).map_err(|e| RelverError::schema(path, e.to_string()))?;

  let Some(mapping) = value.as_mapping() else {
    return Err(RelverError::schema(path, "note must be a YAML mapping"));
  };

  let field = |name: &str| -> RelverResult<String> {
    match mapping.get(name) {
      None | Some(serde_yaml::Value::Null) => {
        Err(RelverError::schema(path, format!("missing required field: {}", name)))
      }
      Some(serde_yaml::Value::String(s)) => Ok(s.trim().to_string()),
      Some(serde_yaml::Value::Number(n)) => Ok(n.to_string()),
      Some(_) => Err(RelverError::schema(path, format!("field '{}' must be a string", name))),
    }
  };

  let component = field("component")?;
  let bump_raw = field("bump")?;
  let summary = field("summary")?;

  let bump: Bump = bump_raw
    .parse()
    .map_err(|_| RelverError::schema(path, format!("invalid bump '{}' (expected patch, minor or major)", bump_raw)))?;
  if summary.is_empty() {
    return Err(RelverError::schema(path, "summary cannot be empty"));
  }

  let canonical = registry.resolve_from(&component, &file)?;

  Ok(ChangeNote {
    file,
    component: canonical.name.clone(),
    bump,
    summary,
  })
}
