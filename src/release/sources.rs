//! Reading and writing version values in the supported source formats
//!
//! TOML sources are edited with `toml_edit` so comments and layout survive a
//! bump. Readers return a plain reason string on failure; the registry wraps
//! it into a component-named error.

use crate::core::config::{VersionSource, VersionSourceKind};
use crate::core::error::{RelverError, RelverResult, ResultExt};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

static SETUP_VERSION_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r#"(version\s*=\s*["'])([^"']+)(["'])"#).expect("valid regex"));

static RUNTIME_VERSION_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r#"(__version__\s*=\s*["'])([^"']+)(["'])"#).expect("valid regex"));

/// Read the raw version string from a source file
pub fn read_version(path: &Path, kind: VersionSourceKind) -> Result<String, String> {
  let content = std::fs::read_to_string(path).map_err(|e| e.to_string())?;

  match kind {
    VersionSourceKind::Cargo => read_toml_version(&content, &[&["package"], &["workspace", "package"]]),
    VersionSourceKind::Pyproject => read_toml_version(&content, &[&["project"]]),
    VersionSourceKind::PackageJson => {
      let value: serde_json::Value = serde_json::from_str(&content).map_err(|e| e.to_string())?;
      value
        .get("version")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| "no string \"version\" field".to_string())
    }
    VersionSourceKind::SetupPy => SETUP_VERSION_RE
      .captures(&content)
      .map(|c| c[2].to_string())
      .ok_or_else(|| "no version= keyword".to_string()),
    VersionSourceKind::Plain => {
      let trimmed = content.trim();
      if trimmed.is_empty() {
        Err("file is empty".to_string())
      } else {
        Ok(trimmed.to_string())
      }
    }
  }
}

/// Read the `__version__` assignment from a runtime file
pub fn read_runtime_version(path: &Path) -> Result<String, String> {
  let content = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
  RUNTIME_VERSION_RE
    .captures(&content)
    .map(|c| c[2].to_string())
    .ok_or_else(|| "no __version__ assignment".to_string())
}

fn read_toml_version(content: &str, tables: &[&[&str]]) -> Result<String, String> {
  let doc: toml_edit::DocumentMut = content.parse().map_err(|e: toml_edit::TomlError| e.to_string())?;

  for table_path in tables {
    let mut item = doc.as_item();
    let mut found = true;
    for key in *table_path {
      match item.get(key) {
        Some(next) => item = next,
        None => {
          found = false;
          break;
        }
      }
    }
    if found && let Some(version) = item.get("version").and_then(|v| v.as_str()) {
      return Ok(version.to_string());
    }
  }

  let expected: Vec<String> = tables.iter().map(|t| format!("[{}].version", t.join("."))).collect();
  Err(format!("missing {}", expected.join(" or ")))
}

/// Render a source file with `version` in place, without writing it
pub fn render_version(root: &Path, source: &VersionSource, version: &str) -> RelverResult<String> {
  let path = root.join(&source.file);
  let content =
    std::fs::read_to_string(&path).with_context(|| format!("Failed to read {}", source.file.display()))?;

  match source.kind {
    VersionSourceKind::Cargo => write_toml_version(&content, &[&["package"], &["workspace", "package"]], version),
    VersionSourceKind::Pyproject => write_toml_version(&content, &[&["project"]], version),
    VersionSourceKind::PackageJson => {
      let mut value: serde_json::Value = serde_json::from_str(&content)?;
      match value.as_object_mut() {
        Some(obj) => {
          obj.insert("version".to_string(), serde_json::Value::String(version.to_string()));
          let mut out = serde_json::to_string_pretty(&value)?;
          out.push('\n');
          Ok(out)
        }
        None => Err("package.json is not an object".to_string()),
      }
    }
    VersionSourceKind::SetupPy => replace_first(&SETUP_VERSION_RE, &content, version),
    VersionSourceKind::Plain => Ok(format!("{}\n", version)),
  }
  .map_err(|reason| RelverError::message(format!("Could not update {}: {}", source.file.display(), reason)))
}

/// Render a runtime file with its `__version__` assignment rewritten
pub fn render_runtime_version(root: &Path, file: &Path, version: &str) -> RelverResult<String> {
  let path = root.join(file);
  let content = std::fs::read_to_string(&path).with_context(|| format!("Failed to read {}", file.display()))?;
  replace_first(&RUNTIME_VERSION_RE, &content, version)
    .map_err(|reason| RelverError::message(format!("Could not update {}: {}", file.display(), reason)))
}

fn replace_first(re: &Regex, content: &str, version: &str) -> Result<String, String> {
  if !re.is_match(content) {
    return Err("version assignment not found".to_string());
  }
  Ok(
    re.replacen(content, 1, |caps: &regex::Captures| {
      format!("{}{}{}", &caps[1], version, &caps[3])
    })
    .into_owned(),
  )
}

/// Walk nested tables by key
fn table_mut<'a>(item: &'a mut toml_edit::Item, path: &[&str]) -> Option<&'a mut toml_edit::Item> {
  path.iter().try_fold(item, |item, key| item.get_mut(*key))
}

fn write_toml_version(content: &str, tables: &[&[&str]], version: &str) -> Result<String, String> {
  let mut doc: toml_edit::DocumentMut = content.parse().map_err(|e: toml_edit::TomlError| e.to_string())?;

  for table_path in tables {
    let Some(slot) = table_mut(doc.as_item_mut(), table_path).and_then(|table| table.get_mut("version")) else {
      continue;
    };
    if !slot.is_str() {
      continue;
    }
    let decor = slot.as_value().map(|v| v.decor().clone());
    let mut new_value = toml_edit::Value::from(version);
    if let Some(decor) = decor {
      *new_value.decor_mut() = decor;
    }
    *slot = toml_edit::Item::Value(new_value);
    return Ok(doc.to_string());
  }

  Err("no literal version field to update".to_string())
}
