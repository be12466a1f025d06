//! Small filesystem and path helpers shared by the release modules

use crate::core::error::{RelverError, RelverResult, ResultExt};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Replace `path` with `contents` in one step
///
/// Writes to a temp file in the destination directory, then renames it over
/// the target, so readers observe either the old or the new document.
pub fn write_atomic(path: &Path, contents: &[u8]) -> RelverResult<()> {
  staged_temp(path, contents)?
    .persist(path)
    .map_err(RelverError::from)
    .with_context(|| format!("Failed to replace {}", path.display()))?;
  Ok(())
}

/// Create `path` with `contents`, refusing to replace an existing file
///
/// The content is fully written to a temp file first, so a failed write never
/// leaves a partial file at `path`.
pub fn write_new_atomic(path: &Path, contents: &[u8]) -> RelverResult<()> {
  staged_temp(path, contents)?
    .persist_noclobber(path)
    .map_err(RelverError::from)
    .with_context(|| format!("Failed to create {}", path.display()))?;
  Ok(())
}

/// Temp file next to `path` holding `contents`, flushed to disk
fn staged_temp(path: &Path, contents: &[u8]) -> RelverResult<NamedTempFile> {
  let dir = match path.parent() {
    Some(parent) if !parent.as_os_str().is_empty() => parent,
    _ => Path::new("."),
  };
  std::fs::create_dir_all(dir).with_context(|| format!("Failed to create directory {}", dir.display()))?;

  let mut tmp = NamedTempFile::new_in(dir).with_context(|| format!("Failed to create temp file in {}", dir.display()))?;
  tmp
    .write_all(contents)
    .with_context(|| format!("Failed to write {}", path.display()))?;
  tmp
    .as_file()
    .sync_all()
    .with_context(|| format!("Failed to flush {}", path.display()))?;
  Ok(tmp)
}

/// Convert a path to Git format (always forward slashes)
pub fn path_to_git_format(path: &Path) -> String {
  #[cfg(target_os = "windows")]
  {
    path.to_string_lossy().replace('\\', "/")
  }
  #[cfg(not(target_os = "windows"))]
  {
    path.to_string_lossy().to_string()
  }
}

/// Lowercase ASCII slug, words joined by '-', at most `max_len` bytes
pub fn slugify(text: &str, max_len: usize) -> String {
  let mut slug = String::new();
  for word in text
    .split(|c: char| !c.is_ascii_alphanumeric())
    .filter(|w| !w.is_empty())
  {
    let word = word.to_ascii_lowercase();
    let extra = if slug.is_empty() { word.len() } else { word.len() + 1 };
    if slug.len() + extra > max_len {
      break;
    }
    if !slug.is_empty() {
      slug.push('-');
    }
    slug.push_str(&word);
  }
  slug
}
