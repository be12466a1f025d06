//! Integration tests for `relver note`, `relver notes` and `relver archive`

use crate::helpers::{TestRepo, relver, run_relver, stderr, stdout};
use anyhow::Result;

#[test]
fn test_note_creates_file_for_canonical_name() -> Result<()> {
  let repo = TestRepo::new()?;

  let output = run_relver(&repo.path, &["note", "tent", "minor", "-m", "Add inbox filters"])?;
  assert!(stdout(&output).contains("📝 Created change note"));

  let created: Vec<_> = std::fs::read_dir(repo.path.join(".changes"))?
    .filter_map(|e| e.ok())
    .map(|e| e.file_name().to_string_lossy().to_string())
    .filter(|n| !n.starts_with('_'))
    .collect();
  assert_eq!(created.len(), 1);
  assert!(created[0].ends_with("-tentacle-add-inbox-filters.yaml"), "{}", created[0]);

  let body = repo.read_file(&format!(".changes/{}", created[0]))?;
  assert!(body.contains("component: tentacle"));
  assert!(body.contains("bump: minor"));
  Ok(())
}

#[test]
fn test_note_rejects_bad_input() -> Result<()> {
  let repo = TestRepo::new()?;

  let bad_bump = relver(&repo.path, &["note", "tentacle", "huge", "-m", "x"])?;
  assert_eq!(bad_bump.status.code(), Some(3));
  assert!(stderr(&bad_bump).contains("Invalid bump 'huge'"));

  let unknown = relver(&repo.path, &["note", "octopus", "patch", "-m", "x"])?;
  assert_eq!(unknown.status.code(), Some(1));
  Ok(())
}

#[test]
fn test_notes_lists_intents() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.note("20260110090000-tentacle-a.yaml", "tentacle", "patch", "Fix crash")?;
  repo.note("20260111090000-tentacle-b.yaml", "tent", "minor", "Add filters")?;

  let output = run_relver(&repo.path, &["notes"])?;
  let out = stdout(&output);
  assert!(out.contains("📦 tentacle (minor)"));
  assert!(out.contains("2 note(s) for 1 component(s)"));

  let json = run_relver(&repo.path, &["notes", "--json"])?;
  let notes: serde_json::Value = serde_json::from_slice(&json.stdout)?;
  assert_eq!(notes[1]["component"], "tentacle");
  assert_eq!(notes[1]["bump"], "minor");
  Ok(())
}

#[test]
fn test_archive_moves_notes_under_release_id() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.note("20260110090000-tentacle-a.yaml", "tentacle", "patch", "Fix crash")?;

  let output = run_relver(&repo.path, &["archive"])?;
  assert!(stdout(&output).contains("Archived 1 note(s) for platform-2026.01.05.1"));
  assert!(!repo.file_exists(".changes/20260110090000-tentacle-a.yaml"));
  assert!(repo.file_exists(".changes/archive/platform-2026.01.05.1/20260110090000-tentacle-a.yaml"));
  assert!(repo.file_exists(".changes/_template.yaml"));
  Ok(())
}
