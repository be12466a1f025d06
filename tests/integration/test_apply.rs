//! Integration tests for `relver apply`

use crate::helpers::{TestRepo, relver, run_relver, stderr, stdout};
use anyhow::Result;

#[test]
fn test_apply_writes_sources_and_manifest() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.note("20260110090000-tentacle-a.yaml", "tentacle", "minor", "Add filters")?;
  repo.note("20260110100000-inkpass-sdk-b.yaml", "inkpass-sdk", "patch", "Fix refresh")?;
  run_relver(&repo.path, &["plan"])?;

  let output = run_relver(&repo.path, &["apply"])?;
  assert!(stdout(&output).contains("✅ Applied 2 version bump(s)"));

  assert_eq!(repo.read_file("apps/tentacle/VERSION")?, "1.3.0\n");
  assert!(
    repo
      .read_file("apps/tentacle/tentacle/__init__.py")?
      .contains("__version__ = \"1.3.0\"")
  );
  let pyproject = repo.read_file("libs/inkpass/pyproject.toml")?;
  assert!(pyproject.contains("version = \"0.1.3\" # keep in sync"), "{}", pyproject);
  assert!(repo.read_file("apps/fluxos-agent/package.json")?.contains("\"version\": \"1.4.0\""));

  let manifest = repo.read_file("manifest.yaml")?;
  assert!(!manifest.contains("platform-2026.01.05.1"));
  run_relver(&repo.path, &["verify"])?;
  Ok(())
}

#[test]
fn test_apply_twice_is_stale() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.note("20260110090000-tentacle-a.yaml", "tentacle", "patch", "Fix")?;
  run_relver(&repo.path, &["plan"])?;
  run_relver(&repo.path, &["apply"])?;

  let again = relver(&repo.path, &["apply"])?;
  assert_eq!(again.status.code(), Some(3));
  assert!(stderr(&again).contains("tentacle: plan expects current version 1.2.3, source has 1.2.4"));
  assert_eq!(repo.read_file("apps/tentacle/VERSION")?, "1.2.4\n");
  Ok(())
}

#[test]
fn test_apply_dry_run_changes_nothing() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.note("20260110090000-fluxos-agent-a.yaml", "fluxos-agent", "major", "Drop v1 API")?;
  run_relver(&repo.path, &["plan"])?;
  let manifest = repo.read_file("manifest.yaml")?;

  let output = run_relver(&repo.path, &["apply", "--dry-run"])?;
  assert!(stdout(&output).contains("fluxos-agent: 1.4.0 → 2.0.0"));
  assert!(repo.read_file("apps/fluxos-agent/package.json")?.contains("\"version\": \"1.4.0\""));
  assert_eq!(repo.read_file("manifest.yaml")?, manifest);
  Ok(())
}

#[test]
fn test_apply_rejects_edited_plan() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.write(
    "release-plan.json",
    r#"{"components":[{"name":"tentacle","current_version":"1.2.3","bump":"giant","next_version":"9.0.0"}]}"#,
  )?;

  let output = relver(&repo.path, &["apply"])?;
  assert_eq!(output.status.code(), Some(3));
  assert!(stderr(&output).contains("Invalid bump 'giant'"));
  assert_eq!(repo.read_file("apps/tentacle/VERSION")?, "1.2.3\n");
  Ok(())
}

#[test]
fn test_apply_writes_nothing_when_a_runtime_file_lost_its_version() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.note("20260110090000-fluxos-agent-a.yaml", "fluxos-agent", "minor", "Add retries")?;
  repo.note("20260110100000-tentacle-b.yaml", "tentacle", "minor", "Add filters")?;
  run_relver(&repo.path, &["plan"])?;
  repo.write("apps/tentacle/tentacle/__init__.py", "VERSION = \"1.2.3\"\n")?;
  let manifest = repo.read_file("manifest.yaml")?;

  let output = relver(&repo.path, &["apply"])?;
  assert_eq!(output.status.code(), Some(1));
  assert!(stderr(&output).contains("apps/tentacle/tentacle/__init__.py"));

  assert!(repo.read_file("apps/fluxos-agent/package.json")?.contains("\"version\": \"1.4.0\""));
  assert_eq!(repo.read_file("apps/tentacle/VERSION")?, "1.2.3\n");
  assert_eq!(repo.read_file("manifest.yaml")?, manifest);
  Ok(())
}
