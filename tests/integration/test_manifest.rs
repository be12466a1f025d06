//! Integration tests for `relver verify` and `relver manifest`

use crate::helpers::{TestRepo, relver, run_relver, stderr, stdout};
use anyhow::Result;

#[test]
fn test_verify_clean_manifest() -> Result<()> {
  let repo = TestRepo::new()?;

  let output = run_relver(&repo.path, &["verify"])?;
  let out = stdout(&output);
  assert!(out.contains("✅ tentacle 1.2.3"));
  assert!(out.contains("platform-2026.01.05.1 is consistent (3 components)"));
  Ok(())
}

#[test]
fn test_verify_reports_every_issue() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.write(
    "manifest.yaml",
    "platform_release: p\ncomponents:\n  fluxos-agent: 1.3.9\n  inkpass-sdk: 0.1.1\n  tentacle: 1.2.3\n",
  )?;

  let output = relver(&repo.path, &["verify"])?;
  assert_eq!(output.status.code(), Some(3));
  let err = stderr(&output);
  assert!(err.contains("fluxos-agent: manifest=1.3.9, source=1.4.0"));
  assert!(err.contains("inkpass-sdk: manifest=0.1.1, source=0.1.2"));
  Ok(())
}

#[test]
fn test_verify_reports_kind_mismatch() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.write(
    "manifest.yaml",
    "platform_release: p\ncomponents:\n  fluxos-agent: 1.4.0\n  inkpass-sdk: 0.1.2\n  tentacle:\n    version: 1.2.3\n    kind: library\n",
  )?;

  let output = relver(&repo.path, &["verify"])?;
  assert_eq!(output.status.code(), Some(3));
  assert!(stderr(&output).contains("tentacle: manifest kind=library, source=app"));
  Ok(())
}

#[test]
fn test_verify_reports_runtime_drift() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.write("apps/tentacle/tentacle/__init__.py", "__version__ = \"1.2.2\"\n")?;

  let output = relver(&repo.path, &["verify"])?;
  assert_eq!(output.status.code(), Some(3));
  assert!(stderr(&output).contains("tentacle: apps/tentacle/tentacle/__init__.py=1.2.2, source=1.2.3"));
  Ok(())
}

#[test]
fn test_verify_unreadable_source() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.write("apps/tentacle/VERSION", "not-a-version\n")?;

  let output = relver(&repo.path, &["verify"])?;
  assert_eq!(output.status.code(), Some(1));
  assert!(stderr(&output).contains("tentacle: cannot read version"));
  Ok(())
}

#[test]
fn test_manifest_regeneration_fixes_drift() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.write(
    "manifest.yaml",
    "platform_release: p\ncomponents:\n  inkpass-sdk: 0.1.1\n  ghost: 9.9.9\n",
  )?;
  assert_eq!(relver(&repo.path, &["verify"])?.status.code(), Some(3));

  run_relver(
    &repo.path,
    &["manifest", "--platform-release", "platform-2026.02.01.1"],
  )?;
  let manifest = repo.read_file("manifest.yaml")?;
  assert!(manifest.contains("platform_release: platform-2026.02.01.1"));
  assert!(manifest.contains("schema_version: 2"));
  assert!(manifest.contains("version_sources_digest:"));
  assert!(!manifest.contains("ghost"));

  run_relver(&repo.path, &["verify"])?;
  Ok(())
}

#[test]
fn test_manifest_dry_run_leaves_file() -> Result<()> {
  let repo = TestRepo::new()?;
  let before = repo.read_file("manifest.yaml")?;

  let output = run_relver(&repo.path, &["manifest", "--dry-run"])?;
  assert!(stdout(&output).contains("platform_release: platform-"));
  assert_eq!(repo.read_file("manifest.yaml")?, before);
  Ok(())
}
