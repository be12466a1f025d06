//! Integration tests for `relver bump`

use crate::helpers::{TestRepo, relver, run_relver, stderr, stdout};
use anyhow::Result;

#[test]
fn test_bump_writes_sources_and_manifest() -> Result<()> {
  let repo = TestRepo::new()?;

  let output = run_relver(&repo.path, &["bump", "tent", "minor"])?;
  assert!(stdout(&output).contains("✅ Bumped tentacle to 1.3.0"));

  assert_eq!(repo.read_file("apps/tentacle/VERSION")?, "1.3.0\n");
  assert!(
    repo
      .read_file("apps/tentacle/tentacle/__init__.py")?
      .contains("__version__ = \"1.3.0\"")
  );
  run_relver(&repo.path, &["verify"])?;
  Ok(())
}

#[test]
fn test_bump_dry_run_and_no_manifest() -> Result<()> {
  let repo = TestRepo::new()?;
  let manifest = repo.read_file("manifest.yaml")?;

  let output = run_relver(&repo.path, &["bump", "fluxos-agent", "major", "--dry-run"])?;
  assert!(stdout(&output).contains("fluxos-agent would bump 1.4.0 → 2.0.0"));
  assert!(repo.read_file("apps/fluxos-agent/package.json")?.contains("\"version\": \"1.4.0\""));

  run_relver(&repo.path, &["bump", "inkpass", "patch", "--no-manifest"])?;
  assert!(repo.read_file("libs/inkpass/pyproject.toml")?.contains("version = \"0.1.3\" # keep in sync"));
  assert_eq!(repo.read_file("manifest.yaml")?, manifest);
  Ok(())
}

#[test]
fn test_bump_rejects_bad_input() -> Result<()> {
  let repo = TestRepo::new()?;

  let bad_bump = relver(&repo.path, &["bump", "tentacle", "huge"])?;
  assert_eq!(bad_bump.status.code(), Some(3));
  assert!(stderr(&bad_bump).contains("Invalid bump 'huge'"));

  let unknown = relver(&repo.path, &["bump", "octopus", "patch"])?;
  assert_eq!(unknown.status.code(), Some(1));
  assert!(stderr(&unknown).contains("Unknown component 'octopus'"));

  assert_eq!(repo.read_file("apps/tentacle/VERSION")?, "1.2.3\n");
  Ok(())
}
