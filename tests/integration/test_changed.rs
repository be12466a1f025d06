//! Integration tests for `relver changed` and `relver plan --changed`

use crate::helpers::{TestRepo, git, relver, run_relver, stderr, stdout};
use anyhow::Result;

fn head(repo: &TestRepo) -> Result<String> {
  let output = git(&repo.path, &["rev-parse", "HEAD"])?;
  Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

#[test]
fn test_changed_lists_components_matching_path_globs() -> Result<()> {
  let repo = TestRepo::new()?;
  let base = head(&repo)?;
  repo.write("apps/tentacle/tentacle/inbox.py", "def filters():\n    return []\n")?;
  repo.write("docs/README.md", "notes\n")?;
  repo.commit("Add inbox filters")?;

  let output = run_relver(&repo.path, &["changed", "--base", &base, "--json"])?;
  let set: serde_json::Value = serde_json::from_str(&stdout(&output))?;

  assert_eq!(set["components"], serde_json::json!(["tentacle"]));
  assert_eq!(
    set["files"],
    serde_json::json!(["apps/tentacle/tentacle/inbox.py", "docs/README.md"])
  );
  assert_eq!(set["base"], serde_json::json!(base));
  Ok(())
}

#[test]
fn test_plan_only_includes_changed_components() -> Result<()> {
  let repo = TestRepo::new()?;
  let base = head(&repo)?;
  repo.write("apps/tentacle/tentacle/inbox.py", "FILTERS = []\n")?;
  repo.commit("Add inbox filters")?;

  let output = run_relver(
    &repo.path,
    &["changed", "--base", &base, "--output", "changed.json"],
  )?;
  assert!(stdout(&output).contains("📦 tentacle (1 file(s))"));
  assert!(repo.file_exists("changed.json"));

  repo.note("20260110090000-tentacle-a.yaml", "tentacle", "minor", "Add filters")?;
  repo.note("20260110100000-inkpass-sdk-b.yaml", "inkpass-sdk", "patch", "Fix refresh")?;

  let output = run_relver(&repo.path, &["plan", "--changed", "changed.json"])?;
  assert!(stdout(&output).contains("Skipping 1 component(s) not in changed.json"));

  let plan: serde_json::Value = serde_json::from_str(&repo.read_file("release-plan.json")?)?;
  let names: Vec<&str> = plan["components"]
    .as_array()
    .unwrap()
    .iter()
    .map(|c| c["name"].as_str().unwrap())
    .collect();
  assert_eq!(names, vec!["tentacle"]);
  Ok(())
}

#[test]
fn test_changed_rejects_unknown_revision() -> Result<()> {
  let repo = TestRepo::new()?;

  let output = relver(&repo.path, &["changed", "--base", "no-such-branch"])?;
  assert_eq!(output.status.code(), Some(2));
  assert!(stderr(&output).contains("git diff --name-only no-such-branch HEAD"));
  Ok(())
}
