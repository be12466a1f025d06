//! Integration tests for `relver tag`

use crate::helpers::{TestRepo, git, relver, run_relver, stderr, stdout};
use anyhow::Result;
use tempfile::TempDir;

/// Notes -> plan -> apply -> merge, ready for tagging
fn merged_release(repo: &TestRepo) -> Result<()> {
  repo.note("20260110090000-fluxos-agent-a.yaml", "fluxos-agent", "major", "Drop v1 API")?;
  repo.note("20260110100000-tentacle-b.yaml", "tentacle", "minor", "Add filters")?;
  run_relver(&repo.path, &["plan"])?;
  run_relver(&repo.path, &["apply"])?;
  repo.commit("Release fluxos-agent 2.0.0, tentacle 1.3.0")?;
  Ok(())
}

fn platform_tags(tags: &[String]) -> Vec<&String> {
  tags.iter().filter(|t| t.starts_with("platform-")).collect()
}

#[test]
fn test_tag_creates_component_and_platform_tags() -> Result<()> {
  let repo = TestRepo::new()?;
  merged_release(&repo)?;

  let output = run_relver(&repo.path, &["tag"])?;
  assert!(stdout(&output).contains("✅ Created 3 tag(s)"));

  let tags = repo.tags()?;
  assert!(tags.contains(&"fluxos-agent@2.0.0".to_string()));
  assert!(tags.contains(&"tentacle@1.3.0".to_string()));
  assert!(!tags.iter().any(|t| t.starts_with("inkpass-sdk@")));
  assert_eq!(platform_tags(&tags).len(), 1);
  Ok(())
}

#[test]
fn test_existing_tag_fails_and_creates_nothing() -> Result<()> {
  let repo = TestRepo::new()?;
  let old_head = git(&repo.path, &["rev-parse", "HEAD"])?;
  let old_head = String::from_utf8_lossy(&old_head.stdout).trim().to_string();
  git(&repo.path, &["tag", "-a", "fluxos-agent@2.0.0", "-m", "earlier release"])?;
  merged_release(&repo)?;

  let output = relver(&repo.path, &["tag"])?;
  assert_eq!(output.status.code(), Some(3));
  let err = stderr(&output);
  assert!(err.contains("Tag fluxos-agent@2.0.0 already exists"));
  assert!(err.contains("not attempted: tentacle@1.3.0"));

  let tags = repo.tags()?;
  assert_eq!(tags, vec!["fluxos-agent@2.0.0".to_string()]);
  assert_eq!(repo.tag_target("fluxos-agent@2.0.0")?, old_head);
  Ok(())
}

#[test]
fn test_tag_twice_never_moves_tags() -> Result<()> {
  let repo = TestRepo::new()?;
  merged_release(&repo)?;
  run_relver(&repo.path, &["tag"])?;
  let target = repo.tag_target("tentacle@1.3.0")?;

  repo.write("README.md", "later commit\n")?;
  repo.commit("Later work")?;

  let output = relver(&repo.path, &["tag"])?;
  assert_eq!(output.status.code(), Some(3));
  assert_eq!(repo.tag_target("tentacle@1.3.0")?, target);
  Ok(())
}

#[test]
fn test_tag_requires_merged_manifest() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.note("20260110090000-tentacle-b.yaml", "tentacle", "minor", "Add filters")?;
  run_relver(&repo.path, &["plan"])?;

  let output = relver(&repo.path, &["tag"])?;
  assert_eq!(output.status.code(), Some(3));
  assert!(stderr(&output).contains("tentacle: manifest=1.2.3, source=1.3.0"));
  assert!(repo.tags()?.is_empty());
  Ok(())
}

#[test]
fn test_tag_dry_run() -> Result<()> {
  let repo = TestRepo::new()?;
  merged_release(&repo)?;

  let output = run_relver(&repo.path, &["tag", "--dry-run"])?;
  let out = stdout(&output);
  assert!(out.contains("fluxos-agent@2.0.0"));
  assert!(out.contains("platform-"));
  assert!(repo.tags()?.is_empty());
  Ok(())
}

#[test]
fn test_tag_push_to_remote() -> Result<()> {
  let repo = TestRepo::new()?;
  let remote = TempDir::new()?;
  git(remote.path(), &["init", "--bare"])?;
  git(
    &repo.path,
    &["remote", "add", "origin", &remote.path().to_string_lossy()],
  )?;
  merged_release(&repo)?;

  run_relver(&repo.path, &["tag", "--push"])?;

  let remote_tags = git(remote.path(), &["tag", "--list"])?;
  let remote_tags = String::from_utf8_lossy(&remote_tags.stdout);
  assert!(remote_tags.contains("fluxos-agent@2.0.0"));
  assert!(remote_tags.contains("tentacle@1.3.0"));
  Ok(())
}

#[test]
fn test_push_failure_keeps_local_tags() -> Result<()> {
  let repo = TestRepo::new()?;
  merged_release(&repo)?;

  let output = relver(&repo.path, &["tag", "--push", "--remote", "nowhere"])?;
  assert_eq!(output.status.code(), Some(2));
  assert!(stderr(&output).contains("to nowhere failed"));
  assert_eq!(repo.tags()?.len(), 3);
  Ok(())
}
