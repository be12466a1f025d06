//! System git backend for the tag namespace and change detection
//!
//! Uses the git CLI with an isolated environment. `git tag` refuses to
//! replace an existing ref, which is the compare-and-create the tag
//! authority relies on.

use crate::core::error::{GitError, RelverError, RelverResult, ResultExt};
use crate::release::tags::{TagCreate, TagStore};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Git backend using system git
pub struct SystemGit {
  /// Repository working directory
  pub(crate) repo_path: PathBuf,

  /// Working tree root
  pub(crate) work_tree: PathBuf,
}

impl SystemGit {
  /// Open a git repository
  pub fn open(path: &Path) -> RelverResult<Self> {
    let output = Command::new("git")
      .arg("-C")
      .arg(path)
      .args(["rev-parse", "--show-toplevel"])
      .output()
      .context("Failed to execute git rev-parse")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      if stderr.contains("not a git repository") {
        return Err(RelverError::Git(GitError::RepoNotFound {
          path: path.to_path_buf(),
        }));
      }
      return Err(RelverError::message(format!("Failed to open git repository: {}", stderr)));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let work_tree = stdout.trim();

    Ok(Self {
      repo_path: path.to_path_buf(),
      work_tree: PathBuf::from(work_tree),
    })
  }

  pub fn work_tree(&self) -> &Path {
    &self.work_tree
  }

  /// Get HEAD commit SHA
  pub fn head_commit(&self) -> RelverResult<String> {
    let output = self
      .git_cmd()
      .args(["rev-parse", "HEAD"])
      .output()
      .context("Failed to get HEAD commit")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(RelverError::Git(GitError::CommandFailed {
        command: "git rev-parse HEAD".to_string(),
        stderr: stderr.to_string(),
      }));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  /// Files that differ between two revisions, relative to the work tree
  pub fn changed_files(&self, base: &str, head: &str) -> RelverResult<Vec<PathBuf>> {
    for rev in [base, head] {
      if rev.trim().is_empty() || rev.starts_with('-') {
        return Err(RelverError::message(format!("Invalid revision '{}'", rev)));
      }
    }

    let output = self
      .git_cmd()
      .args(["diff", "--name-only", base, head, "--"])
      .output()
      .context("Failed to execute git diff")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(RelverError::Git(GitError::CommandFailed {
        command: format!("git diff --name-only {} {}", base, head),
        stderr: stderr.to_string(),
      }));
    }

    let files: Vec<PathBuf> = String::from_utf8_lossy(&output.stdout)
      .lines()
      .map(str::trim)
      .filter(|line| !line.is_empty())
      .map(PathBuf::from)
      .collect();
    debug!(base, head, files = files.len(), "changed files");
    Ok(files)
  }

  /// Create a safe git command with isolated environment
  ///
  /// - Sets working directory to repo path
  /// - Clears environment variables
  /// - Whitelists only PATH and HOME
  /// - Adds safe configuration overrides
  pub(crate) fn git_cmd(&self) -> Command {
    let mut cmd = Command::new("git");

    cmd.arg("-C").arg(&self.repo_path);

    // Isolated environment (don't trust global config)
    cmd.env_clear();
    if let Ok(path) = std::env::var("PATH") {
      cmd.env("PATH", path);
    }
    if let Ok(home) = std::env::var("HOME") {
      cmd.env("HOME", home);
    }

    cmd.arg("-c").arg("protocol.version=2");
    cmd.arg("-c").arg("core.quotePath=false");
    // Signing needs an agent the CI job may not have
    cmd.arg("-c").arg("tag.gpgSign=false");

    cmd
  }
}

impl TagStore for SystemGit {
  fn tag_exists(&self, name: &str) -> RelverResult<bool> {
    let refname = format!("refs/tags/{}", name);
    let output = self
      .git_cmd()
      .args(["rev-parse", "--verify", "--quiet", &refname])
      .output()
      .context("Failed to execute git rev-parse")?;

    if output.status.success() {
      return Ok(true);
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    if stderr.trim().is_empty() {
      Ok(false)
    } else {
      Err(RelverError::Git(GitError::CommandFailed {
        command: format!("git rev-parse --verify {}", refname),
        stderr: stderr.to_string(),
      }))
    }
  }

  fn create_tag(&mut self, name: &str, message: &str) -> RelverResult<TagCreate> {
    let output = self
      .git_cmd()
      .args(["tag", "-a", name, "-m", message])
      .output()
      .context("Failed to execute git tag")?;

    if output.status.success() {
      debug!(tag = name, "git tag created");
      return Ok(TagCreate::Created);
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    if stderr.contains("already exists") {
      return Ok(TagCreate::AlreadyExists);
    }
    Err(RelverError::Git(GitError::CommandFailed {
      command: format!("git tag -a {}", name),
      stderr: stderr.to_string(),
    }))
  }

  fn push_tags(&mut self, remote: &str, names: &[String]) -> RelverResult<()> {
    println!("   Pushing {} tag(s) to '{}'...", names.len(), remote);

    let refspecs: Vec<String> = names.iter().map(|n| format!("refs/tags/{}", n)).collect();
    let output = self
      .git_cmd()
      .arg("push")
      .arg(remote)
      .args(&refspecs)
      .output()
      .context("Failed to push")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(RelverError::Git(GitError::PushFailed {
        remote: remote.to_string(),
        tags: names.to_vec(),
        reason: stderr.to_string(),
      }));
    }

    println!("   ✅ Pushed tags to {}", remote);
    Ok(())
  }
}
