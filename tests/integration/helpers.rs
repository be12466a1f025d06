//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// relver.toml shared by most tests
pub const CONFIG: &str = r#"
[[components]]
name = "tentacle"
aliases = ["tent"]
kind = "app"
path_globs = ["apps/tentacle/*"]
version = { file = "apps/tentacle/VERSION", kind = "plain" }
runtime_version_files = ["apps/tentacle/tentacle/__init__.py"]

[[components]]
name = "inkpass-sdk"
aliases = ["inkpass"]
kind = "library"
path_globs = ["libs/inkpass/*"]
version = { file = "libs/inkpass/pyproject.toml", kind = "pyproject" }

[[components]]
name = "fluxos-agent"
path_globs = ["apps/fluxos-agent/*"]
version = { file = "apps/fluxos-agent/package.json", kind = "package-json" }
"#;

/// A git repository with three versioned components
pub struct TestRepo {
  _root: TempDir,
  pub path: PathBuf,
}

impl TestRepo {
  /// Repository with config, version sources, a matching manifest and an
  /// empty notes directory, all committed
  pub fn new() -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().to_path_buf();

    git(&path, &["init", "--initial-branch=main"])?;
    git(&path, &["config", "user.name", "Test User"])?;
    git(&path, &["config", "user.email", "test@example.com"])?;

    let repo = Self { _root: root, path };
    repo.write("relver.toml", CONFIG)?;
    repo.write("apps/tentacle/VERSION", "1.2.3\n")?;
    repo.write("apps/tentacle/tentacle/__init__.py", "__version__ = \"1.2.3\"\n")?;
    repo.write(
      "libs/inkpass/pyproject.toml",
      "[project]\nname = \"inkpass-sdk\"\nversion = \"0.1.2\" # keep in sync\n",
    )?;
    repo.write(
      "apps/fluxos-agent/package.json",
      "{\n  \"name\": \"fluxos-agent\",\n  \"version\": \"1.4.0\"\n}\n",
    )?;
    repo.write(
      "manifest.yaml",
      "platform_release: platform-2026.01.05.1\ncomponents:\n  fluxos-agent: 1.4.0\n  inkpass-sdk: 0.1.2\n  tentacle: 1.2.3\n",
    )?;
    repo.write(".changes/_template.yaml", "component: \nbump: patch\nsummary: \n")?;
    repo.commit("Initial release layout")?;

    Ok(repo)
  }

  /// Write a file relative to the repository root
  pub fn write(&self, rel: &str, content: &str) -> Result<()> {
    let file = self.path.join(rel);
    if let Some(parent) = file.parent() {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::write(file, content)?;
    Ok(())
  }

  /// Add a pending change note
  pub fn note(&self, file: &str, component: &str, bump: &str, summary: &str) -> Result<()> {
    self.write(
      &format!(".changes/{}", file),
      &format!("component: {}\nbump: {}\nsummary: {}\n", component, bump, summary),
    )
  }

  /// Commit current changes
  pub fn commit(&self, message: &str) -> Result<String> {
    git(&self.path, &["add", "."])?;
    git(&self.path, &["commit", "-m", message])?;

    let output = git(&self.path, &["rev-parse", "HEAD"])?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  /// Tag names in the repository
  pub fn tags(&self) -> Result<Vec<String>> {
    let output = git(&self.path, &["tag", "--list"])?;
    Ok(
      String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(String::from)
        .collect(),
    )
  }

  /// Commit a tag points at
  pub fn tag_target(&self, tag: &str) -> Result<String> {
    let output = git(&self.path, &["rev-parse", &format!("{}^{{commit}}", tag)])?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  pub fn file_exists(&self, path: &str) -> bool {
    self.path.join(path).exists()
  }

  pub fn read_file(&self, path: &str) -> Result<String> {
    Ok(std::fs::read_to_string(self.path.join(path))?)
  }
}

/// Run git command in a directory
pub fn git(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = Command::new("git")
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run git command")?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    anyhow::bail!("Git command failed: git {}\n{}", args.join(" "), stderr);
  }

  Ok(output)
}

/// Run relver and return its output whatever the exit status
pub fn relver(cwd: &Path, args: &[&str]) -> Result<Output> {
  Command::new(env!("CARGO_BIN_EXE_relver"))
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run relver")
}

/// Run relver, failing the test on a non-zero exit
pub fn run_relver(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = relver(cwd, args)?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    anyhow::bail!(
      "relver command failed: relver {}\nstdout: {}\nstderr: {}",
      args.join(" "),
      stdout,
      stderr
    );
  }

  Ok(output)
}

pub fn stdout(output: &Output) -> String {
  String::from_utf8_lossy(&output.stdout).to_string()
}

pub fn stderr(output: &Output) -> String {
  String::from_utf8_lossy(&output.stderr).to_string()
}
