//! Release context - build once, pass everywhere
//!
//! main.rs resolves the repository root and loads the configuration and
//! component registry once; every command takes `&ReleaseContext`.

use crate::core::config::RelverConfig;
use crate::core::error::RelverResult;
use crate::core::vcs::SystemGit;
use crate::release::notes::ChangeNoteStore;
use crate::release::registry::ComponentRegistry;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Shared state for one relver invocation
pub struct ReleaseContext {
  /// Repository root (git top-level when inside a repository)
  pub root: PathBuf,

  pub config: RelverConfig,

  pub registry: ComponentRegistry,
}

impl ReleaseContext {
  /// Build the context from the working directory
  ///
  /// The repository root is the git top-level when `cwd` is inside a
  /// repository, otherwise `cwd` itself.
  pub fn build(cwd: &Path, explicit_config: Option<&Path>) -> RelverResult<Self> {
    let root = match SystemGit::open(cwd) {
      Ok(git) => git.work_tree().to_path_buf(),
      Err(e) => {
        debug!(error = %e, "not in a git repository, using working directory as root");
        cwd.to_path_buf()
      }
    };

    // Relative --config paths are taken from where the user ran the command
    let explicit = explicit_config.map(|p| if p.is_absolute() { p.to_path_buf() } else { cwd.join(p) });
    let config_path = RelverConfig::locate(&root, explicit.as_deref())?;
    let config = RelverConfig::load(&config_path)?;
    let registry = ComponentRegistry::from_config(&root, &config, &config_path)?;
    if registry.is_empty() {
      warn!(path = %config_path.display(), "no components declared");
    }

    Ok(Self {
      root,
      config,
      registry,
    })
  }

  /// Resolve a configured or overriding path against the repository root
  pub fn path(&self, path: &Path) -> PathBuf {
    if path.is_absolute() {
      path.to_path_buf()
    } else {
      self.root.join(path)
    }
  }

  pub fn manifest_path(&self, override_path: Option<&Path>) -> PathBuf {
    self.path(override_path.unwrap_or(&self.config.release.manifest))
  }

  pub fn plan_path(&self, override_path: Option<&Path>) -> PathBuf {
    self.path(override_path.unwrap_or(&self.config.release.plan))
  }

  pub fn notes(&self) -> ChangeNoteStore {
    ChangeNoteStore::new(self.path(&self.config.release.notes_dir))
  }

  pub fn archive_root(&self) -> PathBuf {
    self.path(&self.config.release.archive_dir)
  }

  /// Open the repository; required for tagging
  pub fn git(&self) -> RelverResult<SystemGit> {
    SystemGit::open(&self.root)
  }

  /// Path relative to the root for display
  pub fn display<'a>(&self, path: &'a Path) -> std::borrow::Cow<'a, str> {
    path.strip_prefix(&self.root).unwrap_or(path).to_string_lossy()
  }
}
