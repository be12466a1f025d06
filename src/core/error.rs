//! Error types for relver with contextual messages and exit codes
//!
//! Every failure category maps to one exit code. Validation failures that
//! carry several issues (coverage, drift) render one line per component so CI
//! logs stay greppable.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for relver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (config, schema, unknown component)
  User = 1,
  /// System error (git, push, I/O)
  System = 2,
  /// Validation failure (drift, coverage, tag conflict)
  Validation = 3,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for relver
#[derive(Debug)]
pub enum RelverError {
  /// Configuration and document schema errors
  Config(ConfigError),

  /// Component lookup and version-source errors
  Component(ComponentError),

  /// Release invariant violations
  Validation(ValidationError),

  /// Git operation errors
  Git(GitError),

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl RelverError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    RelverError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    RelverError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Shorthand for a schema error on a document
  pub fn schema(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
    RelverError::Config(ConfigError::Schema {
      path: path.into(),
      reason: reason.into(),
    })
  }

  /// Add context to an existing error
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      RelverError::Message { message, context, help } => RelverError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      RelverError::Io(e) => RelverError::Io(io::Error::new(e.kind(), format!("{}: {}", ctx_str, e))),
      _ => self,
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      RelverError::Config(_) => ExitCode::User,
      RelverError::Component(_) => ExitCode::User,
      RelverError::Validation(_) => ExitCode::Validation,
      RelverError::Git(_) => ExitCode::System,
      RelverError::Io(_) => ExitCode::System,
      RelverError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      RelverError::Config(e) => e.help_message(),
      RelverError::Component(e) => e.help_message(),
      RelverError::Validation(e) => e.help_message(),
      RelverError::Git(e) => e.help_message(),
      RelverError::Message { help, .. } => help.clone(),
      _ => None,
    }
  }
}

impl fmt::Display for RelverError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      RelverError::Config(e) => write!(f, "{}", e),
      RelverError::Component(e) => write!(f, "{}", e),
      RelverError::Validation(e) => write!(f, "{}", e),
      RelverError::Git(e) => write!(f, "{}", e),
      RelverError::Io(e) => write!(f, "{}", e),
      RelverError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for RelverError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      RelverError::Io(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for RelverError {
  fn from(err: io::Error) -> Self {
    RelverError::Io(err)
  }
}

impl From<String> for RelverError {
  fn from(msg: String) -> Self {
    RelverError::message(msg)
  }
}

impl From<&str> for RelverError {
  fn from(msg: &str) -> Self {
    RelverError::message(msg)
  }
}

impl From<toml_edit::TomlError> for RelverError {
  fn from(err: toml_edit::TomlError) -> Self {
    RelverError::message(format!("TOML parse error: {}", err))
  }
}

impl From<toml_edit::de::Error> for RelverError {
  fn from(err: toml_edit::de::Error) -> Self {
    RelverError::message(format!("TOML deserialization error: {}", err))
  }
}

impl From<serde_json::Error> for RelverError {
  fn from(err: serde_json::Error) -> Self {
    RelverError::message(format!("JSON error: {}", err))
  }
}

impl From<serde_yaml::Error> for RelverError {
  fn from(err: serde_yaml::Error) -> Self {
    RelverError::message(format!("YAML error: {}", err))
  }
}

impl From<tempfile::PersistError> for RelverError {
  fn from(err: tempfile::PersistError) -> Self {
    RelverError::Io(err.error)
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// relver.toml not found
  NotFound { repo_root: PathBuf },

  /// A note, config, manifest or plan document does not have the expected shape
  Schema { path: PathBuf, reason: String },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::NotFound { .. } => {
        Some("Create relver.toml with a [[components]] table, or pass --config <PATH>.".to_string())
      }
      ConfigError::Schema { .. } => None,
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::NotFound { repo_root } => {
        write!(
          f,
          "No relver configuration found.\nExpected file: {}/relver.toml",
          repo_root.display()
        )
      }
      ConfigError::Schema { path, reason } => {
        write!(f, "Schema error in {}: {}", path.display(), reason)
      }
    }
  }
}

/// Component lookup and version-source errors
#[derive(Debug)]
pub enum ComponentError {
  /// Name or alias not declared in the registry
  Unknown { name: String, origin: Option<String> },

  /// Version source missing, unparseable, or not SemVer
  VersionSourceUnreadable {
    component: String,
    path: PathBuf,
    reason: String,
  },
}

impl ComponentError {
  fn help_message(&self) -> Option<String> {
    match self {
      ComponentError::Unknown { .. } => {
        Some("Declare the component (or add the alias) under [[components]] in relver.toml.".to_string())
      }
      ComponentError::VersionSourceUnreadable { .. } => None,
    }
  }
}

impl fmt::Display for ComponentError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ComponentError::Unknown { name, origin } => match origin {
        Some(origin) => write!(f, "Unknown component '{}' in {}", name, origin),
        None => write!(f, "Unknown component '{}'", name),
      },
      ComponentError::VersionSourceUnreadable { component, path, reason } => {
        write!(f, "{}: cannot read version from {} ({})", component, path.display(), reason)
      }
    }
  }
}

/// Disagreement between the manifest and an authoritative version source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drift {
  pub component: String,
  /// Where the disagreeing value was recorded (`manifest` or a runtime file)
  pub recorded_in: String,
  pub recorded: String,
  pub source: String,
}

impl fmt::Display for Drift {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{}: {}={}, source={}",
      self.component, self.recorded_in, self.recorded, self.source
    )
  }
}

/// Release invariant violations
#[derive(Debug)]
pub enum ValidationError {
  /// Bump severity is none of patch, minor, major
  InvalidBump { value: String, origin: String },

  /// Registry and manifest do not list the same components
  ManifestCoverage { missing: Vec<String>, extra: Vec<String> },

  /// Recorded versions differ from authoritative sources
  ManifestDrift { drifts: Vec<Drift> },

  /// Bumping would overflow a version field
  VersionOverflow {
    component: String,
    version: String,
    bump: String,
  },

  /// A plan's current_version no longer matches the source
  PlanStale {
    component: String,
    expected: String,
    found: String,
  },

  /// Tag already exists in the tag namespace
  TagAlreadyExists {
    tag: String,
    created: Vec<String>,
    not_attempted: Vec<String>,
  },
}

impl ValidationError {
  fn help_message(&self) -> Option<String> {
    match self {
      ValidationError::ManifestCoverage { .. } | ValidationError::ManifestDrift { .. } => {
        Some("Regenerate the manifest with `relver manifest` or fix the version sources.".to_string())
      }
      ValidationError::PlanStale { .. } => Some("Regenerate the plan with `relver plan`.".to_string()),
      ValidationError::TagAlreadyExists { .. } => Some(
        "Tags are immutable. Bump the component again with a new change note instead of reusing a version."
          .to_string(),
      ),
      ValidationError::InvalidBump { .. } | ValidationError::VersionOverflow { .. } => None,
    }
  }
}

impl fmt::Display for ValidationError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ValidationError::InvalidBump { value, origin } => {
        write!(
          f,
          "Invalid bump '{}' in {} (expected patch, minor or major)",
          value, origin
        )
      }
      ValidationError::ManifestCoverage { missing, extra } => {
        write!(f, "Manifest coverage check failed")?;
        for name in missing {
          write!(f, "\n  {}: missing from manifest", name)?;
        }
        for name in extra {
          write!(f, "\n  {}: not a registered component", name)?;
        }
        Ok(())
      }
      ValidationError::ManifestDrift { drifts } => {
        write!(f, "Manifest drift detected")?;
        for drift in drifts {
          write!(f, "\n  {}", drift)?;
        }
        Ok(())
      }
      ValidationError::VersionOverflow { component, version, bump } => {
        write!(f, "{}: a {} bump of {} overflows", component, bump, version)
      }
      ValidationError::PlanStale {
        component,
        expected,
        found,
      } => {
        write!(
          f,
          "{}: plan expects current version {}, source has {}",
          component, expected, found
        )
      }
      ValidationError::TagAlreadyExists {
        tag,
        created,
        not_attempted,
      } => {
        write!(f, "Tag {} already exists", tag)?;
        if !created.is_empty() {
          write!(f, "\n  created before conflict: {}", created.join(", "))?;
        }
        if !not_attempted.is_empty() {
          write!(f, "\n  not attempted: {}", not_attempted.join(", "))?;
        }
        Ok(())
      }
    }
  }
}

/// Git operation errors
#[derive(Debug)]
pub enum GitError {
  /// Git command failed
  CommandFailed { command: String, stderr: String },

  /// Repository not found
  RepoNotFound { path: PathBuf },

  /// Pushing tags to the remote failed
  PushFailed { remote: String, tags: Vec<String>, reason: String },
}

impl GitError {
  fn help_message(&self) -> Option<String> {
    match self {
      GitError::PushFailed { reason, remote, .. } => {
        if reason.contains("permission denied") || reason.contains("403") {
          Some("Check your credentials for the remote. Local tags were kept.".to_string())
        } else {
          Some(format!("Local tags were kept. Retry with: git push {} --tags", remote))
        }
      }
      GitError::RepoNotFound { path } => Some(format!(
        "Run relver inside a git repository or check the path: {}",
        path.display()
      )),
      _ => None,
    }
  }
}

impl fmt::Display for GitError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GitError::CommandFailed { command, stderr } => {
        write!(f, "Git command failed: {}\n{}", command, stderr.trim())
      }
      GitError::RepoNotFound { path } => {
        write!(f, "Git repository not found at: {}", path.display())
      }
      GitError::PushFailed { remote, tags, reason } => {
        write!(f, "Push of {} to {} failed: {}", tags.join(", "), remote, reason.trim())
      }
    }
  }
}

/// Result type alias for relver
pub type RelverResult<T> = Result<T, RelverError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> RelverResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> RelverResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<RelverError>,
{
  fn context(self, ctx: impl Into<String>) -> RelverResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> RelverResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Print an error to stderr with help text
pub fn print_error(error: &RelverError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}
