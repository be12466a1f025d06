//! Immutable release tags
//!
//! Tags only move `absent -> created`. Existence is checked for every tag
//! before the first one is created, and creation itself goes through the
//! store's compare-and-create so a concurrent release fails cleanly instead
//! of moving a tag.

use crate::core::error::{Drift, GitError, RelverError, RelverResult, ValidationError};
use crate::release::manifest::Manifest;
use crate::release::plan::ReleasePlan;
use tracing::{debug, info};

/// Result of an atomic create attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagCreate {
  Created,
  /// The name was already taken; nothing was changed
  AlreadyExists,
}

/// Storage boundary for the tag namespace
pub trait TagStore {
  fn tag_exists(&self, name: &str) -> RelverResult<bool>;

  /// Create an annotated tag at the current commit, failing closed if the
  /// name exists. Must never replace an existing tag.
  fn create_tag(&mut self, name: &str, message: &str) -> RelverResult<TagCreate>;

  fn push_tags(&mut self, remote: &str, names: &[String]) -> RelverResult<()>;
}

/// One tag to create
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRequest {
  pub name: String,
  pub message: String,
}

/// `name@x.y.z`
pub fn component_tag_name(component: &str, version: &semver::Version) -> String {
  format!("{}@{}", component, version)
}

/// Platform tag for a manifest's `platform_release`
pub fn platform_tag_name(platform_release: &str) -> RelverResult<String> {
  let release = platform_release.trim();
  if release.is_empty() {
    return Err(RelverError::with_help(
      "Manifest has no platform_release",
      "Regenerate the manifest with `relver manifest`.",
    ));
  }
  if release.starts_with("platform-") {
    Ok(release.to_string())
  } else {
    Ok(format!("platform-{}", release))
  }
}

/// Reject names git would refuse as a ref
pub fn validate_tag_name(name: &str) -> RelverResult<()> {
  let invalid = name.is_empty()
    || name.starts_with(['-', '.', '/'])
    || name.ends_with(['.', '/'])
    || name.ends_with(".lock")
    || name.contains("..")
    || name.contains("@{")
    || name.contains("//")
    || name == "@"
    || name
      .chars()
      .any(|c| c.is_control() || c.is_whitespace() || matches!(c, '~' | '^' | ':' | '?' | '*' | '[' | '\\'));

  if invalid {
    return Err(RelverError::message(format!("'{}' is not a valid tag name", name)));
  }
  Ok(())
}

/// Tags for a merged release: one per plan entry, then the platform tag
///
/// The manifest must already record each entry's next_version.
pub fn release_tags(plan: &ReleasePlan, manifest: &Manifest) -> RelverResult<Vec<TagRequest>> {
  if plan.is_empty() {
    return Err(RelverError::with_help(
      "Release plan is empty, nothing to tag",
      "Add change notes and run `relver plan`.",
    ));
  }

  let drifts: Vec<Drift> = plan
    .components
    .iter()
    .filter_map(|entry| {
      let next = entry.next_version.to_string();
      match manifest.version_of(&entry.name) {
        Some(recorded) if recorded == next => None,
        recorded => Some(Drift {
          component: entry.name.clone(),
          recorded_in: "manifest".to_string(),
          recorded: recorded.unwrap_or("<missing>").to_string(),
          source: next,
        }),
      }
    })
    .collect();
  if !drifts.is_empty() {
    return Err(RelverError::Validation(ValidationError::ManifestDrift { drifts }));
  }

  let platform = platform_tag_name(&manifest.platform_release)?;
  let mut requests: Vec<TagRequest> = plan
    .components
    .iter()
    .map(|entry| TagRequest {
      name: component_tag_name(&entry.name, &entry.next_version),
      message: format!("Release {} {}", entry.name, entry.next_version),
    })
    .collect();
  requests.push(TagRequest {
    message: format!("Platform release {}", platform),
    name: platform,
  });

  for request in &requests {
    validate_tag_name(&request.name)?;
  }
  Ok(requests)
}

/// Creates tags through a `TagStore`
pub struct TagAuthority<'a, S: TagStore> {
  store: &'a mut S,
}

impl<'a, S: TagStore> TagAuthority<'a, S> {
  pub fn new(store: &'a mut S) -> Self {
    Self { store }
  }

  /// First requested tag that already exists
  pub fn preflight(&self, requests: &[TagRequest]) -> RelverResult<Option<String>> {
    for request in requests {
      if self.store.tag_exists(&request.name)? {
        return Ok(Some(request.name.clone()));
      }
    }
    Ok(None)
  }

  /// Create every tag in order, stopping at the first conflict
  ///
  /// Tags created before a conflict stay; the error lists them along with
  /// the tags that were not attempted.
  pub fn create(&mut self, requests: &[TagRequest]) -> RelverResult<Vec<String>> {
    let names: Vec<String> = requests.iter().map(|r| r.name.clone()).collect();

    if let Some(existing) = self.preflight(requests)? {
      return Err(RelverError::Validation(ValidationError::TagAlreadyExists {
        not_attempted: names.iter().filter(|n| **n != existing).cloned().collect(),
        tag: existing,
        created: Vec::new(),
      }));
    }

    let mut created = Vec::with_capacity(requests.len());
    for (idx, request) in requests.iter().enumerate() {
      match self.store.create_tag(&request.name, &request.message)? {
        TagCreate::Created => {
          debug!(tag = %request.name, "created tag");
          created.push(request.name.clone());
        }
        TagCreate::AlreadyExists => {
          return Err(RelverError::Validation(ValidationError::TagAlreadyExists {
            tag: request.name.clone(),
            created,
            not_attempted: names[idx + 1..].to_vec(),
          }));
        }
      }
    }

    info!(count = created.len(), "created release tags");
    Ok(created)
  }

  /// Best-effort propagation of created tags
  pub fn push(&mut self, remote: &str, created: &[String]) -> RelverResult<()> {
    if created.is_empty() {
      return Ok(());
    }
    self.store.push_tags(remote, created).map_err(|e| match e {
      RelverError::Git(GitError::PushFailed { .. }) => e,
      other => RelverError::Git(GitError::PushFailed {
        remote: remote.to_string(),
        tags: created.to_vec(),
        reason: other.to_string(),
      }),
    })
  }
}
