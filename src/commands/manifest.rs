//! `relver manifest`: regenerate the platform manifest from version sources

use crate::core::context::ReleaseContext;
use crate::core::error::RelverResult;
use crate::release::manifest::{self, Manifest};
use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Build a fresh manifest; the release id defaults to the next one for today
pub fn regenerate(ctx: &ReleaseContext, path: &Path, platform_release: Option<String>) -> RelverResult<Manifest> {
  let existing = if path.exists() {
    match Manifest::load(path) {
      Ok(m) => Some(m),
      Err(e) => {
        warn!(error = %e, "existing manifest unreadable, numbering from 1");
        eprintln!("⚠️  Ignoring unreadable manifest {}: {}", ctx.display(path), e);
        None
      }
    }
  } else {
    None
  };

  let now = Utc::now();
  let id = platform_release.unwrap_or_else(|| manifest::next_platform_release_id(existing.as_ref(), now.date_naive()));
  let git_sha = ctx.git().and_then(|git| git.head_commit()).ok();

  manifest::generate(&ctx.registry, &id, git_sha, now)
}

/// Run the manifest command
pub fn run_manifest(
  ctx: &ReleaseContext,
  manifest: Option<PathBuf>,
  platform_release: Option<String>,
  dry_run: bool,
) -> RelverResult<()> {
  let path = ctx.manifest_path(manifest.as_deref());
  let generated = regenerate(ctx, &path, platform_release)?;

  if dry_run {
    print!("{}", serde_yaml::to_string(&generated)?);
    println!("🔍 Dry-run mode ({} not written)", ctx.display(&path));
    return Ok(());
  }

  generated.save(&path)?;
  for (name, entry) in &generated.components {
    println!("   ✅ {} {}", name, entry.version());
  }
  println!();
  println!(
    "✅ Wrote {} for {}",
    ctx.display(&path),
    generated.platform_release
  );
  Ok(())
}
