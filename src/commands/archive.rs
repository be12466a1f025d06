//! `relver archive`: move consumed change notes under the release id

use crate::core::context::ReleaseContext;
use crate::core::error::RelverResult;
use crate::release::manifest::Manifest;
use std::path::PathBuf;

/// Run the archive command
pub fn run_archive(
  ctx: &ReleaseContext,
  manifest: Option<PathBuf>,
  platform_release: Option<String>,
) -> RelverResult<()> {
  let platform_release = match platform_release {
    Some(id) => id,
    None => Manifest::load(&ctx.manifest_path(manifest.as_deref()))?.platform_release,
  };

  let archived = ctx.notes().archive(&ctx.archive_root(), &platform_release)?;
  if archived.is_empty() {
    println!("⚠️  No pending change notes to archive");
    return Ok(());
  }

  for path in &archived {
    println!("   📁 {}", ctx.display(path));
  }
  println!();
  println!("✅ Archived {} note(s) for {}", archived.len(), platform_release.trim());
  Ok(())
}
