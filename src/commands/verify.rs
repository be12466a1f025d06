//! `relver verify`: the manifest consistency gate

use crate::core::context::ReleaseContext;
use crate::core::error::RelverResult;
use crate::release::manifest::{self, Manifest, SyncReport};
use std::path::{Path, PathBuf};

/// Load the manifest and fail on any coverage or drift issue
pub fn manifest_gate(ctx: &ReleaseContext, manifest_path: &Path) -> RelverResult<(Manifest, SyncReport)> {
  let manifest = Manifest::load(manifest_path)?;
  let report = manifest::check(&ctx.registry, &manifest)?;
  if !report.is_clean() {
    report.clone().into_result()?;
  }
  Ok((manifest, report))
}

/// Run the verify command
pub fn run_verify(ctx: &ReleaseContext, manifest: Option<PathBuf>) -> RelverResult<()> {
  let manifest_path = ctx.manifest_path(manifest.as_deref());
  println!("🔍 Checking {} against version sources...", ctx.display(&manifest_path));

  let (manifest, report) = manifest_gate(ctx, &manifest_path)?;

  for name in ctx.registry.names() {
    println!("   ✅ {} {}", name, manifest.version_of(name).unwrap_or_default());
  }
  println!();
  println!(
    "✅ Manifest {} is consistent ({} components)",
    if manifest.platform_release.is_empty() {
      "<unnamed>"
    } else {
      manifest.platform_release.as_str()
    },
    report.checked
  );
  Ok(())
}
