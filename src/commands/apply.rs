//! `relver apply`: write planned versions to their sources

use crate::commands::manifest::regenerate;
use crate::core::context::ReleaseContext;
use crate::core::error::RelverResult;
use crate::release::plan::ReleasePlan;
use std::path::PathBuf;

/// Run the apply command
pub fn run_apply(
  ctx: &ReleaseContext,
  plan: Option<PathBuf>,
  manifest: Option<PathBuf>,
  no_manifest: bool,
  dry_run: bool,
) -> RelverResult<()> {
  let plan_path = ctx.plan_path(plan.as_deref());
  let release = ReleasePlan::load(&plan_path)?;
  let origin = ctx.display(&plan_path).into_owned();

  if release.is_empty() {
    println!("⚠️  {} lists no components; nothing to apply", origin);
    return Ok(());
  }

  if dry_run {
    release.verify_current(&ctx.registry, &origin)?;
    println!("📦 Would apply {}:", origin);
    for entry in &release.components {
      println!("  {}: {} → {}", entry.name, entry.current_version, entry.next_version);
    }
    println!();
    println!("🔍 Dry-run mode (no changes applied)");
    return Ok(());
  }

  let changed = release.apply(&ctx.registry, &origin)?;
  for entry in &release.components {
    println!("   ✅ {}: {} → {}", entry.name, entry.current_version, entry.next_version);
  }
  for file in &changed {
    println!("      updated {}", file.display());
  }

  if !no_manifest {
    let manifest_path = ctx.manifest_path(manifest.as_deref());
    let generated = regenerate(ctx, &manifest_path, None)?;
    generated.save(&manifest_path)?;
    println!(
      "   ✅ Wrote {} for {}",
      ctx.display(&manifest_path),
      generated.platform_release
    );
  }

  println!();
  println!("✅ Applied {} version bump(s)", release.components.len());
  Ok(())
}
