//! `relver bump`: bump one component directly, without change notes

use crate::commands::manifest::regenerate;
use crate::core::context::ReleaseContext;
use crate::core::error::RelverResult;
use crate::release::bump::Bump;
use std::path::PathBuf;

/// Run the bump command
pub fn run_bump(
  ctx: &ReleaseContext,
  component: String,
  bump: String,
  manifest: Option<PathBuf>,
  no_manifest: bool,
  dry_run: bool,
) -> RelverResult<()> {
  let component = ctx.registry.resolve(&component)?;
  let bump = Bump::parse_from(&bump, "command line")?;
  let current = ctx.registry.read_version(component)?;
  let next = bump.apply(&component.name, &current)?;

  if dry_run {
    println!("📦 {} would bump {} → {} ({})", component.name, current, next, bump);
    println!();
    println!("🔍 Dry-run mode (no changes applied)");
    return Ok(());
  }

  let changed = ctx.registry.write_version(component, &next)?;
  println!("   ✅ {}: {} → {} ({})", component.name, current, next, bump);
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
  println!("✅ Bumped {} to {}", component.name, next);
  Ok(())
}
