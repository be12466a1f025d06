//! `relver tag`: create immutable release tags for a merged plan

use crate::commands::verify::manifest_gate;
use crate::core::context::ReleaseContext;
use crate::core::error::RelverResult;
use crate::release::plan::ReleasePlan;
use crate::release::tags::{self, TagAuthority};
use std::path::PathBuf;

/// Run the tag command
pub fn run_tag(
  ctx: &ReleaseContext,
  plan: Option<PathBuf>,
  manifest: Option<PathBuf>,
  push: bool,
  remote: Option<String>,
  dry_run: bool,
) -> RelverResult<()> {
  let manifest_path = ctx.manifest_path(manifest.as_deref());
  let (manifest, _) = manifest_gate(ctx, &manifest_path)?;

  let release = ReleasePlan::load(&ctx.plan_path(plan.as_deref()))?;
  let requests = tags::release_tags(&release, &manifest)?;

  let mut git = ctx.git()?;
  let mut authority = TagAuthority::new(&mut git);

  if dry_run {
    if let Some(existing) = authority.preflight(&requests)? {
      println!("⚠️  Tag {} already exists; tagging would fail", existing);
    }
    println!("🏷️  Would create:");
    for request in &requests {
      println!("   {}", request.name);
    }
    println!();
    println!("🔍 Dry-run mode (no tags created)");
    return Ok(());
  }

  let created = authority.create(&requests)?;
  for name in &created {
    println!("   🏷️  {}", name);
  }
  println!();
  println!("✅ Created {} tag(s)", created.len());

  if push {
    let remote = remote.unwrap_or_else(|| ctx.config.release.remote.clone());
    authority.push(&remote, &created)?;
  }
  Ok(())
}
