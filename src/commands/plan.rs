//! `relver plan`: resolve pending notes into a release plan

use crate::commands::verify::manifest_gate;
use crate::core::context::ReleaseContext;
use crate::core::error::RelverResult;
use crate::release::bump;
use crate::release::changes::ChangeSet;
use crate::release::notes;
use crate::release::plan::ReleasePlan;
use std::path::PathBuf;

/// Run the plan command
///
/// The manifest gate runs first, even when there are no pending notes. With
/// a change set, notes for components outside it are left pending.
pub fn run_plan(
  ctx: &ReleaseContext,
  manifest: Option<PathBuf>,
  plan: Option<PathBuf>,
  changed: Option<PathBuf>,
  dry_run: bool,
  json: bool,
) -> RelverResult<()> {
  let manifest_path = ctx.manifest_path(manifest.as_deref());
  manifest_gate(ctx, &manifest_path)?;

  let pending = ctx.notes().load(&ctx.registry)?;
  let mut intents = notes::aggregate(&pending);

  if let Some(changed) = changed {
    let changed_path = ctx.path(&changed);
    let filter = ChangeSet::load(&changed_path)?.component_filter(&ctx.registry, &ctx.display(&changed_path))?;
    let before = intents.len();
    intents.retain(|name, _| filter.contains(name));
    if !json && before != intents.len() {
      println!(
        "ℹ️  Skipping {} component(s) not in {}",
        before - intents.len(),
        ctx.display(&changed_path)
      );
    }
  }
  let release = ReleasePlan::from_resolved(bump::resolve(&intents, &ctx.registry)?)?;

  if json {
    print!("{}", release.to_json()?);
  } else if release.is_empty() {
    println!("⚠️  No pending change notes; the plan is empty");
  } else {
    println!("📦 Release plan ({} components)", release.components.len());
    println!();
    for entry in &release.components {
      println!(
        "  {}: {} → {} ({})",
        entry.name, entry.current_version, entry.next_version, entry.bump
      );
      for reason in &entry.reasons {
        println!("      {}", reason);
      }
    }
    println!();
  }

  if dry_run {
    if !json {
      println!("🔍 Dry-run mode (plan not written)");
    }
    return Ok(());
  }

  let plan_path = ctx.plan_path(plan.as_deref());
  release.write(&plan_path)?;
  if !json {
    println!("✅ Wrote {}", ctx.display(&plan_path));
  }
  Ok(())
}
