//! `relver changed`: components touched between two revisions

use crate::core::context::ReleaseContext;
use crate::core::error::RelverResult;
use crate::release::changes::ChangeSet;
use std::path::PathBuf;

/// Run the changed command
pub fn run_changed(
  ctx: &ReleaseContext,
  base: String,
  head: String,
  output: Option<PathBuf>,
  json: bool,
) -> RelverResult<()> {
  let files = ctx.git()?.changed_files(&base, &head)?;
  let set = ChangeSet::detect(&ctx.registry, &base, &head, &files);

  if json {
    print!("{}", set.to_json()?);
  } else {
    println!("🔍 {} file(s) changed between {} and {}", set.files.len(), base, head);
    for (name, files) in &set.component_files {
      println!("  📦 {} ({} file(s))", name, files.len());
    }
    if set.components.is_empty() {
      println!("  no component matched");
    }
  }

  if let Some(output) = output {
    let path = ctx.path(&output);
    set.write(&path)?;
    if !json {
      println!("✅ Wrote {}", ctx.display(&path));
    }
  }
  Ok(())
}
