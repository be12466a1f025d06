//! `relver notes`: show pending change notes and the bump each implies

use crate::core::context::ReleaseContext;
use crate::core::error::RelverResult;
use crate::release::notes;

/// Run the notes command
pub fn run_notes(ctx: &ReleaseContext, json: bool) -> RelverResult<()> {
  let store = ctx.notes();
  let pending = store.load(&ctx.registry)?;

  if json {
    println!("{}", serde_json::to_string_pretty(&pending)?);
    return Ok(());
  }

  if pending.is_empty() {
    println!("⚠️  No pending change notes in {}", ctx.display(store.dir()));
    return Ok(());
  }

  let intents = notes::aggregate(&pending);
  for (component, group) in notes::group_by_component(&pending) {
    let severity = intents.get(&component).map(|i| i.severity.as_str()).unwrap_or_default();
    println!("📦 {} ({})", component, severity);
    for note in group {
      println!("   {:<5}  {}  [{}]", note.bump, note.summary, note.file);
    }
  }
  println!();
  println!("{} note(s) for {} component(s)", pending.len(), intents.len());
  Ok(())
}
