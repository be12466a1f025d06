//! `relver note`: record a pending change note

use crate::core::context::ReleaseContext;
use crate::core::error::RelverResult;
use crate::release::bump::Bump;
use chrono::Utc;

/// Run the note command
pub fn run_note(ctx: &ReleaseContext, component: String, bump: String, summary: String) -> RelverResult<()> {
  let bump = Bump::parse_from(&bump, "command line")?;
  let path = ctx.notes().create(&ctx.registry, &component, bump, &summary, Utc::now())?;

  println!("📝 Created change note {}", ctx.display(&path));
  Ok(())
}
