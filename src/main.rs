mod commands;
mod core;
mod release;
mod utils;

use clap::{Parser, Subcommand};
use core::context::ReleaseContext;
use core::error::{RelverError, print_error};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Resolve component release versions and keep the platform manifest and tags consistent
#[derive(Parser)]
#[command(name = "relver")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(styles = get_styles())]
struct Cli {
  /// Path to relver.toml (default: search the repository root)
  #[arg(long, global = true)]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  // ============================================================================
  // Change notes
  // ============================================================================
  /// Record a pending change note for a component
  Note {
    /// Component name or alias
    component: String,
    /// Bump severity: patch, minor or major
    bump: String,
    /// One-line summary of the change
    #[arg(short = 'm', long)]
    summary: String,
  },

  /// List pending change notes and the bump each component gets
  Notes {
    /// Output notes in JSON format
    #[arg(long)]
    json: bool,
  },

  /// Move pending change notes into the archive for a platform release
  Archive {
    /// Manifest to read the platform release id from
    #[arg(long)]
    manifest: Option<PathBuf>,
    /// Platform release id (default: the manifest's platform_release)
    #[arg(long)]
    platform_release: Option<String>,
  },

  // ============================================================================
  // Versions
  // ============================================================================
  /// Check the manifest, then resolve pending notes into a release plan
  Plan {
    /// Manifest path (default: release.manifest)
    #[arg(long)]
    manifest: Option<PathBuf>,
    /// Plan output path (default: release.plan)
    #[arg(long)]
    plan: Option<PathBuf>,
    /// Only plan components listed in this change set (from `relver changed`)
    #[arg(long)]
    changed: Option<PathBuf>,
    /// Show the plan without writing it
    #[arg(long)]
    dry_run: bool,
    /// Print the plan as JSON
    #[arg(long)]
    json: bool,
  },

  /// List components whose path globs match files changed between two revisions
  Changed {
    /// Base revision
    #[arg(long)]
    base: String,
    /// Head revision
    #[arg(long, default_value = "HEAD")]
    head: String,
    /// Write the change set as JSON to this path
    #[arg(long)]
    output: Option<PathBuf>,
    /// Print the change set as JSON
    #[arg(long)]
    json: bool,
  },

  /// Bump one component directly and regenerate the manifest
  Bump {
    /// Component name or alias
    component: String,
    /// Bump severity: patch, minor or major
    bump: String,
    /// Manifest path (default: release.manifest)
    #[arg(long)]
    manifest: Option<PathBuf>,
    /// Leave the manifest untouched
    #[arg(long)]
    no_manifest: bool,
    /// Show the new version without writing it
    #[arg(long)]
    dry_run: bool,
  },

  /// Write the planned versions to their version sources
  Apply {
    /// Plan path (default: release.plan)
    #[arg(long)]
    plan: Option<PathBuf>,
    /// Manifest path (default: release.manifest)
    #[arg(long)]
    manifest: Option<PathBuf>,
    /// Leave the manifest untouched
    #[arg(long)]
    no_manifest: bool,
    /// Show what would happen without making changes
    #[arg(long)]
    dry_run: bool,
  },

  // ============================================================================
  // Manifest
  // ============================================================================
  /// Check the manifest against the authoritative version sources
  Verify {
    /// Manifest path (default: release.manifest)
    #[arg(long)]
    manifest: Option<PathBuf>,
  },

  /// Regenerate the manifest from the authoritative version sources
  Manifest {
    /// Manifest path (default: release.manifest)
    #[arg(long)]
    manifest: Option<PathBuf>,
    /// Platform release id (default: next platform-YYYY.MM.DD.N)
    #[arg(long)]
    platform_release: Option<String>,
    /// Print the manifest without writing it
    #[arg(long)]
    dry_run: bool,
  },

  // ============================================================================
  // Tags
  // ============================================================================
  /// Create component and platform tags for a merged release plan
  Tag {
    /// Plan path (default: release.plan)
    #[arg(long)]
    plan: Option<PathBuf>,
    /// Manifest path (default: release.manifest)
    #[arg(long)]
    manifest: Option<PathBuf>,
    /// Push created tags to the remote
    #[arg(long, overrides_with = "no_push")]
    push: bool,
    /// Keep tags local (default)
    #[arg(long, overrides_with = "push")]
    no_push: bool,
    /// Remote to push to (default: release.remote)
    #[arg(long)]
    remote: Option<String>,
    /// Show the tags without creating them
    #[arg(long)]
    dry_run: bool,
  },
}

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .valid(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

fn main() {
  let cli = Cli::parse();

  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_env("RELVER_LOG").unwrap_or_else(|_| EnvFilter::new("warn")))
    .with_writer(std::io::stderr)
    .with_target(false)
    .init();

  let cwd = match std::env::current_dir() {
    Ok(dir) => dir,
    Err(e) => {
      eprintln!("Error: Failed to get current directory: {}", e);
      std::process::exit(1);
    }
  };

  let ctx = match ReleaseContext::build(&cwd, cli.config.as_deref()) {
    Ok(ctx) => ctx,
    Err(e) => handle_error(e),
  };

  let result = match cli.command {
    Commands::Note {
      component,
      bump,
      summary,
    } => commands::run_note(&ctx, component, bump, summary),
    Commands::Notes { json } => commands::run_notes(&ctx, json),
    Commands::Archive {
      manifest,
      platform_release,
    } => commands::run_archive(&ctx, manifest, platform_release),
    Commands::Plan {
      manifest,
      plan,
      changed,
      dry_run,
      json,
    } => commands::run_plan(&ctx, manifest, plan, changed, dry_run, json),
    Commands::Changed {
      base,
      head,
      output,
      json,
    } => commands::run_changed(&ctx, base, head, output, json),
    Commands::Bump {
      component,
      bump,
      manifest,
      no_manifest,
      dry_run,
    } => commands::run_bump(&ctx, component, bump, manifest, no_manifest, dry_run),
    Commands::Apply {
      plan,
      manifest,
      no_manifest,
      dry_run,
    } => commands::run_apply(&ctx, plan, manifest, no_manifest, dry_run),
    Commands::Verify { manifest } => commands::run_verify(&ctx, manifest),
    Commands::Manifest {
      manifest,
      platform_release,
      dry_run,
    } => commands::run_manifest(&ctx, manifest, platform_release, dry_run),
    Commands::Tag {
      plan,
      manifest,
      push,
      no_push,
      remote,
      dry_run,
    } => commands::run_tag(&ctx, plan, manifest, push && !no_push, remote, dry_run),
  };

  if let Err(err) = result {
    handle_error(err);
  }
}

fn handle_error(err: RelverError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
