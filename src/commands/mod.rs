//! CLI commands for relver
//!
//! ## Change notes
//! - **note**: record a pending change note
//! - **notes**: list pending notes and the bump each component gets
//! - **archive**: move consumed notes under the platform release id
//!
//! ## Versions
//! - **changed**: components touched between two revisions
//! - **plan**: gate on the manifest, then resolve notes into a release plan
//! - **apply**: write planned versions to their sources
//! - **bump**: bump one component directly
//!
//! ## Manifest
//! - **verify**: check the manifest against version sources
//! - **manifest**: regenerate the manifest
//!
//! ## Tags
//! - **tag**: create immutable component and platform tags
//!
//! All commands accept `&ReleaseContext` to avoid reloading config.

pub mod apply;
pub mod archive;
pub mod bump;
pub mod changed;
pub mod manifest;
pub mod note;
pub mod notes;
pub mod plan;
pub mod tag;
pub mod verify;

pub use apply::run_apply;
pub use archive::run_archive;
pub use bump::run_bump;
pub use changed::run_changed;
pub use manifest::run_manifest;
pub use note::run_note;
pub use notes::run_notes;
pub use plan::run_plan;
pub use tag::run_tag;
pub use verify::run_verify;
