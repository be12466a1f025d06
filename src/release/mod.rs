//! Release version resolution
//!
//! Data flows one way:
//!
//! ```text
//! change notes + registry -> bump resolution -> release plan -> tags
//! ```
//!
//! The manifest check runs as an independent gate at any point.
//!
//! - **notes**: pending change notes and per-component bump intents
//! - **changes**: components touched by a git change range
//! - **registry**: components, aliases, authoritative version sources
//! - **sources**: reading and writing version values per file format
//! - **bump**: SemVer bump rules and next-version resolution
//! - **manifest**: platform manifest model, consistency gate, regeneration
//! - **plan**: the serialized release plan and `apply`
//! - **tags**: immutable component and platform tags

pub mod bump;
pub mod changes;
pub mod manifest;
pub mod notes;
pub mod plan;
pub mod registry;
pub mod sources;
pub mod tags;

