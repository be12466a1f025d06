//! Core building blocks shared by every command
//!
//! - **config**: relver.toml parsing and validation
//! - **context**: per-invocation context (root, config, registry)
//! - **error**: error types with contextual help and exit codes
//! - **vcs**: system git backend for the tag namespace

pub mod config;
pub mod context;
pub mod error;
pub mod vcs;
