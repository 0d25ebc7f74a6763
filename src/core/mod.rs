//! Core building blocks
//!
//! - **config**: affected.toml parsing and validation
//! - **context**: Per-invocation build context holding the detector
//! - **error**: Error types with contextual help messages and exit codes
//! - **logging**: tracing subscriber setup
//! - **vcs**: Git queries (SystemGit)

pub mod config;
pub mod context;
pub mod error;
pub mod logging;
pub mod vcs;
