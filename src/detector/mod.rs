//! Affected module detection
//!
//! Given the module graph and a git diff, every module lands in one of three
//! buckets:
//!
//! - **Changed**: owns a changed file, is always-build, or is co-built with a
//!   Changed module
//! - **Dependent**: not Changed, but transitively depends on a Changed module
//!   (or is co-built with a Dependent one)
//! - **None**: everything else
//!
//! `AllAffected` is the union of the first two and the default scope.
//!
//! When the diff cannot be trusted to be complete (no baseline commit, or a
//! changed file no module owns) the detector widens the scope instead of
//! guessing. Building too much is a cost; skipping an affected module is a bug.

pub mod affected;
pub mod cobuilt;
pub mod session;
pub mod test_scope;

pub use affected::{AffectedModuleDetector, Classification, DetectionMode, DetectorSettings};
pub use session::DetectorSession;
pub use test_scope::TestPlan;

use serde::Serialize;
use std::fmt;

/// Classification of one module relative to the current change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectSubset {
  Changed,
  Dependent,
  AllAffected,
  None,
}

impl fmt::Display for ProjectSubset {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      ProjectSubset::Changed => "changed",
      ProjectSubset::Dependent => "dependent",
      ProjectSubset::AllAffected => "all-affected",
      ProjectSubset::None => "none",
    };
    f.write_str(s)
  }
}

/// Which modules the caller wants back. Filtering only; the full
/// classification is always computed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
  ChangedOnly,
  DependentOnly,
  #[default]
  AllAffected,
}

impl Scope {
  /// From the mutually exclusive `--changed-only` / `--dependent-only` flags.
  pub fn from_flags(changed_only: bool, dependent_only: bool) -> Self {
    match (changed_only, dependent_only) {
      (true, _) => Scope::ChangedOnly,
      (false, true) => Scope::DependentOnly,
      (false, false) => Scope::AllAffected,
    }
  }

  /// Does a module classified as `subset` belong to this scope?
  pub fn includes(self, subset: ProjectSubset) -> bool {
    match (self, subset) {
      (_, ProjectSubset::None) => false,
      (_, ProjectSubset::AllAffected) => true,
      (Scope::AllAffected, _) => true,
      (Scope::ChangedOnly, ProjectSubset::Changed) => true,
      (Scope::DependentOnly, ProjectSubset::Dependent) => true,
      _ => false,
    }
  }
}

impl fmt::Display for Scope {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      Scope::ChangedOnly => "changed",
      Scope::DependentOnly => "dependent",
      Scope::AllAffected => "all-affected",
    };
    f.write_str(s)
  }
}
