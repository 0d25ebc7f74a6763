//! Test tier selection
//!
//! Changed modules run every tier; modules that are only Dependent skip the
//! large (slow, device/integration) tier. Unaffected modules run nothing.

use super::{AffectedModuleDetector, ProjectSubset};
use crate::core::error::AffectedResult;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TestTier {
  Small,
  Medium,
  Large,
}

impl fmt::Display for TestTier {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      TestTier::Small => "small",
      TestTier::Medium => "medium",
      TestTier::Large => "large",
    };
    f.write_str(s)
  }
}

impl TestTier {
  pub fn for_subset(subset: ProjectSubset) -> &'static [TestTier] {
    match subset {
      ProjectSubset::Changed | ProjectSubset::AllAffected => &[TestTier::Small, TestTier::Medium, TestTier::Large],
      ProjectSubset::Dependent => &[TestTier::Small, TestTier::Medium],
      ProjectSubset::None => &[],
    }
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct TestPlanEntry {
  pub module: String,
  pub subset: ProjectSubset,
  pub tiers: Vec<TestTier>,
}

/// Per-module test tiers for every module in the build, sorted by module.
#[derive(Debug, Clone, Serialize)]
pub struct TestPlan {
  pub entries: Vec<TestPlanEntry>,
}

impl TestPlan {
  pub fn build(detector: &AffectedModuleDetector) -> AffectedResult<Self> {
    let mut entries = Vec::new();
    for module in detector.all_modules() {
      let subset = if detector.should_include(&module)? {
        detector.classify(&module)?
      } else {
        ProjectSubset::None
      };
      entries.push(TestPlanEntry {
        tiers: TestTier::for_subset(subset).to_vec(),
        module,
        subset,
      });
    }
    Ok(Self { entries })
  }

  /// Entries with at least one tier to run
  pub fn scheduled(&self) -> impl Iterator<Item = &TestPlanEntry> {
    self.entries.iter().filter(|e| !e.tiers.is_empty())
  }
}
