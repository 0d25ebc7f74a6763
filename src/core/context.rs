//! Build context - build once, pass everywhere
//!
//! # Architecture
//!
//! ```text
//! main.rs:
//!   BuildContext::build(root, overrides) -> &BuildContext
//!   |   load affected.toml -> open git -> provider -> DetectorSession -> finalize
//!   v
//! commands/*.rs:
//!   fn run_xxx(ctx: &BuildContext, ...)
//! ```
//!
//! There is exactly one detector per invocation. Commands receive it by
//! reference; nothing is global.

use crate::core::config::{AffectedConfig, GraphProvider};
use crate::core::error::AffectedResult;
use crate::core::vcs::SystemGit;
use crate::detector::{AffectedModuleDetector, DetectorSession, DetectorSettings, ProjectSubset, Scope};
use crate::graph::provider;
use std::path::{Path, PathBuf};

/// Command-line overrides layered over affected.toml
#[derive(Debug, Clone, Default)]
pub struct Overrides {
  pub baseline: Option<String>,
  pub disable: bool,
  pub committed_only: bool,
  pub scope: Scope,
}

/// Shared per-invocation state.
pub struct BuildContext {
  /// Workspace root directory (where affected.toml / Cargo.toml live)
  pub root: PathBuf,

  /// Git work tree root (canonical)
  pub work_tree: PathBuf,

  session: DetectorSession,
}

impl BuildContext {
  /// Load config, discover modules and finalize the detector.
  pub fn build(workspace_root: &Path, overrides: &Overrides) -> AffectedResult<Self> {
    let root = workspace_root.to_path_buf();
    let config = AffectedConfig::load_or_default(&root)?;

    let git = SystemGit::open(&root)?;
    let work_tree = git.work_tree().to_path_buf();

    let modules = match config.effective_provider() {
      GraphProvider::Declared => provider::declared_modules(&config.modules, &root, &work_tree)?,
      GraphProvider::Cargo | GraphProvider::Auto => provider::cargo_modules(&root, &work_tree)?,
    };

    let settings = Self::settings(&config, overrides);
    let mut session = DetectorSession::new(settings, Box::new(git));
    session.register_all(modules)?;
    session.finalize()?;

    Ok(Self {
      root,
      work_tree,
      session,
    })
  }

  /// Merge config with CLI overrides.
  fn settings(config: &AffectedConfig, overrides: &Overrides) -> DetectorSettings {
    let mut settings = DetectorSettings::from_config(&config.detector);
    settings.scope = overrides.scope;
    if overrides.disable {
      settings.enabled = false;
    }
    if overrides.committed_only {
      settings.include_uncommitted = false;
    }
    if let Some(ref baseline) = overrides.baseline {
      settings.baseline = Some(baseline.clone());
    }
    settings
  }

  pub fn detector(&self) -> AffectedResult<&AffectedModuleDetector> {
    self.session.detector()
  }

  pub fn classify(&self, module: &str) -> AffectedResult<ProjectSubset> {
    self.session.classify(module)
  }

  pub fn should_include(&self, module: &str) -> AffectedResult<bool> {
    self.session.should_include(module)
  }

  /// Absolute directory of a module, if it has one.
  pub fn module_dir(&self, module: &str) -> AffectedResult<Option<PathBuf>> {
    Ok(self.detector()?.module_dir(module).map(|dir| self.work_tree.join(dir)))
  }

  pub fn workspace_root(&self) -> &Path {
    &self.root
  }
}
