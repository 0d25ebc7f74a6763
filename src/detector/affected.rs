//! The detector itself: selective classification, or accept-all when
//! detection is switched off.

use super::cobuilt::{close_over_groups, resolve_groups};
use super::{ProjectSubset, Scope};
use crate::core::config::DetectorConfig;
use crate::core::error::{AffectedResult, DetectorError};
use crate::core::vcs::GitClient;
use crate::graph::ProjectGraph;
use crate::graph::project_graph::normalize;
use serde::Serialize;
use std::cell::OnceCell;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Everything that steers detection, after config and CLI overrides merge.
#[derive(Debug, Clone)]
pub struct DetectorSettings {
  pub enabled: bool,
  pub scope: Scope,
  pub baseline: Option<String>,
  pub include_uncommitted: bool,
  pub always_build: Vec<String>,
  pub ignored_paths: Vec<PathBuf>,
  pub cobuilt: Vec<BTreeSet<String>>,
}

impl Default for DetectorSettings {
  fn default() -> Self {
    Self::from_config(&DetectorConfig::default())
  }
}

impl DetectorSettings {
  pub fn from_config(config: &DetectorConfig) -> Self {
    Self {
      enabled: config.enabled,
      scope: Scope::default(),
      baseline: config.baseline.clone(),
      include_uncommitted: config.include_uncommitted,
      always_build: config.always_build.clone(),
      ignored_paths: config.ignored_paths.iter().map(|p| normalize(p)).collect(),
      cobuilt: config.cobuilt_groups(),
    }
  }
}

/// Why the detector gave up on selectivity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildAllReason {
  /// No merge commit to diff against; every module is Changed
  NoBaseline,
  /// A changed file belongs to no module; everything not Changed is Dependent
  UnknownFiles,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "mode", content = "reason")]
pub enum DetectionMode {
  Selective,
  BuildAll(BuildAllReason),
}

/// The result of one detection run. Computed once, then read-only.
#[derive(Debug, Clone, Serialize)]
pub struct Classification {
  pub baseline: Option<String>,
  pub changed_files: Vec<PathBuf>,
  pub ignored_files: Vec<PathBuf>,
  pub unknown_files: Vec<PathBuf>,
  pub mode: DetectionMode,
  pub changed: BTreeSet<String>,
  pub dependent: BTreeSet<String>,
}

impl Classification {
  pub fn subset(&self, module: &str) -> ProjectSubset {
    if self.changed.contains(module) {
      ProjectSubset::Changed
    } else if self.dependent.contains(module) {
      ProjectSubset::Dependent
    } else {
      ProjectSubset::None
    }
  }

  pub fn modules_in(&self, scope: Scope) -> BTreeSet<String> {
    match scope {
      Scope::ChangedOnly => self.changed.clone(),
      Scope::DependentOnly => self.dependent.clone(),
      Scope::AllAffected => self.changed.union(&self.dependent).cloned().collect(),
    }
  }
}

/// Classifies modules against a git diff. Nothing is computed until the first
/// query; the answer is then memoized for the life of the detector.
pub struct SelectiveDetector {
  graph: ProjectGraph,
  git: Box<dyn GitClient>,
  settings: DetectorSettings,
  /// Co-built groups fully present in the graph
  cobuilt: Vec<BTreeSet<String>>,
  /// Always-build modules present in the graph
  always_build: BTreeSet<String>,
  classification: OnceCell<Classification>,
}

impl SelectiveDetector {
  fn new(graph: ProjectGraph, git: Box<dyn GitClient>, settings: DetectorSettings) -> AffectedResult<Self> {
    let cobuilt = resolve_groups(&settings.cobuilt, &graph)?;

    let mut always_build = BTreeSet::new();
    for module in &settings.always_build {
      if graph.contains(module) {
        always_build.insert(module.clone());
      } else {
        tracing::debug!(%module, "always-build module not in this checkout, skipping");
      }
    }

    Ok(Self {
      graph,
      git,
      settings,
      cobuilt,
      always_build,
      classification: OnceCell::new(),
    })
  }

  fn classification(&self) -> AffectedResult<&Classification> {
    if let Some(classification) = self.classification.get() {
      return Ok(classification);
    }
    let computed = self.compute()?;
    Ok(self.classification.get_or_init(|| computed))
  }

  fn compute(&self) -> AffectedResult<Classification> {
    let all_modules = self.graph.module_paths();

    let baseline = match &self.settings.baseline {
      Some(rev) => Some(self.git.resolve_commit(rev)?),
      None => self.git.find_previous_merge_commit()?,
    };

    let Some(baseline) = baseline else {
      tracing::info!("no merge commit in history, treating every module as changed");
      return Ok(Classification {
        baseline: None,
        changed_files: Vec::new(),
        ignored_files: Vec::new(),
        unknown_files: Vec::new(),
        mode: DetectionMode::BuildAll(BuildAllReason::NoBaseline),
        changed: all_modules,
        dependent: BTreeSet::new(),
      });
    };

    let files = self
      .git
      .find_changed_files_since(&baseline, self.settings.include_uncommitted)?;
    let (ignored_files, changed_files): (Vec<PathBuf>, Vec<PathBuf>) =
      files.into_iter().partition(|f| self.is_ignored(f));

    let mut changed = BTreeSet::new();
    let mut unknown_files = Vec::new();
    for file in &changed_files {
      match self.graph.find_containing_module(file) {
        Some(module) => {
          changed.insert(module.to_string());
        }
        None => {
          tracing::info!(file = %file.display(), "no module owns changed file, widening scope to every module");
          unknown_files.push(file.clone());
        }
      }
    }

    changed.extend(self.always_build.iter().cloned());
    let changed = close_over_groups(&changed, &self.cobuilt);

    let mut reached = changed.clone();
    for module in &changed {
      reached.extend(self.graph.transitive_dependents(module)?);
    }
    let reached = close_over_groups(&reached, &self.cobuilt);

    let (mode, dependent): (DetectionMode, BTreeSet<String>) = if unknown_files.is_empty() {
      (DetectionMode::Selective, reached.difference(&changed).cloned().collect())
    } else {
      (
        DetectionMode::BuildAll(BuildAllReason::UnknownFiles),
        all_modules.difference(&changed).cloned().collect(),
      )
    };

    tracing::debug!(
      %baseline,
      files = changed_files.len(),
      changed = changed.len(),
      dependent = dependent.len(),
      "classified modules"
    );

    Ok(Classification {
      baseline: Some(baseline),
      changed_files,
      ignored_files,
      unknown_files,
      mode,
      changed,
      dependent,
    })
  }

  fn is_ignored(&self, file: &Path) -> bool {
    let file = normalize(file);
    self.settings.ignored_paths.iter().any(|prefix| file.starts_with(prefix))
  }

  fn check_known(&self, module: &str) -> AffectedResult<()> {
    if self.graph.contains(module) {
      Ok(())
    } else {
      Err(
        DetectorError::UnknownModule {
          module: module.to_string(),
        }
        .into(),
      )
    }
  }
}

/// Treats every module as changed. Used when detection is switched off.
pub struct AcceptAllDetector {
  graph: ProjectGraph,
}

/// The detector handed to every consumer. The variant is fixed at
/// construction from `DetectorSettings::enabled`.
pub enum AffectedModuleDetector {
  Selective(Box<SelectiveDetector>),
  AcceptAll(AcceptAllDetector),
}

impl AffectedModuleDetector {
  pub fn new(graph: ProjectGraph, git: Box<dyn GitClient>, settings: DetectorSettings) -> AffectedResult<Self> {
    if settings.enabled {
      Ok(Self::Selective(Box::new(SelectiveDetector::new(graph, git, settings)?)))
    } else {
      tracing::info!("affected module detection disabled, every module is included");
      Ok(Self::AcceptAll(AcceptAllDetector { graph }))
    }
  }

  /// Classification of a single module.
  pub fn classify(&self, module: &str) -> AffectedResult<ProjectSubset> {
    match self {
      Self::Selective(detector) => {
        detector.check_known(module)?;
        Ok(detector.classification()?.subset(module))
      }
      Self::AcceptAll(_) => Ok(ProjectSubset::Changed),
    }
  }

  /// Should tasks of `module` run in this build?
  pub fn should_include(&self, module: &str) -> AffectedResult<bool> {
    match self {
      Self::Selective(detector) => Ok(detector.settings.scope.includes(self.classify(module)?)),
      Self::AcceptAll(_) => Ok(true),
    }
  }

  /// Modules in the requested scope.
  pub fn affected_modules(&self) -> AffectedResult<BTreeSet<String>> {
    match self {
      Self::Selective(detector) => Ok(detector.classification()?.modules_in(detector.settings.scope)),
      Self::AcceptAll(detector) => Ok(detector.graph.module_paths()),
    }
  }

  /// Full detection result; `None` when detection is disabled.
  pub fn classification(&self) -> AffectedResult<Option<&Classification>> {
    match self {
      Self::Selective(detector) => detector.classification().map(Some),
      Self::AcceptAll(_) => Ok(None),
    }
  }

  /// Every module known to the build, affected or not.
  pub fn all_modules(&self) -> BTreeSet<String> {
    self.graph().module_paths()
  }

  /// Direct dependencies of a module, sorted.
  pub fn dependencies(&self, module: &str) -> AffectedResult<Vec<String>> {
    self.graph().direct_dependencies(module)
  }

  /// Root directory of a module, relative to the work tree.
  pub fn module_dir(&self, module: &str) -> Option<&Path> {
    self.graph().module(module).map(|m| m.dir.as_path())
  }

  fn graph(&self) -> &ProjectGraph {
    match self {
      Self::Selective(detector) => &detector.graph,
      Self::AcceptAll(detector) => &detector.graph,
    }
  }

  pub fn scope(&self) -> Scope {
    match self {
      Self::Selective(detector) => detector.settings.scope,
      Self::AcceptAll(_) => Scope::AllAffected,
    }
  }

  pub fn is_enabled(&self) -> bool {
    matches!(self, Self::Selective(_))
  }
}
