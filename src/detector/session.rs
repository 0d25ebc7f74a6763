//! Detector lifecycle
//!
//! Modules are registered while the build graph is being assembled; the
//! detector only exists once the session is finalized. Any query before that
//! is `DetectorError::NotReady` rather than an answer computed from a partial
//! graph.

use super::affected::{AffectedModuleDetector, DetectorSettings};
use super::ProjectSubset;
use crate::core::error::{AffectedResult, DetectorError};
use crate::core::vcs::GitClient;
use crate::graph::{ModuleSpec, ProjectGraph};

pub struct DetectorSession {
  settings: DetectorSettings,
  git: Option<Box<dyn GitClient>>,
  modules: Vec<ModuleSpec>,
  detector: Option<AffectedModuleDetector>,
}

impl DetectorSession {
  pub fn new(settings: DetectorSettings, git: Box<dyn GitClient>) -> Self {
    Self {
      settings,
      git: Some(git),
      modules: Vec::new(),
      detector: None,
    }
  }

  /// Add a module to the graph under construction.
  pub fn register(&mut self, module: ModuleSpec) -> AffectedResult<()> {
    if self.detector.is_some() {
      return Err(DetectorError::AlreadyFinalized { module: module.path }.into());
    }
    self.modules.push(module);
    Ok(())
  }

  pub fn register_all(&mut self, modules: impl IntoIterator<Item = ModuleSpec>) -> AffectedResult<()> {
    for module in modules {
      self.register(module)?;
    }
    Ok(())
  }

  /// Freeze the module graph and construct the detector. Idempotent.
  pub fn finalize(&mut self) -> AffectedResult<&AffectedModuleDetector> {
    if self.detector.is_none() {
      let git = self.git.take().ok_or(DetectorError::NotReady)?;
      let graph = ProjectGraph::build(std::mem::take(&mut self.modules))?;
      if graph.is_empty() {
        tracing::warn!("no modules registered, nothing will be selected");
      }
      tracing::debug!(modules = graph.len(), "module graph finalized");
      self.detector = Some(AffectedModuleDetector::new(graph, git, self.settings.clone())?);
    }
    self.detector()
  }

  /// The detector, once the graph is finalized.
  pub fn detector(&self) -> AffectedResult<&AffectedModuleDetector> {
    self.detector.as_ref().ok_or_else(|| DetectorError::NotReady.into())
  }

  pub fn classify(&self, module: &str) -> AffectedResult<ProjectSubset> {
    self.detector()?.classify(module)
  }

  pub fn should_include(&self, module: &str) -> AffectedResult<bool> {
    self.detector()?.should_include(module)
  }
}
