use crate::core::error::{AffectedError, AffectedResult, ConfigError, ResultExt};
use crate::graph::project_graph::normalize;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Configuration for cargo-affected
/// Searched in order: affected.toml, .affected.toml, .cargo/affected.toml, .config/affected.toml
///
/// The file is optional. Without one, the module graph comes from the Cargo
/// workspace and the detector runs with defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AffectedConfig {
  #[serde(default)]
  pub detector: DetectorConfig,
  #[serde(default)]
  pub graph: GraphConfig,
  #[serde(default)]
  pub modules: Vec<ModuleConfig>,
}

/// Detector policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
  /// When false, every module is treated as changed (accept-all detector)
  #[serde(default = "default_true")]
  pub enabled: bool,

  /// Diff against this revision instead of the previous merge commit
  #[serde(default)]
  pub baseline: Option<String>,

  /// Count working-tree and untracked changes, not just commits
  #[serde(default = "default_true")]
  pub include_uncommitted: bool,

  /// Modules that are always treated as changed
  #[serde(default)]
  pub always_build: Vec<String>,

  /// Directories whose changes never affect any module (e.g. "docs")
  #[serde(default)]
  pub ignored_paths: Vec<PathBuf>,

  /// Groups of modules that are always classified together
  #[serde(default)]
  pub cobuilt: Vec<Vec<String>>,
}

fn default_true() -> bool {
  true
}

impl Default for DetectorConfig {
  fn default() -> Self {
    Self {
      enabled: true,
      baseline: None,
      include_uncommitted: true,
      always_build: Vec::new(),
      ignored_paths: Vec::new(),
      cobuilt: Vec::new(),
    }
  }
}

impl DetectorConfig {
  /// Validate detector configuration
  pub fn validate(&self) -> AffectedResult<()> {
    for group in &self.cobuilt {
      let unique: BTreeSet<_> = group.iter().collect();
      if unique.len() < 2 {
        return Err(
          ConfigError::InvalidValue {
            field: "detector.cobuilt".to_string(),
            reason: format!("group [{}] needs at least two distinct modules", group.join(", ")),
          }
          .into(),
        );
      }
    }

    if let Some(ref baseline) = self.baseline
      && baseline.trim().is_empty()
    {
      return Err(
        ConfigError::InvalidValue {
          field: "detector.baseline".to_string(),
          reason: "must not be empty".to_string(),
        }
        .into(),
      );
    }

    for path in &self.ignored_paths {
      let reason = if path.is_absolute() {
        Some("must be relative to the repository root")
      } else if path.components().any(|c| matches!(c, Component::ParentDir)) {
        Some("must not contain '..'")
      } else if normalize(path).as_os_str().is_empty() {
        // An empty prefix would match every file and hide every change
        Some("must name a directory below the repository root")
      } else {
        None
      };

      if let Some(reason) = reason {
        return Err(
          ConfigError::InvalidValue {
            field: "detector.ignored_paths".to_string(),
            reason: format!("'{}' {}", path.display(), reason),
          }
          .into(),
        );
      }
    }

    Ok(())
  }

  /// Co-built groups as sets
  pub fn cobuilt_groups(&self) -> Vec<BTreeSet<String>> {
    self
      .cobuilt
      .iter()
      .map(|group| group.iter().cloned().collect())
      .collect()
  }
}

/// Where the module graph comes from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphProvider {
  /// `[[modules]]` if any are declared, Cargo workspace otherwise
  #[default]
  Auto,
  /// Cargo workspace members via cargo metadata
  Cargo,
  /// `[[modules]]` tables in this file
  Declared,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphConfig {
  #[serde(default)]
  pub provider: GraphProvider,
}

/// A declared module
///
/// ```toml
/// [[modules]]
/// path = ":compose:ui:ui-graphics"
/// dir = "compose/ui/ui-graphics"
/// dependencies = [":compose:ui:ui-unit"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleConfig {
  pub path: String,
  /// Directory relative to the config's workspace root
  pub dir: PathBuf,
  #[serde(default)]
  pub dependencies: Vec<String>,
}

impl AffectedConfig {
  /// Find config file in search order: affected.toml, .affected.toml, .cargo/affected.toml, .config/affected.toml
  pub fn find_config_path(path: &Path) -> Option<PathBuf> {
    let candidates = [
      path.join("affected.toml"),
      path.join(".affected.toml"),
      path.join(".cargo").join("affected.toml"),
      path.join(".config").join("affected.toml"),
    ];

    candidates.into_iter().find(|p| p.exists())
  }

  /// Load config, falling back to defaults when no file exists
  pub fn load_or_default(path: &Path) -> AffectedResult<Self> {
    match Self::find_config_path(path) {
      Some(config_path) => Self::load_from(&config_path),
      None => Ok(Self::default()),
    }
  }

  /// Load and validate a specific config file
  pub fn load_from(config_path: &Path) -> AffectedResult<Self> {
    let content = fs::read_to_string(config_path)
      .with_context(|| format!("Failed to read config from {}", config_path.display()))?;
    let config = Self::parse(&content).with_context(|| format!("Invalid config in {}", config_path.display()))?;
    tracing::debug!(path = %config_path.display(), "loaded config");
    Ok(config)
  }

  /// Parse and validate config text
  pub fn parse(content: &str) -> AffectedResult<Self> {
    let config: AffectedConfig = toml_edit::de::from_str(content)?;
    config.validate()?;
    Ok(config)
  }

  pub fn validate(&self) -> AffectedResult<()> {
    self.detector.validate()?;

    if self.graph.provider == GraphProvider::Declared && self.modules.is_empty() {
      return Err(AffectedError::with_help(
        "graph.provider is 'declared' but no [[modules]] are declared",
        "Add [[modules]] tables or set graph.provider = \"cargo\"",
      ));
    }

    for module in &self.modules {
      if module.path.trim().is_empty() {
        return Err(
          ConfigError::InvalidValue {
            field: "modules.path".to_string(),
            reason: format!("module in '{}' has an empty path", module.dir.display()),
          }
          .into(),
        );
      }
      if module.dir.is_absolute() {
        return Err(
          ConfigError::InvalidValue {
            field: "modules.dir".to_string(),
            reason: format!("'{}' must be relative to the workspace root", module.dir.display()),
          }
          .into(),
        );
      }
    }

    Ok(())
  }

  /// Resolve `Auto` into a concrete provider
  pub fn effective_provider(&self) -> GraphProvider {
    match self.graph.provider {
      GraphProvider::Auto if self.modules.is_empty() => GraphProvider::Cargo,
      GraphProvider::Auto => GraphProvider::Declared,
      other => other,
    }
  }
}
