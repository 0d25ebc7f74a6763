//! Error types for cargo-affected with contextual messages and exit codes
//!
//! Every failure that could make the detector answer with a scope that is too
//! narrow ends up here and aborts the run. Mapping gaps are not errors; they
//! widen the scope instead (see `detector`).

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for cargo-affected
///
/// `Skip` is reserved for `include` answering "not affected"; no error maps to
/// it, so a task guard never reads a failure as permission to skip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// `include`: module is out of scope
  Skip = 1,
  /// User error (config, invalid args, detector misuse)
  User = 2,
  /// System error (git, I/O)
  System = 3,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for cargo-affected
#[derive(Debug)]
pub enum AffectedError {
  /// Configuration errors
  Config(ConfigError),

  /// Git operation errors
  Git(GitError),

  /// Detector lifecycle and classification errors
  Detector(DetectorError),

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl AffectedError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    AffectedError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    AffectedError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Add context to an existing error
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      AffectedError::Message { message, context, help } => AffectedError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      AffectedError::Io(err) => AffectedError::Message {
        message: format!("I/O error: {}", err),
        context: Some(ctx_str),
        help: None,
      },
      _ => self,
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      AffectedError::Config(_) => ExitCode::User,
      AffectedError::Git(_) => ExitCode::System,
      AffectedError::Detector(_) => ExitCode::User,
      AffectedError::Io(_) => ExitCode::System,
      AffectedError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      AffectedError::Config(e) => e.help_message(),
      AffectedError::Git(e) => e.help_message(),
      AffectedError::Detector(e) => e.help_message(),
      AffectedError::Message { help, .. } => help.clone(),
      AffectedError::Io(_) => None,
    }
  }
}

impl fmt::Display for AffectedError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      AffectedError::Config(e) => write!(f, "{}", e),
      AffectedError::Git(e) => write!(f, "{}", e),
      AffectedError::Detector(e) => write!(f, "{}", e),
      AffectedError::Io(e) => write!(f, "I/O error: {}", e),
      AffectedError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for AffectedError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      AffectedError::Io(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for AffectedError {
  fn from(err: io::Error) -> Self {
    AffectedError::Io(err)
  }
}

impl From<ConfigError> for AffectedError {
  fn from(err: ConfigError) -> Self {
    AffectedError::Config(err)
  }
}

impl From<GitError> for AffectedError {
  fn from(err: GitError) -> Self {
    AffectedError::Git(err)
  }
}

impl From<DetectorError> for AffectedError {
  fn from(err: DetectorError) -> Self {
    AffectedError::Detector(err)
  }
}

impl From<cargo_metadata::Error> for AffectedError {
  fn from(err: cargo_metadata::Error) -> Self {
    AffectedError::message(format!("Cargo metadata error: {}", err))
  }
}

impl From<toml_edit::de::Error> for AffectedError {
  fn from(err: toml_edit::de::Error) -> Self {
    AffectedError::message(format!("TOML deserialization error: {}", err))
  }
}

impl From<serde_json::Error> for AffectedError {
  fn from(err: serde_json::Error) -> Self {
    AffectedError::message(format!("JSON error: {}", err))
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// Two modules registered under the same path
  DuplicateModule { path: String },

  /// Two modules claim the same directory
  OverlappingDirectory {
    dir: PathBuf,
    first: String,
    second: String,
  },

  /// A module depends on a module that was never declared
  UnknownDependency { module: String, dependency: String },

  /// A module directory lies outside the git work tree
  OutsideWorkTree { module: String, dir: PathBuf },

  /// Some, but not all, members of a co-built group are present
  PartialCobuiltGroup { group: Vec<String>, missing: Vec<String> },

  /// A field holds a value we cannot use
  InvalidValue { field: String, reason: String },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::UnknownDependency { dependency, .. } => Some(format!(
        "Declare '{}' under [[modules]] in affected.toml or remove it from the dependency list.",
        dependency
      )),
      ConfigError::PartialCobuiltGroup { .. } => Some(
        "Co-built groups must be entirely present or entirely absent. Check out the missing modules or fix [detector].cobuilt."
          .to_string(),
      ),
      ConfigError::OverlappingDirectory { .. } => {
        Some("Every directory can be owned by exactly one module.".to_string())
      }
      _ => None,
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::DuplicateModule { path } => write!(f, "Module '{}' is declared more than once", path),
      ConfigError::OverlappingDirectory { dir, first, second } => write!(
        f,
        "Modules '{}' and '{}' both claim directory '{}'",
        first,
        second,
        dir.display()
      ),
      ConfigError::UnknownDependency { module, dependency } => {
        write!(f, "Module '{}' depends on unknown module '{}'", module, dependency)
      }
      ConfigError::OutsideWorkTree { module, dir } => write!(
        f,
        "Module '{}' lives outside the git work tree: {}",
        module,
        dir.display()
      ),
      ConfigError::PartialCobuiltGroup { group, missing } => write!(
        f,
        "Co-built group [{}] is missing {}",
        group.join(", "),
        missing.join(", ")
      ),
      ConfigError::InvalidValue { field, reason } => write!(f, "Invalid value for {}: {}", field, reason),
    }
  }
}

/// Git operation errors
#[derive(Debug)]
pub enum GitError {
  /// Git command failed
  CommandFailed { command: String, stderr: String },

  /// Repository not found
  RepoNotFound { path: PathBuf },

  /// Revision does not resolve to a commit
  CommitNotFound { sha: String },

  /// Git printed something we cannot interpret
  MalformedOutput { command: String, output: String },
}

impl GitError {
  fn help_message(&self) -> Option<String> {
    match self {
      GitError::RepoNotFound { path } => Some(format!(
        "Run cargo affected from inside a git checkout (looked at {})",
        path.display()
      )),
      GitError::CommitNotFound { .. } => {
        Some("Check the baseline override, or fetch more history if this is a shallow clone.".to_string())
      }
      _ => None,
    }
  }
}

impl fmt::Display for GitError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GitError::CommandFailed { command, stderr } => {
        write!(f, "Git command failed: {}\n{}", command, stderr)
      }
      GitError::RepoNotFound { path } => {
        write!(f, "Git repository not found at: {}", path.display())
      }
      GitError::CommitNotFound { sha } => {
        write!(f, "Commit not found: {}", sha)
      }
      GitError::MalformedOutput { command, output } => {
        write!(f, "Unexpected output from {}: {:?}", command, output)
      }
    }
  }
}

/// Detector lifecycle errors
#[derive(Debug, PartialEq, Eq)]
pub enum DetectorError {
  /// Queried before every module was registered and the session finalized
  NotReady,

  /// Module registered after the session was finalized
  AlreadyFinalized { module: String },

  /// Queried for a module that is not part of the graph
  UnknownModule { module: String },
}

impl DetectorError {
  fn help_message(&self) -> Option<String> {
    match self {
      DetectorError::NotReady => {
        Some("Register all modules and call finalize() before classifying.".to_string())
      }
      DetectorError::UnknownModule { .. } => Some("List known modules with `cargo affected list --all`.".to_string()),
      DetectorError::AlreadyFinalized { .. } => None,
    }
  }
}

impl fmt::Display for DetectorError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      DetectorError::NotReady => write!(f, "Affected module detector queried before the module graph was finalized"),
      DetectorError::AlreadyFinalized { module } => {
        write!(f, "Cannot register module '{}': the module graph is already finalized", module)
      }
      DetectorError::UnknownModule { module } => write!(f, "Unknown module '{}'", module),
    }
  }
}

/// Result type alias for cargo-affected
pub type AffectedResult<T> = Result<T, AffectedError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> AffectedResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> AffectedResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<AffectedError>,
{
  fn context(self, ctx: impl Into<String>) -> AffectedResult<T> {
    self.map_err(|e| Into::<AffectedError>::into(e).context(ctx))
  }

  fn with_context<F>(self, f: F) -> AffectedResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| Into::<AffectedError>::into(e).context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &AffectedError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}
