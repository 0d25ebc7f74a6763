pub mod system_git;

pub use system_git::SystemGit;

use crate::core::error::AffectedResult;
use std::path::PathBuf;

/// What the detector needs to know from version control.
///
/// Paths are relative to the work tree root.
pub trait GitClient {
  /// Most recent merge commit reachable from HEAD, or `None` when history has
  /// no merge (shallow clones, fresh repositories).
  fn find_previous_merge_commit(&self) -> AffectedResult<Option<String>>;

  /// Files changed between `sha` and HEAD, or between `sha` and the working
  /// tree (plus untracked files) when `include_uncommitted` is set.
  fn find_changed_files_since(&self, sha: &str, include_uncommitted: bool) -> AffectedResult<Vec<PathBuf>>;

  /// Resolve a user-supplied revision to a full commit id.
  fn resolve_commit(&self, rev: &str) -> AffectedResult<String>;
}
