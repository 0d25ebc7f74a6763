//! System git backend - zero dependencies
//!
//! Every query is one plumbing/porcelain subprocess with machine-readable
//! output. Any non-zero exit or unexpected output is an error: an empty diff
//! that should not be empty would silently shrink the build.

use super::GitClient;
use crate::core::error::{AffectedResult, GitError, ResultExt};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Git backend using system git (zero crate dependencies)
pub struct SystemGit {
  /// Repository working directory
  pub(crate) repo_path: PathBuf,

  /// Working tree root
  pub(crate) work_tree: PathBuf,
}

impl SystemGit {
  /// Open a git repository
  ///
  /// This performs ONE subprocess call to get the repository metadata.
  pub fn open(path: &Path) -> AffectedResult<Self> {
    let output = Command::new("git")
      .arg("-C")
      .arg(path)
      .args(["rev-parse", "--show-toplevel"])
      .output()
      .context("Failed to execute git rev-parse")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      if stderr.contains("not a git repository") {
        return Err(
          GitError::RepoNotFound {
            path: path.to_path_buf(),
          }
          .into(),
        );
      }
      return Err(
        GitError::CommandFailed {
          command: "git rev-parse --show-toplevel".to_string(),
          stderr: stderr.to_string(),
        }
        .into(),
      );
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let work_tree = PathBuf::from(stdout.trim());
    let work_tree = work_tree.canonicalize().unwrap_or(work_tree);

    Ok(Self {
      repo_path: path.to_path_buf(),
      work_tree,
    })
  }

  /// Working tree root (canonical)
  pub fn work_tree(&self) -> &Path {
    &self.work_tree
  }

  /// Run git and return stdout, failing on non-zero exit
  fn run(&self, args: &[&str]) -> AffectedResult<String> {
    let command = format!("git {}", args.join(" "));
    tracing::debug!(%command, "running git");

    let output: Output = self
      .git_cmd()
      .args(args)
      .output()
      .with_context(|| format!("Failed to execute {}", command))?;

    if !output.status.success() {
      return Err(
        GitError::CommandFailed {
          command,
          stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
        .into(),
      );
    }

    String::from_utf8(output.stdout).map_err(|e| {
      GitError::MalformedOutput {
        command,
        output: String::from_utf8_lossy(e.as_bytes()).to_string(),
      }
      .into()
    })
  }

  /// Create a safe git command with isolated environment
  ///
  /// - Sets working directory to repo path
  /// - Clears environment variables
  /// - Whitelists only PATH and HOME
  /// - Adds safe configuration overrides
  pub(crate) fn git_cmd(&self) -> Command {
    let mut cmd = Command::new("git");

    cmd.arg("-C").arg(&self.repo_path);

    // Isolated environment (don't trust global config)
    cmd.env_clear();
    if let Ok(path) = std::env::var("PATH") {
      cmd.env("PATH", path);
    }
    if let Ok(home) = std::env::var("HOME") {
      cmd.env("HOME", home);
    }

    cmd.arg("-c").arg("core.quotePath=false"); // Don't escape non-ASCII

    cmd
  }
}

impl GitClient for SystemGit {
  fn find_previous_merge_commit(&self) -> AffectedResult<Option<String>> {
    let stdout = self.run(&["log", "-1", "--merges", "--format=%H", "HEAD"])?;
    parse_merge_commit(&stdout, "git log -1 --merges --format=%H HEAD")
  }

  fn find_changed_files_since(&self, sha: &str, include_uncommitted: bool) -> AffectedResult<Vec<PathBuf>> {
    let mut files = BTreeSet::new();

    if include_uncommitted {
      // Working tree against the baseline covers committed + staged + unstaged
      let diff = self.run(&["diff", "--name-only", "-z", "--no-renames", sha, "--"])?;
      files.extend(parse_name_list(&diff));

      let untracked = self.run(&["ls-files", "-z", "--others", "--exclude-standard", "--full-name", "--", ":/"])?;
      files.extend(parse_name_list(&untracked));
    } else {
      let diff = self.run(&["diff", "--name-only", "-z", "--no-renames", sha, "HEAD", "--"])?;
      files.extend(parse_name_list(&diff));
    }

    Ok(files.into_iter().collect())
  }

  fn resolve_commit(&self, rev: &str) -> AffectedResult<String> {
    let spec = format!("{}^{{commit}}", rev);
    let output = self
      .git_cmd()
      .args(["rev-parse", "--verify", "--quiet", &spec])
      .output()
      .context("Failed to execute git rev-parse")?;

    if !output.status.success() {
      return Err(GitError::CommitNotFound { sha: rev.to_string() }.into());
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let sha = stdout.trim();
    if !is_object_id(sha) {
      return Err(
        GitError::MalformedOutput {
          command: format!("git rev-parse --verify {}", spec),
          output: stdout.to_string(),
        }
        .into(),
      );
    }
    Ok(sha.to_string())
  }
}

/// Parse the single line printed by `git log -1 --format=%H`.
fn parse_merge_commit(stdout: &str, command: &str) -> AffectedResult<Option<String>> {
  let mut lines = stdout.lines().map(str::trim).filter(|l| !l.is_empty());

  let Some(sha) = lines.next() else {
    return Ok(None);
  };

  if !is_object_id(sha) || lines.next().is_some() {
    return Err(
      GitError::MalformedOutput {
        command: command.to_string(),
        output: stdout.to_string(),
      }
      .into(),
    );
  }

  Ok(Some(sha.to_string()))
}

/// Parse NUL-terminated paths, as printed by `diff --name-only -z` and
/// `ls-files -z`. Paths are verbatim: no C-quoting, tabs and newlines kept.
fn parse_name_list(stdout: &str) -> impl Iterator<Item = PathBuf> + '_ {
  stdout.split('\0').filter(|p| !p.is_empty()).map(PathBuf::from)
}

/// SHA-1 (40) or SHA-256 (64) hex object id
fn is_object_id(s: &str) -> bool {
  (s.len() == 40 || s.len() == 64) && s.chars().all(|c| c.is_ascii_hexdigit())
}
