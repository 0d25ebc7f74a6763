//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// A throwaway git repository to run cargo-affected in
pub struct TestWorkspace {
  _root: TempDir,
  pub path: PathBuf,
}

impl TestWorkspace {
  /// Create an empty repository on `main` with an initial commit
  pub fn new() -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().to_path_buf();

    git(&path, &["init", "--initial-branch=main"])?;
    git(&path, &["config", "user.name", "Test User"])?;
    git(&path, &["config", "user.email", "test@example.com"])?;
    git(&path, &["config", "commit.gpgsign", "false"])?;

    std::fs::write(path.join(".gitignore"), "target/\nCargo.lock\n")?;
    git(&path, &["add", "."])?;
    git(&path, &["commit", "-m", "Initial commit"])?;

    Ok(Self { _root: root, path })
  }

  /// Repository with declared modules `:a`, `:b` (depends on `:a`) and `:c`,
  /// committed and merged so HEAD sits on a merge commit.
  pub fn abc() -> Result<Self> {
    Self::declared(
      &[(":a", "a", ""), (":b", "b", ":a"), (":c", "c", "")],
      "",
    )
  }

  /// Repository with the given declared modules `(path, dir, deps)` plus extra
  /// `[detector]` TOML. `deps` is whitespace separated; an empty `dir` is the
  /// repository root. Every module gets a
  /// source file, and the setup lands via a merge commit.
  pub fn declared(modules: &[(&str, &str, &str)], detector: &str) -> Result<Self> {
    let ws = Self::new()?;

    let mut toml = String::from("[graph]\nprovider = \"declared\"\n\n");
    if !detector.is_empty() {
      toml.push_str("[detector]\n");
      toml.push_str(detector);
      toml.push_str("\n\n");
    }
    for (path, dir, deps) in modules {
      toml.push_str("[[modules]]\n");
      toml.push_str(&format!("path = \"{}\"\n", path));
      toml.push_str(&format!("dir = \"{}\"\n", dir));
      let deps: Vec<String> = deps.split_whitespace().map(|d| format!("\"{}\"", d)).collect();
      toml.push_str(&format!("dependencies = [{}]\n\n", deps.join(", ")));
    }

    let mut files = vec![("affected.toml".to_string(), toml)];
    for (path, dir, _) in modules {
      let source = Path::new(dir).join("src/Main.kt");
      files.push((source.to_string_lossy().into_owned(), format!("// {}\n", path)));
    }
    let files: Vec<(&str, &str)> = files.iter().map(|(p, c)| (p.as_str(), c.as_str())).collect();
    ws.merge_feature("setup", &files)?;

    Ok(ws)
  }

  /// Write files on a feature branch and merge it into main with `--no-ff`
  pub fn merge_feature(&self, branch: &str, files: &[(&str, &str)]) -> Result<String> {
    git(&self.path, &["checkout", "-b", branch])?;
    for (file, content) in files {
      self.write_file(file, content)?;
    }
    self.commit(&format!("Add {}", branch))?;
    git(&self.path, &["checkout", "main"])?;
    git(&self.path, &["merge", "--no-ff", "-m", &format!("Merge {}", branch), branch])?;
    self.head()
  }

  /// Write a file relative to the repository root, creating parent dirs
  pub fn write_file(&self, file: &str, content: &str) -> Result<()> {
    let file_path = self.path.join(file);
    if let Some(parent) = file_path.parent() {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::write(file_path, content)?;
    Ok(())
  }

  /// Commit current changes
  pub fn commit(&self, message: &str) -> Result<String> {
    git(&self.path, &["add", "."])?;
    git(&self.path, &["commit", "-m", message])?;
    self.head()
  }

  pub fn head(&self) -> Result<String> {
    let output = git(&self.path, &["rev-parse", "HEAD"])?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  /// Add a crate under `crates/` with path dependencies on other crates
  pub fn add_crate(&self, name: &str, deps: &[&str]) -> Result<PathBuf> {
    let crate_path = self.path.join("crates").join(name);
    std::fs::create_dir_all(crate_path.join("src"))?;

    let mut cargo_toml = format!(
      r#"[package]
name = "{}"
version = "0.1.0"
edition = "2021"

[dependencies]
"#,
      name
    );
    for dep in deps {
      cargo_toml.push_str(&format!("{} = {{ path = \"../{}\" }}\n", dep, dep));
    }

    std::fs::write(crate_path.join("Cargo.toml"), cargo_toml)?;
    std::fs::write(crate_path.join("src/lib.rs"), format!("//! {} crate\n", name))?;

    Ok(crate_path)
  }
}

/// Run git command in a directory
pub fn git(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = Command::new("git")
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run git command")?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    anyhow::bail!("Git command failed: git {}\n{}", args.join(" "), stderr);
  }

  Ok(output)
}

/// Run cargo-affected without checking the exit status
pub fn run_cargo_affected_raw(cwd: &Path, args: &[&str]) -> Result<Output> {
  let bin = env!("CARGO_BIN_EXE_cargo-affected");

  Command::new(bin)
    .current_dir(cwd)
    .arg("affected")
    .args(args)
    .env_remove("RUST_LOG")
    .output()
    .context("Failed to run cargo-affected")
}

/// Run cargo-affected and fail unless it exits successfully
pub fn run_cargo_affected(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = run_cargo_affected_raw(cwd, args)?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    anyhow::bail!(
      "cargo-affected command failed: cargo affected {}\nstdout: {}\nstderr: {}",
      args.join(" "),
      stdout,
      stderr
    );
  }

  Ok(output)
}

/// Selected module names, one per line, from `list --format names`
pub fn selected(cwd: &Path, args: &[&str]) -> Result<Vec<String>> {
  let mut full = vec!["list", "--format", "names"];
  full.extend_from_slice(args);
  let output = run_cargo_affected(cwd, &full)?;
  Ok(
    String::from_utf8_lossy(&output.stdout)
      .lines()
      .map(String::from)
      .collect(),
  )
}
