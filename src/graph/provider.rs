//! Build graph providers
//!
//! A provider turns whatever describes the build (a Cargo workspace, or the
//! `[[modules]]` tables of affected.toml) into `ModuleSpec`s whose directories
//! are relative to the git work tree, which is what git reports paths against.

use super::project_graph::ModuleSpec;
use crate::core::config::ModuleConfig;
use crate::core::error::{AffectedResult, ConfigError};
use cargo_metadata::MetadataCommand;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Workspace members of a Cargo workspace, keyed by crate name.
///
/// Edges are dependencies of any kind (normal, dev, build) between members.
/// Dependencies outside the workspace are not modules and are dropped.
pub fn cargo_modules(workspace_root: &Path, work_tree: &Path) -> AffectedResult<Vec<ModuleSpec>> {
  let metadata = MetadataCommand::new()
    .manifest_path(workspace_root.join("Cargo.toml"))
    .no_deps()
    .exec()?;

  let members = metadata.workspace_packages();
  let member_names: HashSet<String> = members
    .iter()
    .map(|pkg| {
      let name: &str = pkg.name.as_ref();
      name.to_string()
    })
    .collect();

  let mut specs = Vec::with_capacity(members.len());
  for package in members {
    let name: &str = package.name.as_ref();
    let crate_root = package
      .manifest_path
      .parent()
      .map(|p| p.as_std_path().to_path_buf())
      .unwrap_or_else(|| workspace_root.to_path_buf());

    let mut spec = ModuleSpec::new(name, relative_to_work_tree(name, &crate_root, work_tree)?);
    for dep in &package.dependencies {
      if member_names.contains(dep.name.as_str()) && dep.name != name && !spec.dependencies.contains(&dep.name) {
        spec = spec.depends_on(dep.name.clone());
      }
    }
    specs.push(spec);
  }

  tracing::debug!(modules = specs.len(), "loaded cargo workspace modules");
  Ok(specs)
}

/// Modules declared in affected.toml.
///
/// A declared module whose directory is missing from the checkout (partial
/// checkouts) is skipped, and edges pointing at it are dropped. Edges to
/// modules that were never declared stay and fail graph construction.
pub fn declared_modules(
  modules: &[ModuleConfig],
  workspace_root: &Path,
  work_tree: &Path,
) -> AffectedResult<Vec<ModuleSpec>> {
  let mut absent = HashSet::new();
  let mut specs = Vec::with_capacity(modules.len());

  for module in modules {
    let dir = workspace_root.join(&module.dir);
    if !dir.exists() {
      tracing::debug!(module = %module.path, dir = %dir.display(), "module directory absent, skipping");
      absent.insert(module.path.as_str());
      continue;
    }

    specs.push(ModuleSpec {
      path: module.path.clone(),
      dir: relative_to_work_tree(&module.path, &dir, work_tree)?,
      dependencies: module.dependencies.clone(),
    });
  }

  for spec in &mut specs {
    spec.dependencies.retain(|dep| !absent.contains(dep.as_str()));
  }

  Ok(specs)
}

/// Express `dir` relative to the work tree. Both sides are canonicalized when
/// possible so symlinked temp dirs still line up with `git rev-parse`.
fn relative_to_work_tree(module: &str, dir: &Path, work_tree: &Path) -> AffectedResult<PathBuf> {
  let dir = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
  let work_tree = work_tree.canonicalize().unwrap_or_else(|_| work_tree.to_path_buf());

  dir
    .strip_prefix(&work_tree)
    .map(Path::to_path_buf)
    .map_err(|_| {
      ConfigError::OutsideWorkTree {
        module: module.to_string(),
        dir: dir.clone(),
      }
      .into()
    })
}
