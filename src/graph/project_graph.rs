//! Module dependency graph built on petgraph
//!
//! ## Graph Structure
//!
//! - **Directed Graph**: `A → B` means "A depends on B"
//! - **Nodes**: Modules (path + directory relative to the work tree)
//! - **Index**: module path → node, module directory → node
//! - **Dependents cache**: reverse reachability per module, filled on demand
//!
//! The graph is immutable once built. The only interior mutability is the
//! dependents cache, which is single-threaded (`RefCell`).

use crate::core::error::{AffectedResult, ConfigError, DetectorError};
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::path::{Component, Path, PathBuf};

/// A module as handed over by a build graph provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleSpec {
  /// Module identifier, e.g. `:compose:ui:ui-graphics` or a crate name
  pub path: String,
  /// Root directory relative to the work tree (empty = work tree root)
  pub dir: PathBuf,
  /// Paths of the modules this one depends on
  pub dependencies: Vec<String>,
}

impl ModuleSpec {
  pub fn new(path: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
    Self {
      path: path.into(),
      dir: dir.into(),
      dependencies: Vec::new(),
    }
  }

  pub fn depends_on(mut self, dependency: impl Into<String>) -> Self {
    self.dependencies.push(dependency.into());
    self
  }
}

/// A module node in the dependency graph.
#[derive(Debug, Clone)]
pub struct ModuleNode {
  pub path: String,
  pub dir: PathBuf,
}

/// Module dependency graph.
pub struct ProjectGraph {
  /// Nodes: ModuleNode, edges: dependent → dependency
  graph: DiGraph<ModuleNode, ()>,

  /// Index: module path → node index
  path_to_node: HashMap<String, NodeIndex>,

  /// Index: module directory → node index
  dir_to_node: HashMap<PathBuf, NodeIndex>,

  /// Transitive dependents, memoized per module
  dependents_cache: RefCell<HashMap<NodeIndex, BTreeSet<String>>>,
}

impl ProjectGraph {
  /// Build the graph from provider output.
  ///
  /// Fails on duplicate module paths, two modules sharing a directory, and
  /// dependencies on modules that were never declared.
  pub fn build(specs: Vec<ModuleSpec>) -> AffectedResult<Self> {
    let mut graph = DiGraph::new();
    let mut path_to_node = HashMap::new();
    let mut dir_to_node: HashMap<PathBuf, NodeIndex> = HashMap::new();

    for spec in &specs {
      if path_to_node.contains_key(&spec.path) {
        return Err(ConfigError::DuplicateModule { path: spec.path.clone() }.into());
      }

      let dir = normalize(&spec.dir);
      if let Some(existing) = dir_to_node.get(&dir) {
        let first: &ModuleNode = &graph[*existing];
        return Err(
          ConfigError::OverlappingDirectory {
            dir,
            first: first.path.clone(),
            second: spec.path.clone(),
          }
          .into(),
        );
      }

      let node_idx = graph.add_node(ModuleNode {
        path: spec.path.clone(),
        dir: dir.clone(),
      });
      path_to_node.insert(spec.path.clone(), node_idx);
      dir_to_node.insert(dir, node_idx);
    }

    for spec in &specs {
      let from_idx = path_to_node[&spec.path];
      for dep in &spec.dependencies {
        let to_idx = path_to_node.get(dep).ok_or_else(|| ConfigError::UnknownDependency {
          module: spec.path.clone(),
          dependency: dep.clone(),
        })?;
        graph.update_edge(from_idx, *to_idx, ());
      }
    }

    Ok(Self {
      graph,
      path_to_node,
      dir_to_node,
      dependents_cache: RefCell::new(HashMap::new()),
    })
  }

  /// All module paths, sorted.
  pub fn module_paths(&self) -> BTreeSet<String> {
    self.path_to_node.keys().cloned().collect()
  }

  pub fn contains(&self, module: &str) -> bool {
    self.path_to_node.contains_key(module)
  }

  pub fn len(&self) -> usize {
    self.graph.node_count()
  }

  pub fn is_empty(&self) -> bool {
    self.graph.node_count() == 0
  }

  /// Look up a module node.
  pub fn module(&self, module: &str) -> Option<&ModuleNode> {
    self.path_to_node.get(module).map(|idx| &self.graph[*idx])
  }

  /// Direct dependencies of a module (what it uses).
  pub fn direct_dependencies(&self, module: &str) -> AffectedResult<Vec<String>> {
    let node_idx = self.find_node(module)?;

    let mut deps: Vec<String> = self
      .graph
      .neighbors_directed(node_idx, Direction::Outgoing)
      .map(|idx| self.graph[idx].path.clone())
      .collect();

    deps.sort();
    Ok(deps)
  }

  /// Every module that depends on `module`, directly or transitively.
  ///
  /// Breadth-first over incoming edges. The visited set makes cycles
  /// terminate, and the start module is never part of its own result.
  pub fn transitive_dependents(&self, module: &str) -> AffectedResult<BTreeSet<String>> {
    let start = self.find_node(module)?;

    if let Some(cached) = self.dependents_cache.borrow().get(&start) {
      return Ok(cached.clone());
    }

    let mut visited = HashSet::from([start]);
    let mut queue = VecDeque::from([start]);
    let mut dependents = BTreeSet::new();

    while let Some(node_idx) = queue.pop_front() {
      for neighbor_idx in self.graph.neighbors_directed(node_idx, Direction::Incoming) {
        if visited.insert(neighbor_idx) {
          dependents.insert(self.graph[neighbor_idx].path.clone());
          queue.push_back(neighbor_idx);
        }
      }
    }

    self.dependents_cache.borrow_mut().insert(start, dependents.clone());
    Ok(dependents)
  }

  /// Map a work-tree-relative file path to its owning module.
  ///
  /// Walks up the file's ancestors; the first directory owned by a module is
  /// the longest matching prefix, so `:foo:bar` wins over `:foo`.
  pub fn find_containing_module(&self, file_path: &Path) -> Option<&str> {
    let normalized = normalize(file_path);
    let mut current = normalized.as_path();

    loop {
      if let Some(idx) = self.dir_to_node.get(current) {
        return Some(self.graph[*idx].path.as_str());
      }
      current = current.parent()?;
    }
  }

  fn find_node(&self, module: &str) -> AffectedResult<NodeIndex> {
    self.path_to_node.get(module).copied().ok_or_else(|| {
      DetectorError::UnknownModule {
        module: module.to_string(),
      }
      .into()
    })
  }
}

/// Lexically normalize a relative path: drop `.` and leading `./`, resolve `..`.
pub(crate) fn normalize(path: &Path) -> PathBuf {
  let mut out = PathBuf::new();
  for component in path.components() {
    match component {
      Component::CurDir => {}
      Component::ParentDir => {
        out.pop();
      }
      other => out.push(other.as_os_str()),
    }
  }
  out
}
