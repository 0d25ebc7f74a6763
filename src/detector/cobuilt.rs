//! Co-built groups: modules that are always scheduled together.

use crate::core::error::{AffectedResult, ConfigError};
use crate::graph::ProjectGraph;
use std::collections::BTreeSet;

/// Keep the groups whose members are all present in the graph.
///
/// A group that is entirely absent is dropped (partial checkouts). A group
/// that is only partly present is an error.
pub fn resolve_groups(groups: &[BTreeSet<String>], graph: &ProjectGraph) -> AffectedResult<Vec<BTreeSet<String>>> {
  let mut resolved = Vec::with_capacity(groups.len());

  for group in groups {
    let missing: Vec<String> = group.iter().filter(|m| !graph.contains(m)).cloned().collect();

    if missing.is_empty() {
      resolved.push(group.clone());
    } else if missing.len() == group.len() {
      tracing::debug!(group = ?group, "co-built group absent from checkout, ignoring");
    } else {
      return Err(
        ConfigError::PartialCobuiltGroup {
          group: group.iter().cloned().collect(),
          missing,
        }
        .into(),
      );
    }
  }

  Ok(resolved)
}

/// Close `seed` over `groups`: any group touching the set is pulled in whole,
/// repeated until nothing new is added.
pub fn close_over_groups(seed: &BTreeSet<String>, groups: &[BTreeSet<String>]) -> BTreeSet<String> {
  let mut result = seed.clone();

  loop {
    let mut added = false;
    for group in groups {
      if group.iter().any(|m| result.contains(m)) {
        for member in group {
          added |= result.insert(member.clone());
        }
      }
    }
    if !added {
      return result;
    }
  }
}
