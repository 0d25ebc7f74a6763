//! Module graph
//!
//! Built on petgraph for direct control and minimal abstraction. Providers
//! describe modules; `ProjectGraph` answers ownership and reachability.

pub mod project_graph;
pub mod provider;

pub use project_graph::{ModuleSpec, ProjectGraph};
