//! Integration tests for Cargo workspaces (modules discovered via cargo metadata)

use crate::helpers::{TestWorkspace, run_cargo_affected, selected};
use anyhow::Result;

fn cargo_workspace() -> Result<TestWorkspace> {
  let ws = TestWorkspace::new()?;
  ws.write_file(
    "Cargo.toml",
    r#"[workspace]
members = ["crates/*"]
resolver = "2"
"#,
  )?;
  ws.add_crate("lib-a", &[])?;
  ws.add_crate("lib-b", &["lib-a"])?;
  ws.add_crate("lib-c", &[])?;
  ws.add_crate("app", &["lib-b"])?;
  ws.commit("Add crates")?;
  ws.merge_feature("readme", &[("crates/lib-c/README.md", "# lib-c\n")])?;
  Ok(ws)
}

#[test]
fn test_cargo_transitive_dependents() -> Result<()> {
  let ws = cargo_workspace()?;
  ws.write_file("crates/lib-a/src/lib.rs", "//! changed\n")?;

  assert_eq!(selected(&ws.path, &["--changed-only"])?, vec!["lib-a"]);
  assert_eq!(selected(&ws.path, &["--dependent-only"])?, vec!["app", "lib-b"]);

  Ok(())
}

#[test]
fn test_cargo_non_source_file_still_owned() -> Result<()> {
  let ws = cargo_workspace()?;
  ws.write_file("crates/lib-c/README.md", "# lib-c, edited\n")?;

  assert_eq!(selected(&ws.path, &[])?, vec!["lib-c"]);

  Ok(())
}

#[test]
fn test_cargo_requires_workspace_root() -> Result<()> {
  let ws = cargo_workspace()?;
  ws.write_file("crates/app/src/lib.rs", "//! changed\n")?;

  let sub = ws.path.join("crates");
  let output = run_cargo_affected(&sub, &["list", "--format", "names"]);
  // No Cargo.toml or affected.toml in crates/, so discovery there must fail
  // loudly rather than report an empty set.
  assert!(output.is_err());

  assert_eq!(selected(&ws.path, &[])?, vec!["app"]);

  Ok(())
}
