//! Integration tests for the widening rules: no baseline, unowned files,
//! co-built groups and always-build modules

use crate::helpers::{TestWorkspace, run_cargo_affected, run_cargo_affected_raw, selected};
use anyhow::Result;

#[test]
fn test_no_merge_commit_builds_everything() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.write_file(
    "affected.toml",
    r#"
[[modules]]
path = ":a"
dir = "a"

[[modules]]
path = ":b"
dir = "b"
"#,
  )?;
  ws.write_file("a/src/Main.kt", "// a\n")?;
  ws.write_file("b/src/Main.kt", "// b\n")?;
  ws.commit("Linear history only")?;

  assert_eq!(selected(&ws.path, &["--changed-only"])?, vec![":a", ":b"]);

  let output = run_cargo_affected(&ws.path, &["list", "--format", "json"])?;
  let json: serde_json::Value = serde_json::from_slice(&output.stdout)?;
  assert_eq!(json["classification"]["baseline"], serde_json::Value::Null);
  assert_eq!(json["classification"]["mode"]["reason"], "no_baseline");

  Ok(())
}

#[test]
fn test_unowned_file_widens_to_dependents() -> Result<()> {
  let ws = TestWorkspace::abc()?;
  ws.write_file("a/src/Main.kt", "// changed\n")?;
  ws.write_file("build-logic/settings.gradle", "// shared\n")?;

  assert_eq!(selected(&ws.path, &[])?, vec![":a", ":b", ":c"]);
  assert_eq!(selected(&ws.path, &["--changed-only"])?, vec![":a"]);
  assert_eq!(selected(&ws.path, &["--dependent-only"])?, vec![":b", ":c"]);

  let output = run_cargo_affected(&ws.path, &["changed-files", "--json"])?;
  let json: serde_json::Value = serde_json::from_slice(&output.stdout)?;
  assert_eq!(
    json["unknown_files"],
    serde_json::json!(["build-logic/settings.gradle"])
  );

  Ok(())
}

#[test]
fn test_ignored_paths_do_not_widen() -> Result<()> {
  let ws = TestWorkspace::declared(
    &[(":a", "a", ""), (":b", "b", ":a")],
    r#"ignored_paths = ["docs"]"#,
  )?;
  ws.write_file("docs/guide.md", "# Guide\n")?;

  assert!(selected(&ws.path, &[])?.is_empty());

  let output = run_cargo_affected(&ws.path, &["changed-files"])?;
  assert!(String::from_utf8_lossy(&output.stdout).contains("- docs/guide.md"));

  Ok(())
}

#[test]
fn test_cobuilt_group_is_changed_together() -> Result<()> {
  let ws = TestWorkspace::declared(
    &[(":app", "app", ""), (":app-test", "app-test", ""), (":lib", "lib", "")],
    r#"cobuilt = [[":app", ":app-test"]]"#,
  )?;
  ws.write_file("app/src/Main.kt", "// changed\n")?;

  assert_eq!(selected(&ws.path, &["--changed-only"])?, vec![":app", ":app-test"]);

  Ok(())
}

#[test]
fn test_partial_cobuilt_group_is_rejected() -> Result<()> {
  let ws = TestWorkspace::declared(
    &[(":app", "app", ""), (":lib", "lib", "")],
    r#"cobuilt = [[":app", ":app-test"]]"#,
  )?;
  ws.write_file("lib/src/Main.kt", "// changed\n")?;

  let output = run_cargo_affected_raw(&ws.path, &["list"])?;
  assert!(!output.status.success());
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains(":app-test"), "got: {}", stderr);

  Ok(())
}

#[test]
fn test_always_build_module() -> Result<()> {
  let ws = TestWorkspace::declared(
    &[(":a", "a", ""), (":smoke", "smoke", ":a"), (":c", "c", "")],
    r#"always_build = [":c"]"#,
  )?;

  assert_eq!(selected(&ws.path, &["--changed-only"])?, vec![":c"]);

  ws.write_file("a/src/Main.kt", "// changed\n")?;
  assert_eq!(selected(&ws.path, &[])?, vec![":a", ":c", ":smoke"]);

  Ok(())
}

#[test]
fn test_ignored_path_covering_repository_is_rejected() -> Result<()> {
  let ws = TestWorkspace::declared(&[(":a", "a", ""), (":b", "b", ":a")], r#"ignored_paths = ["."]"#)?;
  ws.write_file("a/src/Main.kt", "// changed\n")?;

  let output = run_cargo_affected_raw(&ws.path, &["list", "--format", "names"])?;
  assert_eq!(output.status.code(), Some(2));
  assert!(output.stdout.is_empty());
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("ignored_paths"), "got: {}", stderr);

  Ok(())
}
