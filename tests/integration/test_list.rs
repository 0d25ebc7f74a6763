//! Integration tests for `cargo affected list`

use crate::helpers::{TestWorkspace, run_cargo_affected, selected};
use anyhow::Result;

#[test]
fn test_list_nothing_changed() -> Result<()> {
  let ws = TestWorkspace::abc()?;

  assert!(selected(&ws.path, &[])?.is_empty());

  Ok(())
}

#[test]
fn test_list_change_selects_dependents() -> Result<()> {
  let ws = TestWorkspace::abc()?;
  ws.write_file("a/src/Main.kt", "// changed\n")?;

  assert_eq!(selected(&ws.path, &[])?, vec![":a", ":b"]);
  assert_eq!(selected(&ws.path, &["--changed-only"])?, vec![":a"]);
  assert_eq!(selected(&ws.path, &["--dependent-only"])?, vec![":b"]);

  Ok(())
}

#[test]
fn test_list_leaf_change_has_no_dependents() -> Result<()> {
  let ws = TestWorkspace::abc()?;
  ws.write_file("b/src/Main.kt", "// changed\n")?;

  assert_eq!(selected(&ws.path, &[])?, vec![":b"]);
  assert!(selected(&ws.path, &["--dependent-only"])?.is_empty());

  Ok(())
}

#[test]
fn test_list_untracked_file_counts() -> Result<()> {
  let ws = TestWorkspace::abc()?;
  ws.write_file("c/src/New.kt", "// new\n")?;

  assert_eq!(selected(&ws.path, &[])?, vec![":c"]);

  Ok(())
}

#[test]
fn test_list_committed_only_skips_working_tree() -> Result<()> {
  let ws = TestWorkspace::abc()?;
  ws.write_file("a/src/Main.kt", "// committed\n")?;
  ws.commit("Change a")?;
  ws.write_file("c/src/Main.kt", "// uncommitted\n")?;

  assert_eq!(selected(&ws.path, &[])?, vec![":a", ":b", ":c"]);
  assert_eq!(selected(&ws.path, &["--committed-only"])?, vec![":a", ":b"]);

  Ok(())
}

#[test]
fn test_list_baseline_override() -> Result<()> {
  let ws = TestWorkspace::abc()?;
  ws.merge_feature("touch-c", &[("c/src/Main.kt", "// merged\n")])?;
  ws.write_file("a/src/Main.kt", "// changed\n")?;
  ws.commit("Change a")?;

  // Last merge commit is the touch-c merge, so only :a's change is seen.
  assert_eq!(selected(&ws.path, &[])?, vec![":a", ":b"]);

  // Diffing against HEAD~2 (the setup merge) also sees the touch-c merge.
  let output = run_cargo_affected(&ws.path, &["list", "--format", "names", "--baseline", "HEAD~2"])?;
  let names: Vec<String> = String::from_utf8_lossy(&output.stdout).lines().map(String::from).collect();
  assert_eq!(names, vec![":a", ":b", ":c"]);

  Ok(())
}

#[test]
fn test_list_json_output() -> Result<()> {
  let ws = TestWorkspace::abc()?;
  ws.write_file("a/src/Main.kt", "// changed\n")?;

  let output = run_cargo_affected(&ws.path, &["list", "--format", "json"])?;
  let json: serde_json::Value = serde_json::from_slice(&output.stdout)?;

  assert_eq!(json["enabled"], true);
  assert_eq!(json["scope"], "all_affected");
  assert_eq!(json["classification"]["mode"]["mode"], "selective");
  assert_eq!(json["classification"]["changed"], serde_json::json!([":a"]));
  assert_eq!(json["classification"]["dependent"], serde_json::json!([":b"]));
  assert_eq!(json["selected"], serde_json::json!([":a", ":b"]));
  assert_eq!(json["summary"]["modules_count"], 3);

  Ok(())
}

#[test]
fn test_list_text_output() -> Result<()> {
  let ws = TestWorkspace::abc()?;
  ws.write_file("a/src/Main.kt", "// changed\n")?;

  let output = run_cargo_affected(&ws.path, &["list", "--all"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.contains("Changed: 1 modules"), "got: {}", stdout);
  assert!(stdout.contains("Dependent: 1 modules"), "got: {}", stdout);
  assert!(stdout.contains("a/src/Main.kt"), "got: {}", stdout);
  assert!(stdout.contains(":c"), "--all should list unaffected modules: {}", stdout);

  Ok(())
}

#[test]
fn test_list_scope_flags_conflict() -> Result<()> {
  let ws = TestWorkspace::abc()?;

  let result = run_cargo_affected(&ws.path, &["list", "--changed-only", "--dependent-only"]);
  assert!(result.is_err());

  Ok(())
}

#[test]
fn test_list_file_names_git_would_quote() -> Result<()> {
  let ws = TestWorkspace::declared(&[(":root", "", ""), (":a", "a", ""), (":b", "b", ":a")], "")?;

  // Untracked: reported by ls-files
  ws.write_file("a/src/we\"ird.kt", "// quoted\n")?;
  assert_eq!(selected(&ws.path, &["--changed-only"])?, vec![":a"]);

  // Committed: reported by diff
  ws.commit("Add file with a quote")?;
  ws.write_file("b/src/tab\there.kt", "// tab\n")?;
  ws.commit("Add file with a tab")?;
  assert_eq!(selected(&ws.path, &["--changed-only", "--committed-only"])?, vec![":a", ":b"]);
  assert_eq!(selected(&ws.path, &["--dependent-only"])?, Vec::<String>::new());

  Ok(())
}
