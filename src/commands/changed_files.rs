//! `cargo affected changed-files` - Show the baseline and the raw diff
//!
//! Diagnostic view of what the detector saw, including files it ignored and
//! files no module owns.

use crate::core::context::BuildContext;
use crate::core::error::AffectedResult;

pub fn run_changed_files(ctx: &BuildContext, json: bool) -> AffectedResult<()> {
  let detector = ctx.detector()?;

  let Some(classification) = detector.classification()? else {
    if json {
      println!("{}", serde_json::json!({ "enabled": false }));
    } else {
      println!("Detection disabled: no diff computed");
    }
    return Ok(());
  };

  if json {
    let output = serde_json::json!({
      "enabled": true,
      "baseline": classification.baseline,
      "changed_files": classification.changed_files,
      "ignored_files": classification.ignored_files,
      "unknown_files": classification.unknown_files,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    return Ok(());
  }

  match &classification.baseline {
    Some(sha) => println!("Baseline: {}", sha),
    None => println!("Baseline: none (no merge commit found, every module is changed)"),
  }

  for file in &classification.changed_files {
    let marker = if classification.unknown_files.contains(file) {
      "?"
    } else {
      "M"
    };
    println!("{} {}", marker, file.display());
  }
  for file in &classification.ignored_files {
    println!("- {}", file.display());
  }

  Ok(())
}
