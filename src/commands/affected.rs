//! `cargo affected list` - Show which modules are affected by changes
//!
//! Prints the changed modules, their transitive dependents, and the modules
//! selected by the requested scope (`--changed-only`, `--dependent-only`, or
//! both tiers by default).

use crate::core::context::BuildContext;
use crate::core::error::{AffectedError, AffectedResult};
use crate::detector::{AffectedModuleDetector, Classification, DetectionMode};
use serde_json::json;

/// Output format for list/plan commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
  Text,
  Json,
  NamesOnly,
}

impl OutputFormat {
  pub fn parse(s: &str) -> AffectedResult<Self> {
    match s.to_lowercase().as_str() {
      "text" => Ok(Self::Text),
      "json" => Ok(Self::Json),
      "names" | "names-only" => Ok(Self::NamesOnly),
      _ => Err(AffectedError::message(format!(
        "Unknown format '{}'. Valid formats: text, json, names-only",
        s
      ))),
    }
  }
}

/// Run the list command
pub fn run_list(ctx: &BuildContext, format: String, all: bool) -> AffectedResult<()> {
  let output_format = OutputFormat::parse(&format)?;
  let detector = ctx.detector()?;

  match output_format {
    OutputFormat::Text => display_text(detector, all),
    OutputFormat::Json => display_json(detector),
    OutputFormat::NamesOnly => display_names_only(detector, all),
  }
}

/// Display results in human-readable text format
fn display_text(detector: &AffectedModuleDetector, all: bool) -> AffectedResult<()> {
  println!("Affected Modules");
  println!("================");
  println!();

  let selected = detector.affected_modules()?;

  match detector.classification()? {
    None => {
      println!("Detection disabled: every module is included");
      println!();
    }
    Some(classification) => display_classification(classification),
  }

  println!("Selected ({}): {} modules", detector.scope(), selected.len());
  for module in &selected {
    println!("  🎯 {}", module);
  }

  if all {
    println!();
    println!("All modules:");
    for module in detector.all_modules() {
      println!("  {:<10} {}", detector.classify(&module)?.to_string(), module);
    }
  }

  Ok(())
}

fn display_classification(classification: &Classification) {
  match &classification.baseline {
    Some(sha) => println!("Baseline: {}", sha),
    None => println!("Baseline: none (no merge commit found)"),
  }

  println!("Changed files: {}", classification.changed_files.len());
  if !classification.changed_files.is_empty() && classification.changed_files.len() <= 20 {
    for file in &classification.changed_files {
      println!("  {}", file.display());
    }
  }
  if !classification.ignored_files.is_empty() {
    println!("Ignored files: {}", classification.ignored_files.len());
  }
  println!();

  match classification.mode {
    DetectionMode::Selective => {}
    DetectionMode::BuildAll(reason) => {
      println!("⚠  Building everything ({:?})", reason);
      for file in &classification.unknown_files {
        println!("  ?  {}", file.display());
      }
      println!();
    }
  }

  println!("Changed: {} modules", classification.changed.len());
  for module in &classification.changed {
    println!("  📦 {}", module);
  }
  println!();

  println!("Dependent: {} modules", classification.dependent.len());
  for module in &classification.dependent {
    println!("  ⬆  {}", module);
  }
  println!();
}

/// Display results in JSON format
fn display_json(detector: &AffectedModuleDetector) -> AffectedResult<()> {
  let selected: Vec<_> = detector.affected_modules()?.into_iter().collect();

  let output = json!({
      "enabled": detector.is_enabled(),
      "scope": detector.scope(),
      "classification": detector.classification()?,
      "selected": selected,
      "summary": {
          "modules_count": detector.all_modules().len(),
          "selected_count": selected.len(),
      }
  });

  println!("{}", serde_json::to_string_pretty(&output)?);

  Ok(())
}

/// Display only module names (the selected scope, or every module with `--all`)
fn display_names_only(detector: &AffectedModuleDetector, all: bool) -> AffectedResult<()> {
  let modules = if all {
    detector.all_modules()
  } else {
    detector.affected_modules()?
  };

  for module in modules {
    println!("{}", module);
  }

  Ok(())
}
