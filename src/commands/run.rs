//! `cargo affected run` - Run a command for every affected module
//!
//! The command is run once per module in scope, from the workspace root, with
//! placeholders substituted in every argument:
//!
//! - `{module}`: module path (crate name for Cargo workspaces)
//! - `{dir}`: absolute module directory
//!
//! Modules out of scope are skipped. Failures are collected and reported at
//! the end so one broken module doesn't hide the others.

use crate::core::context::BuildContext;
use crate::core::error::{AffectedError, AffectedResult};
use std::path::Path;
use std::process::Command;

/// Run the run command
pub fn run_run(ctx: &BuildContext, dry_run: bool, command: Vec<String>) -> AffectedResult<()> {
  let Some((program, args)) = command.split_first() else {
    return Err(AffectedError::with_help(
      "No command given",
      "Pass the command after `--`, e.g. `cargo affected run -- cargo test -p {module}`",
    ));
  };

  let detector = ctx.detector()?;
  let mut targets = Vec::new();
  let mut skipped = 0usize;
  for module in detector.all_modules() {
    if detector.should_include(&module)? {
      targets.push(module);
    } else {
      tracing::debug!(%module, "module not affected, skipping");
      skipped += 1;
    }
  }

  if targets.is_empty() {
    println!("✅ No affected modules ({} skipped)", skipped);
    println!("   Nothing to run");
    return Ok(());
  }

  println!("🎯 {} affected modules, {} skipped", targets.len(), skipped);

  let mut invocations = Vec::with_capacity(targets.len());
  for module in &targets {
    let dir = ctx
      .module_dir(module)?
      .map(|d| d.display().to_string())
      .unwrap_or_default();
    let argv: Vec<String> = args.iter().map(|a| substitute(a, module, &dir)).collect();
    invocations.push((module, substitute(program, module, &dir), argv));
  }

  if dry_run {
    println!("\nDRY RUN: Would execute:");
    for (_, program, argv) in &invocations {
      println!("  {} {}", program, argv.join(" "));
    }
    return Ok(());
  }

  println!();
  let mut failed = Vec::new();
  for (module, program, argv) in &invocations {
    println!("Running for {} ...", module);
    if !execute(ctx.workspace_root(), program, argv)? {
      eprintln!("❌ Failed for {}", module);
      failed.push(module.to_string());
    } else {
      println!("✅ {} passed", module);
    }
    println!();
  }

  if !failed.is_empty() {
    return Err(AffectedError::message(format!(
      "Command failed for {} module(s): {}",
      failed.len(),
      failed.join(", ")
    )));
  }

  println!("✅ All affected modules completed successfully");
  Ok(())
}

fn execute(cwd: &Path, program: &str, args: &[String]) -> AffectedResult<bool> {
  let status = Command::new(program)
    .current_dir(cwd)
    .args(args)
    .status()
    .map_err(|e| AffectedError::message(format!("Failed to execute {}: {}", program, e)))?;
  Ok(status.success())
}

fn substitute(arg: &str, module: &str, dir: &str) -> String {
  arg.replace("{module}", module).replace("{dir}", dir)
}
