//! `cargo affected classify` and `cargo affected include`
//!
//! `classify` prints the tier of each module. `include` is the task guard:
//! it prints `true`/`false` and its exit status tells a task runner whether to
//! run the module's tasks (0 = run, 1 = skip). Errors exit 2 or 3, never 1.

use crate::core::context::BuildContext;
use crate::core::error::AffectedResult;

/// Run the classify command
pub fn run_classify(ctx: &BuildContext, modules: Vec<String>, json: bool) -> AffectedResult<()> {
  let detector = ctx.detector()?;

  let mut results = Vec::with_capacity(modules.len());
  for module in modules {
    let subset = ctx.classify(&module)?;
    let included = ctx.should_include(&module)?;
    // Accept-all mode classifies modules it has never seen; they have no edges.
    let dependencies = if detector.is_enabled() || detector.all_modules().contains(&module) {
      detector.dependencies(&module)?
    } else {
      Vec::new()
    };
    results.push((module, subset, included, dependencies));
  }

  if json {
    let output: Vec<_> = results
      .iter()
      .map(|(module, subset, included, dependencies)| {
        serde_json::json!({
          "module": module,
          "classification": subset,
          "included": included,
          "dependencies": dependencies,
        })
      })
      .collect();
    println!("{}", serde_json::to_string_pretty(&output)?);
  } else {
    for (module, subset, included, dependencies) in &results {
      let marker = if *included { "✅" } else { "⏭ " };
      println!("{} {}: {}", marker, module, subset);
      if !dependencies.is_empty() {
        println!("     depends on: {}", dependencies.join(", "));
      }
    }
  }

  Ok(())
}

/// Run the include command. Returns whether the module is in scope.
pub fn run_include(ctx: &BuildContext, module: String) -> AffectedResult<bool> {
  let included = ctx.should_include(&module)?;
  println!("{}", included);
  Ok(included)
}
