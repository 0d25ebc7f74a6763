//! `cargo affected plan` - Test tiers per module
//!
//! Changed modules run small, medium and large tests; dependent modules run
//! small and medium; everything else is skipped.

use super::affected::OutputFormat;
use crate::core::context::BuildContext;
use crate::core::error::AffectedResult;
use crate::detector::TestPlan;

pub fn run_plan(ctx: &BuildContext, format: String) -> AffectedResult<()> {
  let output_format = OutputFormat::parse(&format)?;
  let plan = TestPlan::build(ctx.detector()?)?;

  match output_format {
    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&plan)?),
    OutputFormat::NamesOnly => {
      for entry in plan.scheduled() {
        println!("{}", entry.module);
      }
    }
    OutputFormat::Text => {
      println!("🎯 Test Plan");
      println!();
      for entry in plan.scheduled() {
        let tiers: Vec<String> = entry.tiers.iter().map(|t| t.to_string()).collect();
        println!("  {} ({}): {}", entry.module, entry.subset, tiers.join(", "));
      }
      let skipped = plan.entries.len() - plan.scheduled().count();
      println!();
      println!("{} modules scheduled, {} skipped", plan.entries.len() - skipped, skipped);
    }
  }

  Ok(())
}
