mod commands;
mod core;
mod detector;
mod graph;

use clap::{Parser, Subcommand};
use core::context::{BuildContext, Overrides};
use core::error::{AffectedError, ExitCode, print_error};
use detector::Scope;

/// Build and test only the modules a change can affect
#[derive(Parser)]
#[command(name = "cargo")]
#[command(bin_name = "cargo")]
#[command(styles = get_styles())]
enum CargoCli {
  Affected(AffectedCli),
}

#[derive(Parser)]
#[command(name = "affected")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(styles = get_styles())]
struct AffectedCli {
  /// Commit to diff against (default: last merge commit reachable from HEAD)
  #[arg(long, global = true)]
  baseline: Option<String>,

  /// Disable detection; every module is treated as changed
  #[arg(long, global = true)]
  no_detect: bool,

  /// Ignore uncommitted and untracked changes
  #[arg(long, global = true)]
  committed_only: bool,

  /// Only select modules that were changed directly
  #[arg(long, global = true, conflicts_with = "dependent_only")]
  changed_only: bool,

  /// Only select modules affected through their dependencies
  #[arg(long, global = true)]
  dependent_only: bool,

  /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
  #[arg(short, long, global = true, action = clap::ArgAction::Count)]
  verbose: u8,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Show changed, dependent and selected modules
  List {
    /// Output format: text (default), json, names-only
    #[arg(long, default_value = "text")]
    format: String,
    /// Also list modules that are not affected
    #[arg(short, long)]
    all: bool,
  },

  /// Classify specific modules as changed, dependent or none
  Classify {
    /// Module paths (crate names for Cargo workspaces)
    #[arg(required = true)]
    modules: Vec<String>,
    /// Output results in JSON format
    #[arg(long)]
    json: bool,
  },

  /// Exit 0 if a module should be built, 1 if it can be skipped, 2+ on error
  Include {
    /// Module path (crate name for Cargo workspaces)
    module: String,
  },

  /// Show the baseline commit and the files changed since it
  ChangedFiles {
    /// Output results in JSON format
    #[arg(long)]
    json: bool,
  },

  /// Show which test tiers each module should run
  Plan {
    /// Output format: text (default), json, names-only
    #[arg(long, default_value = "text")]
    format: String,
  },

  /// Run a command once per selected module ({module} and {dir} are substituted)
  Run {
    /// Show the commands without executing them
    #[arg(long)]
    dry_run: bool,
    /// Command to run
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
    command: Vec<String>,
  },
}

fn get_styles() -> clap::builder::Styles {
  let yellow = anstyle::Color::Ansi(anstyle::AnsiColor::Yellow);
  let green = anstyle::Color::Ansi(anstyle::AnsiColor::Green);
  let red = anstyle::Color::Ansi(anstyle::AnsiColor::Red);

  clap::builder::Styles::styled()
    .usage(anstyle::Style::new().bold().underline().fg_color(Some(yellow)))
    .header(anstyle::Style::new().bold().underline().fg_color(Some(yellow)))
    .literal(anstyle::Style::new().fg_color(Some(green)))
    .invalid(anstyle::Style::new().bold().fg_color(Some(red)))
    .error(anstyle::Style::new().bold().fg_color(Some(red)))
    .valid(anstyle::Style::new().bold().underline().fg_color(Some(green)))
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

fn main() {
  let CargoCli::Affected(cli) = CargoCli::parse();
  core::logging::init(cli.verbose);

  let workspace_root = match std::env::current_dir() {
    Ok(dir) => dir,
    Err(e) => handle_error(AffectedError::Io(e).context("Failed to get current directory")),
  };

  let overrides = Overrides {
    baseline: cli.baseline,
    disable: cli.no_detect,
    committed_only: cli.committed_only,
    scope: Scope::from_flags(cli.changed_only, cli.dependent_only),
  };

  let ctx = match BuildContext::build(&workspace_root, &overrides) {
    Ok(ctx) => ctx,
    Err(e) => handle_error(e),
  };

  let result = match cli.command {
    Commands::List { format, all } => commands::run_list(&ctx, format, all),
    Commands::Classify { modules, json } => commands::run_classify(&ctx, modules, json),
    Commands::Include { module } => match commands::run_include(&ctx, module) {
      Ok(true) => Ok(()),
      Ok(false) => std::process::exit(ExitCode::Skip.as_i32()),
      Err(e) => Err(e),
    },
    Commands::ChangedFiles { json } => commands::run_changed_files(&ctx, json),
    Commands::Plan { format } => commands::run_plan(&ctx, format),
    Commands::Run { dry_run, command } => commands::run_run(&ctx, dry_run, command),
  };

  if let Err(err) = result {
    handle_error(err);
  }
}

fn handle_error(err: AffectedError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
