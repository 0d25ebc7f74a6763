//! CLI commands for cargo-affected
//!
//! - **list**: Changed / dependent / selected modules
//! - **classify**: Classification of specific modules
//! - **include**: Task guard, exit status says whether a module runs
//! - **changed-files**: Baseline and raw diff
//! - **plan**: Test tiers per module
//! - **run**: Run a command for every affected module
//!
//! All commands accept `&BuildContext` so the detector is built once.

pub mod affected;
pub mod changed_files;
pub mod classify;
pub mod plan;
pub mod run;

pub use affected::run_list;
pub use changed_files::run_changed_files;
pub use classify::{run_classify, run_include};
pub use plan::run_plan;
pub use run::run_run;
