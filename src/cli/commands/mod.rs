//! Command implementations for the EPS parser CLI
//!
//! Each subcommand lives in its own module; this module only dispatches.

pub mod check;
pub mod export;
pub mod inspect;
pub mod merge;
pub mod shared;

use crate::cli::args::{Args, Commands};
use anyhow::Result;
use shared::setup_logging;

/// Main command runner
///
/// Sets up logging from the global flags, then hands over to the
/// subcommand handler:
/// - `inspect`: document summary
/// - `check`: consistency checks over files and directories
/// - `export`: one table to Parquet or CSV
/// - `merge`: merged ITL timeline to Parquet or CSV
pub fn run(args: Args) -> Result<()> {
    setup_logging(&args)?;
    let config = args.parser_config();

    match &args.command {
        Some(Commands::Inspect(inspect_args)) => inspect::run_inspect(inspect_args, &config),
        Some(Commands::Check(check_args)) => {
            check::run_check(check_args, &config, args.show_progress())
        }
        Some(Commands::Export(export_args)) => export::run_export(export_args, &config),
        Some(Commands::Merge(merge_args)) => merge::run_merge(merge_args, &config),
        None => Ok(()),
    }
}
