//! Command-line argument definitions for the EPS parser
//!
//! This module defines the CLI interface using clap derive API. Logging
//! and time-format flags are global and apply to every subcommand.

use crate::config::{ParserConfig, TimeFormat};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for the EPS planning-file parser
///
/// Reads EDF, ITL and EVF files produced by the Experiment Planning
/// Software and exposes their tables for inspection, validation and export.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "eps",
    version,
    about = "Parse EPS experiment description, timeline and event files",
    long_about = "Parses the EDF, ITL and EVF text formats of the Experiment Planning Software \
                  into fixed-schema tables. Tables can be inspected, checked for consistency \
                  against their declared time window and includes, and exported to Parquet or CSV."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        global = true,
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Suppress output (quiet mode)
    ///
    /// Only show errors. Overrides verbose settings.
    #[arg(
        short = 'q',
        long = "quiet",
        global = true,
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,

    /// How time tokens are told apart
    #[arg(
        long = "time-format",
        value_name = "FORMAT",
        global = true,
        default_value = "auto",
        help = "Time token format: auto, elapsed or absolute"
    )]
    pub time_format: TimeFormat,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Show metadata, tables and includes of one file
    Inspect(InspectArgs),
    /// Check time windows and include files
    Check(CheckArgs),
    /// Write one table to Parquet or CSV
    Export(ExportArgs),
    /// Merge an ITL timeline with its includes and write the result
    Merge(MergeArgs),
}

#[derive(Debug, Clone, Parser)]
pub struct InspectArgs {
    /// EDF, ITL or EVF file
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Print the first rows of every non-empty table
    #[arg(long = "rows", value_name = "N", default_value_t = 0)]
    pub rows: usize,
}

#[derive(Debug, Clone, Parser)]
pub struct CheckArgs {
    /// Files or directories to check; directories are walked recursively
    #[arg(value_name = "PATH", required = true)]
    pub paths: Vec<PathBuf>,

    /// Fail on events outside the declared time window
    #[arg(long = "strict", help = "Treat out-of-window events as errors")]
    pub strict: bool,
}

#[derive(Debug, Clone, Parser)]
pub struct ExportArgs {
    /// EDF, ITL or EVF file
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Table name, e.g. `modes` or `itl_events`
    #[arg(short = 't', long = "table", value_name = "NAME")]
    pub table: String,

    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output: PathBuf,

    #[arg(long = "format", value_enum, default_value = "parquet")]
    pub format: ExportFormat,
}

#[derive(Debug, Clone, Parser)]
pub struct MergeArgs {
    /// Root ITL file
    #[arg(value_name = "ITL")]
    pub file: PathBuf,

    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output: PathBuf,

    #[arg(long = "format", value_enum, default_value = "parquet")]
    pub format: ExportFormat,

    /// Maximum include nesting
    #[arg(long = "max-depth", value_name = "N")]
    pub max_depth: Option<usize>,

    /// Fail on included events outside their declared time window
    #[arg(long = "strict")]
    pub strict: bool,
}

/// Table output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    /// Apache Parquet
    Parquet,
    /// Comma-separated values with header
    Csv,
}

impl Args {
    /// Get log level based on verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }

    /// Check if we should show progress bars (not in quiet mode)
    pub fn show_progress(&self) -> bool {
        !self.quiet
    }

    /// Parser configuration from the global flags
    pub fn parser_config(&self) -> ParserConfig {
        ParserConfig::default().with_time_format(self.time_format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_export_command() {
        let args = Args::parse_from([
            "eps", "export", "inst.edf", "--table", "modes", "-o", "modes.csv", "--format", "csv",
        ]);
        match args.command {
            Some(Commands::Export(export)) => {
                assert_eq!(export.table, "modes");
                assert_eq!(export.format, ExportFormat::Csv);
                assert_eq!(export.output, PathBuf::from("modes.csv"));
            }
            other => panic!("expected export command, got {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = Args::parse_from(["eps", "check", "plans/", "--strict", "-vv", "--time-format", "elapsed"]);
        assert_eq!(args.get_log_level(), "debug");
        assert_eq!(args.time_format, TimeFormat::Elapsed);
        assert_eq!(args.parser_config().time_format, TimeFormat::Elapsed);
        match args.command {
            Some(Commands::Check(check)) => {
                assert!(check.strict);
                assert_eq!(check.paths, vec![PathBuf::from("plans/")]);
            }
            other => panic!("expected check command, got {:?}", other),
        }
    }

    #[test]
    fn test_log_level() {
        let mut args = Args::parse_from(["eps"]);
        assert!(args.command.is_none());
        assert_eq!(args.get_log_level(), "warn");
        assert!(args.show_progress());

        args.verbose = 1;
        assert_eq!(args.get_log_level(), "info");
        args.verbose = 3;
        assert_eq!(args.get_log_level(), "trace");

        args.quiet = true;
        assert_eq!(args.get_log_level(), "error");
        assert!(!args.show_progress());
    }
}
