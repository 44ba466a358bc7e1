//! Shared helpers for CLI commands
//!
//! Logging setup, input discovery and table export used by several
//! subcommands.

use crate::cli::args::{Args, ExportFormat};
use crate::models::FileKind;
use crate::table::RectangularTable;
use anyhow::{Context, Result};
use polars::prelude::*;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Set up structured logging from the global flags
pub fn setup_logging(args: &Args) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    // Create filter
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("eps_parser={}", log_level)));

    if args.quiet {
        // Minimal logging for quiet mode
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()
            .context("Failed to initialize logging")?;
    } else {
        // Standard logging with timestamps
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .context("Failed to initialize logging")?;
    }

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Expand files and directories into the EPS files they contain, sorted
pub fn collect_input_files(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for path in paths {
        // Explicit files are taken as given, whatever the extension
        if path.is_file() {
            files.push(path.clone());
            continue;
        }

        for entry in WalkDir::new(path) {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if path.is_file() && FileKind::from_path(path).is_some() {
                        files.push(path.to_path_buf());
                    }
                }
                Err(e) => {
                    warn!("Error walking directory {}: {}", path.display(), e);
                }
            }
        }
    }

    files.sort();
    files.dedup();
    files
}

/// Write a table through polars, returning the number of rows written
pub fn write_table(table: &RectangularTable, output: &Path, format: ExportFormat) -> Result<usize> {
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    // Time columns become Datetime(ms) here
    let mut df = table
        .to_dataframe()
        .with_context(|| format!("Failed to build dataframe for table {}", table.name()))?;
    let mut file = File::create(output)
        .with_context(|| format!("Failed to create output file {}", output.display()))?;

    match format {
        ExportFormat::Parquet => {
            ParquetWriter::new(&mut file)
                .finish(&mut df)
                .with_context(|| format!("Failed to write Parquet file {}", output.display()))?;
        }
        ExportFormat::Csv => {
            CsvWriter::new(&mut file)
                .include_header(true)
                .finish(&mut df)
                .with_context(|| format!("Failed to write CSV file {}", output.display()))?;
        }
    }

    debug!("Wrote {} rows to {}", df.height(), output.display());
    Ok(df.height())
}
