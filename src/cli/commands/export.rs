//! Export command: one table to Parquet or CSV

use crate::cli::args::ExportArgs;
use crate::cli::commands::shared::write_table;
use crate::config::ParserConfig;
use crate::document::ParsedDocument;
use anyhow::{Context, Result};
use colored::*;

pub fn run_export(args: &ExportArgs, config: &ParserConfig) -> Result<()> {
    let doc = ParsedDocument::load(&args.file, config)
        .with_context(|| format!("Failed to parse {}", args.file.display()))?;
    let table = doc.table(&args.table).with_context(|| {
        let names: Vec<&str> = doc.tables().iter().map(|t| t.name()).collect();
        format!("Available tables: {}", names.join(", "))
    })?;

    let rows = write_table(table, &args.output, args.format)?;

    println!(
        "{} {} rows of {} to {}",
        "Exported".bright_green().bold(),
        rows.to_string().bright_white(),
        table.name().bright_cyan(),
        args.output.display()
    );
    Ok(())
}
