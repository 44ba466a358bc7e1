//! Merge command: ITL timeline with all includes folded in

use crate::cli::args::MergeArgs;
use crate::cli::commands::shared::write_table;
use crate::config::ParserConfig;
use crate::itl::ItlDocument;
use anyhow::{Context, Result};
use colored::*;

pub fn run_merge(args: &MergeArgs, config: &ParserConfig) -> Result<()> {
    let mut config = config.clone();
    if let Some(depth) = args.max_depth {
        config = config.with_max_include_depth(depth);
    }
    if args.strict {
        config = config.with_strict_time_bounds();
    }

    let root = ItlDocument::load(&args.file, &config)
        .with_context(|| format!("Failed to parse {}", args.file.display()))?;
    let merged = root
        .merge_includes()
        .with_context(|| format!("Failed to merge includes of {}", args.file.display()))?;

    let rows = write_table(merged.table(), &args.output, args.format)?;

    println!(
        "{} {} events from {} files to {}",
        "Merged".bright_green().bold(),
        rows.to_string().bright_white(),
        merged.sources.len().to_string().bright_white(),
        args.output.display()
    );
    for missing in &merged.missing {
        println!("  {} {}", "Missing include:".bright_yellow(), missing);
    }
    Ok(())
}
