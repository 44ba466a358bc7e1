//! Inspect command: one-screen summary of a parsed file

use crate::cli::args::InspectArgs;
use crate::config::ParserConfig;
use crate::document::ParsedDocument;
use crate::table::RectangularTable;
use anyhow::{Context, Result};
use colored::*;
use tracing::info;

pub fn run_inspect(args: &InspectArgs, config: &ParserConfig) -> Result<()> {
    info!("Inspecting {}", args.file.display());
    let doc = ParsedDocument::load(&args.file, config)
        .with_context(|| format!("Failed to parse {}", args.file.display()))?;

    println!(
        "{} {}",
        format!("{} file", doc.kind()).bright_green().bold(),
        doc.path().display().to_string().bright_white()
    );

    if !doc.metadata().is_empty() {
        println!("\n{}", "Metadata".bright_yellow());
        for (key, value) in doc.metadata().iter() {
            println!("  {} {}", format!("{}:", key).bright_cyan(), value);
        }
    }

    let times = [
        ("Ref_date:", doc.reference_date()),
        ("Start_time:", doc.start_time()),
        ("End_time:", doc.end_time()),
    ];
    if times.iter().any(|(_, t)| t.is_some()) {
        println!("\n{}", "Window".bright_yellow());
        for (label, time) in times {
            if let Some(time) = time {
                println!("  {} {}", label.bright_cyan(), time);
            }
        }
    }

    println!("\n{}", "Tables".bright_yellow());
    for table in doc.tables() {
        let rows = table.height().to_string();
        let rows = if table.is_empty() {
            rows.dimmed()
        } else {
            rows.bright_white().bold()
        };
        println!("  {:<18} {} rows", table.name().bright_cyan(), rows);
    }

    if !doc.includes().is_empty() {
        println!("\n{}", "Includes".bright_yellow());
        for include in doc.includes() {
            match &include.raw_time {
                Some(time) => println!("  {} at {}", include.file_name, time),
                None => println!("  {}", include.file_name),
            }
        }
    }

    if !doc.variables().is_empty() {
        println!("\n{}", "Variables".bright_yellow());
        for (key, value) in doc.variables().iter() {
            println!("  {} {}", format!("{}:", key).bright_cyan(), value);
        }
    }

    println!(
        "\n  {} {}",
        "Unclassified lines:".bright_cyan(),
        doc.unclassified().len()
    );

    if args.rows > 0 {
        for table in doc.tables().into_iter().filter(|t| !t.is_empty()) {
            print_rows(table, args.rows);
        }
    }

    Ok(())
}

fn print_rows(table: &RectangularTable, limit: usize) {
    println!("\n{}", table.name().bright_green().bold());
    println!("  {}", table.columns().join(" | ").bright_cyan());
    for row in table.rows().iter().take(limit) {
        let cells: Vec<&str> = row.iter().map(|c| c.as_deref().unwrap_or("-")).collect();
        println!("  {}", cells.join(" | "));
    }
    if table.height() > limit {
        println!("  {}", format!("... {} more", table.height() - limit).dimmed());
    }
}
