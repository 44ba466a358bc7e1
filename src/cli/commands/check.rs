//! Check command: consistency checks over many files

use crate::cli::args::CheckArgs;
use crate::cli::commands::shared::collect_input_files;
use crate::config::ParserConfig;
use crate::consistency::{ConsistencyReport, check_document};
use crate::document::ParsedDocument;
use anyhow::{Context, Result, bail};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tracing::{error, info};

pub fn run_check(args: &CheckArgs, config: &ParserConfig, show_progress: bool) -> Result<()> {
    let config = if args.strict {
        config.clone().with_strict_time_bounds()
    } else {
        config.clone()
    };

    let files = collect_input_files(&args.paths);
    if files.is_empty() {
        bail!("No .edf, .itl or .evf files found");
    }
    info!("Checking {} files", files.len());

    let progress_bar = if show_progress {
        let pb = ProgressBar::new(files.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .context("Invalid progress bar template")?
                .progress_chars("#>-"),
        );
        pb.set_message("Checking files...");
        Some(pb)
    } else {
        None
    };

    let mut reports: Vec<ConsistencyReport> = Vec::new();
    let mut failures: Vec<(PathBuf, String)> = Vec::new();

    for file in &files {
        let outcome = ParsedDocument::load(file, &config).and_then(|doc| check_document(&doc, &config));
        match outcome {
            Ok(report) => reports.push(report),
            Err(e) => {
                error!("{}: {}", file.display(), e);
                failures.push((file.clone(), e.to_string()));
            }
        }
        if let Some(pb) = &progress_bar {
            pb.inc(1);
        }
    }

    if let Some(pb) = &progress_bar {
        pb.finish_with_message("Check complete");
    }

    print_summary(&reports, &failures);

    if !failures.is_empty() {
        bail!("{} of {} files failed", failures.len(), files.len());
    }
    Ok(())
}

fn print_summary(reports: &[ConsistencyReport], failures: &[(PathBuf, String)]) {
    println!("\n{}", "Check Summary".bright_green().bold());

    for report in reports.iter().filter(|r| !r.is_clean()) {
        println!(
            "  {} {}",
            "Warnings in".bright_yellow(),
            report.path.display()
        );
        for violation in &report.violations {
            println!("    {}", violation);
        }
        for missing in &report.missing_includes {
            println!("    {}", missing);
        }
    }
    for (path, message) in failures {
        println!("  {} {}: {}", "Failed".bright_red(), path.display(), message);
    }

    let warnings: usize = reports.iter().map(|r| r.warning_count()).sum();
    println!(
        "  {} {}",
        "Files checked:".bright_cyan(),
        (reports.len() + failures.len()).to_string().bright_white()
    );
    println!(
        "  {} {}",
        "Warnings:".bright_cyan(),
        warnings.to_string().bright_white()
    );
    if !failures.is_empty() {
        println!(
            "  {} {}",
            "Files failed:".bright_red(),
            failures.len().to_string().bright_red().bold()
        );
    }
}
