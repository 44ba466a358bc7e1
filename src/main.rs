use clap::Parser;
use eps_parser::cli::{args::Args, commands};
use std::process;

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    // If no subcommand was provided, show help and available commands
    if args.command.is_none() {
        show_help_and_commands();
        process::exit(0);
    }

    match commands::run(args) {
        Ok(()) => process::exit(0),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("EPS Parser - Experiment Planning Software file reader");
    println!("=====================================================");
    println!();
    println!("Parse EDF, ITL and EVF planning files into fixed-schema tables.");
    println!();
    println!("USAGE:");
    println!("    eps <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    inspect     Show metadata, tables and includes of one file");
    println!("    check       Check time windows and include files");
    println!("    export      Write one table to Parquet or CSV");
    println!("    merge       Merge an ITL timeline with its includes");
    println!("    help        Show this help message or help for specific commands");
    println!();
    println!("OPTIONS:");
    println!("    -v, --verbose            Increase logging verbosity");
    println!("    -q, --quiet              Suppress output except errors");
    println!("        --time-format <F>    auto, elapsed or absolute");
    println!("    -h, --help               Show help information");
    println!("    -V, --version            Show version information");
    println!();
    println!("EXAMPLES:");
    println!("    eps inspect MAG.edf --rows 5");
    println!("    eps check plans/ --strict");
    println!("    eps export MAG.edf --table modes --output modes.parquet");
    println!("    eps merge ROOT.itl --output timeline.csv --format csv");
    println!();
    println!("For detailed help on any command, use:");
    println!("    eps <COMMAND> --help");
}
