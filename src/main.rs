use clap::Parser;
use colored::Colorize;
use extlint_cli::{cli::Cli, run_command};
use std::process;

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    cli.init_logging();

    if let Err(e) = run_command(cli) {
        eprintln!("{} {}", "Error:".red().bold(), e);
        process::exit(1);
    }
}
