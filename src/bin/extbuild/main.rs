//! extbuild CLI - Drive CMake to build native Python extensions

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use extbuild::core::errors::exit_code_for;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(exit_code_for(&e));
    }
}

fn run() -> Result<()> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("extbuild=debug")
    } else if cli.quiet {
        EnvFilter::new("extbuild=warn")
    } else {
        EnvFilter::new("extbuild=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    // Execute command
    match cli.command {
        Commands::BuildExt(args) => commands::build_ext::execute(args),
        Commands::Test(args) => commands::test::execute(args),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
