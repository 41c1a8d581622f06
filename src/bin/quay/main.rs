//! Quay CLI - inspect, build and install Python projects

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use quay::project::ProjectError;
use quay::util::diagnostic::emit;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        match e.downcast_ref::<ProjectError>() {
            Some(err) => emit(&err.to_diagnostic(), false),
            None => eprintln!("error: {:#}", e),
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("quay=debug")
    } else {
        EnvFilter::new("quay=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Show(args) => commands::show::execute(args),
        Commands::Install(args) => commands::install::execute(args),
        Commands::Uninstall(args) => commands::uninstall::execute(args),
        Commands::Wheel(args) => commands::wheel::execute(args),
        Commands::Download(args) => commands::download::execute(args),
    }
}
