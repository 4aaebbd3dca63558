//! ModelX CLI
//!
//! Command-line surface over a SQLite model file

use clap::{Parser, Subcommand};
use modelx_core::config::ModelConfig;
use modelx_core::logging_facility;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "modelx")]
#[command(about = "ModelX - Structural model consistency tools", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scan the model for invariant violations without fixing them
    Check(commands::check::CheckArgs),
    /// Scan the model and fix invariant violations
    Repair(commands::repair::RepairArgs),
    /// Row counts per table
    Stats(commands::stats::StatsArgs),
}

impl Commands {
    fn model(&self) -> &commands::ModelArgs {
        match self {
            Commands::Check(args) => &args.model,
            Commands::Repair(args) => &args.model,
            Commands::Stats(args) => &args.model,
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = ModelConfig::load_or_default(cli.command.model().config.as_deref())?;
    logging_facility::init(config.logging.profile);

    match cli.command {
        Commands::Check(args) => commands::check::execute(args, &config),
        Commands::Repair(args) => commands::repair::execute(args, &config),
        Commands::Stats(args) => commands::stats::execute(args, &config),
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
