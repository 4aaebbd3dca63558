//! Repair command

use clap::Args;
use modelx_core::config::ModelConfig;

use super::{open_model, ModelArgs};

#[derive(Debug, Args)]
pub struct RepairArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    /// Report findings without writing
    #[arg(long)]
    pub dry_run: bool,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn execute(args: RepairArgs, config: &ModelConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut controller = open_model(&args.model, config)?;
    let report = controller.repair(args.dry_run)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for line in &report.log {
            println!("{}", line);
        }
        println!("found: {}", report.found);
        println!("fixed: {}", report.fixed);
    }
    controller.close();
    Ok(())
}
