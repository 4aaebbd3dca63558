//! Consistency check command

use clap::Args;
use modelx_core::config::ModelConfig;

use super::{open_model, ModelArgs};

#[derive(Debug, Args)]
pub struct CheckArgs {
    #[command(flatten)]
    pub model: ModelArgs,
}

/// Dry-run repair; findings are reported, never fixed
pub fn execute(args: CheckArgs, config: &ModelConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut controller = open_model(&args.model, config)?;
    let report = controller.repair(true)?;

    if report.is_clean() {
        println!("Model is consistent");
    } else {
        for finding in &report.findings {
            println!("{}", finding);
        }
        println!("{} finding(s); run `modelx repair` to fix", report.found);
    }
    controller.close();
    Ok(())
}
