//! Row statistics command

use clap::Args;
use modelx_core::config::ModelConfig;
use modelx_core::model::Table;
use modelx_core::store::Reader;

use super::{open_model, ModelArgs};

#[derive(Debug, Args)]
pub struct StatsArgs {
    #[command(flatten)]
    pub model: ModelArgs,
}

pub fn execute(args: StatsArgs, config: &ModelConfig) -> Result<(), Box<dyn std::error::Error>> {
    let controller = open_model(&args.model, config)?;
    for table in Table::ALL {
        let count = controller.store().count_rows(table)?;
        println!("{:<16} {}", table.name(), count);
    }
    controller.close();
    Ok(())
}
