pub mod check;
pub mod repair;
pub mod stats;

use std::path::PathBuf;

use clap::Args;
use modelx_core::config::ModelConfig;
use modelx_engine::Controller;
use modelx_store::SqliteStore;

/// Arguments shared by every command
#[derive(Debug, Args)]
pub struct ModelArgs {
    /// Path to the model file
    #[arg(long)]
    pub db: PathBuf,

    /// Optional TOML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Open an existing model file; the commands never create one
pub fn open_model(
    args: &ModelArgs,
    config: &ModelConfig,
) -> Result<Controller<SqliteStore>, Box<dyn std::error::Error>> {
    if !args.db.exists() {
        return Err(format!("model file not found: {}", args.db.display()).into());
    }
    tracing::debug!(db = %args.db.display(), "opening model");
    Ok(Controller::open(&args.db, config)?)
}
