//! Longtext CLI - justify long texts from the command line

mod cli;
mod commands;
mod input;

use clap::Parser;
use cli::{Cli, Commands, TierArgs};
use longtext::{
    types::LayoutOptions, LongtextError, Orchestrator, OrchestratorConfig, ValidationError,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Longtext(#[from] LongtextError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Usage(String),
}

impl From<ValidationError> for CliError {
    fn from(e: ValidationError) -> Self {
        CliError::Longtext(e.into())
    }
}

pub type Result<T> = std::result::Result<T, CliError>;

/// Start an orchestrator honoring the environment and the tier flags
pub fn orchestrator(tiers: TierArgs, layout: Option<LayoutOptions>) -> Result<Orchestrator> {
    let mut config = OrchestratorConfig::from_env()?;
    if tiers.no_offload {
        config.offload = false;
    }
    if tiers.no_native {
        config.native = false;
    }
    if let Some(layout) = layout {
        config.layout = layout;
    }
    Ok(Orchestrator::builder().config(config).build()?)
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: failed to start runtime: {e}");
            std::process::exit(1);
        }
    };

    let outcome = runtime.block_on(async {
        match cli.command {
            Commands::Justify(args) => commands::justify::run(&args).await,
            Commands::Stats(args) => commands::stats::run(&args).await,
            Commands::Validate(args) => commands::validate::run(&args).await,
            Commands::Layout(args) => commands::layout::run(&args),
            Commands::Batch(args) => commands::batch::run(&args).await,
            Commands::Info(args) => commands::info::run(&args).await,
        }
    });

    if let Err(e) = outcome {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
