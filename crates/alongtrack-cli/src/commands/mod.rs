//! Command implementations

mod config;
mod presets;
mod run;

use std::path::PathBuf;

use crate::cli::{Cli, Commands};
use crate::output::OutputWriter;
use anyhow::Result;

/// Global options shared by every command
#[derive(Debug, Clone, Default)]
pub struct CommandContext {
    pub config_file: Option<PathBuf>,
    pub presets_file: Option<PathBuf>,
}

/// Execute a CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    let output = OutputWriter::new(cli.json);
    let context = CommandContext {
        config_file: cli.config,
        presets_file: cli.presets_file,
    };

    match cli.command {
        Commands::Run(args) => run::execute(args, &context, &output, cli.dry_run).await,
        Commands::Presets => presets::execute(&context, &output),
        Commands::Config => config::execute(&context, &output),
    }
}
