//! CLI module providing command-line interface functionality
//!
//! This module handles argument parsing and routing to the appropriate
//! handlers.

pub mod commands;
pub mod context;
pub mod handlers;

use anyhow::Result;
use clap::Parser;

pub use commands::{Cli, Commands, ConfigAction};
pub use context::CliContext;
pub use handlers::CommandHandler;

/// Main CLI application
pub struct CliApp;

impl CliApp {
    /// Parse command line arguments and execute the requested command
    pub fn run() -> Result<()> {
        let cli = Cli::parse();

        // init rewrites the config file, so it must not depend on parsing it
        let context = match cli.command {
            Commands::Init { .. } => CliContext::with_default_config(cli.project.clone(), cli.verbose)?,
            _ => CliContext::new(cli.project.clone(), cli.verbose)?,
        };
        let _log_guard = context.init_logging()?;

        let handler = CommandHandler::new(context);
        handler.handle_command(cli.command)
    }
}
