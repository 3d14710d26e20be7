//! Command handlers for all CLI operations
//!
//! This module routes parsed commands to their handlers, keeping CLI
//! parsing separate from the library calls.

pub mod config;
pub mod send;
pub mod tag;

use super::{CliContext, Commands};
use anyhow::Result;

pub use config::ConfigHandler;
pub use send::{SendArgs, SendHandler};
pub use tag::TagHandler;

/// Coordinates all command handling with dependency injection via CliContext
pub struct CommandHandler {
    context: CliContext,
}

impl CommandHandler {
    pub fn new(context: CliContext) -> Self {
        Self { context }
    }

    /// Route commands to their appropriate handlers
    pub fn handle_command(&self, command: Commands) -> Result<()> {
        match command {
            Commands::Send {
                message,
                title,
                data,
                devices,
                devices_file,
                api_key,
                dry_run,
            } => SendHandler::new(&self.context).handle_send(SendArgs {
                message,
                title,
                data,
                devices,
                devices_file,
                api_key,
                dry_run,
            }),
            Commands::Tag {
                file,
                source,
                campaign,
            } => TagHandler::new(&self.context).handle_tag(file, &source, &campaign),
            Commands::TagUrl {
                url,
                source,
                campaign,
                content,
            } => TagHandler::new(&self.context).handle_tag_url(
                &url,
                &source,
                &campaign,
                content.as_deref(),
            ),
            Commands::Init { global, force } => {
                ConfigHandler::new(&self.context).handle_init(global, force)
            }
            Commands::Config { action } => ConfigHandler::new(&self.context).handle_config(action),
        }
    }
}
