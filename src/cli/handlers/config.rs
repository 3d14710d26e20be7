//! Configuration management handler
//!
//! This module handles configuration initialization and the show/get/set
//! commands.

use super::super::{CliContext, ConfigAction};
use anyhow::Result;
use gcm_tags::config::ConfigManager;
use std::path::PathBuf;

/// Handler for configuration operations
pub struct ConfigHandler<'a> {
    context: &'a CliContext,
}

impl<'a> ConfigHandler<'a> {
    pub fn new(context: &'a CliContext) -> Self {
        Self { context }
    }

    /// Handle configuration initialization
    pub fn handle_init(&self, global: bool, force: bool) -> Result<()> {
        let path = if global {
            None
        } else {
            Some(
                self.context
                    .project_path
                    .clone()
                    .unwrap_or_else(|| PathBuf::from(".")),
            )
        };

        let config_path = ConfigManager::get_config_path(path.clone())?;

        if config_path.exists() && !force {
            println!("Configuration already initialized at: {}", config_path.display());
            println!("Use --force to overwrite");
            return Ok(());
        }

        ConfigManager::reset(path)?;
        println!("Configuration initialized successfully at: {}", config_path.display());

        Ok(())
    }

    /// Handle configuration management
    pub fn handle_config(&self, action: ConfigAction) -> Result<()> {
        let mut config_manager = ConfigManager::new(self.context.project_path.clone())?;

        match action {
            ConfigAction::Show => {
                println!("# {}", config_manager.config_path().display());
                println!("{}", toml::to_string_pretty(config_manager.config())?);
            }
            ConfigAction::Set { key, value } => {
                config_manager.set_value(&key, &value)?;
                config_manager.save()?;
                println!("Configuration updated: {key} = {value}");
            }
            ConfigAction::Get { key } => {
                println!("{}", config_manager.get_value(&key)?);
            }
        }

        Ok(())
    }
}
