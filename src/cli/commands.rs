//! Command definitions and structures for the CLI
//!
//! This module contains the clap-based argument definitions for the main
//! CLI structure and all subcommands.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Main CLI structure
#[derive(Parser)]
#[command(name = "gcm-tags")]
#[command(about = "Send GCM push notifications and tag links with UTM parameters")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Project path for project-level configuration
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Send a push notification to one or more devices
    Send {
        /// Message to send
        message: String,

        /// Optional title
        #[arg(short, long)]
        title: Option<String>,

        /// Additional data field as key=value (repeatable)
        #[arg(short, long = "data", value_name = "KEY=VALUE")]
        data: Vec<String>,

        /// Device registration id (repeatable)
        #[arg(short = 'D', long = "device")]
        devices: Vec<String>,

        /// File with one device registration id per line
        #[arg(long)]
        devices_file: Option<PathBuf>,

        /// Server API key (overrides gcm.api_key)
        #[arg(long, env = "GCM_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// Print the request instead of sending it
        #[arg(long)]
        dry_run: bool,
    },

    /// Add UTM parameters to every link in an HTML fragment
    Tag {
        /// HTML file to read (stdin when omitted)
        file: Option<PathBuf>,

        /// Value for utm_source
        #[arg(short, long)]
        source: String,

        /// Value for utm_campaign
        #[arg(short, long)]
        campaign: String,
    },

    /// Add UTM parameters to a single URL
    TagUrl {
        /// URL to tag
        url: String,

        /// Value for utm_source
        #[arg(short, long)]
        source: String,

        /// Value for utm_campaign
        #[arg(short, long)]
        campaign: String,

        /// Value for utm_content
        #[arg(long)]
        content: Option<String>,
    },

    /// Initialize configuration
    Init {
        /// Initialize global configuration (default is project-level)
        #[arg(short, long)]
        global: bool,

        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Configure settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration management actions
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Set configuration value
    Set {
        /// Configuration key (e.g., gcm.endpoint, tracking.extra_params.ref)
        key: String,
        /// Value to set (empty clears optional keys)
        value: String,
    },

    /// Get configuration value
    Get {
        /// Configuration key
        key: String,
    },
}
