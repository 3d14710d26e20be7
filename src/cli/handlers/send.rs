//! Push notification handler
//!
//! Collects devices, data fields and the API key from arguments and
//! configuration, then sends through the library client.

use super::super::CliContext;
use anyhow::{Context, Result};
use gcm_tags::errors::AppError;
use gcm_tags::gcm::{GcmClient, GcmClientConfig, SendRequest};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Arguments of the `send` command
pub struct SendArgs {
    pub message: String,
    pub title: Option<String>,
    pub data: Vec<String>,
    pub devices: Vec<String>,
    pub devices_file: Option<PathBuf>,
    pub api_key: Option<String>,
    pub dry_run: bool,
}

/// Handler for send operations
pub struct SendHandler<'a> {
    context: &'a CliContext,
}

impl<'a> SendHandler<'a> {
    pub fn new(context: &'a CliContext) -> Self {
        Self { context }
    }

    pub fn handle_send(&self, args: SendArgs) -> Result<()> {
        let config = self.context.config_manager.config();

        let api_key = args
            .api_key
            .or_else(|| config.gcm.api_key.clone())
            .context("No API key configured: pass --api-key, set GCM_API_KEY or gcm.api_key")?;

        let mut devices = args.devices;
        if let Some(path) = &args.devices_file {
            devices.extend(read_devices_file(path)?);
        }

        let mut request = SendRequest::new(args.message);
        request.title = args.title;
        for field in &args.data {
            let (key, value) = parse_data_field(field)?;
            request.data.insert(key, value);
        }

        let mut client = GcmClient::with_config(api_key, GcmClientConfig::from(&config.gcm))?;
        client.set_devices(devices);

        if args.dry_run {
            println!("Dry run - would send notification");
            println!("Endpoint: {}", client.config().endpoint);
            println!("Devices: {}", client.devices().len());
            println!("Requests: {}", client.batch_count());
            println!("{}", serde_json::to_string_pretty(&request.data_payload())?);
            return Ok(());
        }

        let result = client.send(&request)?;
        info!(
            success = result.success,
            failure = result.failure,
            canonical_ids = result.canonical_ids,
            "Push notification sent"
        );
        for (index, canonical) in result.canonical_updates() {
            if let Some(device) = client.devices().get(index) {
                warn!(device = %device, canonical = %canonical, "Device registration id should be replaced");
            }
        }

        println!("{}", serde_json::to_string_pretty(&result)?);
        Ok(())
    }
}

/// Parses a `key=value` data field. Values that parse as JSON are kept as
/// JSON, everything else is sent as a string.
fn parse_data_field(field: &str) -> Result<(String, Value), AppError> {
    let (key, value) = field
        .split_once('=')
        .filter(|(key, _)| !key.trim().is_empty())
        .ok_or_else(|| AppError::InvalidArgument {
            argument: field.to_string(),
            reason: "expected KEY=VALUE".to_string(),
        })?;

    let value = match serde_json::from_str::<Value>(value) {
        Ok(parsed @ (Value::Number(_) | Value::Bool(_) | Value::Object(_) | Value::Array(_))) => parsed,
        _ => Value::String(value.to_string()),
    };
    Ok((key.trim().to_string(), value))
}

/// Reads one device id per line, skipping blank lines and `#` comments.
fn read_devices_file(path: &Path) -> Result<Vec<String>, AppError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| AppError::io_with_source(path, "read devices file", e))?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}
