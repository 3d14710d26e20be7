//! Error types for the gcm-tags crate
//!
//! This module defines the error conditions surfaced by the messaging client
//! and the configuration layer. The link tagger never fails, so it has no
//! variants here.

use std::path::PathBuf;
use thiserror::Error;

/// Main application error type
///
/// Variants are grouped by functional domain; see [`AppError::category`].
#[derive(Error, Debug)]
pub enum AppError {
    // Messaging client errors
    #[error("Invalid API key: {reason}")]
    InvalidCredential {
        reason: String,
    },

    #[error("No devices specified")]
    NoDevices,

    #[error("Invalid response http code: {status_code}")]
    HttpStatus {
        status_code: u16,
        url: String,
        payload: String,
        body: String,
    },

    #[error("Invalid response format: {context}")]
    InvalidResponseFormat {
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("HTTP request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // Configuration errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        path: PathBuf,
    },

    #[error("Invalid configuration value for '{key}': {value}")]
    InvalidConfigValue {
        key: String,
        value: String,
    },

    // I/O errors
    #[error("File I/O error for '{path}': {operation}")]
    Io {
        path: PathBuf,
        operation: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Invalid command argument '{argument}': {reason}")]
    InvalidArgument {
        argument: String,
        reason: String,
    },
}

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Create a new Config error with context
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    /// Create a new Config error with source
    pub fn config_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new InvalidCredential error
    pub fn invalid_credential(reason: impl Into<String>) -> Self {
        Self::InvalidCredential {
            reason: reason.into(),
        }
    }

    /// Create a new I/O error with source
    pub fn io_with_source(
        path: impl Into<PathBuf>,
        operation: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Io {
            path: path.into(),
            operation: operation.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new InvalidResponseFormat error with source
    pub fn invalid_response(
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::InvalidResponseFormat {
            context: context.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new Transport error with source
    pub fn transport(
        url: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Transport {
            url: url.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Whether a caller may reasonably retry the failed send.
    ///
    /// The client itself never retries.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { .. } => true,
            Self::HttpStatus { status_code, .. } => {
                *status_code >= 500 || *status_code == 408 || *status_code == 429
            }
            _ => false,
        }
    }

    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidCredential { .. } | Self::NoDevices => "messaging",
            Self::HttpStatus { .. } | Self::Transport { .. } => "network",
            Self::InvalidResponseFormat { .. } => "serialization",
            Self::Config { .. } | Self::ConfigNotFound { .. } | Self::InvalidConfigValue { .. } => "config",
            Self::Io { .. } => "io",
            Self::InvalidArgument { .. } => "cli",
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        let operation = match err.kind() {
            std::io::ErrorKind::NotFound => "file not found",
            std::io::ErrorKind::PermissionDenied => "permission denied",
            _ => "I/O operation",
        }
        .to_string();

        Self::Io {
            path: PathBuf::from("unknown"),
            operation,
            source: Some(Box::new(err)),
        }
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config {
            message: format!("TOML parsing error: {}", err),
            source: Some(Box::new(err)),
        }
    }
}
