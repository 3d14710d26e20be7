use crate::errors::{AppError, AppResult};
use crate::gcm::{GcmClientConfig, DEFAULT_ENDPOINT, MAX_DEVICES_PER_REQUEST};
use crate::tags::UtmTagger;
use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_DIR: &str = ".gcm-tags";
const CONFIG_FILE: &str = "config.toml";

/// Main configuration structure
///
/// Contains the messaging client settings, the link tagger defaults and
/// logging options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub gcm: GcmConfig,
    #[serde(default)]
    pub tracking: TrackingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Settings for the push messaging endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GcmConfig {
    pub api_key: Option<String>,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    pub timeout_secs: Option<u64>,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

/// Defaults applied by the link tagger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingConfig {
    #[serde(default = "default_medium")]
    pub medium: String,
    #[serde(default)]
    pub extra_params: BTreeMap<String, String>, // appended to every tagged URL
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    pub log_path: Option<String>,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_batch_size() -> usize {
    MAX_DEVICES_PER_REQUEST
}

fn default_medium() -> String {
    "email".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for GcmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: default_endpoint(),
            timeout_secs: None,
            batch_size: default_batch_size(),
        }
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            medium: default_medium(),
            extra_params: BTreeMap::new(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            log_path: None,
        }
    }
}

impl From<&GcmConfig> for GcmClientConfig {
    fn from(config: &GcmConfig) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            timeout_secs: config.timeout_secs,
            batch_size: config.batch_size,
            ..Default::default()
        }
    }
}

impl From<&TrackingConfig> for UtmTagger {
    fn from(config: &TrackingConfig) -> Self {
        UtmTagger::new()
            .with_medium(config.medium.clone())
            .with_extra_params(config.extra_params.clone())
    }
}

/// Configuration manager
///
/// Handles loading and saving project-level and global configuration.
/// Project configuration takes precedence over the global one.
///
/// # Configuration Hierarchy
///
/// 1. **Project-level**: `.gcm-tags/config.toml` in the project root
/// 2. **Global**: `~/.gcm-tags/config.toml` in the user home directory
///
/// # Example
///
/// ```rust,no_run
/// use gcm_tags::config::ConfigManager;
/// use std::path::PathBuf;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config_manager = ConfigManager::new(Some(PathBuf::from("/path/to/project")))?;
///     println!("Endpoint: {}", config_manager.config().gcm.endpoint);
///     Ok(())
/// }
/// ```
pub struct ConfigManager {
    config_path: PathBuf,
    config: Config,
}

impl ConfigManager {
    /// Creates a new ConfigManager instance
    ///
    /// With a project path, the project config is used if it exists, then the
    /// global config if that exists; otherwise a default project config is
    /// written. Without a project path the global config is used.
    ///
    /// # Errors
    ///
    /// Fails if the config directory cannot be created or the file cannot be
    /// read, parsed or written.
    pub fn new(project_path: Option<PathBuf>) -> AppResult<Self> {
        if let Some(ref path) = project_path {
            let project_config_path = Self::get_config_path(Some(path.clone()))?;

            if project_config_path.exists() {
                return Self::load_from(project_config_path);
            }

            let global_config_path = Self::get_config_path(None)?;
            if global_config_path.exists() {
                return Self::load_from(global_config_path);
            }

            Self::load_from(project_config_path)
        } else {
            let config_path = Self::get_config_path(None)?;
            Self::load_from(config_path)
        }
    }

    /// Always uses the project-level configuration, even if a global one exists.
    pub fn new_project_config(project_path: PathBuf) -> AppResult<Self> {
        let config_path = Self::get_config_path(Some(project_path))?;
        Self::load_from(config_path)
    }

    /// Default configuration bound to the project (or global) config path.
    ///
    /// The file is neither read nor written; call [`save()`](Self::save)
    /// to persist it.
    pub fn with_defaults(project_path: Option<PathBuf>) -> AppResult<Self> {
        Ok(ConfigManager {
            config_path: Self::get_config_path(project_path)?,
            config: Config::default(),
        })
    }

    /// Writes the default configuration, replacing any existing file
    /// without parsing it.
    pub fn reset(project_path: Option<PathBuf>) -> AppResult<Self> {
        let manager = Self::with_defaults(project_path)?;
        manager.save()?;
        Ok(manager)
    }

    /// Opens an explicit configuration file that must already exist.
    pub fn open(path: impl Into<PathBuf>) -> AppResult<Self> {
        let config_path = path.into();
        if !config_path.exists() {
            return Err(AppError::ConfigNotFound { path: config_path });
        }
        Self::load_from(config_path)
    }

    pub fn get_config_path(project_path: Option<PathBuf>) -> AppResult<PathBuf> {
        let base_path = if let Some(path) = project_path {
            path.join(CONFIG_DIR)
        } else {
            let base_dirs = BaseDirs::new()
                .ok_or_else(|| AppError::config("Failed to get base directories"))?;
            base_dirs.home_dir().join(CONFIG_DIR)
        };

        fs::create_dir_all(&base_path)
            .map_err(|e| AppError::io_with_source(&base_path, "create config directory", e))?;

        Ok(base_path.join(CONFIG_FILE))
    }

    fn load_from(config_path: PathBuf) -> AppResult<Self> {
        let config = Self::load_or_create(&config_path)?;
        Ok(ConfigManager {
            config_path,
            config,
        })
    }

    fn load_or_create(path: &Path) -> AppResult<Config> {
        if path.exists() {
            let content = fs::read_to_string(path)
                .map_err(|e| AppError::io_with_source(path, "read config file", e))?;
            toml::from_str(&content)
                .map_err(|e| AppError::config_with_source("Failed to parse config file", e))
        } else {
            let config = Config::default();
            let content = toml::to_string_pretty(&config)
                .map_err(|e| AppError::config_with_source("Failed to serialize default config", e))?;
            fs::write(path, content)
                .map_err(|e| AppError::io_with_source(path, "write default config", e))?;
            Ok(config)
        }
    }

    /// Saves the current configuration back to the file it was loaded from.
    pub fn save(&self) -> AppResult<()> {
        let content = toml::to_string_pretty(&self.config)
            .map_err(|e| AppError::config_with_source("Failed to serialize config", e))?;
        fs::write(&self.config_path, content)
            .map_err(|e| AppError::io_with_source(&self.config_path, "write config file", e))?;
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns a mutable reference to the configuration
    ///
    /// Call [`save()`](Self::save) to persist changes.
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Reads a dotted configuration key such as `gcm.endpoint` or
    /// `tracking.extra_params.ref`.
    pub fn get_value(&self, key: &str) -> AppResult<String> {
        let config = &self.config;
        let value = match key {
            "gcm.api_key" => config.gcm.api_key.clone().unwrap_or_else(|| "None".to_string()),
            "gcm.endpoint" => config.gcm.endpoint.clone(),
            "gcm.timeout_secs" => config
                .gcm
                .timeout_secs
                .map(|t| t.to_string())
                .unwrap_or_else(|| "None".to_string()),
            "gcm.batch_size" => config.gcm.batch_size.to_string(),
            "tracking.medium" => config.tracking.medium.clone(),
            "logging.level" => config.logging.level.clone(),
            "logging.log_path" => config
                .logging
                .log_path
                .clone()
                .unwrap_or_else(|| "None".to_string()),
            _ => match key.strip_prefix("tracking.extra_params.") {
                Some(name) => config
                    .tracking
                    .extra_params
                    .get(name)
                    .cloned()
                    .ok_or_else(|| AppError::InvalidConfigValue {
                        key: key.to_string(),
                        value: "not set".to_string(),
                    })?,
                None => return Err(AppError::config(format!("Unknown configuration key: {key}"))),
            },
        };
        Ok(value)
    }

    /// Sets a dotted configuration key. An empty value clears optional keys.
    pub fn set_value(&mut self, key: &str, value: &str) -> AppResult<()> {
        let invalid = || AppError::InvalidConfigValue {
            key: key.to_string(),
            value: value.to_string(),
        };
        let optional = |v: &str| if v.is_empty() { None } else { Some(v.to_string()) };

        let config = &mut self.config;
        match key {
            "gcm.api_key" => config.gcm.api_key = optional(value),
            "gcm.endpoint" => {
                url::Url::parse(value).map_err(|_| invalid())?;
                config.gcm.endpoint = value.to_string();
            }
            "gcm.timeout_secs" => {
                config.gcm.timeout_secs = if value.is_empty() {
                    None
                } else {
                    Some(value.parse().map_err(|_| invalid())?)
                }
            }
            "gcm.batch_size" => {
                let size: usize = value.parse().map_err(|_| invalid())?;
                if size == 0 || size > MAX_DEVICES_PER_REQUEST {
                    return Err(invalid());
                }
                config.gcm.batch_size = size;
            }
            "tracking.medium" => config.tracking.medium = value.to_string(),
            "logging.level" => {
                value
                    .parse::<tracing::Level>()
                    .map_err(|_| invalid())?;
                config.logging.level = value.to_string();
            }
            "logging.log_path" => config.logging.log_path = optional(value),
            _ => match key.strip_prefix("tracking.extra_params.") {
                Some(name) if !name.is_empty() => {
                    if value.is_empty() {
                        config.tracking.extra_params.remove(name);
                    } else {
                        config
                            .tracking
                            .extra_params
                            .insert(name.to_string(), value.to_string());
                    }
                }
                _ => return Err(AppError::config(format!("Unknown configuration key: {key}"))),
            },
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_written() {
        let temp_dir = TempDir::new().unwrap();
        let manager = ConfigManager::new_project_config(temp_dir.path().to_path_buf()).unwrap();

        let path = temp_dir.path().join(".gcm-tags").join("config.toml");
        assert!(path.exists());
        assert_eq!(manager.config_path(), path.as_path());
        assert_eq!(manager.config().gcm.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(manager.config().gcm.batch_size, 1000);
        assert_eq!(manager.config().tracking.medium, "email");
    }

    #[test]
    fn test_reset_replaces_malformed_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = ConfigManager::get_config_path(Some(temp_dir.path().to_path_buf())).unwrap();
        fs::write(&path, "[gcm\nbatch_size = ").unwrap();

        assert!(ConfigManager::new_project_config(temp_dir.path().to_path_buf()).is_err());

        let manager = ConfigManager::with_defaults(Some(temp_dir.path().to_path_buf())).unwrap();
        assert_eq!(manager.config(), &Config::default());
        assert_eq!(fs::read_to_string(&path).unwrap(), "[gcm\nbatch_size = ");

        ConfigManager::reset(Some(temp_dir.path().to_path_buf())).unwrap();
        let reloaded = ConfigManager::new_project_config(temp_dir.path().to_path_buf()).unwrap();
        assert_eq!(reloaded.config(), &Config::default());
    }

    #[test]
    fn test_save_and_reload() {
        let temp_dir = TempDir::new().unwrap();
        let mut manager = ConfigManager::new_project_config(temp_dir.path().to_path_buf()).unwrap();
        manager.set_value("gcm.api_key", "AIzaSyTestKey").unwrap();
        manager.set_value("tracking.extra_params.ref", "newsletter").unwrap();
        manager.save().unwrap();

        let reloaded = ConfigManager::new_project_config(temp_dir.path().to_path_buf()).unwrap();
        assert_eq!(reloaded.config(), manager.config());
        assert_eq!(reloaded.get_value("gcm.api_key").unwrap(), "AIzaSyTestKey");
        assert_eq!(
            reloaded.get_value("tracking.extra_params.ref").unwrap(),
            "newsletter"
        );
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("custom.toml");
        fs::write(&path, "[gcm]\napi_key = \"abcdefgh\"\n").unwrap();

        let manager = ConfigManager::open(&path).unwrap();
        assert_eq!(manager.config().gcm.api_key.as_deref(), Some("abcdefgh"));
        assert_eq!(manager.config().gcm.batch_size, MAX_DEVICES_PER_REQUEST);
        assert_eq!(manager.config().logging.level, "info");
    }

    #[test]
    fn test_open_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = ConfigManager::open(temp_dir.path().join("missing.toml"));
        assert!(matches!(result, Err(AppError::ConfigNotFound { .. })));
    }

    #[test]
    fn test_set_value_validation() {
        let temp_dir = TempDir::new().unwrap();
        let mut manager = ConfigManager::new_project_config(temp_dir.path().to_path_buf()).unwrap();

        assert!(manager.set_value("gcm.batch_size", "1001").is_err());
        assert!(manager.set_value("gcm.batch_size", "0").is_err());
        assert!(manager.set_value("gcm.endpoint", "not a url").is_err());
        assert!(manager.set_value("logging.level", "loud").is_err());
        assert!(manager.set_value("unknown.key", "x").is_err());

        manager.set_value("gcm.batch_size", "500").unwrap();
        assert_eq!(manager.config().gcm.batch_size, 500);
        manager.set_value("gcm.timeout_secs", "").unwrap();
        assert_eq!(manager.config().gcm.timeout_secs, None);
    }

    #[test]
    fn test_conversions() {
        let mut config = Config::default();
        config.gcm.timeout_secs = Some(5);
        config
            .tracking
            .extra_params
            .insert("ref".to_string(), "mail".to_string());

        let client_config = GcmClientConfig::from(&config.gcm);
        assert_eq!(client_config.timeout_secs, Some(5));
        assert_eq!(client_config.endpoint, DEFAULT_ENDPOINT);

        let tagger = UtmTagger::from(&config.tracking);
        assert_eq!(
            tagger.process_url("/a", "s", "c", Some("x")),
            "/a?utm_medium=email&utm_source=s&utm_campaign=c&utm_content=x&ref=mail"
        );
    }
}
