//! Configuration management for parley.
//!
//! Handles loading and saving TOML configuration files with cross-platform
//! paths, defaults for a first launch, and atomic write operations.

use crate::{
    AppError, AppResult,
    config::{
        BootstrapConfig, ChatConfig, DeliveryConfig, IdentityConfig, RecorderConfig,
        default_web_origin,
    },
};

use std::{
    fs,
    io::Write,
    panic::Location,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

const LOCAL_API_KEY: &str = "local";

/// Main configuration struct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Local user identity.
    pub identity: IdentityConfig,
    /// Conversation to join.
    pub chat: ChatConfig,
    /// Hold-to-record gesture tuning.
    #[serde(default)]
    pub recorder: RecorderConfig,
    /// Voice message delivery behavior.
    #[serde(default)]
    pub delivery: DeliveryConfig,
    /// Connection retry policy.
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
}

impl Config {
    /// Load configuration from disk, creating default if not found.
    #[track_caller]
    #[instrument]
    pub fn load() -> AppResult<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            info!("No config found, creating default");
            let config = Self::with_data_dir(Self::project_dirs()?.data_dir());
            config.save_to(&config_path)?;

            warn!(
                config_path = ?config_path,
                user_id = %config.identity.user_id,
                "Default config created. Set chat.peer_id to the person you want to talk to."
            );

            Ok(config)
        }
    }

    /// Load and parse a configuration file.
    #[track_caller]
    #[instrument]
    pub fn load_from(path: &Path) -> AppResult<Self> {
        let contents = fs::read_to_string(path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to read config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let config: Config = toml::from_str(&contents).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to parse config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        config.validate()?;

        info!(config_path = ?path, "Configuration loaded");

        Ok(config)
    }

    /// Default configuration keeping its outbox under `data_dir`.
    ///
    /// The generated user id is random so two local instances sharing an
    /// outbox do not collide.
    pub fn with_data_dir(data_dir: &Path) -> Self {
        let user_id = format!("user-{}", Uuid::new_v4().simple());

        Config {
            identity: IdentityConfig {
                display_name: user_id.clone(),
                user_id,
                image: None,
                api_key: LOCAL_API_KEY.to_string(),
                token: String::new(),
            },
            chat: ChatConfig {
                peer_id: "peer".to_string(),
                web_origin: default_web_origin(),
                outbox_dir: data_dir.join("outbox"),
            },
            recorder: RecorderConfig::default(),
            delivery: DeliveryConfig::default(),
            bootstrap: BootstrapConfig::default(),
        }
    }

    /// Reject configurations the session cannot start with.
    #[track_caller]
    pub fn validate(&self) -> AppResult<()> {
        let required = [
            ("identity.user_id", &self.identity.user_id),
            ("identity.api_key", &self.identity.api_key),
            ("chat.peer_id", &self.chat.peer_id),
        ];

        if let Some((field, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(AppError::InvalidConfig {
                field,
                reason: "must not be empty".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if self.chat.peer_id == self.identity.user_id {
            return Err(AppError::InvalidConfig {
                field: "chat.peer_id",
                reason: "must differ from identity.user_id".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(())
    }

    /// Save configuration using atomic write pattern.
    ///
    /// Writes to a temporary file first, then renames to prevent corruption
    /// if the process crashes during the write.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn save_to(&self, config_path: &Path) -> AppResult<()> {
        let contents = toml::to_string_pretty(self).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to serialize config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let temp_path = config_path.with_extension("toml.tmp");

        let mut temp_file = fs::File::create(&temp_path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to create temp config file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        temp_file
            .write_all(contents.as_bytes())
            .map_err(|e| AppError::ConfigError {
                reason: format!("Failed to write temp config file: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        temp_file.sync_all().map_err(|e| AppError::ConfigError {
            reason: format!("Failed to sync temp config file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        fs::rename(&temp_path, config_path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to rename temp config to final: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(config_path = ?config_path, "Configuration saved (atomic write)");

        Ok(())
    }

    /// Directory for rolling log files, created if missing.
    #[track_caller]
    pub fn log_dir() -> AppResult<PathBuf> {
        let log_dir = Self::project_dirs()?.data_dir().join("logs");

        if !log_dir.exists() {
            fs::create_dir_all(&log_dir)?;
        }

        Ok(log_dir)
    }

    #[track_caller]
    fn config_path() -> AppResult<PathBuf> {
        let proj_dirs = Self::project_dirs()?;
        let config_dir = proj_dirs.config_dir();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
            debug!(config_dir = ?config_dir, "Created config directory");
        }

        Ok(config_dir.join("config.toml"))
    }

    #[track_caller]
    fn project_dirs() -> AppResult<ProjectDirs> {
        ProjectDirs::from("com", "parley", "Parley").ok_or_else(|| AppError::ConfigError {
            reason: "Failed to get project directories".to_string(),
            location: ErrorLocation::from(Location::caller()),
        })
    }
}
