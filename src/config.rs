//! Application Configuration
//!
//! This module provides configuration management for the application,
//! supporting a YAML configuration file with sensible defaults. Secrets
//! (the access token and the remote mirror token) are sourced from the
//! environment once at load time; nothing reads the environment after
//! startup.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

/// File store backend types
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub enum StoreBackend {
    #[default]
    Local,
    Mock,
}

impl std::str::FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" | "disk" => Ok(StoreBackend::Local),
            "mock" => Ok(StoreBackend::Mock),
            _ => Err(format!("Unknown store backend: {}", s)),
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub retention: RetentionConfig,
    pub auth: AuthConfig,
    pub mirror: MirrorConfig,
    pub logging: LoggingConfig,
    /// Shared secret for the access guard, from `API_TOKEN`
    #[serde(skip)]
    pub access_token: Option<String>,
    /// Remote mirror credential, from `DROPBOX_ACCESS_TOKEN`
    #[serde(skip)]
    pub mirror_token: Option<String>,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Number of worker threads
    pub workers: usize,
    /// Maximum upload payload size in bytes
    pub max_payload_size: usize,
}

/// File store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Directory under which all uploaded files reside
    pub root: String,
    /// Prefix stored names with an upload timestamp to avoid collisions
    pub timestamp_names: bool,
}

/// Retention sweeper configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetentionConfig {
    pub enabled: bool,
    /// Files older than this are deleted on the next request
    pub max_age_seconds: u64,
}

/// Access guard configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub enabled: bool,
}

/// Remote mirror configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MirrorConfig {
    pub enabled: bool,
    /// Content-upload endpoint of the remote storage API
    pub upload_url: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Path to the log4rs configuration file
    pub config_file: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            workers: 4,
            max_payload_size: 64 * 1024 * 1024, // 64MB
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Local,
            root: "./data/uploads".to_string(),
            timestamp_names: true,
        }
    }
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_age_seconds: 7 * 24 * 3600, // one week
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self { enabled: false }
    }
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            upload_url: "https://content.dropboxapi.com/2/files/upload".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            config_file: "server_log.yaml".to_string(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            store: StoreConfig::default(),
            retention: RetentionConfig::default(),
            auth: AuthConfig::default(),
            mirror: MirrorConfig::default(),
            logging: LoggingConfig::default(),
            access_token: None,
            mirror_token: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from `config.yaml`, falling back to defaults,
    /// then pick up credentials from the environment.
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let mut config = Self::load_file("config.yaml")?;
        config.access_token = read_env_secret("API_TOKEN");
        config.mirror_token = read_env_secret("DROPBOX_ACCESS_TOKEN");
        Ok(config)
    }

    /// Load configuration from a specific file path, defaults if absent.
    /// Does not touch the environment.
    pub fn load_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        if Path::new(path).exists() {
            let content = fs::read_to_string(path)?;
            let config: AppConfig = serde_yaml::from_str(&content)?;
            info!("Loaded configuration from {}", path);
            Ok(config)
        } else {
            warn!("Config file {} not found, using defaults", path);
            Ok(Self::default())
        }
    }
}

fn read_env_secret(name: &str) -> Option<String> {
    match env::var(name) {
        Ok(value) if !value.is_empty() => Some(value),
        _ => None,
    }
}
