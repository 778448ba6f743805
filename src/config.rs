//! Configuration management
//!
//! Settings come from a TOML file (first one found on the search path)
//! with `INFLIGHT_*` environment variables layered on top.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DEFAULT_PORTAL_BASE_URL: &str = "https://shop.ba.com";
pub const DEFAULT_API_BASE_URL: &str = "https://api.air.dot-air.com";

/// Root configuration structure
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct Config {
    /// Backend locations
    #[serde(default)]
    pub endpoints: EndpointsConfig,

    /// HTTP transport settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct EndpointsConfig {
    /// Host serving the portal front-end and its config files
    #[serde(default = "default_portal_base_url")]
    pub portal_base_url: String,

    /// On-board API host
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            portal_base_url: default_portal_base_url(),
            api_base_url: default_api_base_url(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct HttpConfig {
    /// Request timeout in seconds, unset for none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// Connection timeout in seconds, unset for none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connect_timeout: Option<u64>,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: None,
            connect_timeout: None,
            user_agent: default_user_agent(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// Default value functions
fn default_portal_base_url() -> String {
    DEFAULT_PORTAL_BASE_URL.to_string()
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_user_agent() -> String {
    concat!("inflight-portal/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from `path`, or from the first file on the search path
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(p) if !p.exists() => {
                return Err(Error::Config(format!("{} does not exist", p.display())))
            }
            Some(p) => Some(p.to_path_buf()),
            None => Self::search_paths().into_iter().find(|p| p.exists()),
        };

        let mut builder = ::config::Config::builder();
        match &file {
            Some(p) => {
                tracing::debug!("Loading config from: {}", p.display());
                builder = builder.add_source(::config::File::from(p.as_path()));
            }
            None => tracing::debug!("No config file found, using defaults"),
        }

        let config = builder
            .add_source(
                ::config::Environment::with_prefix("INFLIGHT")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from("config.toml"),
            PathBuf::from("/etc/inflight-portal/config.toml"),
        ];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("inflight-portal/config.toml"));
        }
        paths
    }

    /// Effective configuration rendered as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }
}
