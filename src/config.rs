//! Configuration for the quake feed pipeline.
//!
//! Settings come from an optional TOML file with environment variable
//! overrides under the `QUAKE_` prefix. Defaults target the public USGS
//! FDSN event service.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{PipelineError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PipelineConfig {
    pub catalog: CatalogConfig,
    pub fallback: FallbackConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CatalogConfig {
    /// Base URL of the FDSN event query endpoint
    pub endpoint: String,
    /// Request timeout in seconds for the single fetch attempt
    pub request_timeout_secs: u64,
    /// Default time window when the caller supplies no start date
    pub default_window_days: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct FallbackConfig {
    /// Single-slot snapshot file, overwritten on every successful fetch
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            catalog: CatalogConfig {
                endpoint: "https://earthquake.usgs.gov/fdsnws/event/1/query".to_string(),
                request_timeout_secs: 10,
                default_window_days: 60,
            },
            fallback: FallbackConfig {
                path: PathBuf::from("fallback_earthquakes.json"),
            },
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a TOML file and validate it.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            PipelineError::config(format!(
                "failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        let config: PipelineConfig = toml::from_str(&content)
            .map_err(|e| PipelineError::config(format!("failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Build configuration from defaults plus `QUAKE_`-prefixed environment
    /// variable overrides.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(endpoint) = std::env::var("QUAKE_CATALOG_ENDPOINT") {
            config.catalog.endpoint = endpoint;
        }
        if let Ok(timeout) = std::env::var("QUAKE_REQUEST_TIMEOUT_SECS") {
            config.catalog.request_timeout_secs = timeout.parse().map_err(|_| {
                PipelineError::config("QUAKE_REQUEST_TIMEOUT_SECS must be an integer")
            })?;
        }
        if let Ok(days) = std::env::var("QUAKE_DEFAULT_WINDOW_DAYS") {
            config.catalog.default_window_days = days
                .parse()
                .map_err(|_| PipelineError::config("QUAKE_DEFAULT_WINDOW_DAYS must be an integer"))?;
        }
        if let Ok(path) = std::env::var("QUAKE_FALLBACK_PATH") {
            config.fallback.path = PathBuf::from(path);
        }
        if let Ok(host) = std::env::var("QUAKE_SERVER_HOST") {
            config.server.host = host;
        }
        if let Ok(port) = std::env::var("QUAKE_SERVER_PORT") {
            config.server.port = port
                .parse()
                .map_err(|_| PipelineError::config("QUAKE_SERVER_PORT must be a port number"))?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.catalog.endpoint.is_empty() {
            return Err(PipelineError::config("catalog endpoint must not be empty"));
        }
        if self.catalog.request_timeout_secs == 0 {
            return Err(PipelineError::config("request timeout must be non-zero"));
        }
        if self.catalog.default_window_days <= 0 {
            return Err(PipelineError::config("default window must be positive"));
        }
        Ok(())
    }
}
