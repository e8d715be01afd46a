//! AlertSrv configuration
//!
//! Layered with figment, later layers win:
//! 1. built-in defaults
//! 2. YAML file (`--config`, else `config/alertsrv.yaml` or `alertsrv.yaml`)
//! 3. `ALERTSRV_` environment variables, `__` separating sections
//!    (e.g. `ALERTSRV_API__PORT=8080`)
//! 4. the conventional `PORT` and `DATABASE_URL` variables
//!
//! A `.env` file, when present, feeds layers 3 and 4 through
//! [`load_env_file`]. Variables already set in the process keep their values.

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{AlertError, Result};

/// Config files probed when no explicit path is given
const DEFAULT_CONFIG_PATHS: [&str; 2] = ["config/alertsrv.yaml", "alertsrv.yaml"];

/// Alert service configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Listen address
    pub host: String,
    /// Listen port
    pub port: u16,
}

impl ApiConfig {
    /// Build a path with API prefix
    pub fn build_path(&self, path: &str) -> String {
        format!("/api/{}", path.trim_start_matches('/'))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// `memory://` or a `sqlite:` URL
    pub url: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://alerts.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default)]
    pub json: bool,
    /// Also write daily-rolling log files here
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            dir: None,
        }
    }
}

/// Load `KEY=VALUE` lines from a `.env` file into the process environment
///
/// With no explicit path the file is searched for from the working directory
/// upwards. A missing file is not an error. Returns the file that was read.
pub fn load_env_file(path: Option<&Path>) -> Result<Option<PathBuf>> {
    let loaded = match path {
        Some(path) => dotenv::from_path(path).map(|_| path.to_path_buf()),
        None => dotenv::dotenv(),
    };
    match loaded {
        Ok(found) => Ok(Some(found)),
        Err(e) if e.not_found() => Ok(None),
        Err(e) => Err(AlertError::config(format!("failed to read .env file: {}", e))),
    }
}

impl AlertConfig {
    /// Load configuration from all layers
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(AlertConfig::default()));

        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(AlertError::config(format!(
                        "config file not found: {}",
                        path.display()
                    )));
                }
                figment = figment.merge(Yaml::file(path));
            },
            None => {
                if let Some(found) = DEFAULT_CONFIG_PATHS
                    .iter()
                    .map(Path::new)
                    .find(|p| p.exists())
                {
                    figment = figment.merge(Yaml::file(found));
                }
            },
        }

        let config: AlertConfig = figment
            .merge(Env::prefixed("ALERTSRV_").split("__"))
            .merge(Env::raw().only(&["PORT"]).map(|_| "api.port".into()))
            .merge(
                Env::raw()
                    .only(&["DATABASE_URL"])
                    .map(|_| "storage.url".into()),
            )
            .extract()
            .map_err(|e| AlertError::config(format!("failed to load configuration: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Check values the type system cannot
    pub fn validate(&self) -> Result<()> {
        if self.api.port == 0 {
            return Err(AlertError::config("api.port must not be 0"));
        }
        if self.api.host.trim().is_empty() {
            return Err(AlertError::config("api.host must not be empty"));
        }
        if self.storage.url.trim().is_empty() {
            return Err(AlertError::config("storage.url must not be empty"));
        }
        Ok(())
    }

    /// Default configuration rendered as YAML
    pub fn default_yaml() -> String {
        serde_yaml::to_string(&Self::default())
            .unwrap_or_else(|_| "# Failed to generate config file".to_string())
    }
}
