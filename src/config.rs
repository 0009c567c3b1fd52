use crate::marker::DEFAULT_MARKER_PREFIX;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_ENV: &str = "TIMETABLE_REMAP_CONFIG";
pub const HTTP_ADDR_ENV: &str = "TIMETABLE_REMAP_HTTP_ADDR";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] io::Error),
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid http address '{0}'")]
    InvalidAddress(String),
}

/// Runtime settings shared by the CLI and the HTTP server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// SQLite file; `:memory:` keeps everything in the process.
    pub database_path: PathBuf,
    pub http_addr: String,
    pub log_filter: String,
    pub marker_prefix: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("timetable.db"),
            http_addr: "127.0.0.1:3000".to_string(),
            log_filter: "info".to_string(),
            marker_prefix: DEFAULT_MARKER_PREFIX.to_string(),
        }
    }
}

impl EngineConfig {
    /// Load from `path`, else from `$TIMETABLE_REMAP_CONFIG`, else defaults.
    /// A missing file yields defaults. `$TIMETABLE_REMAP_HTTP_ADDR` overrides
    /// the listen address.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = path
            .map(Path::to_path_buf)
            .or_else(|| env::var_os(CONFIG_ENV).map(PathBuf::from));

        let mut config = match resolved {
            Some(path) if path.exists() => Self::from_toml(&fs::read_to_string(&path)?)?,
            _ => Self::default(),
        };

        if let Ok(addr) = env::var(HTTP_ADDR_ENV) {
            if !addr.trim().is_empty() {
                config.http_addr = addr.trim().to_string();
            }
        }
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.http_addr
            .parse()
            .map_err(|_| ConfigError::InvalidAddress(self.http_addr.clone()))
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == ":memory:"
    }
}
