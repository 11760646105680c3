//! Startup configuration.
//!
//! Both roles read the same JSON key-value file (by default `config.json`):
//!
//! ```json
//! {
//!   "server_ip": "127.0.0.1",
//!   "server_port": 9090,
//!   "filename": "words.txt",
//!   "k": 5,
//!   "p": 0,
//!   "num_iterations": 1
//! }
//! ```
//!
//! Every key is optional.  The raw file is parsed once into [`Config`], then
//! validated into a [`ServerConfig`] or [`ClientConfig`] that is passed
//! explicitly to the server or client.  A file that cannot be read or parsed
//! is never fatal: [`Config::load_or_default`] logs the problem and every
//! field falls back to its built-in default.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = "config.json";
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 9090;
pub const DEFAULT_WORD_FILE: &str = "words.txt";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Raw key-value contents of the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server_ip: Option<String>,
    pub server_port: Option<i64>,
    pub filename: Option<PathBuf>,
    /// Page size.
    pub k: Option<i64>,
    /// Starting offset.
    pub p: Option<i64>,
    pub num_iterations: Option<i64>,
    pub num_repetitions: Option<i64>,
    /// Per-operation I/O deadline; absent or 0 disables it.
    pub io_timeout_ms: Option<u64>,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Like [`Config::load`], but any error yields the all-defaults config.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                log::warn!("{e}; using built-in defaults");
                Self::default()
            }
        }
    }

    fn port(&self) -> u16 {
        self.server_port
            .and_then(|p| u16::try_from(p).ok())
            .filter(|&p| p != 0)
            .unwrap_or(DEFAULT_PORT)
    }

    fn address(&self) -> Option<&str> {
        self.server_ip
            .as_deref()
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
    }

    fn io_timeout(&self) -> Option<Duration> {
        self.io_timeout_ms
            .filter(|&ms| ms > 0)
            .map(Duration::from_millis)
    }
}

// ---------------------------------------------------------------------------
// Validated views
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub word_file: PathBuf,
    pub io_timeout: Option<Duration>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl ServerConfig {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            bind_address: cfg.address().unwrap_or(DEFAULT_BIND_ADDRESS).to_owned(),
            port: cfg.port(),
            word_file: cfg
                .filename
                .clone()
                .filter(|f| !f.as_os_str().is_empty())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_WORD_FILE)),
            io_timeout: cfg.io_timeout(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub server_address: String,
    pub port: u16,
    pub start_offset: i64,
    /// Words per request.  `None` when unset or not positive: nothing to fetch.
    pub page_size: Option<i64>,
    /// Full passes over the list; at least 1.
    pub repetitions: u32,
    pub io_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl ClientConfig {
    pub fn from_config(cfg: &Config) -> Self {
        let repetitions = cfg
            .num_iterations
            .filter(|&r| r > 0)
            .or(cfg.num_repetitions.filter(|&r| r > 0))
            .and_then(|r| u32::try_from(r).ok())
            .unwrap_or(1);
        Self {
            server_address: cfg.address().unwrap_or(DEFAULT_SERVER_ADDRESS).to_owned(),
            port: cfg.port(),
            start_offset: cfg.p.unwrap_or(0),
            page_size: cfg.k.filter(|&k| k > 0),
            repetitions,
            io_timeout: cfg.io_timeout(),
        }
    }
}
