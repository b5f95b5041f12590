//! Configuration management for covidpt.
//!
//! This module handles the layered configuration system with the following precedence:
//! 1. Command-line arguments and environment variables (highest priority)
//! 2. JSON config file
//! 3. Default values (lowest priority)

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{CovidPtError, Result};
use crate::table::KeyColumns;

/// Default national dataset published by the DSSG Portugal project
pub const DEFAULT_NATIONAL_SOURCE: &str =
    "https://raw.githubusercontent.com/dssg-pt/covid19pt-data/master/data.csv";

/// Default per-county dataset published by the DSSG Portugal project
pub const DEFAULT_REGIONAL_SOURCE: &str =
    "https://raw.githubusercontent.com/dssg-pt/covid19pt-data/master/data_concelhos_new.csv";

/// Command-line arguments for covidpt
#[derive(Parser, Debug, Default)]
#[command(name = "covidpt")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Host address to bind to
    #[arg(short = 'H', long, env = "COVIDPT_HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "COVIDPT_PORT")]
    pub port: Option<u16>,

    /// Number of worker threads
    #[arg(short, long, env = "COVIDPT_WORKERS")]
    pub workers: Option<usize>,

    /// Path to JSON configuration file
    #[arg(short, long, env = "COVIDPT_CONFIG")]
    pub config: Option<PathBuf>,

    /// URL or file path of the national CSV
    #[arg(long, env = "COVIDPT_NATIONAL_SOURCE")]
    pub national_source: Option<String>,

    /// URL or file path of the per-county CSV
    #[arg(long, env = "COVIDPT_REGIONAL_SOURCE")]
    pub regional_source: Option<String>,

    /// Seconds a fetched table may be reused (0 = refetch on every request)
    #[arg(long, env = "COVIDPT_CACHE_TTL_SECS")]
    pub cache_ttl_secs: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "COVIDPT_LOG_LEVEL")]
    pub log_level: Option<String>,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Number of worker threads (None = number of CPU cores)
    #[serde(default)]
    pub workers: Option<usize>,
}

/// Dataset sources and loader behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// URL or file path of the national CSV
    #[serde(default = "default_national_source")]
    pub national_source: String,

    /// URL or file path of the per-county CSV
    #[serde(default = "default_regional_source")]
    pub regional_source: String,

    /// Column holding the `dd-mm-yyyy` observation date
    #[serde(default = "default_date_column")]
    pub date_column: String,

    /// Column holding the county name in the regional CSV
    #[serde(default = "default_county_column")]
    pub county_column: String,

    /// Seconds a fetched table may be reused
    #[serde(default)]
    pub cache_ttl_secs: u64,

    /// Timeout for a single HTTP fetch
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Extra attempts after a failed fetch
    #[serde(default = "default_fetch_retries")]
    pub fetch_retries: u32,

    /// Pause between fetch attempts
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl DataConfig {
    pub fn key_columns(&self) -> KeyColumns {
        KeyColumns {
            date: self.date_column.clone(),
            county: self.county_column.clone(),
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

/// Complete configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Data configuration
    #[serde(default)]
    pub data: DataConfig,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Config {
    /// Load configuration from all sources with proper precedence
    pub fn load() -> Result<Self> {
        Self::from_args(Args::parse())
    }

    /// Build configuration from already-parsed arguments
    pub fn from_args(args: Args) -> Result<Self> {
        // Start with defaults
        let mut config = Config::default();

        // Load from JSON file if provided
        if let Some(config_path) = &args.config {
            let json_config = Self::load_from_file(config_path)?;
            config.merge(json_config);
        }

        // Override with command-line arguments
        if let Some(host) = args.host {
            config.server.host = host;
        }
        if let Some(port) = args.port {
            config.server.port = port;
        }
        if args.workers.is_some() {
            config.server.workers = args.workers;
        }
        if let Some(source) = args.national_source {
            config.data.national_source = source;
        }
        if let Some(source) = args.regional_source {
            config.data.regional_source = source;
        }
        if let Some(ttl) = args.cache_ttl_secs {
            config.data.cache_ttl_secs = ttl;
        }
        if let Some(level) = args.log_level {
            config.log_level = level;
        }

        Ok(config)
    }

    /// Load configuration from a JSON file
    fn load_from_file(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        self.server.host = other.server.host;
        self.server.port = other.server.port;
        if other.server.workers.is_some() {
            self.server.workers = other.server.workers;
        }
        self.data = other.data;
        self.log_level = other.log_level;
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.host.is_empty() {
            return Err(CovidPtError::Config {
                message: "Server host cannot be empty".to_string(),
            });
        }

        if self.server.port == 0 {
            return Err(CovidPtError::Config {
                message: "Server port cannot be 0".to_string(),
            });
        }

        if self.server.workers == Some(0) {
            return Err(CovidPtError::Config {
                message: "Worker count cannot be 0".to_string(),
            });
        }

        if self.data.fetch_timeout_secs == 0 {
            return Err(CovidPtError::Config {
                message: "data.fetch_timeout_secs cannot be 0".to_string(),
            });
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(CovidPtError::Config {
                    message: format!(
                        "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                        self.log_level
                    ),
                });
            }
        }

        for (name, value) in [
            ("national_source", &self.data.national_source),
            ("regional_source", &self.data.regional_source),
            ("date_column", &self.data.date_column),
            ("county_column", &self.data.county_column),
        ] {
            if value.trim().is_empty() {
                return Err(CovidPtError::Config {
                    message: format!("data.{} cannot be empty", name),
                });
            }
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            data: DataConfig::default(),
            log_level: default_log_level(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            national_source: default_national_source(),
            regional_source: default_regional_source(),
            date_column: default_date_column(),
            county_column: default_county_column(),
            cache_ttl_secs: 0,
            fetch_timeout_secs: default_fetch_timeout_secs(),
            fetch_retries: default_fetch_retries(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

// Default value functions for serde
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5001
}

fn default_national_source() -> String {
    DEFAULT_NATIONAL_SOURCE.to_string()
}

fn default_regional_source() -> String {
    DEFAULT_REGIONAL_SOURCE.to_string()
}

fn default_date_column() -> String {
    KeyColumns::default().date
}

fn default_county_column() -> String {
    KeyColumns::default().county
}

fn default_fetch_timeout_secs() -> u64 {
    30
}

fn default_fetch_retries() -> u32 {
    2
}

fn default_retry_delay_ms() -> u64 {
    500
}

fn default_log_level() -> String {
    "info".to_string()
}
