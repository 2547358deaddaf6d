use crate::collectors::property::DEFAULT_POOL_PROPERTIES;
use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub zfs: ZfsConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub collectors: CollectorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ZfsConfig {
    #[serde(default = "default_zpool_path")]
    pub zpool_path: String,
    /// Upper bound on one scrape, pool enumeration included
    #[serde(default = "default_deadline")]
    pub deadline_seconds: u64,
    /// Regular expressions matched against pool names
    ///
    /// Device rows are matched by the pool context they were listed under, so
    /// spares and log devices (context `spares` / `logs`) are only excluded by
    /// a pattern matching that context name, not by their owning pool.
    #[serde(default)]
    pub exclude: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_addr")]
    pub addr: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CollectorsConfig {
    #[serde(default = "default_true")]
    pub pool: bool,
    #[serde(default = "default_pool_properties")]
    pub pool_properties: Vec<String>,
    #[serde(default = "default_true")]
    pub pool_disks: bool,
}

impl Default for ZfsConfig {
    fn default() -> Self {
        Self {
            zpool_path: default_zpool_path(),
            deadline_seconds: default_deadline(),
            exclude: Vec::new(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            port: default_port(),
        }
    }
}

impl Default for CollectorsConfig {
    fn default() -> Self {
        Self {
            pool: true,
            pool_properties: default_pool_properties(),
            pool_disks: true,
        }
    }
}

fn default_zpool_path() -> String {
    "zpool".to_string()
}

fn default_deadline() -> u64 {
    8
}

fn default_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    9134
}

fn default_pool_properties() -> Vec<String> {
    DEFAULT_POOL_PROPERTIES.iter().map(|p| p.to_string()).collect()
}

fn default_true() -> bool {
    true
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        // Load environment variables from .env if present
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("ZFS_EXPORTER")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("zfs.exclude")
                    .with_list_parse_key("collectors.pool_properties")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}
