use std::num::ParseIntError;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExporterError {
    #[error("Invalid zpool output: {0}")]
    InvalidOutput(String),

    #[error("Unsupported property: {0}")]
    UnsupportedProperty(String),

    #[error("Failed to transform property {property} value {value:?}: {reason}")]
    Transform {
        property: String,
        value: String,
        reason: String,
    },

    #[error("Invalid error counter on line {line:?}: {source}")]
    ParseCounter {
        line: String,
        #[source]
        source: ParseIntError,
    },

    #[error("Command `{command}` failed: {reason}")]
    Command { command: String, reason: String },

    #[error("Scrape deadline of {0:?} exceeded")]
    Timeout(Duration),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

pub type Result<T> = std::result::Result<T, ExporterError>;
