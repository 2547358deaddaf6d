//! Property Store and Value Transforms
//!
//! Maps `zpool get` property names to gauge descriptors and the function that
//! turns the raw text value into a number. A store is built once at startup
//! and shared read-only by every per-pool worker.

use crate::error::{ExporterError, Result};
use crate::metrics::{MetricDesc, Observation};
use crate::zfs::PoolHealth;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

pub const SUBSYSTEM_POOL: &str = "pool";
pub const POOL_LABELS: &[&str] = &["pool"];

/// Properties collected when none are configured
pub const DEFAULT_POOL_PROPERTIES: &[&str] = &[
    "allocated",
    "dedupratio",
    "fragmentation",
    "free",
    "freeing",
    "health",
    "leaked",
    "readonly",
    "size",
];

/// Converts a raw property value into a gauge value
pub type Transform = fn(&str) -> std::result::Result<f64, String>;

/// Registration entry for one property
#[derive(Clone)]
pub struct PropertyDescriptor {
    pub key: String,
    pub desc: Arc<MetricDesc>,
    pub transform: Transform,
}

impl PropertyDescriptor {
    pub fn new(
        subsystem: &str,
        key: &str,
        metric: &str,
        help: impl Into<String>,
        transform: Transform,
        labels: &[&str],
    ) -> Self {
        Self {
            key: key.to_string(),
            desc: Arc::new(MetricDesc::new(subsystem, metric, help, labels)),
            transform,
        }
    }

    /// Transform `raw` and attach `label_values`
    ///
    /// Failures are attributed to this property's key.
    pub fn observe(&self, raw: &str, label_values: &[&str]) -> Result<Observation> {
        let value = (self.transform)(raw).map_err(|reason| ExporterError::Transform {
            property: self.key.clone(),
            value: raw.to_string(),
            reason,
        })?;
        Ok(Observation::new(&self.desc, label_values, value))
    }
}

impl fmt::Debug for PropertyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyDescriptor")
            .field("key", &self.key)
            .field("desc", &self.desc)
            .finish_non_exhaustive()
    }
}

/// Immutable lookup table of the properties a subsystem understands
#[derive(Debug, Clone)]
pub struct PropertyStore {
    subsystem: String,
    store: HashMap<String, PropertyDescriptor>,
}

impl PropertyStore {
    pub fn new(subsystem: &str, descriptors: impl IntoIterator<Item = PropertyDescriptor>) -> Self {
        Self {
            subsystem: subsystem.to_string(),
            store: descriptors
                .into_iter()
                .map(|d| (d.key.clone(), d))
                .collect(),
        }
    }

    pub fn subsystem(&self) -> &str {
        &self.subsystem
    }

    /// Look up a property by its `zpool get` name
    ///
    /// # Errors
    ///
    /// [`ExporterError::UnsupportedProperty`] if `key` is not registered.
    /// Callers treat this as a per-property warning, not a scrape failure.
    pub fn find(&self, key: &str) -> Result<&PropertyDescriptor> {
        self.store
            .get(key)
            .ok_or_else(|| ExporterError::UnsupportedProperty(key.to_string()))
    }

    /// The pool-level properties
    pub fn pool() -> Self {
        let pool = |key: &str, metric: &str, help: &str, transform: Transform| {
            PropertyDescriptor::new(SUBSYSTEM_POOL, key, metric, help, transform, POOL_LABELS)
        };

        Self::new(
            SUBSYSTEM_POOL,
            [
                pool(
                    "allocated",
                    "allocated_bytes",
                    "Amount of storage in bytes used within the pool.",
                    transform_numeric,
                ),
                pool(
                    "dedupratio",
                    "deduplication_ratio",
                    "The ratio of deduplicated size vs undeduplicated size for data in this pool.",
                    transform_multiplier,
                ),
                pool(
                    "capacity",
                    "capacity_ratio",
                    "Ratio of pool space used.",
                    transform_percentage,
                ),
                pool(
                    "expandsize",
                    "expand_size_bytes",
                    "Amount of uninitialized space within the pool or device that can be used to increase the total capacity of the pool.",
                    transform_numeric,
                ),
                pool(
                    "fragmentation",
                    "fragmentation_ratio",
                    "The fragmentation ratio of the pool.",
                    transform_percentage,
                ),
                pool(
                    "free",
                    "free_bytes",
                    "The amount of free space in bytes available in the pool.",
                    transform_numeric,
                ),
                pool(
                    "freeing",
                    "freeing_bytes",
                    "The amount of space in bytes remaining to be freed following the destruction of a file system or snapshot.",
                    transform_numeric,
                ),
                pool("health", "health", &health_help(), transform_health_code),
                pool(
                    "leaked",
                    "leaked_bytes",
                    "Number of leaked bytes in the pool.",
                    transform_numeric,
                ),
                pool(
                    "readonly",
                    "readonly",
                    "Read-only status of the pool [0: read-write, 1: read-only].",
                    transform_bool,
                ),
                pool(
                    "size",
                    "size_bytes",
                    "Total size in bytes of the storage pool.",
                    transform_numeric,
                ),
            ],
        )
    }
}

fn health_help() -> String {
    let codes: Vec<String> = PoolHealth::ALL
        .iter()
        .map(|h| format!("{}: {}", h.code(), h))
        .collect();
    format!("Health status code for the pool [{}].", codes.join(", "))
}

/// Byte counts and plain numbers; `-` and `none` mean unset
pub fn transform_numeric(value: &str) -> std::result::Result<f64, String> {
    match value {
        "-" | "none" => Ok(0.0),
        _ => value
            .parse::<f64>()
            .map_err(|e| format!("not a number: {}", e)),
    }
}

/// Ratios such as `1.35x`
pub fn transform_multiplier(value: &str) -> std::result::Result<f64, String> {
    transform_numeric(value.strip_suffix('x').unwrap_or(value))
}

/// Percentages such as `42` or `42%`, scaled to 0..1
pub fn transform_percentage(value: &str) -> std::result::Result<f64, String> {
    transform_numeric(value.strip_suffix('%').unwrap_or(value)).map(|v| v / 100.0)
}

pub fn transform_bool(value: &str) -> std::result::Result<f64, String> {
    match value {
        "on" | "yes" | "enabled" | "active" | "true" => Ok(1.0),
        "off" | "no" | "disabled" | "inactive" | "false" | "-" => Ok(0.0),
        _ => Err(format!("unknown boolean value {:?}", value)),
    }
}

pub fn transform_health_code(value: &str) -> std::result::Result<f64, String> {
    value.parse::<PoolHealth>().map(|h| f64::from(h.code()))
}
