//! Prometheus Metrics Sink
//!
//! Collectors do not touch the registry directly. They produce
//! [`Observation`]s against a [`MetricDesc`], and the scrape orchestrator
//! publishes a collector's observations into a fresh [`MetricSink`] once the
//! collector has finished, so a scrape never exposes a half-written set.
//!
//! # Metric Families
//!
//! - `zfs_pool_*` - scalar pool properties, labelled by `pool`
//! - `zfs_disk_status`, `zfs_disk_read_error`, `zfs_disk_write_error`,
//!   `zfs_disk_checksum_error` - device tree rows
//!   - Labels: zpool, vdev, state, kind, disk
//! - `zfs_scrape_collector_duration_seconds` - time spent in each collector
//! - `zfs_scrape_collector_success` - 1 if the collector succeeded
//!
//! All metrics are gauges and use the `zfs_` namespace prefix.

use crate::error::Result;
use prometheus::{Encoder, GaugeVec, Opts, Registry, TextEncoder};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

pub const NAMESPACE: &str = "zfs";

/// Static identity of a gauge family
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricDesc {
    /// Fully qualified name, e.g. `zfs_pool_size_bytes`
    pub name: String,
    pub help: String,
    pub label_names: Vec<String>,
}

impl MetricDesc {
    pub fn new(subsystem: &str, name: &str, help: impl Into<String>, labels: &[&str]) -> Self {
        Self {
            name: format!("{}_{}_{}", NAMESPACE, subsystem, name),
            help: help.into(),
            label_names: labels.iter().map(|l| l.to_string()).collect(),
        }
    }

    fn opts(&self) -> Opts {
        Opts::new(self.name.clone(), self.help.clone())
    }
}

/// A single gauge value waiting to be published
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub desc: Arc<MetricDesc>,
    pub label_values: Vec<String>,
    pub value: f64,
}

impl Observation {
    pub fn new(desc: &Arc<MetricDesc>, label_values: &[&str], value: f64) -> Self {
        Self {
            desc: Arc::clone(desc),
            label_values: label_values.iter().map(|v| v.to_string()).collect(),
            value,
        }
    }
}

/// Per-scrape registry that observations are published into
///
/// Safe to share between tasks: gauge families are created on first use
/// behind a lock, and the gauges themselves are atomic.
pub struct MetricSink {
    registry: Registry,
    gauges: Mutex<HashMap<String, GaugeVec>>,

    pub scrape_duration_seconds: GaugeVec,
    pub scrape_success: GaugeVec,
}

impl MetricSink {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let scrape_duration_seconds = GaugeVec::new(
            Opts::new(
                "scrape_collector_duration_seconds",
                "zfs_exporter: Duration of a collector scrape.",
            )
            .namespace(NAMESPACE),
            &["collector"],
        )?;

        let scrape_success = GaugeVec::new(
            Opts::new(
                "scrape_collector_success",
                "zfs_exporter: Whether a collector succeeded.",
            )
            .namespace(NAMESPACE),
            &["collector"],
        )?;

        registry.register(Box::new(scrape_duration_seconds.clone()))?;
        registry.register(Box::new(scrape_success.clone()))?;

        Ok(Self {
            registry,
            gauges: Mutex::new(HashMap::new()),
            scrape_duration_seconds,
            scrape_success,
        })
    }

    /// Publish one observation, registering its family on first use
    pub fn publish(&self, observation: &Observation) -> Result<()> {
        let desc = &observation.desc;
        let gauge = {
            let mut gauges = self.gauges.lock().unwrap_or_else(PoisonError::into_inner);
            match gauges.get(&desc.name) {
                Some(gauge) => gauge.clone(),
                None => {
                    let labels: Vec<&str> = desc.label_names.iter().map(String::as_str).collect();
                    let gauge = GaugeVec::new(desc.opts(), &labels)?;
                    self.registry.register(Box::new(gauge.clone()))?;
                    gauges.insert(desc.name.clone(), gauge.clone());
                    gauge
                }
            }
        };

        let values: Vec<&str> = observation.label_values.iter().map(String::as_str).collect();
        gauge
            .get_metric_with_label_values(&values[..])?
            .set(observation.value);
        Ok(())
    }

    pub fn publish_all<'a>(&self, observations: impl IntoIterator<Item = &'a Observation>) -> Result<()> {
        observations.into_iter().try_for_each(|o| self.publish(o))
    }

    /// Record the outcome of one collector
    pub fn set_collector_result(&self, collector: &str, duration_seconds: f64, success: bool) {
        self.scrape_duration_seconds
            .with_label_values(&[collector])
            .set(duration_seconds);
        self.scrape_success
            .with_label_values(&[collector])
            .set(if success { 1.0 } else { 0.0 });
    }

    /// Render metrics in Prometheus text format
    pub fn render(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}
