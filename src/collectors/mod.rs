//! Metrics Collectors
//!
//! Each collector turns one kind of `zpool` output into gauge observations.
//! The [`Exporter`] runs every enabled collector once per scrape and
//! publishes the results into a fresh [`MetricSink`].
//!
//! # Architecture
//!
//! Collectors follow a consistent pattern:
//! - `describe()` lists the metric families they can produce
//! - `update()` queries the [`ZfsClient`] and appends observations to a batch
//! - A collector's batch is only published once `update()` has returned
//!
//! # Error Handling
//!
//! Collector failures are non-fatal for the scrape. The failing collector
//! reports `zfs_scrape_collector_success 0` with a zero duration, and the
//! other collectors are unaffected.

use crate::config::Config;
use crate::error::{ExporterError, Result};
use crate::metrics::{MetricDesc, MetricSink, Observation};
use crate::zfs::ZfsClient;
use futures_util::future::join_all;
use regex::Regex;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

pub mod pool;
pub mod pool_disk;
pub mod property;

pub use pool::PoolCollector;
pub use pool_disk::PoolDiskCollector;
pub use property::{PropertyDescriptor, PropertyStore};

/// Status of a single collector run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionStatus {
    /// All observations were collected and published
    Success,
    /// Collection failed (already logged as warning)
    Failed,
}

/// Pool names to leave out of every collector
#[derive(Debug, Clone, Default)]
pub struct ExcludeFilter {
    patterns: Vec<Regex>,
}

impl ExcludeFilter {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| {
                Regex::new(p.as_ref()).map_err(|e| {
                    ExporterError::Config(format!("invalid exclude pattern {:?}: {}", p.as_ref(), e))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    pub fn is_excluded(&self, pool: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(pool))
    }
}

/// The collectors an [`Exporter`] can run
pub enum Collector {
    Pool(PoolCollector),
    PoolDisks(PoolDiskCollector),
}

impl Collector {
    /// Value of the `collector` label on the scrape metrics
    pub fn name(&self) -> &'static str {
        match self {
            Collector::Pool(_) => "pool",
            Collector::PoolDisks(_) => "pool-disks",
        }
    }

    pub fn describe(&self) -> Vec<Arc<MetricDesc>> {
        match self {
            Collector::Pool(c) => c.describe(),
            Collector::PoolDisks(c) => c.describe(),
        }
    }

    pub async fn update<C: ZfsClient>(
        &self,
        client: &C,
        batch: &mut Vec<Observation>,
        pools: &[String],
        excludes: &ExcludeFilter,
    ) -> Result<()> {
        match self {
            Collector::Pool(c) => c.update(client, batch, pools, excludes).await,
            Collector::PoolDisks(c) => c.update(client, batch, excludes).await,
        }
    }
}

/// Runs the enabled collectors against one [`ZfsClient`]
pub struct Exporter<C> {
    client: C,
    collectors: Vec<Collector>,
    excludes: ExcludeFilter,
    deadline: Duration,
}

impl<C: ZfsClient> Exporter<C> {
    pub fn new(
        client: C,
        collectors: Vec<Collector>,
        excludes: ExcludeFilter,
        deadline: Duration,
    ) -> Self {
        Self {
            client,
            collectors,
            excludes,
            deadline,
        }
    }

    /// Build the collectors enabled in `config`
    ///
    /// The pool property store is constructed here, once, and shared by every
    /// pool worker for the life of the exporter.
    pub fn from_config(client: C, config: &Config) -> Result<Self> {
        let mut collectors = Vec::new();
        if config.collectors.pool {
            let store = Arc::new(PropertyStore::pool());
            collectors.push(Collector::Pool(PoolCollector::new(
                config.collectors.pool_properties.clone(),
                store,
            )));
        }
        if config.collectors.pool_disks {
            collectors.push(Collector::PoolDisks(PoolDiskCollector::new()));
        }

        Ok(Self::new(
            client,
            collectors,
            ExcludeFilter::new(&config.zfs.exclude)?,
            Duration::from_secs(config.zfs.deadline_seconds),
        ))
    }

    pub fn collector_names(&self) -> Vec<&'static str> {
        self.collectors.iter().map(Collector::name).collect()
    }

    pub fn describe(&self) -> Vec<Arc<MetricDesc>> {
        self.collectors.iter().flat_map(Collector::describe).collect()
    }

    /// Run one scrape cycle into a fresh sink
    ///
    /// Pools are enumerated once and handed to every collector. If that fails,
    /// every collector is reported as failed and nothing else is published.
    /// The deadline covers the whole cycle; a collector still running when it
    /// expires is dropped and none of its observations are published.
    pub async fn scrape(&self) -> Result<MetricSink> {
        let sink = MetricSink::new()?;
        let deadline = tokio::time::Instant::now() + self.deadline;

        let pools = match tokio::time::timeout_at(deadline, self.client.pool_names()).await {
            Ok(Ok(pools)) => pools,
            Ok(Err(e)) => {
                warn!("Failed to list pools: {}", e);
                self.fail_all(&sink);
                return Ok(sink);
            }
            Err(_) => {
                warn!("Failed to list pools: {}", ExporterError::Timeout(self.deadline));
                self.fail_all(&sink);
                return Ok(sink);
            }
        };
        debug!("Scraping {} pools", pools.len());

        let runs = self
            .collectors
            .iter()
            .map(|collector| self.run_collector(collector, &pools, deadline));
        for (name, status, elapsed, batch) in join_all(runs).await {
            let status = match (status, sink.publish_all(&batch)) {
                (CollectionStatus::Success, Ok(())) => CollectionStatus::Success,
                (_, Err(e)) => {
                    warn!(collector = name, "Failed to publish metrics: {}", e);
                    CollectionStatus::Failed
                }
                (CollectionStatus::Failed, Ok(())) => CollectionStatus::Failed,
            };

            match status {
                CollectionStatus::Success => {
                    sink.set_collector_result(name, elapsed.as_secs_f64(), true)
                }
                CollectionStatus::Failed => sink.set_collector_result(name, 0.0, false),
            }
        }

        Ok(sink)
    }

    async fn run_collector(
        &self,
        collector: &Collector,
        pools: &[String],
        deadline: tokio::time::Instant,
    ) -> (&'static str, CollectionStatus, Duration, Vec<Observation>) {
        let name = collector.name();
        let begin = Instant::now();
        let mut batch = Vec::new();

        let update = collector.update(&self.client, &mut batch, pools, &self.excludes);
        let outcome = tokio::time::timeout_at(deadline, update).await;
        let status = match outcome {
            Ok(Ok(())) => CollectionStatus::Success,
            Ok(Err(e)) => {
                warn!(collector = name, "Collector failed: {}", e);
                CollectionStatus::Failed
            }
            Err(_) => {
                warn!(collector = name, "{}", ExporterError::Timeout(self.deadline));
                batch.clear();
                CollectionStatus::Failed
            }
        };

        (name, status, begin.elapsed(), batch)
    }

    fn fail_all(&self, sink: &MetricSink) {
        for collector in &self.collectors {
            sink.set_collector_result(collector.name(), 0.0, false);
        }
    }
}
