//! Pool Property Collector
//!
//! Reads the configured `zpool get` properties of every pool and publishes
//! them through the pool [`PropertyStore`].
//!
//! # Metrics Produced
//! - `zfs_pool_<metric>` for every registered property, e.g.
//!   `zfs_pool_size_bytes`, `zfs_pool_health`, `zfs_pool_fragmentation_ratio`
//!   - Labels: pool
//!
//! One worker runs per pool. A failing pool does not stop the others; the
//! first error is returned once every worker has finished.

use super::{ExcludeFilter, PropertyStore};
use crate::error::{ExporterError, Result};
use crate::metrics::{MetricDesc, Observation};
use crate::zfs::ZfsClient;
use futures_util::future::join_all;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct PoolCollector {
    properties: Vec<String>,
    store: Arc<PropertyStore>,
}

impl PoolCollector {
    pub fn new(properties: Vec<String>, store: Arc<PropertyStore>) -> Self {
        Self { properties, store }
    }

    /// Descriptors for the configured properties the store knows about
    pub fn describe(&self) -> Vec<Arc<MetricDesc>> {
        self.properties
            .iter()
            .filter_map(|key| match self.store.find(key) {
                Ok(prop) => Some(Arc::clone(&prop.desc)),
                Err(e) => {
                    warn!(
                        collector = "pool",
                        subsystem = self.store.subsystem(),
                        property = %key,
                        "{}",
                        e
                    );
                    None
                }
            })
            .collect()
    }

    pub async fn update<C: ZfsClient>(
        &self,
        client: &C,
        batch: &mut Vec<Observation>,
        pools: &[String],
        excludes: &ExcludeFilter,
    ) -> Result<()> {
        let workers = pools
            .iter()
            .filter(|pool| !excludes.is_excluded(pool))
            .map(|pool| self.collect_pool(client, pool));

        let mut first_error = None;
        for (pool, observations, result) in join_all(workers).await {
            batch.extend(observations);
            if let Err(e) = result {
                warn!(collector = "pool", pool = %pool, "Failed to collect pool metrics: {}", e);
                first_error.get_or_insert(e);
            }
        }

        first_error.map_or(Ok(()), Err)
    }

    async fn collect_pool<'a, C: ZfsClient>(
        &self,
        client: &C,
        pool: &'a str,
    ) -> (&'a str, Vec<Observation>, Result<()>) {
        let mut observations = Vec::new();
        let result = self.update_pool_metrics(client, pool, &mut observations).await;
        (pool, observations, result)
    }

    /// Publish every row of one pool
    ///
    /// Unsupported properties are logged and skipped. A value that fails to
    /// transform does not stop its siblings, but is reported as this pool's
    /// error.
    async fn update_pool_metrics<C: ZfsClient>(
        &self,
        client: &C,
        pool: &str,
        observations: &mut Vec<Observation>,
    ) -> Result<()> {
        let rows = client.pool_properties(pool, &self.properties).await?;

        let mut first_error = None;
        for row in &rows {
            let prop = match self.store.find(&row.property) {
                Ok(prop) => prop,
                Err(e @ ExporterError::UnsupportedProperty(_)) => {
                    warn!(
                        collector = "pool",
                        subsystem = self.store.subsystem(),
                        pool = %pool,
                        property = %row.property,
                        "{}",
                        e
                    );
                    continue;
                }
                Err(e) => return Err(e),
            };

            match prop.observe(&row.value, &[pool]) {
                Ok(observation) => observations.push(observation),
                Err(e) => {
                    first_error.get_or_insert(e);
                }
            }
        }

        debug!("Collected {} properties for pool {}", observations.len(), pool);
        first_error.map_or(Ok(()), Err)
    }
}
