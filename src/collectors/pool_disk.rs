//! Pool Device Collector
//!
//! Parses `zpool status -L` and publishes one status gauge per device row,
//! plus its error counters.
//!
//! # Metrics Produced
//! - `zfs_disk_status` - Always 1; the state is carried as a label
//! - `zfs_disk_read_error` - Read errors (not emitted for spares)
//! - `zfs_disk_write_error` - Write errors (not emitted for spares)
//! - `zfs_disk_checksum_error` - Checksum errors (not emitted for spares)
//!
//! All four share the labels: zpool, vdev, state, kind, disk

use super::ExcludeFilter;
use crate::error::Result;
use crate::metrics::{MetricDesc, Observation};
use crate::zfs::{DeviceKind, ZfsClient};
use std::sync::Arc;
use tracing::debug;

const SUBSYSTEM_DISK: &str = "disk";
const DISK_LABELS: &[&str] = &["zpool", "vdev", "state", "kind", "disk"];

pub struct PoolDiskCollector {
    status: Arc<MetricDesc>,
    read_errors: Arc<MetricDesc>,
    write_errors: Arc<MetricDesc>,
    checksum_errors: Arc<MetricDesc>,
}

impl PoolDiskCollector {
    pub fn new() -> Self {
        let desc = |name: &str, help: &str| {
            Arc::new(MetricDesc::new(SUBSYSTEM_DISK, name, help, DISK_LABELS))
        };

        Self {
            status: desc("status", "zfs_exporter: Disk status"),
            read_errors: desc("read_error", "zfs_exporter: Disk read errors"),
            write_errors: desc("write_error", "zfs_exporter: Disk write errors"),
            checksum_errors: desc("checksum_error", "zfs_exporter: Disk checksum errors"),
        }
    }

    pub fn describe(&self) -> Vec<Arc<MetricDesc>> {
        vec![
            Arc::clone(&self.status),
            Arc::clone(&self.read_errors),
            Arc::clone(&self.write_errors),
            Arc::clone(&self.checksum_errors),
        ]
    }

    pub async fn update<C: ZfsClient>(
        &self,
        client: &C,
        batch: &mut Vec<Observation>,
        excludes: &ExcludeFilter,
    ) -> Result<()> {
        let records = client.pool_status().await?;

        for record in records.iter().filter(|r| !excludes.is_excluded(&r.pool)) {
            let labels = [
                record.pool.as_str(),
                record.vdev.as_str(),
                record.state.as_str(),
                record.kind.as_str(),
                record.name.as_str(),
            ];

            batch.push(Observation::new(&self.status, &labels, 1.0));
            if record.kind != DeviceKind::Spare {
                batch.push(Observation::new(&self.read_errors, &labels, record.read_errors as f64));
                batch.push(Observation::new(&self.write_errors, &labels, record.write_errors as f64));
                batch.push(Observation::new(
                    &self.checksum_errors,
                    &labels,
                    record.checksum_errors as f64,
                ));
            }
        }

        debug!("Collected {} device rows", records.len());
        Ok(())
    }
}

impl Default for PoolDiskCollector {
    fn default() -> Self {
        Self::new()
    }
}
