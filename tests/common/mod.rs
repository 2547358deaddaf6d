//! Shared test fixtures: canned `zpool` output and an in-memory client.

#![allow(dead_code)]

use std::collections::HashMap;
use std::time::Duration;
use zfs_exporter::error::{ExporterError, Result};
use zfs_exporter::zfs::{parse_pool_status, status_lines, PoolProperty, TopologyRecord, ZfsClient};

pub const SSD_TANK_STATUS: &str = "  pool: ssd_tank
 state: ONLINE
  scan: scrub repaired 0B in 02:44:52 with 0 errors on Sun Aug 14 03:08:54 2022
config:

\tNAME        STATE     READ WRITE CKSUM
\tssd_tank    ONLINE       0    13    26
\t  mirror-0  ONLINE       1    14    27
\t    sdc     ONLINE       2    15    28
\t    sda     ONLINE       3    16    29
\t  mirror-1  ONLINE       4    17    30
\t    sdh     ONLINE       5    18    31
\t    sdd     ONLINE       6    19    32
\t  mirror-2  ONLINE       7    20    33
\t    sde     ONLINE       8    21    34
\t    sdf     ONLINE       9    22    35
\t  mirror-3  ONLINE      10    23    36
\t    sdg     ONLINE      11    24    37
\t    sdi     ONLINE      12    25    38
\tspares
\t  sdj       AVAIL

errors: No known data errors
";

/// In-memory [`ZfsClient`] returning canned output
#[derive(Default)]
pub struct FakeClient {
    pub pools: Vec<String>,
    pub list_error: Option<String>,
    pub properties: HashMap<String, Vec<(String, String)>>,
    pub property_errors: HashMap<String, String>,
    pub slow_pools: HashMap<String, Duration>,
    pub status: String,
}

impl FakeClient {
    pub fn with_pools(pools: &[&str]) -> Self {
        Self {
            pools: pools.iter().map(|p| p.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn property(mut self, pool: &str, key: &str, value: &str) -> Self {
        self.properties
            .entry(pool.to_string())
            .or_default()
            .push((key.to_string(), value.to_string()));
        self
    }
}

impl ZfsClient for FakeClient {
    async fn pool_names(&self) -> Result<Vec<String>> {
        match &self.list_error {
            Some(reason) => Err(ExporterError::Command {
                command: "zpool list -Ho name".to_string(),
                reason: reason.clone(),
            }),
            None => Ok(self.pools.clone()),
        }
    }

    async fn pool_properties(&self, pool: &str, _properties: &[String]) -> Result<Vec<PoolProperty>> {
        if let Some(delay) = self.slow_pools.get(pool) {
            tokio::time::sleep(*delay).await;
        }
        if let Some(reason) = self.property_errors.get(pool) {
            return Err(ExporterError::InvalidOutput(reason.clone()));
        }
        Ok(self
            .properties
            .get(pool)
            .into_iter()
            .flatten()
            .map(|(property, value)| PoolProperty {
                pool: pool.to_string(),
                property: property.clone(),
                value: value.clone(),
            })
            .collect())
    }

    async fn pool_status(&self) -> Result<Vec<TopologyRecord>> {
        parse_pool_status(status_lines(&self.status))
    }
}

/// Find the sample line for `name` carrying every label pair, and return its value
pub fn sample_value(rendered: &str, name: &str, labels: &[(&str, &str)]) -> Option<f64> {
    rendered
        .lines()
        .filter(|line| !line.starts_with('#'))
        .filter(|line| line.starts_with(&format!("{}{{", name)) || line.starts_with(&format!("{} ", name)))
        .find(|line| {
            labels
                .iter()
                .all(|(k, v)| line.contains(&format!("{}=\"{}\"", k, v)))
        })
        .and_then(|line| line.rsplit(' ').next())
        .and_then(|value| value.parse().ok())
}
