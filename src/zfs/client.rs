//! ZFS Command Client
//!
//! Thin I/O shell around the `zpool` binary. Every call spawns a fresh
//! process; nothing is cached between scrapes.
//!
//! | Call                | Command                                        |
//! |---------------------|------------------------------------------------|
//! | [`ZfsClient::pool_names`]      | `zpool list -Ho name`               |
//! | [`ZfsClient::pool_properties`] | `zpool get -Hpo name,property,value <props> <pool>` |
//! | [`ZfsClient::pool_status`]     | `zpool status -L`                   |
//!
//! The [`ZfsClient`] trait is the seam collectors depend on, so tests can
//! substitute canned output for the real binary.

use crate::error::{ExporterError, Result};
use crate::zfs::status::{parse_pool_status, status_lines};
use crate::zfs::types::{PoolProperty, TopologyRecord};
use std::future::Future;
use tokio::process::Command;
use tracing::debug;

/// Source of pool data for the collectors
pub trait ZfsClient: Send + Sync {
    /// Names of all imported pools
    fn pool_names(&self) -> impl Future<Output = Result<Vec<String>>> + Send;

    /// Raw property rows for one pool, restricted to `properties`
    fn pool_properties(
        &self,
        pool: &str,
        properties: &[String],
    ) -> impl Future<Output = Result<Vec<PoolProperty>>> + Send;

    /// Device tree of every imported pool
    fn pool_status(&self) -> impl Future<Output = Result<Vec<TopologyRecord>>> + Send;
}

/// [`ZfsClient`] backed by the `zpool` binary
#[derive(Debug, Clone)]
pub struct CommandClient {
    zpool: String,
}

impl CommandClient {
    pub fn new(zpool: impl Into<String>) -> Self {
        Self {
            zpool: zpool.into(),
        }
    }

    /// Run `zpool` with `args` and return its stdout
    ///
    /// The child is killed if the returned future is dropped, so an expired
    /// scrape deadline does not leave stray processes behind.
    async fn run(&self, args: &[&str]) -> Result<String> {
        let command = format!("{} {}", self.zpool, args.join(" "));
        debug!("Running {}", command);

        let output = Command::new(&self.zpool)
            .args(args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| ExporterError::Command {
                command: command.clone(),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExporterError::Command {
                command,
                reason: format!("{}: {}", output.status, stderr.trim()),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl ZfsClient for CommandClient {
    async fn pool_names(&self) -> Result<Vec<String>> {
        let stdout = self.run(&["list", "-Ho", "name"]).await?;
        Ok(parse_pool_names(&stdout))
    }

    async fn pool_properties(&self, pool: &str, properties: &[String]) -> Result<Vec<PoolProperty>> {
        if properties.is_empty() {
            return Ok(Vec::new());
        }
        let requested = properties.join(",");
        let stdout = self
            .run(&["get", "-Hpo", "name,property,value", requested.as_str(), pool])
            .await?;
        parse_property_rows(pool, &stdout)
    }

    async fn pool_status(&self) -> Result<Vec<TopologyRecord>> {
        let stdout = self.run(&["status", "-L"]).await?;
        parse_pool_status(status_lines(&stdout))
    }
}

/// One pool name per non-empty line
pub fn parse_pool_names(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse tab-separated `name property value` rows for `pool`
///
/// # Errors
///
/// Returns [`ExporterError::InvalidOutput`] if a row does not have exactly
/// three fields or names a different pool.
pub fn parse_property_rows(pool: &str, output: &str) -> Result<Vec<PoolProperty>> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| match line.split('\t').collect::<Vec<_>>().as_slice() {
            [name, property, value] if *name == pool => Ok(PoolProperty {
                pool: name.to_string(),
                property: property.to_string(),
                value: value.to_string(),
            }),
            _ => Err(ExporterError::InvalidOutput(format!(
                "expected `{}<TAB>property<TAB>value`, got {:?}",
                pool, line
            ))),
        })
        .collect()
}
