//! ZFS Prometheus Exporter
//!
//! Turns `zpool` command output into Prometheus gauges.
//!
//! # Overview
//!
//! Every scrape lists the imported pools, reads their properties with
//! `zpool get`, and recovers the device tree from `zpool status`. Nothing is
//! kept between scrapes.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐   zpool list/get/   ┌────────────────────────┐
//! │    zpool    │ ◄─────────────────► │       Exporter         │
//! │   binary    │       status        │                        │
//! └─────────────┘                     │  ┌──────────────────┐  │      HTTP      ┌────────────┐
//!                                     │  │ Topology Parser  │  │ ◄────────────► │ Prometheus │
//!                                     │  └──────────────────┘  │   /metrics     └────────────┘
//!                                     │  ┌──────────────────┐  │
//!                                     │  │  Property Store  │  │
//!                                     │  └──────────────────┘  │
//!                                     └────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`zfs`] - `zpool` client, topology parser and data types
//! - [`collectors`] - Property store, pool and device collectors, scrape orchestration
//! - [`metrics`] - Metric descriptors and the per-scrape sink
//! - [`server`] - HTTP server
//! - [`config`] - Configuration management
//! - [`error`] - Error types
//!
//! # Quick Start
//!
//! ```no_run
//! use zfs_exporter::{config::Config, server};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/Default.toml")?;
//!     server::start(config).await?;
//!     Ok(())
//! }
//! ```

pub mod collectors;
pub mod config;
pub mod error;
pub mod metrics;
pub mod server;
pub mod zfs;
