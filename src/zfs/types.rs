//! ZFS Data Types
//!
//! Plain data recovered from `zpool` output. Records are created fresh for
//! every scrape and carry no identity across scrapes.

use std::fmt;
use std::str::FromStr;

/// Kind of a row in the `zpool status` device tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceKind {
    /// Logical grouping (mirror, raidz) or a bare top-level disk
    Vdev,
    /// Physical device nested below a vdev
    Disk,
    /// Standby device from the `spares` list
    Spare,
}

impl DeviceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceKind::Vdev => "vdev",
            DeviceKind::Disk => "disk",
            DeviceKind::Spare => "spare",
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the pool → vdev → disk tree (plus the flat spares list)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopologyRecord {
    /// Owning pool, or `spares` for spare devices
    pub pool: String,
    /// Owning vdev; empty for spares
    pub vdev: String,
    pub name: String,
    pub kind: DeviceKind,
    /// Status token as printed (ONLINE, DEGRADED, AVAIL, ...)
    pub state: String,
    pub read_errors: u64,
    pub write_errors: u64,
    pub checksum_errors: u64,
}

/// Pool and device health states reported by ZFS
///
/// The numeric code is what `zfs_pool_health` publishes, so the order is fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolHealth {
    Online = 0,
    Degraded = 1,
    Faulted = 2,
    Offline = 3,
    Unavail = 4,
    Removed = 5,
    Suspended = 6,
}

impl PoolHealth {
    pub const ALL: [PoolHealth; 7] = [
        PoolHealth::Online,
        PoolHealth::Degraded,
        PoolHealth::Faulted,
        PoolHealth::Offline,
        PoolHealth::Unavail,
        PoolHealth::Removed,
        PoolHealth::Suspended,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PoolHealth::Online => "ONLINE",
            PoolHealth::Degraded => "DEGRADED",
            PoolHealth::Faulted => "FAULTED",
            PoolHealth::Offline => "OFFLINE",
            PoolHealth::Unavail => "UNAVAIL",
            PoolHealth::Removed => "REMOVED",
            PoolHealth::Suspended => "SUSPENDED",
        }
    }

    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for PoolHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PoolHealth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PoolHealth::ALL
            .into_iter()
            .find(|health| health.as_str() == s)
            .ok_or_else(|| format!("unknown health state {:?}", s))
    }
}

/// One `(pool, property, value)` row from `zpool get -Hp`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolProperty {
    pub pool: String,
    pub property: String,
    pub value: String,
}
