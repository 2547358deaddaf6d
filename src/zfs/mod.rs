pub mod client;
pub mod status;
pub mod types;

pub use client::{CommandClient, ZfsClient};
pub use status::{expand_tabs, parse_pool_status, status_lines};
pub use types::{DeviceKind, PoolHealth, PoolProperty, TopologyRecord};
