use anyhow::Result;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use zfs_exporter::{config::Config, server};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/Default.toml")]
    config: String,

    /// Path to the zpool binary (overrides config)
    #[arg(long, env = "ZFS_EXPORTER_ZPOOL_PATH")]
    zpool_path: Option<String>,

    /// Scrape deadline in seconds (overrides config)
    #[arg(long, env = "ZFS_EXPORTER_DEADLINE")]
    deadline: Option<u64>,

    /// Regular expression of pool names to exclude; may be repeated
    #[arg(long)]
    exclude: Vec<String>,

    /// Port to listen on for metrics (overrides config)
    #[arg(short, long, env = "EXPORTER_PORT")]
    port: Option<u16>,

    /// Address to bind to (overrides config)
    #[arg(short, long, env = "EXPORTER_ADDR")]
    addr: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ZFS Prometheus Exporter v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();
    let mut config = Config::load(&args.config)?;

    if let Some(zpool_path) = args.zpool_path {
        config.zfs.zpool_path = zpool_path;
    }
    if let Some(deadline) = args.deadline {
        config.zfs.deadline_seconds = deadline;
    }
    config.zfs.exclude.extend(args.exclude);
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(addr) = args.addr {
        config.server.addr = addr;
    }

    info!("Configuration loaded successfully");
    info!("zpool binary: {}", config.zfs.zpool_path);
    info!(
        "Metrics endpoint: http://{}:{}/metrics",
        config.server.addr, config.server.port
    );

    if let Err(e) = server::start(config).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
