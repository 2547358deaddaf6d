//! HTTP Server
//!
//! Serves the Prometheus text exposition. Every `/metrics` request runs a
//! complete scrape against the `zpool` binary; nothing is cached between
//! requests.
//!
//! # Endpoints
//!
//! - `GET /` - HTML landing page with links to metrics and health
//! - `GET /metrics` - Prometheus metrics in text format
//! - `GET /health` - Liveness check (always 200)

use crate::collectors::Exporter;
use crate::config::Config;
use crate::zfs::CommandClient;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::sync::Arc;
use tracing::{error, info};

#[derive(Clone)]
struct AppState {
    exporter: Arc<Exporter<CommandClient>>,
}

pub async fn start(config: Config) -> anyhow::Result<()> {
    let client = CommandClient::new(config.zfs.zpool_path.clone());
    let exporter = Exporter::from_config(client, &config)?;

    info!("Enabled collectors: {}", exporter.collector_names().join(", "));
    for desc in exporter.describe() {
        info!("Exporting {} ({})", desc.name, desc.label_names.join(","));
    }

    let state = AppState {
        exporter: Arc::new(exporter),
    };

    let app = Router::new()
        .route("/", get(root_handler))
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_handler))
        .with_state(state);

    let addr = format!("{}:{}", config.server.addr, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Metrics server listening on {}", addr);
    info!("Metrics available at http://{}/metrics", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn root_handler() -> impl IntoResponse {
    axum::response::Html(
        r#"<html>
<head><title>ZFS Exporter</title></head>
<body>
<h1>ZFS Prometheus Exporter</h1>
<p><a href="/metrics">Metrics</a></p>
<p><a href="/health">Health</a></p>
</body>
</html>"#,
    )
}

async fn metrics_handler(State(state): State<AppState>) -> Response {
    let rendered = match state.exporter.scrape().await {
        Ok(sink) => sink.render(),
        Err(e) => Err(e.into()),
    };

    match rendered {
        Ok(metrics) => metrics.into_response(),
        Err(e) => {
            error!("Failed to render metrics: {}", e);
            (
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error rendering metrics: {}", e),
            )
                .into_response()
        }
    }
}

async fn health_handler() -> impl IntoResponse {
    (axum::http::StatusCode::OK, "OK")
}
