use crate::handlers;
use axum::{Router, routing::get};
use expfmt_core::config::{HEALTH_PATH, HttpConfig, metrics_route};
use expfmt_core::error::ExpfmtError;
use expfmt_encoder::ScrapeMetrics;
use prometheus::proto::MetricFamily;
use prometheus::Registry;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Shared state for the scrape endpoint.
pub struct HttpState {
    /// Application metrics to expose.
    pub registry: Registry,
    /// The exporter's own metrics, merged into every scrape.
    pub metrics: Arc<ScrapeMetrics>,
}

impl HttpState {
    pub fn new(registry: Registry, metrics: ScrapeMetrics) -> Self {
        Self {
            registry,
            metrics: Arc::new(metrics),
        }
    }

    /// Application families plus self-metrics, sorted by name.
    pub fn gather(&self) -> Vec<MetricFamily> {
        let mut families = self.registry.gather();
        families.extend(self.metrics.gather());
        families.sort_by(|a, b| a.get_name().cmp(b.get_name()));
        families
    }
}

/// Build the axum router: negotiated scrape at `metrics_path`, plus `/health`.
///
/// Fails when `metrics_path` is not a usable literal route.
pub fn build_router(
    state: Arc<HttpState>,
    metrics_path: &str,
) -> Result<Router, ExpfmtError> {
    let metrics_path = metrics_route(metrics_path)?;
    Ok(Router::new()
        .route(&metrics_path, get(handlers::metrics::scrape))
        .route(HEALTH_PATH, get(handlers::health::health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

/// Bind and serve until Ctrl-C / SIGTERM.
pub async fn serve(config: HttpConfig, state: Arc<HttpState>) -> anyhow::Result<()> {
    let app = build_router(state, &config.metrics_path)?;

    let listener = tokio::net::TcpListener::bind(&config.addr).await?;
    info!(addr = %config.addr, path = %config.metrics_path, "Scrape endpoint listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Scrape endpoint stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
