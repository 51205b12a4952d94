//! Web dashboard: a form-driven optimizer page plus a small JSON API.
//!
//! Every submission runs the full pipeline against the price source; no
//! results are cached between requests.

mod config;
mod error;
mod render;
mod routes;

pub(crate) use config::DashboardConfig;

use axum::Router;
use axum::routing::{get, post};
use frontier::data::{FetchConfig, PriceSource, YahooQuoteProvider};
use frontier::optim::OptimizerConfig;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Shared state handed to every handler.
#[derive(Debug)]
pub(crate) struct AppState<S> {
    pub(crate) source: S,
    pub(crate) optimizer: OptimizerConfig,
}

impl<S> AppState<S> {
    pub(crate) fn new(source: S, optimizer: OptimizerConfig) -> Arc<Self> {
        Arc::new(Self { source, optimizer })
    }
}

/// Assemble the dashboard router.
pub(crate) fn router<S>(state: Arc<AppState<S>>) -> Router
where
    S: PriceSource + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(routes::index))
        .route("/optimize", get(routes::optimize_page::<S>))
        .route("/api/optimize", post(routes::api_optimize::<S>))
        .route("/health", get(routes::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the dashboard backed by Yahoo Finance until Ctrl+C.
pub(crate) async fn serve(config: DashboardConfig) -> Result<(), Box<dyn std::error::Error>> {
    let source = YahooQuoteProvider::with_config(FetchConfig {
        request_delay: config.request_delay,
    })?;
    let app = router(AppState::new(source, OptimizerConfig::default()));

    let addr = format!("{}:{}", config.bind, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Dashboard listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl+C");
        return;
    }
    info!("Shutdown signal received, stopping dashboard");
}
