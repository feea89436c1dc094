pub mod acquirer;
pub mod cache;
pub mod config;
mod error;
pub mod metrics;
pub mod refresher;
mod routes;
pub mod validation;

use axum::{Router, http::StatusCode, routing::get};
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;

use crate::config::ScrapeMode;
use crate::metrics::MetricNames;
use crate::refresher::Refresher;

pub use error::ErrorResponse;

pub struct AppState {
    pub refresher: Arc<Refresher>,
    pub names: MetricNames,
    pub options: ExpositionOptions,
}

/// Exposition endpoint configuration
#[derive(Debug, Clone)]
pub struct ExpositionOptions {
    /// Prefix for all metric names, empty for none
    pub prefix: String,
    /// How a scrape obtains the status it renders
    pub scrape_mode: ScrapeMode,
    /// Longest a blocking scrape waits for a fresh status
    pub scrape_wait: Duration,
}

impl Default for ExpositionOptions {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            scrape_mode: ScrapeMode::Cached,
            scrape_wait: Duration::from_secs(30),
        }
    }
}

/// Create the application router around the given refresher
pub fn create_app(refresher: Arc<Refresher>, options: ExpositionOptions) -> Router {
    let state = Arc::new(AppState {
        refresher,
        names: MetricNames::new(&options.prefix),
        options,
    });

    Router::new()
        .route("/health", get(|| async { StatusCode::OK }))
        .route("/metrics", get(routes::metrics_handler))
        .route("/status", get(routes::status_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
