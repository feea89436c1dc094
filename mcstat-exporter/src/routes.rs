use crate::config::ScrapeMode;
use crate::error::AppError;
use crate::metrics;
use crate::AppState;

use axum::{
    extract::State,
    http::header::CONTENT_TYPE,
    response::IntoResponse,
    Json,
};
use axum_macros::debug_handler;
use mcstat_query::StatusRecord;
use std::sync::Arc;
use tracing::{debug, warn};

#[debug_handler]
pub(crate) async fn metrics_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let record = current_record(&state).await;
    if record.is_none() {
        debug!("no status acquired yet, serving empty exposition");
    }

    let body = metrics::render(record.as_deref(), &state.names)?;
    Ok(([(CONTENT_TYPE, prometheus::TEXT_FORMAT)], body))
}

/// Obtain the record to render according to the scrape mode.
async fn current_record(state: &AppState) -> Option<Arc<StatusRecord>> {
    let refresher = &state.refresher;
    match state.options.scrape_mode {
        ScrapeMode::Cached => refresher.cache().read().await,
        ScrapeMode::Background => {
            refresher.spawn_refresh();
            refresher.cache().read().await
        }
        ScrapeMode::Blocking => {
            // Run in its own task so the acquisition survives a scrape that
            // gives up waiting.
            let task = tokio::spawn({
                let refresher = Arc::clone(refresher);
                async move { refresher.refresh().await }
            });
            match tokio::time::timeout(state.options.scrape_wait, task).await {
                Ok(Ok(Some(record))) => Some(record),
                Ok(Ok(None)) => None,
                Ok(Err(e)) => {
                    warn!(error = %e, "refresh task failed, serving cached status");
                    refresher.cache().read().await
                }
                Err(_) => {
                    warn!(
                        wait = ?state.options.scrape_wait,
                        "acquisition still running, serving cached status"
                    );
                    refresher.cache().read().await
                }
            }
        }
    }
}

#[debug_handler]
pub(crate) async fn status_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let record = state.refresher.cache().read().await.ok_or(AppError::NoStatus)?;
    Ok(Json(record.as_ref().clone()))
}
