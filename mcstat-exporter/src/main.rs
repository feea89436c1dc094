use mcstat_exporter::acquirer::StatusAcquirer;
use mcstat_exporter::cache::StatusCache;
use mcstat_exporter::config::Config;
use mcstat_exporter::refresher::Refresher;
use mcstat_exporter::{ExpositionOptions, create_app, validation};
use mcstat_query::{JavaPing, McSrvStat};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Initialize tracing for structured logging
    #[cfg(debug_assertions)]
    let log_level = tracing::Level::DEBUG;
    #[cfg(not(debug_assertions))]
    let log_level = tracing::Level::INFO;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(log_level.as_str())),
        )
        .with_target(false)
        .compact()
        .init();
    tracing::info!("Starting mcstat exporter...");

    let config = Config::load();
    tracing::info!(
        "Configuration: server={}:{}, prefix='{}', listen={}, refresh={}s, query_timeout={}s, scrape_mode={:?}, fallback_url={}",
        config.server,
        config.port,
        config.prefix,
        config.socket_addr(),
        config.refresh_interval().as_secs(),
        config.query_timeout().as_secs(),
        config.scrape_mode,
        config.fallback_url
    );

    if let Err(e) = validation::validate_prefix(&config.prefix) {
        tracing::error!("Invalid configuration: {}", e);
        std::process::exit(2);
    }
    let target = config.target();
    if let Err(e) = validation::validate_target(&target) {
        tracing::warn!("Every status query will fail: {}", e);
    }

    let primary = JavaPing::new(config.query_timeout());
    let fallback = McSrvStat::new(&config.fallback_url, config.query_timeout())
        .expect("Error creating fallback http client");
    let acquirer = StatusAcquirer::new(Arc::new(primary), Arc::new(fallback));
    let policy = acquirer.policy();
    tracing::info!(
        "Retry policy: {} attempts, {}s backoff",
        policy.max_attempts,
        policy.backoff.as_secs()
    );

    let refresher = Arc::new(Refresher::new(
        acquirer,
        Arc::new(StatusCache::new()),
        target,
        config.refresh_interval(),
    ));
    let refresher_task = Arc::clone(&refresher).spawn();

    let app = create_app(
        refresher,
        ExpositionOptions {
            prefix: config.prefix.clone(),
            scrape_mode: config.scrape_mode,
            scrape_wait: config.scrape_wait(),
        },
    );
    let addr = config.socket_addr();
    let listener = TcpListener::bind(addr).await.unwrap();
    tracing::info!("Metrics listening on http://{}/metrics", addr);

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
        tracing::info!("Shutdown signal received");
    };

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
    {
        tracing::error!("Axum server error: {}", e);
    }
    refresher_task.abort();
}
