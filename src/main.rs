use fraud_detection_service::{
    api::{build_router, AppState},
    config::Config,
    ml::ModelService,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fraud_detection_service=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration: {}", e);
        eprintln!("Using default configuration");
        Config::default()
    });

    tracing::info!(
        "Starting fraud detection service v{}",
        env!("CARGO_PKG_VERSION")
    );
    tracing::info!("Training dataset: {}", config.dataset.path.display());

    // Initialize Prometheus metrics
    if config.observability.prometheus_enabled {
        if let Err(e) = fraud_detection_service::metrics::init_metrics() {
            tracing::warn!("Failed to initialize metrics: {}", e);
            tracing::warn!("Continuing without metrics");
        } else {
            tracing::info!("Prometheus metrics initialized");
        }
    } else {
        tracing::info!("Prometheus metrics disabled in configuration");
    }

    // Model state starts empty; /train populates it
    let model = Arc::new(ModelService::new(
        config.dataset.path.clone(),
        config.model.clone(),
    ));

    let state = AppState::new(model);
    let app = build_router(state);

    // Start HTTP server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("HTTP API server listening on http://{}", addr);
    tracing::info!("   Landing page: http://{}/", addr);
    tracing::info!("   Train:        http://{}/train", addr);
    tracing::info!("   Predict:      http://{}/predict", addr);
    tracing::info!("   Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutting down gracefully...");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received");
}
