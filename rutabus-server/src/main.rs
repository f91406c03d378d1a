use std::sync::Arc;

use clap::Parser;
use rutabus_core::{CsvRepository, GraphService};
use rutabus_server::{AppState, Args, ServerConfig, SharedRepository, create_router};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = ServerConfig::load(&args)?;

    // Re-read on every rebuild, so `/admin/rebuild` picks up a new export
    let repository = CsvRepository::open(&config.data.dir)?;
    let skipped = repository.skipped();
    if !skipped.is_empty() {
        warn!(count = skipped.len(), "rows skipped while reading the network export");
    }
    let repository: SharedRepository = Arc::new(repository);
    let state = AppState::new(GraphService::new(repository, config.planner.clone())?);

    // Build eagerly so the first request does not pay for it
    let service = Arc::clone(&state.service);
    let snapshot = tokio::task::spawn_blocking(move || service.snapshot()).await??;
    info!(
        generation = snapshot.generation,
        nodes = snapshot.graph.node_count(),
        arcs = snapshot.graph.arc_count(),
        skipped = snapshot.report.skipped_count(),
        "network ready"
    );

    let app = create_router(state, &config.server);
    let listener = tokio::net::TcpListener::bind(config.server.bind).await?;
    info!("Journey planner listening on http://{}", config.server.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
