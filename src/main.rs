use std::sync::Arc;

use actix::prelude::*;
use actix_web::{web, App, HttpServer};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod api;
mod config;
mod domain;
mod engine;
mod metrics;
mod reporting;
mod seed;
mod store;

use engine::{OrderEngine, OrderEngineActor};
use reporting::ReportingEngine;
use store::MemoryStore;

#[actix::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured logging with environment-based filtering
    // Default to INFO level, can be overridden with RUST_LOG env var
    // Example: RUST_LOG=debug cargo run
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,order_engine=debug")),
        )
        .init();

    tracing::info!("🚀 Starting Order Aggregation Engine");

    let config = config::Config::from_env();
    tracing::info!(?config, "Configuration loaded");

    // === 1. Open the store handle (explicit lifecycle, injected below) ===
    let store = Arc::new(MemoryStore::new());

    // === 2. Initialize Prometheus metrics ===
    tracing::info!("Initializing metrics");
    let app_metrics = Arc::new(metrics::Metrics::new()?);
    tracing::info!(
        "📊 Metrics registry created with {} metrics",
        app_metrics.registry().gather().len()
    );

    // Start metrics HTTP server in background thread
    let metrics_registry = Arc::new(app_metrics.registry().clone());
    let metrics_port = config.metrics_port;
    std::thread::spawn(move || {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            if let Err(e) = metrics::start_metrics_server(metrics_registry, metrics_port).await {
                tracing::error!("Metrics server error: {}", e);
            }
        });
    });

    // === 3. Build the engine and optionally seed demo data ===
    let order_engine = OrderEngine::new(store.clone(), app_metrics.clone());

    if config.seed_demo_data {
        let summary = seed::load_demo_data(&order_engine)?;
        tracing::info!(
            admin_user_id = %summary.admin_user_id,
            products = summary.products,
            users = summary.users,
            orders = summary.orders,
            "🌱 Demo data loaded"
        );
    }

    // === 4. Start the engine actor (mailbox serializes all mutations) ===
    let engine_addr = OrderEngineActor::new(order_engine).start();

    // === 5. Run the API server ===
    let state = web::Data::new(api::AppState {
        store: store.clone(),
        engine: engine_addr,
        reports: ReportingEngine::new(store),
    });

    tracing::info!("📡 API server on http://0.0.0.0:{}", config.http_port);
    HttpServer::new(move || App::new().app_data(state.clone()).configure(api::configure))
        .bind(("0.0.0.0", config.http_port))?
        .run()
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
