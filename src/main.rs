//! Cardex - Market Data Service
//!
//! Connects to the listing price SSE feed, maintains the dashboard state
//! incrementally, and serves it to the browser UI over HTTP.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use tokio::sync::{watch, RwLock};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cardex_market_data::{
    AppState, Config, Dashboard, DashboardSnapshot, Publisher, SortKey, StreamIngestor,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .init();

    info!("Starting Cardex market data service");

    // Load configuration
    let config = Arc::new(Config::load()?);
    info!(
        endpoint = %config.stream_endpoint,
        page_size = config.page_size,
        "Configuration loaded"
    );

    // Single-writer dashboard state and the snapshot publisher
    let dashboard = Arc::new(RwLock::new(Dashboard::new(config.page_size)?));
    let publisher = Arc::new(Publisher::new());

    let state = Arc::new(AppState {
        dashboard: dashboard.clone(),
        publisher: publisher.clone(),
        config: config.clone(),
    });

    // HTTP surface for the browser dashboard
    let api_state = state.clone();
    let http_port = config.http_port;
    tokio::spawn(async move {
        if let Err(e) = serve_api(api_state, http_port).await {
            warn!(error = %e, "API server error");
        }
    });

    // Ctrl-c flips the shutdown channel; the ingestor releases the feed
    // connection before the task resolves.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let ingestor = StreamIngestor::new(state.clone(), shutdown_rx);
    let ingest_handle = tokio::spawn(ingestor.run());

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");
    let _ = shutdown_tx.send(true);

    match ingest_handle.await {
        Ok(Ok(())) => info!("Feed ingestion stopped"),
        Ok(Err(e)) => warn!(error = %e, "Feed ingestion ended with error"),
        Err(e) => warn!(error = %e, "Feed ingestion task failed"),
    }

    Ok(())
}

/// Serve the dashboard state and user operations, plus health and metrics.
/// CORS is permissive: the browser UI is a cross-origin client.
async fn serve_api(state: Arc<AppState>, port: u16) -> anyhow::Result<()> {
    let app = Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .route("/state", get(dashboard_state))
        .route("/sort/:key", post(set_sort))
        .route("/page/next", post(next_page))
        .route("/page/prev", post(prev_page))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(addr = %addr, "Starting dashboard API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "component": "market-data",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn metrics() -> String {
    use prometheus::{Encoder, TextEncoder};
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}

async fn dashboard_state(State(state): State<Arc<AppState>>) -> Json<DashboardSnapshot> {
    Json(state.dashboard.read().await.snapshot())
}

async fn set_sort(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Json<DashboardSnapshot>, StatusCode> {
    let key: SortKey = key.parse().map_err(|_| StatusCode::BAD_REQUEST)?;

    let snapshot = {
        let mut dashboard = state.dashboard.write().await;
        dashboard.set_sort(key);
        dashboard.snapshot()
    };
    state.publisher.publish(snapshot.clone());

    Ok(Json(snapshot))
}

async fn next_page(State(state): State<Arc<AppState>>) -> Json<DashboardSnapshot> {
    let snapshot = {
        let mut dashboard = state.dashboard.write().await;
        dashboard.next_page();
        dashboard.snapshot()
    };
    state.publisher.publish(snapshot.clone());

    Json(snapshot)
}

async fn prev_page(State(state): State<Arc<AppState>>) -> Json<DashboardSnapshot> {
    let snapshot = {
        let mut dashboard = state.dashboard.write().await;
        dashboard.prev_page();
        dashboard.snapshot()
    };
    state.publisher.publish(snapshot.clone());

    Json(snapshot)
}
