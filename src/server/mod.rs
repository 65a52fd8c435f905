use anyhow::{Context, Result};
use axum::{routing::get, Router};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

pub mod handlers;
pub mod state;

use self::state::AppState;
use handlers::{
    get_legend, get_overlay, get_scene, get_status, index_html, script_js, style_css,
};

// Create the main application router
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_html))
        .route("/style.css", get(style_css))
        .route("/script.js", get(script_js))
        .route("/api/scene", get(get_scene))
        .route("/api/overlay", get(get_overlay))
        .route("/api/legend", get(get_legend))
        .route("/api/status", get(get_status))
        .layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
        .with_state(state)
}

pub async fn bind(port: u16) -> Result<TcpListener> {
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind HTTP server to {}", addr))
}

pub async fn start_server(state: AppState, listener: TcpListener) -> Result<()> {
    let app = create_app(state);
    let addr = listener.local_addr()?;

    tracing::info!("✅ HTTP server started at http://{}", addr);
    tracing::info!("   🗺️  API endpoints:");
    tracing::info!("      - GET /api/scene  - Recorded map scene");
    tracing::info!("      - GET /api/overlay - Earthquake markers once rendered");
    tracing::info!("      - GET /api/legend - Depth legend entries");
    tracing::info!("      - GET /api/status - Overlay status and depth summary");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("🛑 Shutting down");
}
