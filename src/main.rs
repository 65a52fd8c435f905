use anyhow::{Context, Result};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod constants;
mod feed;
mod map;
mod processing;
mod render;
mod server;
mod settings;
mod utils;

use feed::FeedClient;
use map::{LeafletScene, MapContext};
use processing::spawn_overlay_fetch;
use server::{bind, start_server, state::AppState};
use settings::Settings;

fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quakemap=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    tracing::info!("🌋 QuakeMap v{} starting...", env!("CARGO_PKG_VERSION"));

    let settings = Settings::load().context("Failed to load settings")?;
    tracing::info!("⚙️  Config: {}", utils::get_config_path().display());

    // Base map, layer control and legend exist before any feed data
    let map = MapContext::new(LeafletScene::new())
        .context("Failed to build map context")?
        .into_shared();

    let client = FeedClient::new(&settings.feed_url).context("Failed to build HTTP client")?;
    spawn_overlay_fetch(client, map.clone());

    let listener = bind(settings.port).await?;
    let url = format!("http://{}", listener.local_addr()?);
    if settings.auto_open_browser {
        if let Err(e) = utils::open_browser(&url) {
            tracing::warn!("Could not open browser: {}", e);
        }
    } else {
        tracing::info!("🗺️  Open {} to view the map", url);
    }

    let state = AppState {
        map,
        settings: Arc::new(settings),
    };
    start_server(state, listener).await
}
