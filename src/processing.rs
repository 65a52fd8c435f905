use std::time::Instant;
use tokio::task::JoinHandle;

use crate::feed::{FeatureCollection, FeedClient};
use crate::map::SharedMapContext;

/// Renders a fetched feed into the shared map context.
/// Returns `true` when the overlay was drawn by this call.
pub fn apply_feed(ctx: &SharedMapContext, collection: &FeatureCollection) -> bool {
    if let Some(metadata) = &collection.metadata {
        let generated = metadata
            .generated_at()
            .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| "unknown".to_string());
        tracing::info!(
            "📡 Feed '{}' generated at {} ({} events)",
            metadata.title.as_deref().unwrap_or("untitled"),
            generated,
            metadata.count.unwrap_or(collection.features.len())
        );
    }

    let (features, skipped) = collection.earthquakes();
    if skipped > 0 {
        tracing::warn!("Skipped {} features without a point geometry", skipped);
    }

    let mut guard = match ctx.write() {
        Ok(guard) => guard,
        Err(_) => {
            tracing::error!("Map context lock poisoned, earthquake overlay not drawn");
            return false;
        }
    };

    match guard.draw_earthquakes(&features) {
        Ok(Some(summary)) => {
            tracing::info!(
                "🗺️  Drew {} earthquakes (shallow: {}, intermediate: {}, deep: {})",
                summary.total,
                summary.shallow,
                summary.intermediate,
                summary.deep
            );
            true
        }
        Ok(None) => false,
        Err(e) => {
            tracing::error!("Failed to draw earthquake overlay: {:#}", e);
            false
        }
    }
}

/// Fetches the feed once and draws it. Any failure leaves the overlay empty;
/// the base map and legend are unaffected.
pub async fn load_overlay(client: &FeedClient, ctx: &SharedMapContext) -> bool {
    let start = Instant::now();
    tracing::info!("🌍 Fetching earthquake feed from {}", client.url());

    match client.fetch().await {
        Ok(collection) => {
            tracing::info!(
                "✅ Feed received in {:.2}s with {} features",
                start.elapsed().as_secs_f64(),
                collection.features.len()
            );
            apply_feed(ctx, &collection)
        }
        Err(e) => {
            tracing::warn!("⚠️  Earthquake feed unavailable, overlay stays empty: {}", e);
            false
        }
    }
}

/// Single-shot background fetch; no retry, no cancellation.
pub fn spawn_overlay_fetch(client: FeedClient, ctx: SharedMapContext) -> JoinHandle<bool> {
    tokio::spawn(async move { load_overlay(&client, &ctx).await })
}
