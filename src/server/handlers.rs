use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use rust_embed::RustEmbed;
use serde::Serialize;

use super::state::AppState;
use crate::map::leaflet::SceneMarker;
use crate::map::LayerId;
use crate::render::{legend_entries, LegendEntry, RenderSummary};

#[derive(RustEmbed)]
#[folder = "frontend/"]
struct Asset;

fn embedded(path: &str, content_type: &'static str) -> Response {
    match Asset::get(path) {
        Some(file) => (
            [(header::CONTENT_TYPE, content_type)],
            file.data.into_owned(),
        )
            .into_response(),
        None => {
            tracing::error!("Embedded asset missing: {}", path);
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

pub async fn index_html() -> Response {
    embedded("index.html", "text/html; charset=utf-8")
}

pub async fn style_css() -> Response {
    embedded("style.css", "text/css")
}

pub async fn script_js() -> Response {
    embedded("script.js", "application/javascript")
}

pub async fn get_scene(State(state): State<AppState>) -> Result<Response, StatusCode> {
    let json = {
        let map = state.map.read().map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
        map.surface().to_json().map_err(|e| {
            tracing::error!("Scene serialization error: {:#}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
    };

    Ok((
        [
            (header::CONTENT_TYPE, "application/json"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        json,
    )
        .into_response())
}

/// Earthquake overlay contents, polled by pages loaded before the feed arrived.
#[derive(Debug, Serialize)]
pub struct OverlayResponse {
    pub layer: LayerId,
    pub drawn: bool,
    pub markers: Vec<SceneMarker>,
}

pub async fn get_overlay(State(state): State<AppState>) -> Result<Json<OverlayResponse>, StatusCode> {
    let map = state.map.read().map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    let layer = map.layers().earthquakes;
    let markers = map
        .surface()
        .group(layer)
        .map(|g| g.markers.clone())
        .unwrap_or_default();

    Ok(Json(OverlayResponse {
        layer,
        drawn: map.is_overlay_drawn(),
        markers,
    }))
}

pub async fn get_legend() -> Json<Vec<LegendEntry>> {
    Json(legend_entries())
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub feed_url: String,
    pub render_attempted: bool,
    pub overlay_drawn: bool,
    pub markers: usize,
    pub summary: Option<RenderSummary>,
}

pub async fn get_status(State(state): State<AppState>) -> Result<Json<StatusResponse>, StatusCode> {
    let map = state.map.read().map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(StatusResponse {
        feed_url: state.settings.feed_url.clone(),
        render_attempted: map.is_render_attempted(),
        overlay_drawn: map.is_overlay_drawn(),
        markers: map.earthquake_marker_count(),
        summary: map.summary(),
    }))
}
