use anyhow::Result;
use serde::Serialize;

use crate::render::MarkerStyle;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct LayerId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct MarkerHandle(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapView {
    pub center: LatLng,
    pub zoom: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TileLayer {
    pub url_template: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_zoom: Option<u8>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subdomains: Vec<String>,
}

impl TileLayer {
    pub fn new(url_template: &str) -> Self {
        Self {
            url_template: url_template.to_string(),
            attribution: None,
            max_zoom: None,
            subdomains: Vec::new(),
        }
    }

    pub fn with_attribution(mut self, attribution: &str) -> Self {
        self.attribution = Some(attribution.to_string());
        self
    }

    pub fn with_max_zoom(mut self, max_zoom: u8) -> Self {
        self.max_zoom = Some(max_zoom);
        self
    }

    pub fn with_subdomains(mut self, subdomains: &[&str]) -> Self {
        self.subdomains = subdomains.iter().map(|s| s.to_string()).collect();
        self
    }
}

/// Static control whose body is pre-rendered HTML.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendControl {
    pub position: String,
    pub html: String,
}

/// Capabilities of the display surface that markers and controls are drawn on.
///
/// Layers added with `add_to_map = false` exist only to be referenced from
/// a layer control.
pub trait MapSurface: Send + Sync {
    fn create_map(&mut self, view: MapView);

    fn add_tile_layer(&mut self, layer: TileLayer, add_to_map: bool) -> LayerId;

    fn add_layer_group(&mut self, add_to_map: bool) -> LayerId;

    /// Fails when `group` is not a layer group on this surface.
    fn add_circle_marker(
        &mut self,
        group: LayerId,
        position: LatLng,
        style: &MarkerStyle,
    ) -> Result<MarkerHandle>;

    fn bind_popup(&mut self, marker: MarkerHandle, text: &str) -> Result<()>;

    /// Removes every marker from a layer group. Handles to the removed
    /// markers become invalid.
    fn clear_layer_group(&mut self, group: LayerId) -> Result<()>;

    fn add_layer_control(
        &mut self,
        base_layers: &[(String, LayerId)],
        overlays: &[(String, LayerId)],
    ) -> Result<()>;

    fn add_legend_control(&mut self, legend: LegendControl);

    /// Number of markers in a layer group, 0 for unknown ids.
    fn marker_count(&self, group: LayerId) -> usize;
}
