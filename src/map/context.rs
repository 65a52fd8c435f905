use anyhow::Result;
use std::sync::{Arc, RwLock};

use super::leaflet::LeafletScene;
use super::surface::{LatLng, LayerId, LegendControl, MapSurface, MapView, TileLayer};
use crate::constants::{
    BASE_LAYER_NAME, DEFAULT_CENTER, DEFAULT_ZOOM, EARTHQUAKE_LAYER_NAME, LEGEND_POSITION,
    OSM_ATTRIBUTION, OSM_TILE_URL, SATELLITE_MAX_ZOOM, SATELLITE_SUBDOMAINS, SATELLITE_TILE_URL,
};
use crate::feed::EarthquakeFeature;
use crate::render::{legend_entries, legend_html, render, RenderSummary, RenderedMarker};

/// Map context shared between the fetch task and the HTTP handlers.
pub type SharedMapContext = Arc<RwLock<MapContext<LeafletScene>>>;

#[derive(Debug, Clone, Copy)]
pub struct MapLayers {
    pub street: LayerId,
    pub satellite: LayerId,
    pub earthquakes: LayerId,
}

/// Display surface plus the layer handles created at startup.
///
/// The earthquake overlay is written by at most one render pass; the base
/// map, layer control and legend do not depend on it. A pass that fails
/// partway leaves the overlay empty and still counts as the one pass.
pub struct MapContext<S: MapSurface> {
    surface: S,
    layers: MapLayers,
    render_attempted: bool,
    summary: Option<RenderSummary>,
}

impl<S: MapSurface> MapContext<S> {
    pub fn new(mut surface: S) -> Result<Self> {
        surface.create_map(MapView {
            center: LatLng::new(DEFAULT_CENTER.0, DEFAULT_CENTER.1),
            zoom: DEFAULT_ZOOM,
        });

        let street = surface.add_tile_layer(
            TileLayer::new(OSM_TILE_URL).with_attribution(OSM_ATTRIBUTION),
            true,
        );
        let satellite = surface.add_tile_layer(
            TileLayer::new(SATELLITE_TILE_URL)
                .with_max_zoom(SATELLITE_MAX_ZOOM)
                .with_subdomains(SATELLITE_SUBDOMAINS),
            true,
        );

        // Empty until the feed arrives
        let earthquakes = surface.add_layer_group(true);

        surface.add_layer_control(
            &[(BASE_LAYER_NAME.to_string(), street)],
            &[(EARTHQUAKE_LAYER_NAME.to_string(), earthquakes)],
        )?;

        surface.add_legend_control(LegendControl {
            position: LEGEND_POSITION.to_string(),
            html: legend_html(&legend_entries()),
        });

        Ok(Self {
            surface,
            layers: MapLayers {
                street,
                satellite,
                earthquakes,
            },
            render_attempted: false,
            summary: None,
        })
    }

    pub fn into_shared(self) -> Arc<RwLock<Self>> {
        Arc::new(RwLock::new(self))
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn layers(&self) -> MapLayers {
        self.layers
    }

    /// True once a render pass ran, whether or not it succeeded.
    pub fn is_render_attempted(&self) -> bool {
        self.render_attempted
    }

    pub fn is_overlay_drawn(&self) -> bool {
        self.summary.is_some()
    }

    pub fn summary(&self) -> Option<RenderSummary> {
        self.summary
    }

    pub fn earthquake_marker_count(&self) -> usize {
        self.surface.marker_count(self.layers.earthquakes)
    }

    /// Renders the features into the earthquake overlay.
    ///
    /// Returns `None` without touching the surface if a render pass already
    /// ran. On error the overlay group is cleared.
    pub fn draw_earthquakes(
        &mut self,
        features: &[EarthquakeFeature],
    ) -> Result<Option<RenderSummary>> {
        if self.render_attempted {
            tracing::warn!("Earthquake overlay already rendered, ignoring second render pass");
            return Ok(None);
        }
        self.render_attempted = true;

        let markers = render(features);
        if let Err(e) = self.add_markers(&markers) {
            if let Err(clear_err) = self.surface.clear_layer_group(self.layers.earthquakes) {
                tracing::error!("Failed to clear partial earthquake overlay: {:#}", clear_err);
            }
            return Err(e);
        }

        let summary = RenderSummary::from_markers(&markers);
        self.summary = Some(summary);
        Ok(Some(summary))
    }

    fn add_markers(&mut self, markers: &[RenderedMarker]) -> Result<()> {
        for marker in markers {
            let handle = self.surface.add_circle_marker(
                self.layers.earthquakes,
                marker.position,
                &marker.style,
            )?;
            self.surface.bind_popup(handle, &marker.popup)?;
        }
        Ok(())
    }
}
