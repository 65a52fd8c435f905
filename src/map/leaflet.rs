use anyhow::{bail, Context, Result};
use serde::Serialize;

use super::surface::{LatLng, LayerId, LegendControl, MapSurface, MapView, MarkerHandle, TileLayer};
use crate::render::MarkerStyle;

// Records every surface call as plain data. The browser front end replays
// the serialized scene against Leaflet (see frontend/script.js).
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeafletScene {
    pub view: Option<MapView>,
    pub tile_layers: Vec<SceneTileLayer>,
    pub layer_groups: Vec<SceneLayerGroup>,
    pub layer_control: Option<SceneLayerControl>,
    pub legend: Option<LegendControl>,
    #[serde(skip)]
    next_layer_id: usize,
    // marker handle -> (group index, marker index), `None` once cleared
    #[serde(skip)]
    marker_slots: Vec<Option<(usize, usize)>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneTileLayer {
    pub id: LayerId,
    #[serde(flatten)]
    pub layer: TileLayer,
    pub on_map: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneLayerGroup {
    pub id: LayerId,
    pub on_map: bool,
    pub markers: Vec<SceneMarker>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SceneMarker {
    pub id: MarkerHandle,
    pub position: LatLng,
    pub style: MarkerStyle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub popup: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneLayerControl {
    pub base_layers: Vec<NamedLayer>,
    pub overlays: Vec<NamedLayer>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NamedLayer {
    pub name: String,
    pub layer: LayerId,
}

impl LeafletScene {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_layer_id(&mut self) -> LayerId {
        let id = LayerId(self.next_layer_id);
        self.next_layer_id += 1;
        id
    }

    fn has_layer(&self, id: LayerId) -> bool {
        self.tile_layers.iter().any(|l| l.id == id) || self.layer_groups.iter().any(|g| g.id == id)
    }

    fn named_layers(&self, layers: &[(String, LayerId)]) -> Result<Vec<NamedLayer>> {
        layers
            .iter()
            .map(|(name, id)| {
                if !self.has_layer(*id) {
                    bail!("Layer control references unknown layer {:?} ({})", id, name);
                }
                Ok(NamedLayer {
                    name: name.clone(),
                    layer: *id,
                })
            })
            .collect()
    }

    pub fn group(&self, id: LayerId) -> Option<&SceneLayerGroup> {
        self.layer_groups.iter().find(|g| g.id == id)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).context("Failed to serialize map scene")
    }
}

impl MapSurface for LeafletScene {
    fn create_map(&mut self, view: MapView) {
        self.view = Some(view);
    }

    fn add_tile_layer(&mut self, layer: TileLayer, add_to_map: bool) -> LayerId {
        let id = self.allocate_layer_id();
        self.tile_layers.push(SceneTileLayer {
            id,
            layer,
            on_map: add_to_map,
        });
        id
    }

    fn add_layer_group(&mut self, add_to_map: bool) -> LayerId {
        let id = self.allocate_layer_id();
        self.layer_groups.push(SceneLayerGroup {
            id,
            on_map: add_to_map,
            markers: Vec::new(),
        });
        id
    }

    fn add_circle_marker(
        &mut self,
        group: LayerId,
        position: LatLng,
        style: &MarkerStyle,
    ) -> Result<MarkerHandle> {
        let group_index = self
            .layer_groups
            .iter()
            .position(|g| g.id == group)
            .with_context(|| format!("Unknown layer group {:?}", group))?;

        let handle = MarkerHandle(self.marker_slots.len());
        let markers = &mut self.layer_groups[group_index].markers;
        self.marker_slots.push(Some((group_index, markers.len())));
        markers.push(SceneMarker {
            id: handle,
            position,
            style: style.clone(),
            popup: None,
        });
        Ok(handle)
    }

    fn bind_popup(&mut self, marker: MarkerHandle, text: &str) -> Result<()> {
        let (group_index, marker_index) = self
            .marker_slots
            .get(marker.0)
            .copied()
            .flatten()
            .with_context(|| format!("Unknown marker {:?}", marker))?;
        let scene_marker = self
            .layer_groups
            .get_mut(group_index)
            .and_then(|g| g.markers.get_mut(marker_index))
            .with_context(|| format!("Marker {:?} no longer exists", marker))?;
        scene_marker.popup = Some(text.to_string());
        Ok(())
    }

    fn clear_layer_group(&mut self, group: LayerId) -> Result<()> {
        let group_index = self
            .layer_groups
            .iter()
            .position(|g| g.id == group)
            .with_context(|| format!("Unknown layer group {:?}", group))?;

        self.layer_groups[group_index].markers.clear();
        for slot in self.marker_slots.iter_mut() {
            if matches!(slot, Some((g, _)) if *g == group_index) {
                *slot = None;
            }
        }
        Ok(())
    }

    fn add_layer_control(
        &mut self,
        base_layers: &[(String, LayerId)],
        overlays: &[(String, LayerId)],
    ) -> Result<()> {
        let control = SceneLayerControl {
            base_layers: self.named_layers(base_layers)?,
            overlays: self.named_layers(overlays)?,
        };
        self.layer_control = Some(control);
        Ok(())
    }

    fn add_legend_control(&mut self, legend: LegendControl) {
        self.legend = Some(legend);
    }

    fn marker_count(&self, group: LayerId) -> usize {
        self.group(group).map_or(0, |g| g.markers.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::EarthquakeFeature;

    fn style() -> MarkerStyle {
        MarkerStyle::for_feature(&EarthquakeFeature::new(
            2.0,
            30.0,
            "x",
            LatLng::new(0.0, 0.0),
        ))
    }

    #[test]
    fn layer_ids_are_unique_across_kinds() {
        let mut scene = LeafletScene::new();
        let tiles = scene.add_tile_layer(TileLayer::new("https://t/{z}/{x}/{y}.png"), true);
        let group = scene.add_layer_group(false);
        assert_ne!(tiles, group);
        assert!(scene.tile_layers[0].on_map);
        assert!(!scene.layer_groups[0].on_map);
    }

    #[test]
    fn markers_and_popups_land_in_their_group() {
        let mut scene = LeafletScene::new();
        let first = scene.add_layer_group(true);
        let second = scene.add_layer_group(true);

        let a = scene.add_circle_marker(first, LatLng::new(1.0, 2.0), &style()).unwrap();
        let b = scene.add_circle_marker(second, LatLng::new(3.0, 4.0), &style()).unwrap();
        scene.bind_popup(b, "second").unwrap();
        scene.bind_popup(a, "first").unwrap();

        assert_eq!(scene.marker_count(first), 1);
        assert_eq!(scene.marker_count(second), 1);
        assert_eq!(scene.group(first).unwrap().markers[0].popup.as_deref(), Some("first"));
        assert_eq!(scene.group(second).unwrap().markers[0].popup.as_deref(), Some("second"));
    }

    #[test]
    fn clearing_a_group_invalidates_its_markers() {
        let mut scene = LeafletScene::new();
        let cleared = scene.add_layer_group(true);
        let kept = scene.add_layer_group(true);

        let gone = scene.add_circle_marker(cleared, LatLng::new(1.0, 1.0), &style()).unwrap();
        let other = scene.add_circle_marker(kept, LatLng::new(2.0, 2.0), &style()).unwrap();
        scene.clear_layer_group(cleared).unwrap();

        assert_eq!(scene.marker_count(cleared), 0);
        assert_eq!(scene.marker_count(kept), 1);
        assert!(scene.bind_popup(gone, "stale").is_err());
        scene.bind_popup(other, "still here").unwrap();

        // a new marker in the cleared group does not inherit the stale handle
        let fresh = scene.add_circle_marker(cleared, LatLng::new(3.0, 3.0), &style()).unwrap();
        assert_ne!(fresh, gone);
        assert!(scene.bind_popup(gone, "stale").is_err());
        assert!(scene.group(cleared).unwrap().markers[0].popup.is_none());

        assert!(scene.clear_layer_group(LayerId(99)).is_err());
    }

    #[test]
    fn unknown_handles_are_errors() {
        let mut scene = LeafletScene::new();
        let tiles = scene.add_tile_layer(TileLayer::new("t"), true);

        assert!(scene.add_circle_marker(tiles, LatLng::new(0.0, 0.0), &style()).is_err());
        assert!(scene.bind_popup(MarkerHandle(7), "nope").is_err());
        assert!(scene
            .add_layer_control(&[("Missing".to_string(), LayerId(42))], &[])
            .is_err());
        assert_eq!(scene.marker_count(LayerId(42)), 0);
    }

    #[test]
    fn serializes_for_the_front_end() {
        let mut scene = LeafletScene::new();
        scene.create_map(MapView {
            center: LatLng::new(0.0, 0.0),
            zoom: 2,
        });
        let tiles = scene.add_tile_layer(
            TileLayer::new("https://{s}.example/{z}/{x}/{y}.png")
                .with_max_zoom(20)
                .with_subdomains(&["a", "b"]),
            true,
        );
        let group = scene.add_layer_group(true);
        let marker = scene.add_circle_marker(group, LatLng::new(5.0, 6.0), &style()).unwrap();
        scene.bind_popup(marker, "hello").unwrap();
        scene
            .add_layer_control(&[("Base".to_string(), tiles)], &[("Quakes".to_string(), group)])
            .unwrap();

        let json: serde_json::Value = serde_json::from_str(&scene.to_json().unwrap()).unwrap();
        assert_eq!(json["view"]["zoom"], 2);
        assert_eq!(json["tileLayers"][0]["urlTemplate"], "https://{s}.example/{z}/{x}/{y}.png");
        assert_eq!(json["tileLayers"][0]["maxZoom"], 20);
        assert_eq!(json["tileLayers"][0]["onMap"], true);
        assert!(json["tileLayers"][0].get("attribution").is_none());
        assert_eq!(json["layerGroups"][0]["markers"][0]["popup"], "hello");
        assert_eq!(json["layerGroups"][0]["markers"][0]["style"]["fillColor"], "#ff0000");
        assert_eq!(json["layerControl"]["overlays"][0]["name"], "Quakes");
        assert_eq!(json["layerControl"]["overlays"][0]["layer"], group.0);
        assert!(json["legend"].is_null());
        assert!(json.get("nextLayerId").is_none());
    }
}
