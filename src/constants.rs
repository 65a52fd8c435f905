// Feed
pub const EARTHQUAKE_FEED_URL: &str =
    "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/all_week.geojson";

// Port configuration
pub const DEFAULT_PORT: u16 = 3001;

// Initial map view
pub const DEFAULT_CENTER: (f64, f64) = (0.0, 0.0);
pub const DEFAULT_ZOOM: u8 = 2;

// Tile layers
pub const OSM_TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const OSM_ATTRIBUTION: &str =
    "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors";
pub const SATELLITE_TILE_URL: &str = "https://{s}.google.com/vt/lyrs=s&x={x}&y={y}&z={z}";
pub const SATELLITE_SUBDOMAINS: &[&str] = &["mt0", "mt1", "mt2", "mt3"];
pub const SATELLITE_MAX_ZOOM: u8 = 20;

// Layer names shown in the layer control
pub const BASE_LAYER_NAME: &str = "Base Layer";
pub const EARTHQUAKE_LAYER_NAME: &str = "Earthquakes";

// Marker styling
pub const RADIUS_PER_MAGNITUDE: f64 = 5.0;
pub const MARKER_STROKE_COLOR: &str = "#000";
pub const MARKER_STROKE_WEIGHT: f64 = 1.0;
pub const MARKER_STROKE_OPACITY: f64 = 1.0;
pub const MARKER_FILL_OPACITY: f64 = 0.8;

// Depth bands (km). Thresholds are compared with strict less-than.
pub const SHALLOW_DEPTH_LIMIT: f64 = 50.0;
pub const INTERMEDIATE_DEPTH_LIMIT: f64 = 100.0;
pub const SHALLOW_COLOR: &str = "#ff0000";
pub const INTERMEDIATE_COLOR: &str = "#ffff00";
pub const DEEP_COLOR: &str = "#00ff00";

// Legend
pub const LEGEND_POSITION: &str = "bottomright";
pub const LEGEND_TITLE: &str = "Earthquake Depth";
pub const LEGEND_THRESHOLDS: [f64; 3] = [0.0, 50.0, 100.0];
pub const LEGEND_LABELS: [&str; 3] = ["&lt; 50 km", "50 km - 100 km", "&ge; 100 km"];
