use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use crate::map::LatLng;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("feed responded with status {0}")]
    Status(reqwest::StatusCode),

    #[error("feed is not a valid feature collection: {0}")]
    Decode(#[from] serde_json::Error),
}

// GeoJSON feature collection as published by the USGS summary feeds.
// Only the fields the map uses are modelled; everything else is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeatureCollection {
    #[serde(default)]
    pub metadata: Option<FeedMetadata>,
    #[serde(default)]
    pub features: Vec<RawFeature>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedMetadata {
    #[serde(default)]
    pub title: Option<String>,
    /// Milliseconds since the Unix epoch
    #[serde(default)]
    pub generated: Option<i64>,
    #[serde(default)]
    pub count: Option<usize>,
}

impl FeedMetadata {
    pub fn generated_at(&self) -> Option<DateTime<Utc>> {
        self.generated.and_then(DateTime::from_timestamp_millis)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawFeature {
    #[serde(default)]
    pub properties: Option<RawProperties>,
    #[serde(default)]
    pub geometry: Option<RawGeometry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawProperties {
    #[serde(default)]
    pub mag: Option<f64>,
    #[serde(default)]
    pub place: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawGeometry {
    /// `[lon, lat, depth_km]`
    #[serde(default)]
    pub coordinates: Vec<Option<f64>>,
}

/// One earthquake event, immutable once received.
#[derive(Debug, Clone, PartialEq)]
pub struct EarthquakeFeature {
    pub magnitude: Option<f64>,
    /// Depth in km
    pub depth: Option<f64>,
    pub place: Option<String>,
    pub position: LatLng,
}

impl EarthquakeFeature {
    pub fn new(magnitude: f64, depth: f64, place: &str, position: LatLng) -> Self {
        Self {
            magnitude: Some(magnitude),
            depth: Some(depth),
            place: Some(place.to_string()),
            position,
        }
    }

    /// Returns `None` when the feature has no usable point geometry.
    pub fn from_raw(raw: &RawFeature) -> Option<Self> {
        let coordinates = &raw.geometry.as_ref()?.coordinates;
        let lon = (*coordinates.first()?)?;
        let lat = (*coordinates.get(1)?)?;
        let depth = coordinates.get(2).copied().flatten();

        let (magnitude, place) = match &raw.properties {
            Some(props) => (props.mag, props.place.clone()),
            None => (None, None),
        };

        Some(Self {
            magnitude,
            depth,
            place,
            position: LatLng::new(lat, lon),
        })
    }
}

impl FeatureCollection {
    /// Converts every usable feature, returning them with the number skipped.
    pub fn earthquakes(&self) -> (Vec<EarthquakeFeature>, usize) {
        let quakes: Vec<EarthquakeFeature> = self
            .features
            .iter()
            .filter_map(EarthquakeFeature::from_raw)
            .collect();
        let skipped = self.features.len() - quakes.len();
        (quakes, skipped)
    }
}

#[derive(Debug, Clone)]
pub struct FeedClient {
    client: Client,
    url: String,
}

impl FeedClient {
    /// No request timeout: a slow feed is still drawn whenever it arrives.
    pub fn new(url: &str) -> Result<Self, FeedError> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn fetch(&self) -> Result<FeatureCollection, FeedError> {
        tracing::debug!("GET {}", self.url);
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status(status));
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}
