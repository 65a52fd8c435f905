//! Feature-to-marker transformation and the depth color policy.
//!
//! Every value produced here is a pure function of a single feature, so
//! rendering a collection is order independent.

use serde::Serialize;

use crate::constants::{
    DEEP_COLOR, INTERMEDIATE_COLOR, INTERMEDIATE_DEPTH_LIMIT, LEGEND_LABELS, LEGEND_THRESHOLDS,
    LEGEND_TITLE, MARKER_FILL_OPACITY, MARKER_STROKE_COLOR, MARKER_STROKE_OPACITY,
    MARKER_STROKE_WEIGHT, RADIUS_PER_MAGNITUDE, SHALLOW_COLOR, SHALLOW_DEPTH_LIMIT,
};
use crate::feed::EarthquakeFeature;
use crate::map::LatLng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DepthBand {
    Shallow,
    Intermediate,
    Deep,
}

impl DepthBand {
    /// Thresholds are checked in ascending order with strict less-than, so a
    /// depth equal to a threshold belongs to the deeper band. NaN fails every
    /// comparison and lands in `Deep`.
    pub fn for_depth(depth: f64) -> Self {
        if depth < SHALLOW_DEPTH_LIMIT {
            DepthBand::Shallow
        } else if depth < INTERMEDIATE_DEPTH_LIMIT {
            DepthBand::Intermediate
        } else {
            DepthBand::Deep
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            DepthBand::Shallow => SHALLOW_COLOR,
            DepthBand::Intermediate => INTERMEDIATE_COLOR,
            DepthBand::Deep => DEEP_COLOR,
        }
    }
}

pub fn color_for_depth(depth: f64) -> &'static str {
    DepthBand::for_depth(depth).color()
}

/// Linear in magnitude with no clamping; zero or negative magnitudes give
/// a degenerate marker.
pub fn marker_radius(magnitude: f64) -> f64 {
    magnitude * RADIUS_PER_MAGNITUDE
}

/// Circle marker options, serialized with Leaflet's option names.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerStyle {
    pub radius: f64,
    pub fill_color: &'static str,
    pub color: &'static str,
    pub weight: f64,
    pub opacity: f64,
    pub fill_opacity: f64,
}

impl MarkerStyle {
    pub fn for_feature(feature: &EarthquakeFeature) -> Self {
        // A missing magnitude contributes nothing to the radius; a missing
        // depth is drawn in the deepest band.
        let magnitude = feature.magnitude.unwrap_or(0.0);
        let depth = feature.depth.unwrap_or(f64::NAN);

        Self {
            radius: marker_radius(magnitude),
            fill_color: color_for_depth(depth),
            color: MARKER_STROKE_COLOR,
            weight: MARKER_STROKE_WEIGHT,
            opacity: MARKER_STROKE_OPACITY,
            fill_opacity: MARKER_FILL_OPACITY,
        }
    }
}

/// Number formatting as done by JavaScript's `Number.prototype.toString`:
/// shortest round-trip digits, plain decimal notation while the decimal
/// exponent is in `-7..21`, exponential (`1e+21`, `1.5e-7`) outside it.
fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value == 0.0 {
        // covers -0.0
        return "0".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    let sign = if value < 0.0 { "-" } else { "" };
    // `{:e}` prints the shortest round-trip mantissa, e.g. `1.025e1`
    let scientific = format!("{:e}", value.abs());
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return format!("{}", value);
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();

    // value = 0.digits * 10^point
    let len = digits.len() as i32;
    let point = exponent + 1;

    let body = if len <= point && point <= 21 {
        format!("{}{}", digits, "0".repeat((point - len) as usize))
    } else if 0 < point && point <= 21 {
        let (int_part, frac_part) = digits.split_at(point as usize);
        format!("{}.{}", int_part, frac_part)
    } else if -6 < point && point <= 0 {
        format!("0.{}{}", "0".repeat((-point) as usize), digits)
    } else {
        let (lead, rest) = digits.split_at(1);
        let mantissa = if rest.is_empty() {
            lead.to_string()
        } else {
            format!("{}.{}", lead, rest)
        };
        let exp_sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{}", mantissa, exp_sign, exponent.abs())
    };

    format!("{}{}", sign, body)
}

// Absent values print the way string concatenation prints `null`.
fn format_optional(value: Option<f64>) -> String {
    value.map(format_number).unwrap_or_else(|| "null".to_string())
}

pub fn popup_text(feature: &EarthquakeFeature) -> String {
    format!(
        "Magnitude: {}<br>Depth: {} km<br>Location: {}",
        format_optional(feature.magnitude),
        format_optional(feature.depth),
        feature.place.as_deref().unwrap_or("null")
    )
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedMarker {
    pub position: LatLng,
    pub style: MarkerStyle,
    pub popup: String,
    pub band: DepthBand,
}

impl RenderedMarker {
    pub fn from_feature(feature: &EarthquakeFeature) -> Self {
        Self {
            position: feature.position,
            style: MarkerStyle::for_feature(feature),
            popup: popup_text(feature),
            band: DepthBand::for_depth(feature.depth.unwrap_or(f64::NAN)),
        }
    }
}

pub fn render(features: &[EarthquakeFeature]) -> Vec<RenderedMarker> {
    features.iter().map(RenderedMarker::from_feature).collect()
}

/// Per-band marker counts for one render pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RenderSummary {
    pub total: usize,
    pub shallow: usize,
    pub intermediate: usize,
    pub deep: usize,
}

impl RenderSummary {
    pub fn from_markers(markers: &[RenderedMarker]) -> Self {
        let mut summary = RenderSummary::default();
        for marker in markers {
            summary.total += 1;
            match marker.band {
                DepthBand::Shallow => summary.shallow += 1,
                DepthBand::Intermediate => summary.intermediate += 1,
                DepthBand::Deep => summary.deep += 1,
            }
        }
        summary
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegendEntry {
    pub label: &'static str,
    pub color: &'static str,
}

/// Swatch colors are found by probing one km past each threshold, which
/// keeps the legend on the same color function as the markers.
pub fn legend_entries() -> Vec<LegendEntry> {
    LEGEND_THRESHOLDS
        .iter()
        .zip(LEGEND_LABELS.iter())
        .map(|(threshold, label)| LegendEntry {
            label: *label,
            color: color_for_depth(threshold + 1.0),
        })
        .collect()
}

pub fn legend_html(entries: &[LegendEntry]) -> String {
    let mut html = format!("<h4>{}</h4>", LEGEND_TITLE);
    for entry in entries {
        html.push_str(&format!(
            "<i style=\"background:{}\"></i> {}<br>",
            entry.color, entry.label
        ));
    }
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quake(magnitude: f64, depth: f64, place: &str) -> EarthquakeFeature {
        EarthquakeFeature::new(magnitude, depth, place, LatLng::new(0.0, 0.0))
    }

    #[test]
    fn shallow_depths_are_red() {
        for depth in [-10.0, 0.0, 12.0, 49.0, 49.999] {
            assert_eq!(color_for_depth(depth), "#ff0000", "depth {}", depth);
        }
    }

    #[test]
    fn intermediate_depths_are_yellow() {
        for depth in [50.0, 51.0, 75.5, 99.999] {
            assert_eq!(color_for_depth(depth), "#ffff00", "depth {}", depth);
        }
    }

    #[test]
    fn deep_depths_are_green() {
        for depth in [100.0, 101.0, 150.0, 700.0] {
            assert_eq!(color_for_depth(depth), "#00ff00", "depth {}", depth);
        }
    }

    #[test]
    fn thresholds_belong_to_the_deeper_band() {
        assert_eq!(color_for_depth(50.0), INTERMEDIATE_COLOR);
        assert_eq!(color_for_depth(100.0), DEEP_COLOR);
        assert_eq!(DepthBand::for_depth(50.0), DepthBand::Intermediate);
        assert_eq!(DepthBand::for_depth(100.0), DepthBand::Deep);
    }

    #[test]
    fn missing_or_nan_depth_is_deep() {
        assert_eq!(color_for_depth(f64::NAN), DEEP_COLOR);

        let mut feature = quake(4.0, 0.0, "Unknown depth");
        feature.depth = None;
        let style = MarkerStyle::for_feature(&feature);
        assert_eq!(style.fill_color, DEEP_COLOR);
        assert_eq!(RenderedMarker::from_feature(&feature).band, DepthBand::Deep);
    }

    #[test]
    fn radius_is_linear_without_clamping() {
        assert_eq!(marker_radius(3.0), 15.0);
        assert_eq!(marker_radius(6.0), 30.0);
        assert_eq!(marker_radius(0.0), 0.0);
        assert_eq!(marker_radius(-1.5), -7.5);
        assert_eq!(marker_radius(2.5), 12.5);
    }

    #[test]
    fn marker_style_uses_fixed_stroke() {
        let style = MarkerStyle::for_feature(&quake(4.0, 60.0, "Somewhere"));
        assert_eq!(style.radius, 20.0);
        assert_eq!(style.fill_color, "#ffff00");
        assert_eq!(style.color, "#000");
        assert_eq!(style.weight, 1.0);
        assert_eq!(style.opacity, 1.0);
        assert_eq!(style.fill_opacity, 0.8);
    }

    #[test]
    fn marker_style_serializes_with_leaflet_option_names() {
        let style = MarkerStyle::for_feature(&quake(1.0, 10.0, ""));
        let json = serde_json::to_value(&style).unwrap();
        assert_eq!(json["fillColor"], "#ff0000");
        assert_eq!(json["fillOpacity"], 0.8);
        assert_eq!(json["radius"], 5.0);
    }

    #[test]
    fn missing_magnitude_gives_zero_radius() {
        let mut feature = quake(0.0, 10.0, "No magnitude");
        feature.magnitude = None;
        assert_eq!(MarkerStyle::for_feature(&feature).radius, 0.0);
    }

    #[test]
    fn popup_text_is_exact() {
        assert_eq!(
            popup_text(&quake(5.2, 12.0, "Test Zone")),
            "Magnitude: 5.2<br>Depth: 12 km<br>Location: Test Zone"
        );
        assert_eq!(
            popup_text(&quake(-0.0, 10.25, "5 km NW of Town, CA")),
            "Magnitude: 0<br>Depth: 10.25 km<br>Location: 5 km NW of Town, CA"
        );
    }

    #[test]
    fn popup_text_prints_null_for_missing_values() {
        let feature = EarthquakeFeature {
            magnitude: None,
            depth: None,
            place: None,
            position: LatLng::new(1.0, 2.0),
        };
        assert_eq!(
            popup_text(&feature),
            "Magnitude: null<br>Depth: null km<br>Location: null"
        );
    }

    #[test]
    fn numbers_format_like_javascript() {
        let cases = [
            (12.0, "12"),
            (5.2, "5.2"),
            (10.25, "10.25"),
            (150.0, "150"),
            (-3.5, "-3.5"),
            (0.000001, "0.000001"),
            (0.0000001, "1e-7"),
            (0.00000015, "1.5e-7"),
            (123456789012345680000.0, "123456789012345680000"),
            (1e21, "1e+21"),
            (2.5e22, "2.5e+22"),
            (-1e21, "-1e+21"),
            (f64::NAN, "NaN"),
            (f64::INFINITY, "Infinity"),
        ];
        for (value, expected) in cases {
            assert_eq!(format_number(value), expected, "value {:e}", value);
        }
    }

    #[test]
    fn popup_text_uses_exponent_notation_at_extremes() {
        assert_eq!(
            popup_text(&quake(1e21, 0.0000001, "Far")),
            "Magnitude: 1e+21<br>Depth: 1e-7 km<br>Location: Far"
        );
    }

    #[test]
    fn render_is_order_independent() {
        let features = vec![
            quake(3.0, 10.0, "A"),
            quake(6.0, 150.0, "B"),
            quake(4.5, 75.0, "C"),
        ];
        let mut reversed = features.clone();
        reversed.reverse();

        let key = |m: &RenderedMarker| (m.style.radius.to_bits(), m.style.fill_color, m.popup.clone());
        let mut forward: Vec<_> = render(&features).iter().map(key).collect();
        let mut backward: Vec<_> = render(&reversed).iter().map(key).collect();
        forward.sort();
        backward.sort();
        assert_eq!(forward, backward);
    }

    #[test]
    fn summary_counts_bands() {
        let markers = render(&[
            quake(1.0, 10.0, ""),
            quake(1.0, 20.0, ""),
            quake(1.0, 50.0, ""),
            quake(1.0, 300.0, ""),
        ]);
        let summary = RenderSummary::from_markers(&markers);
        assert_eq!(
            summary,
            RenderSummary {
                total: 4,
                shallow: 2,
                intermediate: 1,
                deep: 1
            }
        );
    }

    #[test]
    fn legend_has_three_bands_in_order() {
        let entries = legend_entries();
        let colors: Vec<_> = entries.iter().map(|e| e.color).collect();
        assert_eq!(colors, vec!["#ff0000", "#ffff00", "#00ff00"]);

        assert_eq!(entries.len(), 3);
        // one km past each threshold
        for (entry, depth) in entries.iter().zip([1.0, 51.0, 101.0]) {
            assert_eq!(entry.color, color_for_depth(depth), "depth {}", depth);
        }
        assert_eq!(entries[0].label, "&lt; 50 km");
        assert_eq!(entries[2].label, "&ge; 100 km");
    }

    #[test]
    fn legend_html_lists_swatches() {
        let html = legend_html(&legend_entries());
        assert_eq!(
            html,
            "<h4>Earthquake Depth</h4>\
             <i style=\"background:#ff0000\"></i> &lt; 50 km<br>\
             <i style=\"background:#ffff00\"></i> 50 km - 100 km<br>\
             <i style=\"background:#00ff00\"></i> &ge; 100 km<br>"
        );
    }
}
