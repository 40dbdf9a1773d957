//! Map view descriptor handed to the browser.
//!
//! The server never draws anything itself: it describes three layers (district
//! fill, district labels, case markers) plus the camera and basemap, and the
//! page script turns that into Leaflet layers.

use crate::config::MapSettings;
use crate::page::escape_html;
use crate::types::{CasePoint, Dataset, Region};
use geojson::{Feature, FeatureCollection, Geometry, JsonObject};
use serde::Serialize;

pub const REGION_FILL_OPACITY: f64 = 0.3;
pub const REGION_LINE_WIDTH: f64 = 1.0;
pub const REGION_LINE_COLOR: &str = "black";
pub const LABEL_FONT_SIZE: u32 = 12;
pub const LABEL_COLOR: &str = "black";
pub const MARKER_SIZE: u32 = 8;
pub const MARKER_COLOR: &str = "gray";

/// Tile providers the page knows how to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Basemap {
    CartoPositron,
    CartoDarkmatter,
    OpenStreetMap,
}

impl Basemap {
    pub fn from_style(style: &str) -> Option<Self> {
        match style {
            "carto-positron" => Some(Basemap::CartoPositron),
            "carto-darkmatter" => Some(Basemap::CartoDarkmatter),
            "open-street-map" => Some(Basemap::OpenStreetMap),
            _ => None,
        }
    }

    pub fn tile_url(self) -> &'static str {
        match self {
            Basemap::CartoPositron => {
                "https://{s}.basemaps.cartocdn.com/light_all/{z}/{x}/{y}{r}.png"
            }
            Basemap::CartoDarkmatter => {
                "https://{s}.basemaps.cartocdn.com/dark_all/{z}/{x}/{y}{r}.png"
            }
            Basemap::OpenStreetMap => "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png",
        }
    }

    pub fn attribution(self) -> &'static str {
        match self {
            Basemap::CartoPositron | Basemap::CartoDarkmatter => {
                "&copy; OpenStreetMap contributors &copy; CARTO"
            }
            Basemap::OpenStreetMap => "&copy; OpenStreetMap contributors",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BasemapView {
    pub style: Basemap,
    pub tile_url: &'static str,
    pub attribution: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Label {
    pub text: String,
    pub lat: f64,
    pub lon: f64,
}

/// A case marker keeps the whole row so a click can hand it back unchanged.
#[derive(Debug, Clone, Serialize)]
pub struct Marker {
    #[serde(flatten)]
    pub case: CasePoint,
    pub hover: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Layer {
    RegionFill {
        geojson: FeatureCollection,
        fill_opacity: f64,
        line_width: f64,
        line_color: &'static str,
    },
    RegionLabels {
        labels: Vec<Label>,
        font_size: u32,
        color: &'static str,
    },
    CaseMarkers {
        markers: Vec<Marker>,
        size: u32,
        color: &'static str,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct MapView {
    pub basemap: BasemapView,
    pub zoom: f64,
    pub center: LatLon,
    /// Back to front.
    pub layers: Vec<Layer>,
}

/// Builds the dashboard view. Unknown basemap styles fall back to Carto Positron.
pub fn compose(dataset: &Dataset, settings: &MapSettings) -> MapView {
    let style = Basemap::from_style(&settings.style).unwrap_or_else(|| {
        tracing::warn!("Unknown map style {:?}, using carto-positron", settings.style);
        Basemap::CartoPositron
    });

    MapView {
        basemap: BasemapView {
            style,
            tile_url: style.tile_url(),
            attribution: style.attribution(),
        },
        zoom: settings.zoom,
        center: LatLon {
            lat: settings.center_lat,
            lon: settings.center_lon,
        },
        layers: vec![
            region_fill(&dataset.regions),
            region_labels(&dataset.regions),
            case_markers(&dataset.cases),
        ],
    }
}

fn region_fill(regions: &[Region]) -> Layer {
    let features = regions
        .iter()
        .map(|region| {
            let mut properties = JsonObject::new();
            properties.insert("name".to_string(), region.name.clone().into());
            // Every district shares one dummy value: the fill is not data-driven.
            properties.insert("value".to_string(), 1.into());
            Feature {
                bbox: None,
                geometry: Some(Geometry::new(geojson::Value::from(&region.boundary))),
                id: Some(geojson::feature::Id::String(region.id.clone())),
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    Layer::RegionFill {
        geojson: FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        },
        fill_opacity: REGION_FILL_OPACITY,
        line_width: REGION_LINE_WIDTH,
        line_color: REGION_LINE_COLOR,
    }
}

fn region_labels(regions: &[Region]) -> Layer {
    Layer::RegionLabels {
        labels: regions
            .iter()
            .map(|region| Label {
                text: region.name.clone(),
                lat: region.centroid.y(),
                lon: region.centroid.x(),
            })
            .collect(),
        font_size: LABEL_FONT_SIZE,
        color: LABEL_COLOR,
    }
}

fn case_markers(cases: &[CasePoint]) -> Layer {
    Layer::CaseMarkers {
        markers: cases
            .iter()
            .map(|case| Marker {
                hover: format!(
                    "case: {}<br>district: {}",
                    escape_html(&case.case),
                    escape_html(&case.district)
                ),
                case: case.clone(),
            })
            .collect(),
        size: MARKER_SIZE,
        color: MARKER_COLOR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, Centroid, MultiPolygon};

    fn dataset() -> Dataset {
        let square: MultiPolygon<f64> = MultiPolygon::new(vec![polygon![
            (x: 120.0, y: 22.0),
            (x: 121.0, y: 22.0),
            (x: 121.0, y: 23.0),
            (x: 120.0, y: 23.0),
            (x: 120.0, y: 22.0),
        ]]);
        let centroid = square.centroid().unwrap();
        Dataset {
            regions: vec![Region {
                id: "0".into(),
                name: "Lingya".into(),
                boundary: square,
                centroid,
            }],
            cases: vec![CasePoint {
                case: "C-1".into(),
                district: "Lingya".into(),
                firm: "Acme".into(),
                case_name: "Tower".into(),
                lat: 22.5,
                lon: 120.5,
                url: None,
            }],
        }
    }

    #[test]
    fn layers_are_stacked_fill_labels_markers() {
        let view = compose(&dataset(), &MapSettings::default());
        assert!(matches!(view.layers[0], Layer::RegionFill { .. }));
        assert!(matches!(view.layers[1], Layer::RegionLabels { .. }));
        assert!(matches!(view.layers[2], Layer::CaseMarkers { .. }));
        assert_eq!(view.zoom, 10.0);
        assert_eq!(view.center, LatLon { lat: 22.623, lon: 120.32 });
        assert_eq!(view.basemap.style, Basemap::CartoPositron);
    }

    #[test]
    fn labels_sit_on_centroids() {
        let view = compose(&dataset(), &MapSettings::default());
        let Layer::RegionLabels { labels, .. } = &view.layers[1] else {
            panic!("expected labels");
        };
        assert_eq!(labels[0].text, "Lingya");
        assert!((labels[0].lat - 22.5).abs() < 1e-9);
        assert!((labels[0].lon - 120.5).abs() < 1e-9);
    }

    #[test]
    fn markers_serialize_flat_with_hover() {
        let view = compose(&dataset(), &MapSettings::default());
        let json = serde_json::to_value(&view).unwrap();
        let marker = &json["layers"][2]["markers"][0];
        assert_eq!(json["layers"][2]["kind"], "case_markers");
        assert_eq!(marker["firm"], "Acme");
        assert_eq!(marker["case_name"], "Tower");
        assert_eq!(marker["url"], serde_json::Value::Null);
        assert_eq!(marker["hover"], "case: C-1<br>district: Lingya");
        assert_eq!(json["basemap"]["style"], "carto-positron");
    }

    #[test]
    fn unknown_style_falls_back() {
        let settings = MapSettings {
            style: "satellite".into(),
            ..MapSettings::default()
        };
        let view = compose(&dataset(), &settings);
        assert_eq!(view.basemap.style, Basemap::CartoPositron);
    }
}
