use geo::{MultiPolygon, Point};
use serde::Serialize;

/// An administrative district with the anchor used to place its label.
#[derive(Debug, Clone)]
pub struct Region {
    pub id: String,
    pub name: String,
    pub boundary: MultiPolygon<f64>,
    // Label anchor only, may sit outside a concave boundary.
    pub centroid: Point<f64>,
}

/// One row of the case table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CasePoint {
    pub case: String,
    pub district: String,
    pub firm: String,
    pub case_name: String,
    pub lat: f64,
    pub lon: f64,
    pub url: Option<String>,
}

/// Everything read from disk at startup.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub regions: Vec<Region>,
    pub cases: Vec<CasePoint>,
}
