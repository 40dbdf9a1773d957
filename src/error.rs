use std::path::PathBuf;

/// Failure to read one of the two input files. Always fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to open {path:?}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse GeoJSON {path:?}")]
    GeoJson {
        path: PathBuf,
        #[source]
        source: geojson::Error,
    },
    #[error("GeoJSON {path:?} must be a FeatureCollection")]
    NotFeatureCollection { path: PathBuf },
    #[error("feature {index} in {path:?} has no '{property}' property")]
    MissingName {
        path: PathBuf,
        index: usize,
        property: String,
    },
    #[error("feature {index} in {path:?} must be a Polygon or MultiPolygon")]
    UnsupportedGeometry { path: PathBuf, index: usize },
    #[error("failed to read CSV {path:?}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("column '{column}' not found in {path:?}")]
    MissingColumn { path: PathBuf, column: &'static str },
    #[error("row {row} of {path:?}: invalid {column} value {value:?}")]
    InvalidCoordinate {
        path: PathBuf,
        row: usize,
        column: &'static str,
        value: String,
    },
}
