use crate::config::AppConfig;
use crate::error::LoadError;
use crate::types::{CasePoint, Dataset, Region};
use csv::ReaderBuilder;
use geo::{Centroid, MultiPolygon};
use geojson::{feature::Id, GeoJson};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::info;

pub const REQUIRED_COLUMNS: [&str; 7] = ["lat", "lon", "case", "district", "firm", "case_name", "url"];

/// Reads both input files. Nothing is returned unless both load cleanly.
pub fn load_data(config: &AppConfig) -> Result<Dataset, LoadError> {
    info!("Loading data...");

    let cases = load_cases(&config.input.cases)?;
    info!("Loaded {} case points from {:?}", cases.len(), config.input.cases);

    let regions = load_regions(&config.input.regions, &config.input.name_property)?;
    info!("Loaded {} regions from {:?}", regions.len(), config.input.regions);

    Ok(Dataset { regions, cases })
}

pub fn load_cases(path: &Path) -> Result<Vec<CasePoint>, LoadError> {
    let csv_err = |source: csv::Error| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let mut rdr = ReaderBuilder::new().from_reader(file);
    let headers = rdr.headers().map_err(csv_err)?.clone();

    // Map column names to indices for faster lookup
    let col_indices: HashMap<&str, usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.trim(), i))
        .collect();

    let mut idx = [0usize; REQUIRED_COLUMNS.len()];
    for (slot, column) in idx.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = *col_indices.get(column).ok_or_else(|| LoadError::MissingColumn {
            path: path.to_path_buf(),
            column,
        })?;
    }
    let [lat_idx, lon_idx, case_idx, district_idx, firm_idx, case_name_idx, url_idx] = idx;

    let mut cases = Vec::new();

    for (i, result) in rdr.records().enumerate() {
        let record = result.map_err(csv_err)?;
        let row = i + 1;
        let field = |idx: usize| record.get(idx).unwrap_or("").to_string();
        let coordinate = |idx: usize, column: &'static str| {
            let raw = record.get(idx).unwrap_or("");
            raw.trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| LoadError::InvalidCoordinate {
                    path: path.to_path_buf(),
                    row,
                    column,
                    value: raw.to_string(),
                })
        };

        let url = field(url_idx);
        cases.push(CasePoint {
            case: field(case_idx),
            district: field(district_idx),
            firm: field(firm_idx),
            case_name: field(case_name_idx),
            lat: coordinate(lat_idx, "lat")?,
            lon: coordinate(lon_idx, "lon")?,
            url: if url.trim().is_empty() { None } else { Some(url) },
        });
    }

    Ok(cases)
}

pub fn load_regions(path: &Path, name_property: &str) -> Result<Vec<Region>, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);

    // Parse the GeoJSON. warning: this loads the whole file into memory.
    let geojson = GeoJson::from_reader(reader).map_err(|e| LoadError::GeoJson {
        path: path.to_path_buf(),
        source: geojson::Error::MalformedJson(e),
    })?;

    let collection = match geojson {
        GeoJson::FeatureCollection(fc) => fc,
        _ => {
            return Err(LoadError::NotFeatureCollection {
                path: path.to_path_buf(),
            })
        }
    };

    let mut regions = Vec::with_capacity(collection.features.len());

    for (index, feature) in collection.features.into_iter().enumerate() {
        let name = match feature
            .properties
            .as_ref()
            .and_then(|props| props.get(name_property))
        {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(serde_json::Value::Number(n)) => n.to_string(),
            _ => {
                return Err(LoadError::MissingName {
                    path: path.to_path_buf(),
                    index,
                    property: name_property.to_string(),
                })
            }
        };

        let id = match &feature.id {
            Some(Id::String(s)) => s.clone(),
            Some(Id::Number(n)) => n.to_string(),
            None => index.to_string(),
        };

        let unsupported = || LoadError::UnsupportedGeometry {
            path: path.to_path_buf(),
            index,
        };

        let geometry = feature.geometry.ok_or_else(unsupported)?;
        let converted: geo::Geometry<f64> =
            geometry.value.try_into().map_err(|source| LoadError::GeoJson {
                path: path.to_path_buf(),
                source,
            })?;
        let boundary = match converted {
            geo::Geometry::MultiPolygon(mp) => mp,
            geo::Geometry::Polygon(p) => MultiPolygon::new(vec![p]),
            _ => return Err(unsupported()),
        };

        let centroid = boundary.centroid().ok_or_else(unsupported)?;

        regions.push(Region {
            id,
            name,
            boundary,
            centroid,
        });
    }

    Ok(regions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_tmp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn columns_may_come_in_any_order() {
        let file = write_tmp(
            "url,case_name,firm,district,case,lon,lat,extra\n\
             ,Tower,Acme,Lingya,C-1,120.30,22.62,x\n",
        );
        let cases = load_cases(file.path()).unwrap();
        assert_eq!(cases.len(), 1);
        assert_eq!(cases[0].case, "C-1");
        assert_eq!(cases[0].lat, 22.62);
        assert_eq!(cases[0].lon, 120.30);
        assert_eq!(cases[0].url, None);
    }

    #[test]
    fn bad_latitude_names_the_row() {
        let file = write_tmp(
            "lat,lon,case,district,firm,case_name,url\n\
             22.6,120.3,a,d,f,n,\n\
             north,120.3,b,d,f,n,\n",
        );
        match load_cases(file.path()) {
            Err(LoadError::InvalidCoordinate { row, column, .. }) => {
                assert_eq!(row, 2);
                assert_eq!(column, "lat");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn point_geometry_is_rejected() {
        let file = write_tmp(
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","properties":{"TOWNNAME":"X"},
                 "geometry":{"type":"Point","coordinates":[120.0,22.0]}}]}"#,
        );
        assert!(matches!(
            load_regions(file.path(), "TOWNNAME"),
            Err(LoadError::UnsupportedGeometry { index: 0, .. })
        ));
    }

    #[test]
    fn bare_geometry_is_not_a_collection() {
        let file = write_tmp(r#"{"type":"Point","coordinates":[120.0,22.0]}"#);
        assert!(matches!(
            load_regions(file.path(), "TOWNNAME"),
            Err(LoadError::NotFeatureCollection { .. })
        ));
    }
}
