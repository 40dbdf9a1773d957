use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub input: InputConfig,
    pub map: MapSettings,
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct InputConfig {
    pub regions: PathBuf,
    pub cases: PathBuf,
    pub name_property: String, // GeoJSON property used as the district label
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            regions: PathBuf::from("data/kaohsiung_region.geojson"),
            cases: PathBuf::from("data/KH_case_s3_20250627b.csv"),
            name_property: "TOWNNAME".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct MapSettings {
    pub style: String,
    pub zoom: f64,
    pub center_lat: f64,
    pub center_lon: f64,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            style: "carto-positron".to_string(),
            zoom: 10.0,
            center_lat: 22.623,
            center_lon: 120.32,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8050,
        }
    }
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: AppConfig =
            toml::from_str(content).with_context(|| "Failed to parse TOML configuration")?;
        Ok(config)
    }

    /// Loads `path` when given, otherwise starts from the built-in defaults,
    /// then applies `PORT`.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load_from_file(path)?,
            None => Self::default(),
        };
        config.apply_port(std::env::var("PORT").ok().as_deref())?;
        Ok(config)
    }

    /// Overrides the listen port with an environment-supplied value.
    pub fn apply_port(&mut self, port: Option<&str>) -> Result<()> {
        if let Some(raw) = port.filter(|raw| !raw.trim().is_empty()) {
            self.server.port = raw
                .trim()
                .parse()
                .with_context(|| format!("PORT must be an integer, got {:?}", raw))?;
        }
        Ok(())
    }
}
