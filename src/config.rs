// config.rs

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::category::ParameterCategory;
use crate::legend::SuitabilityLayer;
use crate::loader::DEFAULT_CANDIDATES;

pub const DEFAULT_CONFIG_FILE: &str = "dashboard.toml";

/// Settings read from `dashboard.toml`; every field is optional.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Boundary files tried in order.
    pub candidates: Vec<PathBuf>,
    pub output_dir: PathBuf,
    pub output_filename: String,
    pub tick_rate_ms: u64,
    pub log_file: PathBuf,
    pub default_category: String,
    pub default_layer: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            candidates: DEFAULT_CANDIDATES.iter().map(PathBuf::from).collect(),
            output_dir: PathBuf::from("output/"),
            output_filename: String::from("solar_suitability_map.png"),
            tick_rate_ms: 250,
            log_file: PathBuf::from("solar_dashboard.log"),
            default_category: String::from("crop"),
            default_layer: String::from("adaptation"),
        }
    }
}

impl Config {
    /// Reads `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Config> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Config::parse(&text).with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Config> {
        let config: Config = toml::from_str(text)?;
        config.category()?;
        config.layer()?;
        Ok(config)
    }

    pub fn category(&self) -> Result<ParameterCategory> {
        Ok(self.default_category.parse()?)
    }

    pub fn layer(&self) -> Result<SuitabilityLayer> {
        Ok(self.default_layer.parse()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("dashboard.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(
            config.candidates,
            vec![
                PathBuf::from("Solar_Suitability_layer.shp"),
                PathBuf::from("true_solar_suitability.shp")
            ]
        );
    }

    #[test]
    fn partial_file_overrides_fields() {
        let config = Config::parse(
            r#"
            candidates = ["data/layer.geojson"]
            default_category = "water"
            tick_rate_ms = 100
            "#,
        )
        .unwrap();
        assert_eq!(config.candidates, vec![PathBuf::from("data/layer.geojson")]);
        assert_eq!(config.category().unwrap(), ParameterCategory::Water);
        assert_eq!(config.tick_rate_ms, 100);
        assert_eq!(config.output_dir, PathBuf::from("output/"));
    }

    #[test]
    fn unknown_category_is_rejected() {
        assert!(Config::parse(r#"default_category = "wind""#).is_err());
    }

    #[test]
    fn unknown_key_is_rejected() {
        assert!(Config::parse(r#"colour = "red""#).is_err());
    }

    #[test]
    fn malformed_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.toml");
        fs::write(&path, "candidates = [").unwrap();
        let err = Config::load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("dashboard.toml"));
    }
}
