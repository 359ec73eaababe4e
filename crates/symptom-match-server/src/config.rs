use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::csv_source::CatalogLayout;

/// Service configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub bind_address: String,
    pub port: u16,

    // Catalog source
    pub catalog_path: PathBuf,
    pub catalog_format: CatalogFormat,
    pub condition_column: String,
    pub symptoms_column: String,
    pub weights_path: Option<PathBuf>,

    // Text extraction
    pub model_cache_path: Option<PathBuf>,
    pub confidence_threshold: f64,

    pub max_results: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 5000,
            catalog_path: PathBuf::from("data/conditions.csv"),
            catalog_format: CatalogFormat::Flags,
            condition_column: "Disease".to_string(),
            symptoms_column: "Symptoms".to_string(),
            weights_path: None,
            model_cache_path: None,
            confidence_threshold: symptom_match_nlp::DEFAULT_CONFIDENCE_THRESHOLD,
            max_results: symptom_match_core::resolver::DEFAULT_MAX_RESULTS,
        }
    }
}

impl Config {
    /// Load config from file, or fall back to defaults if it does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content).context("Failed to write config file")
    }

    /// Column layout of the catalog CSV
    pub fn catalog_layout(&self) -> CatalogLayout {
        match self.catalog_format {
            CatalogFormat::Flags => CatalogLayout::Flags {
                condition_column: self.condition_column.clone(),
            },
            CatalogFormat::Listed => CatalogLayout::Listed {
                condition_column: self.condition_column.clone(),
                symptoms_column: self.symptoms_column.clone(),
            },
        }
    }

    pub fn socket_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

/// Shape of the catalog CSV
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogFormat {
    /// One yes/no column per symptom
    #[default]
    Flags,
    /// One column holding a serialized symptom list
    Listed,
}

impl std::str::FromStr for CatalogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "flags" => Ok(Self::Flags),
            "listed" => Ok(Self::Listed),
            _ => Err(format!("Unknown catalog format: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.port, 5000);
        assert_eq!(config.confidence_threshold, 0.3);
        assert_eq!(config.max_results, 3);
        assert_eq!(config.condition_column, "Disease");
        assert_eq!(config.socket_address(), "0.0.0.0:5000");
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "port": 8080, "catalog_format": "listed" }"#).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.catalog_format, CatalogFormat::Listed);
        assert_eq!(config.bind_address, "0.0.0.0");
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let config = Config {
            weights_path: Some(PathBuf::from("weights.json")),
            max_results: 5,
            ..Config::default()
        };

        config.save(&path).unwrap();
        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn test_catalog_format_parse() {
        assert_eq!("flags".parse::<CatalogFormat>().unwrap(), CatalogFormat::Flags);
        assert_eq!("LISTED".parse::<CatalogFormat>().unwrap(), CatalogFormat::Listed);
        assert!("xml".parse::<CatalogFormat>().is_err());
    }

    #[test]
    fn test_catalog_layout() {
        let config = Config {
            catalog_format: CatalogFormat::Listed,
            ..Config::default()
        };
        assert_eq!(
            config.catalog_layout(),
            CatalogLayout::Listed {
                condition_column: "Disease".into(),
                symptoms_column: "Symptoms".into(),
            }
        );
    }
}
