//! Configuration management with layered hierarchy

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::rules::QualityRules;
use crate::entities::item::normalize_color;

/// Effective configuration: quality limits, box capacity and data location
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Config {
    /// Minimum accepted weight in grams (inclusive)
    pub min_weight: f64,

    /// Maximum accepted weight in grams (inclusive)
    pub max_weight: f64,

    /// Minimum accepted length in centimeters (inclusive)
    pub min_length: f64,

    /// Maximum accepted length in centimeters (inclusive)
    pub max_length: f64,

    /// Accepted colors, normalized to lower case
    pub allowed_colors: BTreeSet<String>,

    /// Parts per box
    pub box_capacity: usize,

    /// Root of the file store
    pub data_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_weight: 95.0,
            max_weight: 105.0,
            min_length: 10.0,
            max_length: 20.0,
            allowed_colors: ["azul", "verde"].iter().map(|c| c.to_string()).collect(),
            box_capacity: 10,
            data_dir: PathBuf::from("data"),
        }
    }
}

/// One configuration layer as read from a YAML file; every key is optional
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ConfigLayer {
    pub min_weight: Option<f64>,
    pub max_weight: Option<f64>,
    pub min_length: Option<f64>,
    pub max_length: Option<f64>,
    pub allowed_colors: Option<Vec<String>>,
    pub box_capacity: Option<usize>,
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("invalid {name} range: minimum {min} is greater than maximum {max}")]
    #[diagnostic(code(qcpack::config::range))]
    InvalidRange { name: &'static str, min: f64, max: f64 },

    #[error("box_capacity must be at least 1")]
    #[diagnostic(code(qcpack::config::capacity))]
    ZeroCapacity,

    #[error("allowed_colors must contain at least one color")]
    #[diagnostic(code(qcpack::config::colors))]
    NoColors,

    #[error("invalid value for {key}: '{value}'")]
    #[diagnostic(code(qcpack::config::env))]
    InvalidEnv { key: &'static str, value: String },

    #[error("failed to read config {path:?}: {message}")]
    #[diagnostic(
        code(qcpack::config::parse),
        help("config files are YAML mappings, e.g. `box_capacity: 12`")
    )]
    Parse { path: PathBuf, message: String },
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    ///
    /// `data_dir_override` comes from the command line and beats every
    /// other source.
    pub fn load(data_dir_override: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        // 1. Built-in defaults (already in Default impl)

        // 2. Global user config (~/.config/qcpack/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if let Some(layer) = Self::read_layer(&global_path)? {
                config.merge(layer);
            }
        }

        // The data directory may itself be moved by env or CLI, so resolve it
        // before reading the data-directory config.
        let env_data_dir = std::env::var("QCP_DATA_DIR").ok().map(PathBuf::from);
        if let Some(dir) = data_dir_override.map(Path::to_path_buf).or(env_data_dir) {
            config.data_dir = dir;
        }

        // 3. Data-directory config (<data_dir>/config.yaml)
        let local_path = config.data_dir.join("config.yaml");
        if let Some(mut layer) = Self::read_layer(&local_path)? {
            // The data directory is already decided at this point
            layer.data_dir = None;
            config.merge(layer);
        }

        // 4. Environment variables
        if let Ok(capacity) = std::env::var("QCP_BOX_CAPACITY") {
            config.box_capacity = capacity.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                key: "QCP_BOX_CAPACITY",
                value: capacity.clone(),
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Get the path to the global config file
    pub fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "qcpack")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Get the path to the data-directory config file
    pub fn local_config_path(&self) -> PathBuf {
        self.data_dir.join("config.yaml")
    }

    fn read_layer(path: &Path) -> Result<Option<ConfigLayer>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        if contents.trim().is_empty() {
            return Ok(None);
        }
        serde_yml::from_str::<ConfigLayer>(&contents)
            .map(Some)
            .map_err(|e| ConfigError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
    }

    /// Merge a layer into this config (the layer takes precedence)
    pub fn merge(&mut self, other: ConfigLayer) {
        if let Some(v) = other.min_weight {
            self.min_weight = v;
        }
        if let Some(v) = other.max_weight {
            self.max_weight = v;
        }
        if let Some(v) = other.min_length {
            self.min_length = v;
        }
        if let Some(v) = other.max_length {
            self.max_length = v;
        }
        if let Some(colors) = other.allowed_colors {
            self.allowed_colors = colors.iter().map(|c| normalize_color(c)).collect();
        }
        if let Some(v) = other.box_capacity {
            self.box_capacity = v;
        }
        if let Some(v) = other.data_dir {
            self.data_dir = v;
        }
    }

    /// Check the limits are usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_weight > self.max_weight {
            return Err(ConfigError::InvalidRange {
                name: "weight",
                min: self.min_weight,
                max: self.max_weight,
            });
        }
        if self.min_length > self.max_length {
            return Err(ConfigError::InvalidRange {
                name: "length",
                min: self.min_length,
                max: self.max_length,
            });
        }
        if self.box_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.allowed_colors.iter().all(|c| c.is_empty()) {
            return Err(ConfigError::NoColors);
        }
        Ok(())
    }

    /// Quality rules derived from this config
    pub fn rules(&self) -> QualityRules {
        QualityRules::new(
            self.min_weight..=self.max_weight,
            self.min_length..=self.max_length,
            self.allowed_colors.iter().cloned(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.min_weight, 95.0);
        assert_eq!(config.max_weight, 105.0);
        assert_eq!(config.min_length, 10.0);
        assert_eq!(config.max_length, 20.0);
        assert_eq!(config.box_capacity, 10);
        assert!(config.allowed_colors.contains("azul"));
        assert!(config.allowed_colors.contains("verde"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_merge_normalizes_colors() {
        let mut config = Config::default();
        config.merge(ConfigLayer {
            allowed_colors: Some(vec![" Red ".to_string(), "BLUE".to_string()]),
            box_capacity: Some(4),
            ..Default::default()
        });
        assert_eq!(config.box_capacity, 4);
        assert!(config.allowed_colors.contains("red"));
        assert!(config.allowed_colors.contains("blue"));
        assert!(!config.allowed_colors.contains("azul"));
    }

    #[test]
    fn test_validate_rejects_bad_limits() {
        let mut config = Config::default();
        config.min_weight = 200.0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidRange { name: "weight", .. })));

        let mut config = Config::default();
        config.box_capacity = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ZeroCapacity)));

        let mut config = Config::default();
        config.allowed_colors.clear();
        assert!(matches!(config.validate(), Err(ConfigError::NoColors)));
    }

    #[test]
    fn test_read_layer_from_yaml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "box_capacity: 3\nmax_weight: 110\n").unwrap();

        let layer = Config::read_layer(&path).unwrap().unwrap();
        assert_eq!(layer.box_capacity, Some(3));
        assert_eq!(layer.max_weight, Some(110.0));
        assert!(layer.min_weight.is_none());
    }

    #[test]
    fn test_read_layer_reports_parse_errors() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "box_capacity: [not, a, number]\n").unwrap();
        assert!(matches!(Config::read_layer(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_missing_layer_is_none() {
        let dir = tempdir().unwrap();
        assert!(Config::read_layer(&dir.path().join("nope.yaml")).unwrap().is_none());
    }
}
