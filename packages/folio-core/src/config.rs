//! Configuration loaded from TOML.
//!
//! Default path: `<config dir>/folio/config.toml`, overridable with the
//! `FOLIO_CONFIG` environment variable. A missing file yields defaults.

use crate::analytics::{DEFAULT_MIN_ALIGNED_RETURNS, DEFAULT_STRESS_WINDOW};
use crate::routes::DEFAULT_WALKING_LIMIT_KM;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FolioConfig {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub markers: MarkersConfig,
    #[serde(default)]
    pub directions: DirectionsConfig,
}

/// Defaults for portfolio analysis requests.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisConfig {
    /// Starting capital
    #[serde(default = "default_initial_investment")]
    pub initial_investment: f64,
    /// Days in the stress scenario
    #[serde(default = "default_stress_window")]
    pub stress_window: usize,
    /// Minimum common dates before statistics are computed
    #[serde(default = "default_min_aligned_returns")]
    pub min_aligned_returns: usize,
}

fn default_initial_investment() -> f64 {
    1_000_000.0
}

fn default_stress_window() -> usize {
    DEFAULT_STRESS_WINDOW
}

fn default_min_aligned_returns() -> usize {
    DEFAULT_MIN_ALIGNED_RETURNS
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            initial_investment: default_initial_investment(),
            stress_window: default_stress_window(),
            min_aligned_returns: default_min_aligned_returns(),
        }
    }
}

/// Marker store location.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MarkersConfig {
    /// Path to the markers JSON file (defaults to the data directory)
    pub path: Option<PathBuf>,
}

/// Directions provider settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DirectionsConfig {
    /// API key; `FOLIO_DIRECTIONS_API_KEY` takes precedence
    pub api_key: Option<String>,
    /// Straight-line distance above which walking routes are not requested
    #[serde(default = "default_walking_limit_km")]
    pub walking_limit_km: f64,
    /// Response language
    #[serde(default = "default_language")]
    pub language: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_walking_limit_km() -> f64 {
    DEFAULT_WALKING_LIMIT_KM
}

fn default_language() -> String {
    "ko".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for DirectionsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            walking_limit_km: default_walking_limit_km(),
            language: default_language(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl DirectionsConfig {
    /// API key from the environment, falling back to the config file.
    pub fn resolved_api_key(&self) -> Option<String> {
        env::var("FOLIO_DIRECTIONS_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| self.api_key.clone().filter(|k| !k.trim().is_empty()))
    }
}

impl FolioConfig {
    /// Get the default config file path.
    pub fn default_path() -> PathBuf {
        if let Ok(path) = env::var("FOLIO_CONFIG") {
            return PathBuf::from(path);
        }

        directories::ProjectDirs::from("", "", "folio")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("folio.toml"))
    }

    /// Load from the default path.
    pub fn load() -> Result<Self> {
        Self::from_file(&Self::default_path())
    }

    /// Load configuration from a TOML file. A missing file yields defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let analysis = &self.analysis;
        if !analysis.initial_investment.is_finite() || analysis.initial_investment <= 0.0 {
            return Err(Error::InvalidInput(
                "analysis.initial_investment must be positive".to_string(),
            ));
        }
        if analysis.stress_window == 0 {
            return Err(Error::InvalidInput(
                "analysis.stress_window must be positive".to_string(),
            ));
        }
        if !self.directions.walking_limit_km.is_finite() || self.directions.walking_limit_km < 0.0 {
            return Err(Error::InvalidInput(
                "directions.walking_limit_km must be non-negative".to_string(),
            ));
        }
        Ok(())
    }

    /// Marker store path, falling back to the platform data directory.
    pub fn markers_path(&self) -> PathBuf {
        if let Some(path) = &self.markers.path {
            return path.clone();
        }

        directories::ProjectDirs::from("", "", "folio")
            .map(|dirs| dirs.data_dir().join("markers.json"))
            .unwrap_or_else(|| PathBuf::from("markers.json"))
    }
}
