//! Engine configuration, loaded from and saved to TOML.
//!
//! Every field has a default, so a configuration file only needs the keys it
//! changes:
//!
//! ```toml
//! map_path = "data/roads.csv"
//! use_landmarks = true
//! landmark_count = 16
//! persist_landmarks = true
//! landmark_cache_path = "data/roads.landmarks.bin"
//! search_engine = "bidirectional"
//! default_weight = 1.0
//! allow_per_query_weight_override = true
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::search::SearchEngine;

/// Default number of landmarks requested when none is configured.
pub const DEFAULT_LANDMARK_COUNT: u32 = 16;

/// Largest per-query weight accepted by default.
pub const DEFAULT_MAX_WEIGHT: f64 = 2.0;

/// Average degree below which a unidirectional search is recommended.
pub const DEFAULT_BIDIRECTIONAL_MIN_DEGREE: f64 = 4.0;

/// Decimal places allowed in a per-query weight.
const WEIGHT_DECIMALS: i32 = 2;

/// Tunables for graph preprocessing and query execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Edge list to load when no path is given on the command line.
    pub map_path: Option<PathBuf>,
    /// Use the ALT heuristic instead of the id-difference fallback.
    pub use_landmarks: bool,
    /// Requested landmark count; lowered to the achieved count after preprocessing.
    pub landmark_count: u32,
    /// Write the landmark table to `landmark_cache_path` after computing it.
    pub persist_landmarks: bool,
    /// Location of the binary landmark cache.
    pub landmark_cache_path: Option<PathBuf>,
    /// Engine used when a query does not pick one.
    pub search_engine: SearchEngine,
    /// Heuristic weight used when a query does not supply one, `>= 1.0`.
    pub default_weight: f64,
    /// Whether queries may supply their own weight.
    pub allow_per_query_weight_override: bool,
    /// Upper bound for per-query weights.
    pub max_weight: f64,
    /// Number of concurrent query lanes (buffer sets) to allocate.
    pub search_lanes: usize,
    /// Average degree at which the bidirectional engine becomes the recommendation.
    pub bidirectional_min_degree: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            map_path: None,
            use_landmarks: true,
            landmark_count: DEFAULT_LANDMARK_COUNT,
            persist_landmarks: false,
            landmark_cache_path: None,
            search_engine: SearchEngine::Bidirectional,
            default_weight: 1.0,
            allow_per_query_weight_override: false,
            max_weight: DEFAULT_MAX_WEIGHT,
            search_lanes: default_lanes(),
            bidirectional_min_degree: DEFAULT_BIDIRECTIONAL_MIN_DEGREE,
        }
    }
}

fn default_lanes() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

impl EngineConfig {
    /// Read a configuration file and validate it.
    pub fn load(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading engine configuration");
        let text = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&text).map_err(|e| Error::ConfigParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Write the configuration as TOML, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        let text = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, text)?;
        info!(path = %path.display(), "saved engine configuration");
        Ok(())
    }

    /// Reject out-of-range or inconsistent values.
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: String| Err(Error::InvalidConfig { message });

        if !self.default_weight.is_finite() || self.default_weight < 1.0 {
            return invalid(format!(
                "default_weight must be a finite value >= 1.0, got {}",
                self.default_weight
            ));
        }
        if !self.max_weight.is_finite() || self.max_weight < self.default_weight {
            return invalid(format!(
                "max_weight ({}) must be finite and >= default_weight ({})",
                self.max_weight, self.default_weight
            ));
        }
        if self.search_lanes == 0 {
            return invalid("search_lanes must be at least 1".to_string());
        }
        if !self.bidirectional_min_degree.is_finite() || self.bidirectional_min_degree < 0.0 {
            return invalid(format!(
                "bidirectional_min_degree must be a finite, non-negative value, got {}",
                self.bidirectional_min_degree
            ));
        }
        if self.persist_landmarks && self.landmark_cache_path.is_none() {
            return invalid("persist_landmarks requires landmark_cache_path".to_string());
        }
        Ok(())
    }

    /// Apply the per-query weight policy.
    ///
    /// `None` selects `default_weight`. A supplied weight is accepted only when
    /// overrides are enabled and it passes [`Self::check_weight`].
    pub fn resolve_weight(&self, requested: Option<f64>) -> Result<f64> {
        let Some(weight) = requested else {
            return Ok(self.default_weight);
        };
        if !self.allow_per_query_weight_override {
            return Err(Error::InvalidWeight {
                weight,
                reason: "per-query weight overrides are disabled".to_string(),
            });
        }
        self.check_weight(weight)
    }

    /// Check that `weight` lies in `1.0..=max_weight` with at most two decimal
    /// places, regardless of the override policy.
    pub fn check_weight(&self, weight: f64) -> Result<f64> {
        let reject = |reason: String| Err(Error::InvalidWeight { weight, reason });

        if !weight.is_finite() || weight < 1.0 || weight > self.max_weight {
            return reject(format!("weight must be between 1.0 and {}", self.max_weight));
        }
        let scale = 10f64.powi(WEIGHT_DECIMALS);
        if ((weight * scale).round() - weight * scale).abs() > 1e-9 {
            return reject("weight may have at most two decimal places".to_string());
        }
        Ok(weight)
    }
}
