//! Engine configuration, loadable from TOML.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub data: DataConfig,
    pub aggregation: AggregationConfig,
    pub percentile: PercentileConfig,
    pub clustering: ClusteringConfig,
    pub cache: CacheConfig,
}

/// Where season exports live.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub base_path: PathBuf,
    /// Season files are `<file_prefix><season>.csv`.
    pub file_prefix: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from("data/thai_league_processed"),
            file_prefix: "processed_".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    /// Matches-played floor for league and top-quartile averages.
    pub min_matches: u32,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self { min_matches: 10 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PercentileConfig {
    /// Smallest sample a distribution is reported for.
    pub min_sample: usize,
}

impl Default for PercentileConfig {
    fn default() -> Self {
        Self { min_sample: 10 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusteringConfig {
    /// Matches-played floor (bypassed for a forced player).
    pub min_matches: u32,
    /// Smallest population clustering runs on.
    pub min_population: usize,
    /// Minutes-played floor (never bypassed).
    pub min_minutes: f64,
    pub seed: u64,
    pub n_init: usize,
    pub max_iter: usize,
    pub tolerance: f64,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            min_matches: 5,
            min_population: 10,
            min_minutes: 90.0,
            seed: 42,
            n_init: 10,
            max_iter: 300,
            tolerance: 1e-4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Lifetime of a cached position clustering.
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_secs: 3600 }
    }
}

impl EngineConfig {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Default settings reading season files from `base_path`.
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        let mut config = Self::default();
        config.data.base_path = base_path.into();
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config.aggregation.min_matches, 10);
        assert_eq!(config.clustering.min_matches, 5);
        assert_eq!(config.clustering.seed, 42);
        assert_eq!(config.cache.ttl_secs, 3600);
        assert_eq!(config.data.file_prefix, "processed_");
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
            [data]
            base_path = "/srv/stats"

            [clustering]
            seed = 7
            "#,
        )
        .unwrap();
        assert_eq!(config.data.base_path, PathBuf::from("/srv/stats"));
        assert_eq!(config.data.file_prefix, "processed_");
        assert_eq!(config.clustering.seed, 7);
        assert_eq!(config.clustering.min_population, 10);
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        let err = EngineConfig::from_toml_str("[cache]\nttl_secs = \"soon\"").unwrap_err();
        assert!(matches!(err, crate::error::EfficiencyError::Config(_)));
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.toml");
        std::fs::write(&path, "[percentile]\nmin_sample = 20\n").unwrap();
        let config = EngineConfig::load_from_file(&path).unwrap();
        assert_eq!(config.percentile.min_sample, 20);
    }
}
