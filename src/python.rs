//! Python bindings: the `EfficiencyEngine` class and schema constants.

use std::collections::HashMap;

use pyo3::prelude::*;
use pyo3::types::{PyDict, PyModule};
use pyo3_polars::PyDataFrame;

use crate::aggregation::AggregateResult;
use crate::config::EngineConfig;
use crate::efficiency::ClusterResult;
use crate::facade::{LeagueBenchmarks, PlayerTier, PositionEfficiency};
use crate::percentile::PercentileResult;
use crate::position::PositionGroup;
use crate::schema;
use crate::store::MemorySource;

#[pyclass(name = "EfficiencyEngine", module = "position_efficiency")]
pub struct PyEfficiencyEngine {
    inner: PositionEfficiency,
}

#[pymethods]
impl PyEfficiencyEngine {
    /// Engine over a directory of `processed_<season>.csv` files. Settings
    /// come from `config_path` (TOML) when given; `base_path` overrides the
    /// data directory.
    #[new]
    #[pyo3(signature = (base_path=None, config_path=None))]
    fn new(base_path: Option<String>, config_path: Option<String>) -> PyResult<Self> {
        let mut config = match config_path {
            Some(path) => EngineConfig::load_from_file(path)?,
            None => EngineConfig::default(),
        };
        if let Some(base_path) = base_path {
            config.data.base_path = base_path.into();
        }
        Ok(Self {
            inner: PositionEfficiency::new(config),
        })
    }

    /// Engine over frames already loaded in Python, keyed by season.
    #[staticmethod]
    fn from_frames(frames: HashMap<String, PyDataFrame>) -> Self {
        let source = MemorySource::new();
        for (season, PyDataFrame(frame)) in frames {
            source.insert(season, frame);
        }
        Self {
            inner: PositionEfficiency::with_source(EngineConfig::default(), source),
        }
    }

    // ── Aggregates ──────────────────────────────────────────────────────────

    #[pyo3(signature = (position, seasons, min_matches=None, metrics=None))]
    fn league_average<'py>(
        &self,
        py: Python<'py>,
        position: &str,
        seasons: Vec<String>,
        min_matches: Option<u32>,
        metrics: Option<Vec<String>>,
    ) -> PyResult<Bound<'py, PyDict>> {
        let keys = metric_refs(&metrics);
        let result = self.inner.league_average(
            parse_position(position)?,
            &seasons,
            min_matches,
            keys.as_deref(),
        )?;
        aggregate_dict(py, &result)
    }

    #[pyo3(signature = (team, position, seasons, metrics=None))]
    fn team_average<'py>(
        &self,
        py: Python<'py>,
        team: &str,
        position: &str,
        seasons: Vec<String>,
        metrics: Option<Vec<String>>,
    ) -> PyResult<Bound<'py, PyDict>> {
        let keys = metric_refs(&metrics);
        let result =
            self.inner
                .team_average(team, parse_position(position)?, &seasons, keys.as_deref())?;
        aggregate_dict(py, &result)
    }

    #[pyo3(signature = (position, seasons, metrics=None))]
    fn top_quartile_average<'py>(
        &self,
        py: Python<'py>,
        position: &str,
        seasons: Vec<String>,
        metrics: Option<Vec<String>>,
    ) -> PyResult<Bound<'py, PyDict>> {
        let keys = metric_refs(&metrics);
        let result =
            self.inner
                .top_quartile_average(parse_position(position)?, &seasons, keys.as_deref())?;
        aggregate_dict(py, &result)
    }

    fn league_percentile<'py>(
        &self,
        py: Python<'py>,
        position: &str,
        seasons: Vec<String>,
        percentile: f64,
    ) -> PyResult<Bound<'py, PyDict>> {
        let result = self
            .inner
            .league_percentile(parse_position(position)?, &seasons, percentile)?;
        aggregate_dict(py, &result)
    }

    // ── Percentiles ─────────────────────────────────────────────────────────

    /// `None` when the sample is too small.
    #[pyo3(signature = (position, seasons, metric, player_value=None, min_sample=None))]
    fn distribution<'py>(
        &self,
        py: Python<'py>,
        position: &str,
        seasons: Vec<String>,
        metric: &str,
        player_value: Option<f64>,
        min_sample: Option<usize>,
    ) -> PyResult<Option<Bound<'py, PyDict>>> {
        self.inner
            .distribution(parse_position(position)?, &seasons, metric, player_value, min_sample)?
            .map(|r| percentile_dict(py, &r))
            .transpose()
    }

    fn exact_percentile(&self, value: f64, distribution: Vec<f64>) -> f64 {
        self.inner.exact_percentile(value, &distribution)
    }

    // ── Efficiency tiers ────────────────────────────────────────────────────

    fn player_tier<'py>(
        &self,
        py: Python<'py>,
        player_id: i64,
        season: &str,
    ) -> PyResult<Bound<'py, PyDict>> {
        let tier = self.inner.player_tier(player_id, season)?;
        tier_dict(py, &tier)
    }

    /// Summary dict; per-player rows under `players` as a polars DataFrame.
    #[pyo3(signature = (position, season, current_player_id=None))]
    fn position_benchmarks<'py>(
        &self,
        py: Python<'py>,
        position: &str,
        season: &str,
        current_player_id: Option<i64>,
    ) -> PyResult<Bound<'py, PyDict>> {
        let result = self
            .inner
            .position_benchmarks(parse_position(position)?, season, current_player_id)?;
        cluster_dict(py, &result)
    }

    #[pyo3(signature = (season, positions=None))]
    fn league_efficiency_benchmarks<'py>(
        &self,
        py: Python<'py>,
        season: &str,
        positions: Option<Vec<String>>,
    ) -> PyResult<Bound<'py, PyDict>> {
        let groups = positions
            .map(|p| p.iter().map(|s| parse_position(s)).collect::<PyResult<Vec<_>>>())
            .transpose()?;
        let league = self
            .inner
            .league_efficiency_benchmarks(season, groups.as_deref())?;
        league_dict(py, &league)
    }

    fn available_positions(&self, season: &str) -> PyResult<Vec<String>> {
        Ok(self
            .inner
            .available_positions(season)?
            .iter()
            .map(|g| g.to_string())
            .collect())
    }

    fn available_seasons(&self) -> PyResult<Vec<String>> {
        Ok(self.inner.available_seasons()?)
    }

    fn reload_season(&self, season: &str) -> PyResult<()> {
        Ok(self.inner.reload_season(season)?)
    }

    fn clear_caches(&self) {
        self.inner.clear_caches();
    }

    fn __repr__(&self) -> String {
        format!(
            "EfficiencyEngine(base_path='{}', cached_seasons={:?})",
            self.inner.config().data.base_path.display(),
            self.inner.store().cached_seasons()
        )
    }
}

// ── Conversions ─────────────────────────────────────────────────────────────

fn parse_position(position: &str) -> PyResult<PositionGroup> {
    Ok(position.parse::<PositionGroup>()?)
}

fn metric_refs(metrics: &Option<Vec<String>>) -> Option<Vec<&str>> {
    metrics
        .as_ref()
        .map(|m| m.iter().map(String::as_str).collect())
}

fn aggregate_dict<'py>(py: Python<'py>, result: &AggregateResult) -> PyResult<Bound<'py, PyDict>> {
    let metrics = PyDict::new(py);
    for (key, aggregate) in &result.metrics {
        let entry = PyDict::new(py);
        entry.set_item("value", aggregate.value)?;
        entry.set_item("sample_size", aggregate.sample_size)?;
        if let Some(detail) = &aggregate.top_quartile {
            entry.set_item("p75_threshold", detail.p75_threshold)?;
            entry.set_item("top25_sample_size", detail.top25_sample_size)?;
            entry.set_item("total_sample_size", detail.total_sample_size)?;
        }
        metrics.set_item(key, entry)?;
    }

    let dict = PyDict::new(py);
    dict.set_item("position", result.position.as_str())?;
    dict.set_item("seasons", &result.seasons)?;
    dict.set_item("players_analyzed", result.players_analyzed)?;
    dict.set_item("metrics", metrics)?;
    Ok(dict)
}

fn percentile_dict<'py>(
    py: Python<'py>,
    result: &PercentileResult,
) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new(py);
    dict.set_item("p10", result.p10)?;
    dict.set_item("p25", result.p25)?;
    dict.set_item("p50", result.p50)?;
    dict.set_item("p75", result.p75)?;
    dict.set_item("p90", result.p90)?;
    dict.set_item("min", result.min)?;
    dict.set_item("max", result.max)?;
    dict.set_item("mean", result.mean)?;
    dict.set_item("sample_size", result.sample_size)?;
    dict.set_item("player_percentile", result.player_percentile)?;
    Ok(dict)
}

fn tier_dict<'py>(py: Python<'py>, tier: &PlayerTier) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new(py);
    dict.set_item("player_id", tier.player_id)?;
    dict.set_item("player_name", &tier.player_name)?;
    dict.set_item("team", &tier.team)?;
    dict.set_item("position", tier.position.as_str())?;
    dict.set_item("season", &tier.season)?;
    dict.set_item("iep_score", tier.iep_score)?;
    dict.set_item("tier_label", &tier.tier_label)?;
    dict.set_item("tier_rank", tier.tier_rank)?;
    dict.set_item("cluster_id", tier.cluster_id)?;
    dict.set_item("percentile_in_position", tier.percentile_in_position)?;
    dict.set_item("pca_coordinates", tier.pca_coordinates.to_vec())?;
    dict.set_item("efficiency_band", tier.band.as_str())?;
    dict.set_item("total_variance_explained", tier.total_variance_explained)?;
    dict.set_item("population_size", tier.population_size)?;
    Ok(dict)
}

fn cluster_dict<'py>(py: Python<'py>, result: &ClusterResult) -> PyResult<Bound<'py, PyDict>> {
    let clusters = result
        .clusters
        .iter()
        .map(|c| {
            let profile = PyDict::new(py);
            for (feature, summary) in &c.profile {
                let stats = PyDict::new(py);
                stats.set_item("mean", summary.mean)?;
                stats.set_item("std", summary.std)?;
                stats.set_item("median", summary.median)?;
                profile.set_item(feature, stats)?;
            }
            let entry = PyDict::new(py);
            entry.set_item("cluster_id", c.cluster_id)?;
            entry.set_item("rank", c.rank)?;
            entry.set_item("label", &c.label)?;
            entry.set_item("player_count", c.player_count)?;
            entry.set_item("percentage", c.percentage)?;
            entry.set_item("top_players", &c.top_players)?;
            entry.set_item("characteristics", &c.characteristics)?;
            entry.set_item("performance_profile", profile)?;
            Ok(entry)
        })
        .collect::<PyResult<Vec<_>>>()?;

    let quality = PyDict::new(py);
    quality.set_item("total_players", result.data_quality.total_players)?;
    quality.set_item("valid_for_clustering", result.data_quality.valid_for_clustering)?;
    quality.set_item("features_used", result.data_quality.features_used)?;
    quality.set_item("min_matches_filter", result.data_quality.min_matches_filter)?;

    let dict = PyDict::new(py);
    dict.set_item("position", result.position.as_str())?;
    dict.set_item("season", &result.season)?;
    dict.set_item("analysis_date", result.analysis_date)?;
    dict.set_item("n_clusters", result.n_clusters)?;
    dict.set_item("silhouette_score", result.silhouette_score)?;
    dict.set_item("inertia", result.inertia)?;
    dict.set_item("cluster_distribution", &result.cluster_distribution)?;
    dict.set_item("explained_variance_ratio", &result.explained_variance_ratio)?;
    dict.set_item("total_variance_explained", result.total_variance_explained)?;
    dict.set_item("components", &result.components)?;
    dict.set_item("quality", result.quality.as_str())?;
    dict.set_item("data_quality", quality)?;
    dict.set_item("clusters", clusters)?;
    dict.set_item("players", PyDataFrame(result.players_frame()?))?;
    Ok(dict)
}

fn league_dict<'py>(py: Python<'py>, league: &LeagueBenchmarks) -> PyResult<Bound<'py, PyDict>> {
    let positions = PyDict::new(py);
    for (group, summary) in &league.positions {
        let tiers = summary
            .tiers
            .iter()
            .map(|t| {
                let tier = PyDict::new(py);
                tier.set_item("label", &t.label)?;
                tier.set_item("rank", t.rank)?;
                tier.set_item("players", t.players)?;
                tier.set_item("min", t.min)?;
                tier.set_item("max", t.max)?;
                tier.set_item("mean", t.mean)?;
                tier.set_item("median", t.median)?;
                Ok(tier)
            })
            .collect::<PyResult<Vec<_>>>()?;

        let entry = PyDict::new(py);
        entry.set_item("player_count", summary.player_count)?;
        entry.set_item("n_clusters", summary.n_clusters)?;
        entry.set_item("silhouette_score", summary.silhouette_score)?;
        entry.set_item("variance_explained", summary.variance_explained)?;
        entry.set_item("quality", summary.quality.as_str())?;
        entry.set_item("tiers", tiers)?;
        positions.set_item(group.as_str(), entry)?;
    }

    let dict = PyDict::new(py);
    dict.set_item("season", &league.season)?;
    dict.set_item("positions", positions)?;
    dict.set_item("total_players", league.total_players)?;
    dict.set_item("positions_analyzed", league.positions_analyzed)?;
    dict.set_item("quality", league.quality.as_str())?;
    Ok(dict)
}

/// Export schema constants as Python submodules
pub fn add_schema_exports(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Identity
    let identity = PyModule::new(m.py(), "identity")?;
    identity.add("PLAYER_ID", schema::identity::PLAYER_ID)?;
    identity.add("FULL_NAME", schema::identity::FULL_NAME)?;
    identity.add("PLAYER", schema::identity::PLAYER)?;
    identity.add("TEAM", schema::identity::TEAM)?;
    identity.add("PRIMARY_POSITION", schema::identity::PRIMARY_POSITION)?;
    m.add_submodule(&identity)?;

    // Playing time
    let playing_time = PyModule::new(m.py(), "playing_time")?;
    playing_time.add("MATCHES_PLAYED", schema::playing_time::MATCHES_PLAYED)?;
    playing_time.add("MINUTES_PLAYED", schema::playing_time::MINUTES_PLAYED)?;
    m.add_submodule(&playing_time)?;

    // Clustering features
    let features = PyModule::new(m.py(), "features")?;
    features.add("ALL", schema::features::ALL.to_vec())?;
    m.add_submodule(&features)?;

    // Player result columns
    let results = PyModule::new(m.py(), "results")?;
    results.add("PLAYER_ID", schema::results::PLAYER_ID)?;
    results.add("PLAYER_NAME", schema::results::PLAYER_NAME)?;
    results.add("TEAM", schema::results::TEAM)?;
    results.add("CLUSTER_ID", schema::results::CLUSTER_ID)?;
    results.add("TIER_RANK", schema::results::TIER_RANK)?;
    results.add("TIER_LABEL", schema::results::TIER_LABEL)?;
    results.add("IEP_SCORE", schema::results::IEP_SCORE)?;
    results.add("PCA_1", schema::results::PCA_1)?;
    results.add("PCA_2", schema::results::PCA_2)?;
    m.add_submodule(&results)?;

    Ok(())
}
