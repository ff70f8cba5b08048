//! Single entry point for the rendering layer.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, info};

use crate::aggregation::{AggregateResult, AggregateStatisticsEngine};
use crate::config::EngineConfig;
use crate::efficiency::{
    ClusterQuality, ClusterResult, ClusteringEfficiencyAnalyzer, EfficiencyBand,
};
use crate::error::{EfficiencyError, Result};
use crate::percentile::{PercentileEngine, PercentileResult};
use crate::position::PositionGroup;
use crate::stats;
use crate::store::{CsvDirectorySource, SeasonDataStore, SeasonSource};

/// A player's standing inside their position's tiers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerTier {
    pub player_id: i64,
    pub player_name: String,
    pub team: String,
    pub position: PositionGroup,
    pub season: String,
    pub iep_score: f64,
    pub tier_label: String,
    pub tier_rank: usize,
    pub cluster_id: usize,
    pub percentile_in_position: f64,
    pub pca_coordinates: [f64; 2],
    pub band: EfficiencyBand,
    pub total_variance_explained: f64,
    pub population_size: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierSummary {
    pub label: String,
    pub rank: usize,
    pub players: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionSummary {
    pub position: PositionGroup,
    pub player_count: usize,
    pub n_clusters: usize,
    pub silhouette_score: f64,
    pub variance_explained: f64,
    pub quality: ClusterQuality,
    /// Best tier first.
    pub tiers: Vec<TierSummary>,
}

impl PositionSummary {
    fn from_result(result: &ClusterResult) -> Self {
        let tiers = result
            .clusters
            .iter()
            .map(|cluster| {
                let scores: Vec<f64> = result
                    .players
                    .iter()
                    .filter(|p| p.cluster_id == cluster.cluster_id)
                    .map(|p| p.iep_score)
                    .collect();
                let sorted = stats::sorted_copy(&scores);
                TierSummary {
                    label: cluster.label.clone(),
                    rank: cluster.rank,
                    players: sorted.len(),
                    min: sorted.first().copied().unwrap_or(0.0),
                    max: sorted.last().copied().unwrap_or(0.0),
                    mean: stats::round1(stats::mean(&sorted).unwrap_or(0.0)),
                    median: stats::round1(stats::median(&sorted).unwrap_or(0.0)),
                }
            })
            .collect();

        Self {
            position: result.position,
            player_count: result.players.len(),
            n_clusters: result.n_clusters,
            silhouette_score: result.silhouette_score,
            variance_explained: result.total_variance_explained,
            quality: result.quality,
            tiers,
        }
    }
}

/// Clustering summaries of every analyzable group in a season.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeagueBenchmarks {
    pub season: String,
    pub positions: BTreeMap<PositionGroup, PositionSummary>,
    pub total_players: usize,
    pub positions_analyzed: usize,
    pub quality: ClusterQuality,
}

/// Quality of a league-wide benchmark from its coverage.
pub fn benchmark_quality(total_players: usize, positions: usize) -> ClusterQuality {
    if total_players > 1000 && positions >= 8 {
        ClusterQuality::Excellent
    } else if total_players > 500 && positions >= 6 {
        ClusterQuality::Good
    } else if total_players > 200 && positions >= 4 {
        ClusterQuality::Acceptable
    } else {
        ClusterQuality::Limited
    }
}

struct CachedBenchmark {
    result: Arc<ClusterResult>,
    stored_at: Instant,
}

/// Benchmarks, percentiles and efficiency tiers over one season store.
///
/// Safe to share between request threads. Position clusterings are cached
/// per (position, season) for the configured TTL; concurrent misses on the
/// same key may compute twice.
pub struct PositionEfficiency {
    config: EngineConfig,
    store: Arc<SeasonDataStore>,
    aggregates: AggregateStatisticsEngine,
    percentiles: PercentileEngine,
    analyzer: ClusteringEfficiencyAnalyzer,
    benchmarks: Mutex<HashMap<(PositionGroup, String), CachedBenchmark>>,
}

impl PositionEfficiency {
    /// Engine over the CSV directory named in `config.data`.
    pub fn new(config: EngineConfig) -> Self {
        let source = CsvDirectorySource::from_config(&config.data);
        Self::with_source(config, source)
    }

    pub fn with_source(config: EngineConfig, source: impl SeasonSource + 'static) -> Self {
        let store = Arc::new(SeasonDataStore::new(source));
        Self {
            aggregates: AggregateStatisticsEngine::new(
                Arc::clone(&store),
                config.aggregation.min_matches,
            ),
            percentiles: PercentileEngine::new(Arc::clone(&store)),
            analyzer: ClusteringEfficiencyAnalyzer::new(
                Arc::clone(&store),
                config.clustering.clone(),
            ),
            benchmarks: Mutex::new(HashMap::new()),
            store,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<SeasonDataStore> {
        &self.store
    }

    pub fn aggregates(&self) -> &AggregateStatisticsEngine {
        &self.aggregates
    }

    pub fn analyzer(&self) -> &ClusteringEfficiencyAnalyzer {
        &self.analyzer
    }

    // ── Aggregates ──────────────────────────────────────────────────────────

    /// `min_matches` defaults to the configured aggregation floor.
    pub fn league_average(
        &self,
        position: PositionGroup,
        seasons: &[String],
        min_matches: Option<u32>,
        metrics: Option<&[&str]>,
    ) -> Result<AggregateResult> {
        let min_matches = min_matches.unwrap_or(self.config.aggregation.min_matches);
        self.aggregates
            .league_average(position, seasons, min_matches, metrics)
    }

    pub fn team_average(
        &self,
        team: &str,
        position: PositionGroup,
        seasons: &[String],
        metrics: Option<&[&str]>,
    ) -> Result<AggregateResult> {
        self.aggregates.team_average(team, position, seasons, metrics)
    }

    pub fn top_quartile_average(
        &self,
        position: PositionGroup,
        seasons: &[String],
        metrics: Option<&[&str]>,
    ) -> Result<AggregateResult> {
        self.aggregates
            .top_quartile_average(position, seasons, metrics)
    }

    pub fn league_percentile(
        &self,
        position: PositionGroup,
        seasons: &[String],
        percentile: f64,
    ) -> Result<AggregateResult> {
        self.aggregates
            .league_percentile(position, seasons, percentile)
    }

    // ── Percentiles ─────────────────────────────────────────────────────────

    /// `min_sample` defaults to the configured percentile floor.
    pub fn distribution(
        &self,
        position: PositionGroup,
        seasons: &[String],
        metric: &str,
        player_value: Option<f64>,
        min_sample: Option<usize>,
    ) -> Result<Option<PercentileResult>> {
        let min_sample = min_sample.unwrap_or(self.config.percentile.min_sample);
        self.percentiles
            .distribution(position, seasons, metric, player_value, min_sample)
    }

    pub fn exact_percentile(&self, value: f64, distribution: &[f64]) -> f64 {
        self.percentiles.exact_percentile(value, distribution)
    }

    // ── Efficiency tiers ────────────────────────────────────────────────────

    /// Cluster the player's position group and locate them in it.
    ///
    /// The player bypasses the matches floor but not the minutes floor;
    /// a player removed by the latter yields `PlayerNotInPopulation`.
    pub fn player_tier(&self, player_id: i64, season: &str) -> Result<PlayerTier> {
        let record = self.store.player_record(player_id, season)?;
        let result = self.position_benchmarks(record.group, season, Some(player_id))?;
        let player = result
            .player(player_id)
            .ok_or_else(|| EfficiencyError::PlayerNotInPopulation {
                player_id,
                season: season.to_string(),
            })?;

        Ok(PlayerTier {
            player_id,
            player_name: player.player_name.clone(),
            team: player.team.clone(),
            position: record.group,
            season: season.to_string(),
            iep_score: player.iep_score,
            tier_label: player.tier_label.clone(),
            tier_rank: player.tier_rank,
            cluster_id: player.cluster_id,
            percentile_in_position: stats::exact_percentile(player.iep_score, &result.iep_scores()),
            pca_coordinates: player.pca,
            band: player.band,
            total_variance_explained: result.total_variance_explained,
            population_size: result.players.len(),
        })
    }

    /// Clustering of a position group, cached for the configured TTL.
    ///
    /// Supplying `current_player_id` forces that player into the population
    /// and bypasses the cache in both directions.
    pub fn position_benchmarks(
        &self,
        position: PositionGroup,
        season: &str,
        current_player_id: Option<i64>,
    ) -> Result<Arc<ClusterResult>> {
        let min_matches = self.config.clustering.min_matches;
        if current_player_id.is_some() {
            return Ok(Arc::new(self.analyzer.analyze(
                position,
                season,
                min_matches,
                current_player_id,
            )?));
        }

        let key = (position, season.to_string());
        let ttl = Duration::from_secs(self.config.cache.ttl_secs);
        if let Some(cached) = self.benchmarks.lock().get(&key) {
            if cached.stored_at.elapsed() < ttl {
                debug!(position = %position, season, "benchmark cache hit");
                return Ok(Arc::clone(&cached.result));
            }
        }

        debug!(position = %position, season, "benchmark cache miss");
        let result = Arc::new(self.analyzer.analyze(position, season, min_matches, None)?);
        self.benchmarks.lock().insert(
            key,
            CachedBenchmark {
                result: Arc::clone(&result),
                stored_at: Instant::now(),
            },
        );
        Ok(result)
    }

    /// Summaries for `positions` (all groups when `None`). Groups without
    /// enough players are left out.
    pub fn league_efficiency_benchmarks(
        &self,
        season: &str,
        positions: Option<&[PositionGroup]>,
    ) -> Result<LeagueBenchmarks> {
        let groups = positions.unwrap_or(&PositionGroup::ALL);
        let mut summaries = BTreeMap::new();
        for &group in groups {
            match self.position_benchmarks(group, season, None) {
                Ok(result) => {
                    summaries.insert(group, PositionSummary::from_result(&result));
                }
                Err(EfficiencyError::InsufficientData { player_count, .. }) => {
                    debug!(position = %group, season, player_count, "skipped in league benchmarks");
                }
                Err(e) => return Err(e),
            }
        }

        let total_players = summaries.values().map(|s| s.player_count).sum();
        let positions_analyzed = summaries.len();
        info!(season, positions_analyzed, total_players, "league benchmarks ready");
        Ok(LeagueBenchmarks {
            season: season.to_string(),
            positions: summaries,
            total_players,
            positions_analyzed,
            quality: benchmark_quality(total_players, positions_analyzed),
        })
    }

    /// Groups with enough players (at the clustering matches floor) to cluster.
    pub fn available_positions(&self, season: &str) -> Result<Vec<PositionGroup>> {
        let min_matches = self.config.clustering.min_matches;
        let required = self.config.clustering.min_population;
        let mut available = Vec::new();
        for group in PositionGroup::ALL {
            if self.analyzer.population_size(group, season, min_matches)? >= required {
                available.push(group);
            }
        }
        Ok(available)
    }

    pub fn available_seasons(&self) -> Result<Vec<String>> {
        self.store.available_seasons()
    }

    /// Re-read a season and drop the clusterings computed from it.
    pub fn reload_season(&self, season: &str) -> Result<()> {
        self.store.reload(season)?;
        self.benchmarks.lock().retain(|(_, s), _| s != season);
        Ok(())
    }

    pub fn clear_caches(&self) {
        self.benchmarks.lock().clear();
        self.store.clear_cache();
        info!("all caches cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{spread_population, write_season, PlayerRow};

    const SEASON: &str = "2024-25";

    fn engine(rows: &[PlayerRow], ttl_secs: u64) -> (tempfile::TempDir, PositionEfficiency) {
        let dir = tempfile::tempdir().unwrap();
        write_season(dir.path(), SEASON, rows);
        let mut config = EngineConfig::with_base_path(dir.path());
        config.cache.ttl_secs = ttl_secs;
        (dir, PositionEfficiency::new(config))
    }

    #[test]
    fn benchmarks_are_cached_until_ttl() {
        let (_dir, cached) = engine(&spread_population(1, 15, "CF"), 3600);
        let a = cached.position_benchmarks(PositionGroup::CF, SEASON, None).unwrap();
        let b = cached.position_benchmarks(PositionGroup::CF, SEASON, None).unwrap();
        assert!(Arc::ptr_eq(&a, &b));

        let (_dir, expiring) = engine(&spread_population(1, 15, "CF"), 0);
        let a = expiring.position_benchmarks(PositionGroup::CF, SEASON, None).unwrap();
        let b = expiring.position_benchmarks(PositionGroup::CF, SEASON, None).unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(a.players, b.players);
    }

    #[test]
    fn current_player_bypasses_cache() {
        let mut rows = spread_population(1, 15, "CF");
        rows.push(PlayerRow::new(99, "CF", "Late FC").matches(1.0).minutes(200.0));
        let (_dir, engine) = engine(&rows, 3600);

        let cached = engine.position_benchmarks(PositionGroup::CF, SEASON, None).unwrap();
        let forced = engine.position_benchmarks(PositionGroup::CF, SEASON, Some(99)).unwrap();
        assert!(cached.player(99).is_none());
        assert!(forced.player(99).is_some());

        let again = engine.position_benchmarks(PositionGroup::CF, SEASON, None).unwrap();
        assert!(Arc::ptr_eq(&cached, &again));
    }

    #[test]
    fn player_tier_locates_player() {
        let (_dir, engine) = engine(&spread_population(1, 20, "LB"), 3600);
        let tier = engine.player_tier(5, SEASON).unwrap();
        assert_eq!(tier.position, PositionGroup::FB);
        assert_eq!(tier.population_size, 20);
        assert!((0.1..=99.9).contains(&tier.percentile_in_position));
        assert_eq!(tier.band, EfficiencyBand::from_score(tier.iep_score));
    }

    #[test]
    fn player_tier_errors_are_typed() {
        let mut rows = spread_population(1, 12, "CB");
        rows.push(PlayerRow::new(77, "CB", "Bench FC").matches(1.0).minutes(30.0));
        let (_dir, engine) = engine(&rows, 3600);

        assert!(matches!(
            engine.player_tier(77, SEASON).unwrap_err(),
            EfficiencyError::PlayerNotInPopulation { player_id: 77, .. }
        ));
        assert!(matches!(
            engine.player_tier(12345, SEASON).unwrap_err(),
            EfficiencyError::PlayerNotFound { .. }
        ));
    }

    #[test]
    fn league_benchmarks_skip_thin_groups() {
        let mut rows = spread_population(1, 14, "CF");
        rows.extend(spread_population(100, 12, "GK"));
        rows.extend(spread_population(200, 4, "DMF"));
        let (_dir, engine) = engine(&rows, 3600);

        let league = engine.league_efficiency_benchmarks(SEASON, None).unwrap();
        assert_eq!(league.positions_analyzed, 2);
        assert_eq!(league.total_players, 26);
        assert_eq!(league.quality, ClusterQuality::Limited);
        let cf = &league.positions[&PositionGroup::CF];
        assert_eq!(cf.tiers.iter().map(|t| t.players).sum::<usize>(), 14);
        assert_eq!(cf.tiers[0].rank, 0);

        assert_eq!(
            engine.available_positions(SEASON).unwrap(),
            vec![PositionGroup::GK, PositionGroup::CF]
        );
    }

    #[test]
    fn benchmark_quality_thresholds() {
        assert_eq!(benchmark_quality(1200, 8), ClusterQuality::Excellent);
        assert_eq!(benchmark_quality(1200, 7), ClusterQuality::Good);
        assert_eq!(benchmark_quality(300, 4), ClusterQuality::Acceptable);
        assert_eq!(benchmark_quality(150, 8), ClusterQuality::Limited);
    }

    #[test]
    fn reload_and_clear_drop_cached_state() {
        let (dir, engine) = engine(&spread_population(1, 12, "LW"), 3600);
        let before = engine.position_benchmarks(PositionGroup::W, SEASON, None).unwrap();
        assert_eq!(before.players.len(), 12);

        write_season(dir.path(), SEASON, &spread_population(1, 16, "LW"));
        engine.reload_season(SEASON).unwrap();
        let after = engine.position_benchmarks(PositionGroup::W, SEASON, None).unwrap();
        assert_eq!(after.players.len(), 16);

        engine.clear_caches();
        assert!(engine.store().cached_seasons().is_empty());
    }
}
