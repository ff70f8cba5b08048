//! Clustering-based efficiency (IEP) analysis of one position group and
//! season.
//!
//! Players are clustered on standardized features, clusters are ranked by
//! their mean first principal component, and each player's score combines
//! the rank of their cluster with their own principal coordinates:
//!
//! ```text
//! score = clamp(85 - 20 * rank + clamp(10 * pc1, ±15) + clamp(3 * pc2, ±5), 0, 100)
//! ```
//!
//! Ranking on the first component assumes that axis tracks overall output
//! for the group; nothing guarantees it for every feature mix.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use nalgebra::DMatrix;
use polars::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::clustering::features::{self as feature_matrix, FeatureTable, StandardScaler};
use crate::clustering::{silhouette_score, ClusteringBackend, LloydBackend, Projection};
use crate::config::ClusteringConfig;
use crate::error::{EfficiencyError, Result};
use crate::position::{PositionFamily, PositionGroup};
use crate::schema::{features, results};
use crate::stats::{self, round1};
use crate::store::{id_values, SeasonDataStore};

const THREE_TIERS: [&str; 3] = ["Elite Tier", "Average Tier", "Development Tier"];
const FOUR_TIERS: [&str; 4] = ["Elite Tier", "Strong Tier", "Average Tier", "Development Tier"];
const TOP_PLAYERS_PER_CLUSTER: usize = 5;

/// Tier name for a cluster rank (0 = best) among `n_clusters`.
pub fn tier_label(rank: usize, n_clusters: usize) -> String {
    let names: &[&str] = match n_clusters {
        3 => &THREE_TIERS,
        2 | 4 => &FOUR_TIERS,
        _ => &[],
    };
    names
        .get(rank)
        .map(|s| s.to_string())
        .unwrap_or_else(|| format!("Tier {}", rank + 1))
}

/// Score from cluster rank and principal coordinates, rounded to 0.1.
pub fn iep_score(rank: usize, pc1: f64, pc2: f64) -> f64 {
    let base = 85.0 - 20.0 * rank as f64;
    let score = base + (pc1 * 10.0).clamp(-15.0, 15.0) + (pc2 * 3.0).clamp(-5.0, 5.0);
    round1(score.clamp(0.0, 100.0))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EfficiencyBand {
    Elite,
    Strong,
    Average,
    Development,
}

impl EfficiencyBand {
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            Self::Elite
        } else if score >= 65.0 {
            Self::Strong
        } else if score >= 45.0 {
            Self::Average
        } else {
            Self::Development
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Elite => "Elite",
            Self::Strong => "Strong",
            Self::Average => "Average",
            Self::Development => "Development",
        }
    }
}

impl fmt::Display for EfficiencyBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ClusterQuality {
    Excellent,
    Good,
    Acceptable,
    Limited,
}

impl ClusterQuality {
    pub fn assess(silhouette: f64, variance_explained: f64, players: usize) -> Self {
        if silhouette > 0.5 && variance_explained > 0.7 && players > 50 {
            Self::Excellent
        } else if silhouette > 0.3 && variance_explained > 0.6 && players > 30 {
            Self::Good
        } else if silhouette > 0.2 && variance_explained > 0.5 && players > 15 {
            Self::Acceptable
        } else {
            Self::Limited
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Acceptable => "acceptable",
            Self::Limited => "limited",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerEfficiency {
    pub player_id: i64,
    pub player_name: String,
    pub team: String,
    pub cluster_id: usize,
    pub tier_rank: usize,
    pub tier_label: String,
    pub iep_score: f64,
    pub pca: [f64; 2],
    pub band: EfficiencyBand,
    /// Unscaled feature values, keyed by feature name.
    pub key_features: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureSummary {
    pub mean: f64,
    pub std: f64,
    pub median: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterProfile {
    pub cluster_id: usize,
    pub rank: usize,
    pub label: String,
    pub player_count: usize,
    pub percentage: f64,
    pub pc1_mean: f64,
    pub top_players: Vec<String>,
    pub profile: BTreeMap<String, FeatureSummary>,
    pub characteristics: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataQuality {
    pub total_players: usize,
    pub valid_for_clustering: usize,
    pub features_used: usize,
    pub min_matches_filter: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClusterResult {
    pub position: PositionGroup,
    pub season: String,
    pub analysis_date: DateTime<Utc>,
    pub n_clusters: usize,
    pub silhouette_score: f64,
    pub inertia: f64,
    pub cluster_distribution: BTreeMap<usize, usize>,
    pub explained_variance_ratio: Vec<f64>,
    pub total_variance_explained: f64,
    /// PCA loadings, one row per component, in feature order.
    pub components: Vec<Vec<f64>>,
    pub players: Vec<PlayerEfficiency>,
    /// Ordered best tier first.
    pub clusters: Vec<ClusterProfile>,
    pub data_quality: DataQuality,
    pub quality: ClusterQuality,
}

impl ClusterResult {
    pub fn player(&self, player_id: i64) -> Option<&PlayerEfficiency> {
        self.players.iter().find(|p| p.player_id == player_id)
    }

    pub fn iep_scores(&self) -> Vec<f64> {
        self.players.iter().map(|p| p.iep_score).collect()
    }

    /// Per-player rows as a frame for the rendering layer.
    pub fn players_frame(&self) -> Result<DataFrame> {
        let p = &self.players;
        let columns: Vec<Column> = vec![
            Series::new(
                results::PLAYER_ID.into(),
                p.iter().map(|r| r.player_id).collect::<Vec<_>>(),
            )
            .into(),
            Series::new(
                results::PLAYER_NAME.into(),
                p.iter().map(|r| r.player_name.as_str()).collect::<Vec<_>>(),
            )
            .into(),
            Series::new(
                results::TEAM.into(),
                p.iter().map(|r| r.team.as_str()).collect::<Vec<_>>(),
            )
            .into(),
            Series::new(
                results::CLUSTER_ID.into(),
                p.iter().map(|r| r.cluster_id as u32).collect::<Vec<_>>(),
            )
            .into(),
            Series::new(
                results::TIER_RANK.into(),
                p.iter().map(|r| r.tier_rank as u32).collect::<Vec<_>>(),
            )
            .into(),
            Series::new(
                results::TIER_LABEL.into(),
                p.iter().map(|r| r.tier_label.as_str()).collect::<Vec<_>>(),
            )
            .into(),
            Series::new(
                results::IEP_SCORE.into(),
                p.iter().map(|r| r.iep_score).collect::<Vec<_>>(),
            )
            .into(),
            Series::new(
                results::PCA_1.into(),
                p.iter().map(|r| r.pca[0]).collect::<Vec<_>>(),
            )
            .into(),
            Series::new(
                results::PCA_2.into(),
                p.iter().map(|r| r.pca[1]).collect::<Vec<_>>(),
            )
            .into(),
        ];
        Ok(DataFrame::new(columns)?)
    }
}

pub struct ClusteringEfficiencyAnalyzer {
    store: Arc<SeasonDataStore>,
    backend: Box<dyn ClusteringBackend>,
    config: ClusteringConfig,
}

impl ClusteringEfficiencyAnalyzer {
    pub fn new(store: Arc<SeasonDataStore>, config: ClusteringConfig) -> Self {
        let backend = LloydBackend::from_config(&config);
        Self::with_backend(store, config, backend)
    }

    pub fn with_backend(
        store: Arc<SeasonDataStore>,
        config: ClusteringConfig,
        backend: impl ClusteringBackend + 'static,
    ) -> Self {
        Self {
            store,
            backend: Box::new(backend),
            config,
        }
    }

    pub fn config(&self) -> &ClusteringConfig {
        &self.config
    }

    /// Players clustering would run on, before the viability floor.
    pub fn population_size(
        &self,
        group: PositionGroup,
        season: &str,
        min_matches: u32,
    ) -> Result<usize> {
        Ok(self.population(group, season, min_matches, None)?.height())
    }

    /// Cluster the group's season population.
    ///
    /// `current_player_id` is added even below `min_matches`, but the
    /// minutes and all-zero floor applies to them like anyone else.
    pub fn analyze(
        &self,
        group: PositionGroup,
        season: &str,
        min_matches: u32,
        current_player_id: Option<i64>,
    ) -> Result<ClusterResult> {
        let required = self.config.min_population;
        let rows = self.population(group, season, min_matches, current_player_id)?;
        let total_players = rows.height();
        if total_players < required {
            warn!(group = %group, season, players = total_players, "not enough players to cluster");
            return Err(EfficiencyError::InsufficientData {
                player_count: total_players,
                required,
            });
        }

        let all = feature_matrix::build(&rows)?;
        let table = all.select(&feature_matrix::viable_rows(&all, self.config.min_minutes));
        if table.len() < required {
            warn!(
                group = %group,
                season,
                players = table.len(),
                "not enough players left after the viability floor"
            );
            return Err(EfficiencyError::InsufficientData {
                player_count: table.len(),
                required,
            });
        }

        let scaled = StandardScaler::fit(&table.values).transform(&table.values);
        let k = group.cluster_count().min((table.len() / 2).max(2));
        let partition = self.backend.fit_predict(&scaled, k)?;
        let projection = self.backend.project(&scaled, 2)?;
        let silhouette = silhouette_score(&scaled, &partition.labels).unwrap_or_else(|| {
            warn!(group = %group, season, "silhouette undefined for this partition");
            0.0
        });

        let ranks = rank_clusters(&partition.labels, &projection, k);
        let players = score_players(&table, &partition.labels, &projection, &ranks, k);
        let clusters = profile_clusters(
            group,
            &table,
            &partition.labels,
            &players,
            &projection,
            &ranks,
        );

        let mut cluster_distribution = BTreeMap::new();
        for &label in &partition.labels {
            *cluster_distribution.entry(label).or_insert(0) += 1;
        }
        let total_variance_explained = projection.total_explained_variance();
        let quality = ClusterQuality::assess(silhouette, total_variance_explained, table.len());

        info!(
            group = %group,
            season,
            players = table.len(),
            clusters = k,
            silhouette,
            variance = total_variance_explained,
            "clustering complete"
        );

        Ok(ClusterResult {
            position: group,
            season: season.to_string(),
            analysis_date: Utc::now(),
            n_clusters: k,
            silhouette_score: silhouette,
            inertia: partition.inertia,
            cluster_distribution,
            explained_variance_ratio: projection.explained_variance_ratio.clone(),
            total_variance_explained,
            components: projection.components.clone(),
            players,
            clusters,
            data_quality: DataQuality {
                total_players,
                valid_for_clustering: table.len(),
                features_used: features::ALL.len(),
                min_matches_filter: min_matches,
            },
            quality,
        })
    }

    fn population(
        &self,
        group: PositionGroup,
        season: &str,
        min_matches: u32,
        current_player_id: Option<i64>,
    ) -> Result<DataFrame> {
        let season_table = self.store.load(season)?;
        let mut rows = season_table.position_rows(group, Some(min_matches))?;

        if let Some(player_id) = current_player_id {
            if !id_values(&rows)?.contains(&Some(player_id)) {
                let forced = season_table.group_player_rows(group, player_id)?.head(Some(1));
                if forced.height() == 0 {
                    debug!(player_id, group = %group, season, "requested player not in group");
                } else {
                    debug!(
                        player_id,
                        group = %group,
                        season,
                        "requested player added below matches floor"
                    );
                    rows.vstack_mut(&forced)?;
                }
            }
        }
        Ok(rows)
    }
}

/// Rank of each cluster id, best first by mean PC1. Ties keep id order.
fn rank_clusters(labels: &[usize], projection: &Projection, k: usize) -> Vec<usize> {
    let means = cluster_pc1_means(labels, projection, k);
    let mut order: Vec<usize> = (0..k).collect();
    order.sort_by(|&a, &b| means[b].total_cmp(&means[a]));

    let mut ranks = vec![0; k];
    for (rank, &cluster) in order.iter().enumerate() {
        ranks[cluster] = rank;
    }
    ranks
}

/// Mean PC1 per cluster id. An empty cluster sits at the origin.
fn cluster_pc1_means(labels: &[usize], projection: &Projection, k: usize) -> Vec<f64> {
    (0..k)
        .map(|c| {
            let pc1: Vec<f64> = labels
                .iter()
                .enumerate()
                .filter(|(_, &l)| l == c)
                .map(|(i, _)| projection.coordinate(i, 0))
                .collect();
            stats::mean(&pc1).unwrap_or(0.0)
        })
        .collect()
}

fn score_players(
    table: &FeatureTable,
    labels: &[usize],
    projection: &Projection,
    ranks: &[usize],
    k: usize,
) -> Vec<PlayerEfficiency> {
    (0..table.len())
        .map(|i| {
            let cluster_id = labels[i];
            let rank = ranks[cluster_id];
            let pca = [projection.coordinate(i, 0), projection.coordinate(i, 1)];
            let score = iep_score(rank, pca[0], pca[1]);
            PlayerEfficiency {
                player_id: table.player_ids[i],
                player_name: table.names[i].clone(),
                team: table.teams[i].clone(),
                cluster_id,
                tier_rank: rank,
                tier_label: tier_label(rank, k),
                iep_score: score,
                pca,
                band: EfficiencyBand::from_score(score),
                key_features: features::ALL
                    .iter()
                    .enumerate()
                    .map(|(j, f)| (f.to_string(), table.values[(i, j)]))
                    .collect(),
            }
        })
        .collect()
}

fn profile_clusters(
    group: PositionGroup,
    table: &FeatureTable,
    labels: &[usize],
    players: &[PlayerEfficiency],
    projection: &Projection,
    ranks: &[usize],
) -> Vec<ClusterProfile> {
    let k = ranks.len();
    let pc1_means = cluster_pc1_means(labels, projection, k);
    let mut profiles: Vec<ClusterProfile> = (0..k)
        .filter_map(|c| {
            let members: Vec<usize> = (0..labels.len()).filter(|&i| labels[i] == c).collect();
            if members.is_empty() {
                return None;
            }
            let values: DMatrix<f64> = table.values.select_rows(&members);
            let profile: BTreeMap<String, FeatureSummary> = features::ALL
                .iter()
                .enumerate()
                .map(|(j, f)| {
                    let column: Vec<f64> = values.column(j).iter().copied().collect();
                    let summary = FeatureSummary {
                        mean: stats::mean(&column).unwrap_or(0.0),
                        std: stats::std_dev(&column).unwrap_or(0.0),
                        median: stats::median(&column).unwrap_or(0.0),
                    };
                    (f.to_string(), summary)
                })
                .collect();

            let mut by_score: Vec<&PlayerEfficiency> =
                members.iter().map(|&i| &players[i]).collect();
            by_score.sort_by(|a, b| b.iep_score.total_cmp(&a.iep_score));

            Some(ClusterProfile {
                cluster_id: c,
                rank: ranks[c],
                label: tier_label(ranks[c], k),
                player_count: members.len(),
                percentage: round1(members.len() as f64 / labels.len() as f64 * 100.0),
                pc1_mean: pc1_means[c],
                top_players: by_score
                    .iter()
                    .take(TOP_PLAYERS_PER_CLUSTER)
                    .map(|p| p.player_name.clone())
                    .collect(),
                characteristics: characteristics(group.family(), &profile),
                profile,
            })
        })
        .collect();
    profiles.sort_by_key(|p| p.rank);
    profiles
}

/// Descriptive traits of a cluster from its feature means.
pub fn characteristics(
    family: PositionFamily,
    profile: &BTreeMap<String, FeatureSummary>,
) -> Vec<String> {
    let mean = |feature: &str| profile.get(feature).map_or(0.0, |s| s.mean);
    let rules: &[(&str, f64, &str)] = match family {
        PositionFamily::Attacking => &[
            (features::GOALS_PER_90, 0.5, "High goal scoring rate"),
            (features::ASSISTS_PER_90, 0.3, "Strong assist contribution"),
            (features::SHOTS_PER_90, 3.0, "High shot frequency"),
        ],
        PositionFamily::Midfield => &[
            (features::PASS_ACCURACY_PCT, 85.0, "Excellent passing accuracy"),
            (features::ASSISTS_PER_90, 0.2, "Creative playmaker"),
            (features::INTERCEPTIONS_PER_90, 1.0, "Strong ball recovery"),
        ],
        PositionFamily::Defensive => &[
            (features::TACKLES_PER_90, 2.0, "High tackling activity"),
            (features::CLEARANCES_PER_90, 3.0, "Strong aerial/clearance game"),
            (features::DUELS_WON_PCT, 60.0, "Dominant in duels"),
        ],
        PositionFamily::Goalkeeping => &[],
    };

    let mut traits: Vec<String> = rules
        .iter()
        .filter(|(feature, threshold, _)| mean(*feature) > *threshold)
        .map(|(_, _, label)| label.to_string())
        .collect();
    if mean(features::MINUTES_PLAYED) > 2000.0 {
        traits.push("High playing time".to_string());
    }
    if traits.is_empty() {
        traits.push("Balanced performance profile".to_string());
    }
    traits
}
