//! League, team and top-quartile benchmarks per position group.

use std::collections::BTreeMap;
use std::sync::Arc;

use polars::prelude::DataFrame;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{EfficiencyError, Result};
use crate::metrics::{metric_keys, metrics_for, raw_column, METRIC_COLUMNS};
use crate::position::PositionGroup;
use crate::stats::{mean, quantile, quantile_sorted, sorted_copy};
use crate::store::{column_values, SeasonDataStore};

/// Threshold detail reported by [`AggregateStatisticsEngine::top_quartile_average`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopQuartileDetail {
    pub p75_threshold: f64,
    pub top25_sample_size: usize,
    pub total_sample_size: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricAggregate {
    pub value: f64,
    pub sample_size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_quartile: Option<TopQuartileDetail>,
}

/// Per-metric benchmark values for one position group.
///
/// A metric with no valid observation is absent from `metrics`. Check
/// `players_analyzed == 0` to detect an empty population.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateResult {
    pub position: PositionGroup,
    pub seasons: Vec<String>,
    pub metrics: BTreeMap<String, MetricAggregate>,
    pub players_analyzed: usize,
}

impl AggregateResult {
    fn empty(position: PositionGroup, seasons: &[String]) -> Self {
        Self {
            position,
            seasons: seasons.to_vec(),
            metrics: BTreeMap::new(),
            players_analyzed: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.players_analyzed == 0
    }

    pub fn value(&self, metric_key: &str) -> Option<f64> {
        self.metrics.get(metric_key).map(|m| m.value)
    }
}

pub struct AggregateStatisticsEngine {
    store: Arc<SeasonDataStore>,
    min_matches: u32,
}

impl AggregateStatisticsEngine {
    /// `min_matches` is the floor used by the top-quartile average and by
    /// the team fallback.
    pub fn new(store: Arc<SeasonDataStore>, min_matches: u32) -> Self {
        Self { store, min_matches }
    }

    /// Mean of each metric over group rows with at least `min_matches`
    /// matches. `None` selects every catalog metric.
    pub fn league_average(
        &self,
        group: PositionGroup,
        seasons: &[String],
        min_matches: u32,
        metrics: Option<&[&str]>,
    ) -> Result<AggregateResult> {
        let columns = resolve_metrics(metrics)?;
        let frames = self
            .store
            .position_frames(group, seasons, Some(min_matches))?;
        let players: usize = frames.iter().map(|f| f.height()).sum();
        if players == 0 {
            debug!(group = %group, min_matches, "no qualifying players for league average");
            return Ok(AggregateResult::empty(group, seasons));
        }

        average_metrics(group, seasons, &frames, players, &columns)
    }

    /// Mean of each metric over the team's group rows (no matches floor).
    ///
    /// A team with no rows in the group falls back to the league average for
    /// the same group, seasons and metrics, at the engine's default floor.
    pub fn team_average(
        &self,
        team: &str,
        group: PositionGroup,
        seasons: &[String],
        metrics: Option<&[&str]>,
    ) -> Result<AggregateResult> {
        let columns = resolve_metrics(metrics)?;
        let frames = self
            .store
            .load_many(seasons)?
            .iter()
            .map(|table| table.team_rows(team, group))
            .collect::<Result<Vec<_>>>()?;
        let players: usize = frames.iter().map(|f| f.height()).sum();
        if players == 0 {
            info!(team, group = %group, "team has no players in group, using league average");
            return self.league_average(group, seasons, self.min_matches, metrics);
        }

        average_metrics(group, seasons, &frames, players, &columns)
    }

    /// Mean of the observations at or above each metric's 75th percentile.
    pub fn top_quartile_average(
        &self,
        group: PositionGroup,
        seasons: &[String],
        metrics: Option<&[&str]>,
    ) -> Result<AggregateResult> {
        let columns = resolve_metrics(metrics)?;
        let frames = self
            .store
            .position_frames(group, seasons, Some(self.min_matches))?;
        let players: usize = frames.iter().map(|f| f.height()).sum();
        if players == 0 {
            return Ok(AggregateResult::empty(group, seasons));
        }

        let mut result = AggregateResult::empty(group, seasons);
        result.players_analyzed = players;
        for (key, column) in columns {
            let values = column_values(&frames, column)?;
            let Some(threshold) = quantile(&values, 0.75) else {
                continue;
            };
            let top: Vec<f64> = values.iter().copied().filter(|v| *v >= threshold).collect();
            let Some(value) = mean(&top) else {
                continue;
            };
            result.metrics.insert(
                key.to_string(),
                MetricAggregate {
                    value,
                    sample_size: top.len(),
                    top_quartile: Some(TopQuartileDetail {
                        p75_threshold: threshold,
                        top25_sample_size: top.len(),
                        total_sample_size: values.len(),
                    }),
                },
            );
        }
        Ok(result)
    }

    /// The `percentile` (0-100) value of each primary metric of the group.
    pub fn league_percentile(
        &self,
        group: PositionGroup,
        seasons: &[String],
        percentile: f64,
    ) -> Result<AggregateResult> {
        if !(0.0..=100.0).contains(&percentile) {
            return Err(EfficiencyError::Numeric(format!(
                "percentile must be within 0..=100, got {percentile}"
            )));
        }
        let frames = self
            .store
            .position_frames(group, seasons, Some(self.min_matches))?;
        let mut result = AggregateResult::empty(group, seasons);
        result.players_analyzed = frames.iter().map(|f| f.height()).sum();

        for metric in metrics_for(group).primary {
            let Some(column) = metric.raw_column else {
                continue;
            };
            let values = column_values(&frames, column)?;
            if values.is_empty() {
                continue;
            }
            let sorted = sorted_copy(&values);
            result.metrics.insert(
                metric.key.to_string(),
                MetricAggregate {
                    value: quantile_sorted(&sorted, percentile / 100.0),
                    sample_size: sorted.len(),
                    top_quartile: None,
                },
            );
        }
        Ok(result)
    }

    /// Group rows across seasons, with no matches floor.
    pub fn position_sample_size(&self, group: PositionGroup, seasons: &[String]) -> Result<usize> {
        Ok(self
            .store
            .position_frames(group, seasons, None)?
            .iter()
            .map(|f| f.height())
            .sum())
    }

    /// Group rows whose `metric` value is exactly zero.
    pub fn zero_count(
        &self,
        group: PositionGroup,
        seasons: &[String],
        metric: &str,
    ) -> Result<usize> {
        let column = raw_column(metric)
            .ok_or_else(|| EfficiencyError::UnknownMetric(metric.to_string()))?;
        let frames = self.store.position_frames(group, seasons, None)?;
        Ok(column_values(&frames, column)?
            .into_iter()
            .filter(|v| *v == 0.0)
            .count())
    }
}

fn average_metrics(
    group: PositionGroup,
    seasons: &[String],
    frames: &[DataFrame],
    players: usize,
    columns: &[(&'static str, &'static str)],
) -> Result<AggregateResult> {
    let mut result = AggregateResult::empty(group, seasons);
    result.players_analyzed = players;
    for (key, column) in columns {
        let values = column_values(frames, column)?;
        if let Some(value) = mean(&values) {
            result.metrics.insert(
                key.to_string(),
                MetricAggregate {
                    value,
                    sample_size: values.len(),
                    top_quartile: None,
                },
            );
        }
    }
    Ok(result)
}

fn resolve_metrics(metrics: Option<&[&str]>) -> Result<Vec<(&'static str, &'static str)>> {
    match metrics {
        None => Ok(metric_keys()
            .filter_map(|key| raw_column(key).map(|column| (key, column)))
            .collect()),
        Some(keys) => keys
            .iter()
            .map(|key| {
                METRIC_COLUMNS
                    .iter()
                    .find(|(k, _)| k == key)
                    .copied()
                    .ok_or_else(|| EfficiencyError::UnknownMetric(key.to_string()))
            })
            .collect(),
    }
}
