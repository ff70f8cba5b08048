//! Metric distributions within a position group and exact player ranks.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::error::{EfficiencyError, Result};
use crate::metrics::raw_column;
use crate::position::PositionGroup;
use crate::stats::{self, quantile_sorted, sorted_copy};
use crate::store::{column_values, SeasonDataStore};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PercentileResult {
    pub p10: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub sample_size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_percentile: Option<f64>,
}

impl PercentileResult {
    /// Summary of `values`, or `None` when empty.
    pub fn from_values(values: &[f64], player_value: Option<f64>) -> Option<Self> {
        let sorted = sorted_copy(values);
        let (&min, &max) = (sorted.first()?, sorted.last()?);
        Some(Self {
            p10: quantile_sorted(&sorted, 0.10),
            p25: quantile_sorted(&sorted, 0.25),
            p50: quantile_sorted(&sorted, 0.50),
            p75: quantile_sorted(&sorted, 0.75),
            p90: quantile_sorted(&sorted, 0.90),
            min,
            max,
            mean: stats::mean(&sorted)?,
            sample_size: sorted.len(),
            player_percentile: player_value.map(|v| stats::exact_percentile(v, &sorted)),
        })
    }
}

pub struct PercentileEngine {
    store: Arc<SeasonDataStore>,
}

impl PercentileEngine {
    pub fn new(store: Arc<SeasonDataStore>) -> Self {
        Self { store }
    }

    /// Distribution of `metric` over every group row of the requested
    /// seasons (no matches floor).
    ///
    /// `Ok(None)` when fewer than `min_sample` valid observations exist,
    /// including when no season carries the metric's column.
    pub fn distribution(
        &self,
        group: PositionGroup,
        seasons: &[String],
        metric: &str,
        player_value: Option<f64>,
        min_sample: usize,
    ) -> Result<Option<PercentileResult>> {
        let column = raw_column(metric)
            .ok_or_else(|| EfficiencyError::UnknownMetric(metric.to_string()))?;
        let frames = self.store.position_frames(group, seasons, None)?;
        let values = column_values(&frames, column)?;

        if values.len() < min_sample {
            debug!(
                group = %group,
                metric,
                sample = values.len(),
                min_sample,
                "distribution sample too small"
            );
            return Ok(None);
        }
        Ok(PercentileResult::from_values(&values, player_value))
    }

    /// See [`stats::exact_percentile`].
    pub fn exact_percentile(&self, value: f64, distribution: &[f64]) -> f64 {
        stats::exact_percentile(value, distribution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::CsvDirectorySource;
    use crate::testing::{write_season, PlayerRow};
    use proptest::prelude::*;

    fn engine(rows: &[PlayerRow]) -> (tempfile::TempDir, PercentileEngine) {
        let dir = tempfile::tempdir().unwrap();
        write_season(dir.path(), "2024-25", rows);
        let store = SeasonDataStore::new(CsvDirectorySource::new(dir.path(), "processed_"));
        (dir, PercentileEngine::new(Arc::new(store)))
    }

    fn seasons() -> Vec<String> {
        vec!["2024-25".to_string()]
    }

    #[test]
    fn small_sample_is_none() {
        let rows: Vec<PlayerRow> = (0..9).map(|i| PlayerRow::new(i, "CB", "A")).collect();
        let (_dir, engine) = engine(&rows);
        let result = engine
            .distribution(PositionGroup::CB, &seasons(), "goals_per_90", None, 10)
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn absent_column_is_none_and_unknown_metric_errors() {
        let rows: Vec<PlayerRow> = (0..12).map(|i| PlayerRow::new(i, "GK", "A")).collect();
        let (_dir, engine) = engine(&rows);
        assert!(engine
            .distribution(PositionGroup::GK, &seasons(), "save_percentage", None, 10)
            .unwrap()
            .is_none());
        assert!(matches!(
            engine
                .distribution(PositionGroup::GK, &seasons(), "saves_per_90", None, 10)
                .unwrap_err(),
            EfficiencyError::UnknownMetric(_)
        ));
    }

    #[test]
    fn distribution_includes_low_minute_players() {
        let rows: Vec<PlayerRow> = (0..10)
            .map(|i| PlayerRow::new(i, "AMF", "A").goals(i as f64 / 10.0).matches(1.0))
            .collect();
        let (_dir, engine) = engine(&rows);
        let result = engine
            .distribution(PositionGroup::AMF, &seasons(), "goals_per_90", Some(0.45), 10)
            .unwrap()
            .unwrap();
        assert_eq!(result.sample_size, 10);
        assert_eq!(result.min, 0.0);
        assert!((result.max - 0.9).abs() < 1e-12);
        assert!((result.p50 - 0.45).abs() < 1e-12);
        assert_eq!(result.player_percentile, Some(50.0));
    }

    proptest! {
        #[test]
        fn summary_is_ordered(values in prop::collection::vec(-50.0f64..50.0, 1..300)) {
            let r = PercentileResult::from_values(&values, None).unwrap();
            prop_assert!(r.min <= r.p10);
            prop_assert!(r.p10 <= r.p25 && r.p25 <= r.p50 && r.p50 <= r.p75 && r.p75 <= r.p90);
            prop_assert!(r.p90 <= r.max);
        }
    }
}
