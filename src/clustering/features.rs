//! Clustering feature matrix and standard scaling.

use nalgebra::DMatrix;
use polars::prelude::*;

use crate::error::Result;
use crate::schema::{features, identity, metrics, playing_time};
use crate::stats;
use crate::store::{float_values, id_values, string_values};

/// One row per player, columns in [`features::ALL`] order.
#[derive(Debug, Clone)]
pub struct FeatureTable {
    pub player_ids: Vec<i64>,
    pub names: Vec<String>,
    pub teams: Vec<String>,
    pub values: DMatrix<f64>,
}

impl FeatureTable {
    pub fn len(&self) -> usize {
        self.player_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.player_ids.is_empty()
    }

    pub fn column(&self, feature: &str) -> Option<Vec<f64>> {
        let j = features::ALL.iter().position(|f| *f == feature)?;
        Some(self.values.column(j).iter().copied().collect())
    }

    /// Keep only the rows at `indices`, in that order.
    pub fn select(&self, indices: &[usize]) -> Self {
        Self {
            player_ids: indices.iter().map(|&i| self.player_ids[i]).collect(),
            names: indices.iter().map(|&i| self.names[i].clone()).collect(),
            teams: indices.iter().map(|&i| self.teams[i].clone()).collect(),
            values: self.values.select_rows(indices),
        }
    }
}

/// Build the feature table for every row of `frame`.
///
/// Absent columns and null cells count as zero. Clearances are not in the
/// export and are estimated as aerial duels won per 90 plus interceptions.
pub fn build(frame: &DataFrame) -> Result<FeatureTable> {
    let n = frame.height();
    let zeros_or = |column: &str| -> Result<Vec<f64>> {
        if frame.column(column).is_err() {
            return Ok(vec![0.0; n]);
        }
        Ok(float_values(frame, column)?
            .into_iter()
            .map(|v| v.filter(|x| x.is_finite()).unwrap_or(0.0))
            .collect())
    };

    let goals = zeros_or(metrics::GOALS_PER_90)?;
    let assists = zeros_or(metrics::ASSISTS_PER_90)?;
    let pass_accuracy = zeros_or(metrics::ACCURATE_PASSES_PCT)?;
    let duels_won = zeros_or(metrics::DUELS_WON_PCT)?;
    let shots = zeros_or(metrics::SHOTS_PER_90)?;
    let interceptions = zeros_or(metrics::INTERCEPTIONS_PER_90)?;
    let tackles = zeros_or(metrics::SLIDING_TACKLES_PER_90)?;
    let aerial = zeros_or(metrics::AERIAL_DUELS_PER_90)?;
    let aerial_won = zeros_or(metrics::AERIAL_DUELS_WON_PCT)?;
    let minutes = zeros_or(playing_time::MINUTES_PLAYED)?;

    let clearances: Vec<f64> = (0..n)
        .map(|i| aerial[i] * aerial_won[i] / 100.0 + interceptions[i])
        .collect();

    let columns = [
        goals,
        assists,
        pass_accuracy,
        duels_won,
        shots,
        interceptions,
        tackles,
        clearances,
        minutes,
    ];
    let values = DMatrix::from_fn(n, features::ALL.len(), |i, j| columns[j][i]);

    Ok(FeatureTable {
        player_ids: id_values(frame)?
            .into_iter()
            .map(|id| id.unwrap_or_default())
            .collect(),
        names: labels(string_values(frame, identity::FULL_NAME)?),
        teams: labels(string_values(frame, identity::TEAM)?),
        values,
    })
}

fn labels(values: Vec<Option<String>>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.unwrap_or_else(|| "Unknown".to_string()))
        .collect()
}

/// Row indices that pass the viability floor: some non-zero feature and at
/// least `min_minutes` played.
pub fn viable_rows(table: &FeatureTable, min_minutes: f64) -> Vec<usize> {
    let minutes_col = features::ALL.len() - 1;
    (0..table.len())
        .filter(|&i| {
            let row = table.values.row(i);
            row.sum() != 0.0 && row[minutes_col] >= min_minutes
        })
        .collect()
}

/// Per-feature mean and scale fitted on one population.
#[derive(Debug, Clone)]
pub struct StandardScaler {
    pub means: Vec<f64>,
    pub scales: Vec<f64>,
}

impl StandardScaler {
    /// Population standard deviation; constant features get scale 1.
    pub fn fit(values: &DMatrix<f64>) -> Self {
        let (means, scales): (Vec<f64>, Vec<f64>) = (0..values.ncols())
            .map(|j| {
                let column: Vec<f64> = values.column(j).iter().copied().collect();
                let mean = stats::mean(&column).unwrap_or(0.0);
                let sd = stats::std_dev(&column).unwrap_or(0.0);
                (mean, if sd > 0.0 { sd } else { 1.0 })
            })
            .unzip();
        Self { means, scales }
    }

    pub fn transform(&self, values: &DMatrix<f64>) -> DMatrix<f64> {
        DMatrix::from_fn(values.nrows(), values.ncols(), |i, j| {
            (values[(i, j)] - self.means[j]) / self.scales[j]
        })
    }
}
