//! Positional performance analytics for football season exports.
//!
//! Season CSVs are loaded into [`store::SeasonDataStore`]; the
//! [`facade::PositionEfficiency`] entry point answers league and team
//! averages, percentile distributions and clustering-based efficiency tiers.

pub mod aggregation;
pub mod clustering;
pub mod config;
pub mod efficiency;
pub mod error;
pub mod facade;
pub mod metrics;
pub mod percentile;
pub mod position;
pub mod schema;
pub mod stats;
pub mod store;

#[cfg(feature = "python")]
mod python;
#[cfg(test)]
mod testing;

pub use aggregation::{AggregateResult, AggregateStatisticsEngine, MetricAggregate};
pub use config::EngineConfig;
pub use efficiency::{ClusterResult, ClusteringEfficiencyAnalyzer, EfficiencyBand};
pub use error::{EfficiencyError, Result};
pub use facade::{LeagueBenchmarks, PlayerTier, PositionEfficiency};
pub use percentile::{PercentileEngine, PercentileResult};
pub use position::{map_to_group, PositionGroup};
pub use store::{CsvDirectorySource, MemorySource, SeasonDataStore, SeasonSource};

#[cfg(feature = "python")]
use pyo3::prelude::*;

#[cfg(feature = "python")]
#[pymodule]
fn position_efficiency(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<python::PyEfficiencyEngine>()?;
    python::add_schema_exports(m)?;
    Ok(())
}
