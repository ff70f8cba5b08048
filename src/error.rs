use thiserror::Error;

#[derive(Error, Debug)]
pub enum EfficiencyError {
    #[error("Season data not found: {season} ({location})")]
    DataNotFound { season: String, location: String },

    #[error("Schema error in season {season}: missing {missing:?}")]
    Schema {
        season: String,
        missing: Vec<String>,
    },

    #[error("Insufficient data: {player_count} players (need {required})")]
    InsufficientData { player_count: usize, required: usize },

    #[error("Player {player_id} excluded from the {season} population")]
    PlayerNotInPopulation { player_id: i64, season: String },

    #[error("Player {player_id} has no statistics for {season}")]
    PlayerNotFound { player_id: i64, season: String },

    #[error("Unknown metric: {0}")]
    UnknownMetric(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Numeric error: {0}")]
    Numeric(String),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EfficiencyError>;

impl From<toml::de::Error> for EfficiencyError {
    fn from(err: toml::de::Error) -> Self {
        EfficiencyError::Config(err.to_string())
    }
}

#[cfg(feature = "python")]
impl From<EfficiencyError> for pyo3::PyErr {
    fn from(err: EfficiencyError) -> pyo3::PyErr {
        use pyo3::exceptions::{PyFileNotFoundError, PyKeyError, PyRuntimeError, PyValueError};

        let msg = err.to_string();
        match err {
            EfficiencyError::DataNotFound { .. } => PyFileNotFoundError::new_err(msg),
            EfficiencyError::PlayerNotFound { .. }
            | EfficiencyError::PlayerNotInPopulation { .. }
            | EfficiencyError::UnknownMetric(_) => PyKeyError::new_err(msg),
            EfficiencyError::Schema { .. }
            | EfficiencyError::InsufficientData { .. }
            | EfficiencyError::Config(_) => PyValueError::new_err(msg),
            _ => PyRuntimeError::new_err(msg),
        }
    }
}
