//! Season exports: reading, validation, and the process-wide season cache.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use polars::prelude::*;
use tracing::{debug, info, warn};

use crate::config::DataConfig;
use crate::error::{EfficiencyError, Result};
use crate::metrics::METRIC_COLUMNS;
use crate::position::{map_to_group, PositionGroup, FALLBACK_GROUP, RAW_POSITION_CODES};
use crate::schema::{identity, playing_time, NUMERIC_COLUMNS};
use crate::stats::valid_values;

/// Where season frames come from. The host hands the engine one of these;
/// the engine itself never touches the network.
pub trait SeasonSource: Send + Sync {
    /// Season identifiers the source can serve, in any order.
    fn seasons(&self) -> Result<Vec<String>>;

    /// Raw frame for a season. Fails with `DataNotFound` when absent.
    fn read(&self, season: &str) -> Result<DataFrame>;
}

// ── CSV directory source ────────────────────────────────────────────────────

/// A directory of `<prefix><season>.csv` exports.
pub struct CsvDirectorySource {
    base_path: PathBuf,
    file_prefix: String,
}

impl CsvDirectorySource {
    pub fn new(base_path: impl Into<PathBuf>, file_prefix: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
            file_prefix: file_prefix.into(),
        }
    }

    pub fn from_config(config: &DataConfig) -> Self {
        Self::new(config.base_path.clone(), config.file_prefix.clone())
    }

    fn season_path(&self, season: &str) -> PathBuf {
        self.base_path
            .join(format!("{}{}.csv", self.file_prefix, season))
    }

    /// Read a CSV file with all columns as String dtype.
    /// Trims whitespace from column names.
    fn read_csv_as_strings(&self, path: PathBuf) -> Result<DataFrame> {
        let mut df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(0)) // all columns as String
            .try_into_reader_with_file_path(Some(path))?
            .finish()?;

        let trimmed: Vec<String> = df
            .get_column_names_str()
            .iter()
            .map(|c| c.trim().to_string())
            .collect();
        df.set_column_names(trimmed.as_slice())?;

        Ok(df)
    }
}

impl SeasonSource for CsvDirectorySource {
    fn seasons(&self) -> Result<Vec<String>> {
        if !self.base_path.exists() {
            warn!(path = %self.base_path.display(), "season directory not found");
            return Ok(Vec::new());
        }

        let mut seasons = Vec::new();
        for entry in std::fs::read_dir(&self.base_path)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("csv") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match stem.strip_prefix(self.file_prefix.as_str()) {
                // the merged export is not a season
                Some("complete") | Some("") | None => {}
                Some(season) => seasons.push(season.to_string()),
            }
        }
        Ok(seasons)
    }

    fn read(&self, season: &str) -> Result<DataFrame> {
        let path = self.season_path(season);
        if !path.exists() {
            return Err(EfficiencyError::DataNotFound {
                season: season.to_string(),
                location: path.display().to_string(),
            });
        }
        self.read_csv_as_strings(path)
    }
}

// ── In-memory source ────────────────────────────────────────────────────────

/// Frames registered by the host application (e.g. handed over from Python).
#[derive(Default)]
pub struct MemorySource {
    frames: RwLock<HashMap<String, DataFrame>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, season: impl Into<String>, frame: DataFrame) {
        self.frames.write().insert(season.into(), frame);
    }
}

impl SeasonSource for MemorySource {
    fn seasons(&self) -> Result<Vec<String>> {
        Ok(self.frames.read().keys().cloned().collect())
    }

    fn read(&self, season: &str) -> Result<DataFrame> {
        self.frames
            .read()
            .get(season)
            .cloned()
            .ok_or_else(|| EfficiencyError::DataNotFound {
                season: season.to_string(),
                location: "memory".to_string(),
            })
    }
}

// ── Season table ────────────────────────────────────────────────────────────

/// One player row, as needed to locate a player in their position group.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerRecord {
    pub player_id: i64,
    pub name: String,
    pub team: String,
    pub raw_position: String,
    pub group: PositionGroup,
    pub matches_played: Option<f64>,
    pub minutes_played: Option<f64>,
}

/// A validated, typed season export. Immutable once built.
#[derive(Debug)]
pub struct SeasonTable {
    season: String,
    frame: DataFrame,
    loaded_at: DateTime<Utc>,
}

impl SeasonTable {
    /// Validate and type a raw frame.
    ///
    /// Required: player id, team, primary position, and at least one
    /// performance column. Known numeric columns are cast to Float64
    /// (unparsable cells become null); missing playing-time columns are
    /// added as nulls.
    pub fn from_raw(season: &str, raw: DataFrame) -> Result<Self> {
        let missing: Vec<String> = identity::REQUIRED
            .iter()
            .filter(|c| raw.column(c).is_err())
            .map(|c| c.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(EfficiencyError::Schema {
                season: season.to_string(),
                missing,
            });
        }

        let has_performance = METRIC_COLUMNS
            .iter()
            .any(|(_, column)| raw.column(column).is_ok());
        if !has_performance {
            return Err(EfficiencyError::Schema {
                season: season.to_string(),
                missing: vec!["<any performance column>".to_string()],
            });
        }

        let mut exprs = vec![
            trimmed(identity::PLAYER_ID).cast(DataType::Int64),
            trimmed(identity::TEAM),
            trimmed(identity::PRIMARY_POSITION).str().to_uppercase(),
        ];

        if raw.column(identity::FULL_NAME).is_ok() {
            exprs.push(trimmed(identity::FULL_NAME));
        } else if raw.column(identity::PLAYER).is_ok() {
            exprs.push(trimmed(identity::PLAYER).alias(identity::FULL_NAME));
        } else {
            exprs.push(lit(NULL).cast(DataType::String).alias(identity::FULL_NAME));
        }

        for column in NUMERIC_COLUMNS {
            if raw.column(column).is_ok() {
                exprs.push(trimmed(column).cast(DataType::Float64));
            }
        }
        for column in [playing_time::MATCHES_PLAYED, playing_time::MINUTES_PLAYED] {
            if raw.column(column).is_err() {
                warn!(season, column, "playing-time column missing, filled with nulls");
                exprs.push(lit(NULL).cast(DataType::Float64).alias(column));
            }
        }

        let frame = raw.lazy().with_columns(exprs).collect()?;

        Ok(Self {
            season: season.to_string(),
            frame,
            loaded_at: Utc::now(),
        })
    }

    pub fn season(&self) -> &str {
        &self.season
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// Rows whose raw position maps onto `group`, optionally with a
    /// matches-played floor (missing matches count as zero).
    pub fn position_rows(
        &self,
        group: PositionGroup,
        min_matches: Option<u32>,
    ) -> Result<DataFrame> {
        let mut predicate = group_predicate(group);
        if let Some(min) = min_matches {
            predicate = predicate.and(matches_floor(min));
        }
        Ok(self.frame.clone().lazy().filter(predicate).collect()?)
    }

    /// Rows of `team` (exact name match) in `group`.
    pub fn team_rows(&self, team: &str, group: PositionGroup) -> Result<DataFrame> {
        let predicate = group_predicate(group).and(col(identity::TEAM).eq(lit(team)));
        Ok(self.frame.clone().lazy().filter(predicate).collect()?)
    }

    /// A player's rows inside `group`, ignoring the matches floor.
    pub fn group_player_rows(&self, group: PositionGroup, player_id: i64) -> Result<DataFrame> {
        let predicate = group_predicate(group).and(col(identity::PLAYER_ID).eq(lit(player_id)));
        Ok(self.frame.clone().lazy().filter(predicate).collect()?)
    }

    /// First row of a player, if the season has one.
    pub fn player_record(&self, player_id: i64) -> Result<Option<PlayerRecord>> {
        let rows = self
            .frame
            .clone()
            .lazy()
            .filter(col(identity::PLAYER_ID).eq(lit(player_id)))
            .collect()?;
        if rows.height() == 0 {
            return Ok(None);
        }

        let raw_position = string_values(&rows, identity::PRIMARY_POSITION)?
            .into_iter()
            .next()
            .flatten()
            .unwrap_or_default();
        Ok(Some(PlayerRecord {
            player_id,
            name: string_values(&rows, identity::FULL_NAME)?
                .into_iter()
                .next()
                .flatten()
                .unwrap_or_else(|| "Unknown".to_string()),
            team: string_values(&rows, identity::TEAM)?
                .into_iter()
                .next()
                .flatten()
                .unwrap_or_else(|| "Unknown".to_string()),
            group: map_to_group(&raw_position),
            raw_position,
            matches_played: float_values(&rows, playing_time::MATCHES_PLAYED)?[0],
            minutes_played: float_values(&rows, playing_time::MINUTES_PLAYED)?[0],
        }))
    }
}

fn trimmed(column: &str) -> Expr {
    col(column)
        .cast(DataType::String)
        .str()
        .strip_chars(lit(" \t\r\n"))
}

/// Rows whose code maps onto `group`. The fallback group also takes every
/// code outside the table, missing codes included.
fn group_predicate(group: PositionGroup) -> Expr {
    let codes = Series::new("codes".into(), group.raw_codes());
    let mapped = col(identity::PRIMARY_POSITION).is_in(lit(codes), false);
    if group != FALLBACK_GROUP {
        return mapped;
    }

    let known: Vec<&str> = RAW_POSITION_CODES.iter().map(|(code, _)| *code).collect();
    let unmapped = col(identity::PRIMARY_POSITION)
        .is_in(lit(Series::new("known".into(), known)), false)
        .not()
        .fill_null(lit(true));
    mapped.or(unmapped)
}

fn matches_floor(min_matches: u32) -> Expr {
    col(playing_time::MATCHES_PLAYED)
        .fill_null(lit(0.0))
        .gt_eq(lit(min_matches as f64))
}

// ── Column extraction helpers ───────────────────────────────────────────────

pub fn float_values(frame: &DataFrame, column: &str) -> Result<Vec<Option<f64>>> {
    Ok(frame.column(column)?.f64()?.into_iter().collect())
}

/// Valid observations of `column` across frames. Frames without the column
/// contribute nothing.
pub fn column_values(frames: &[DataFrame], column: &str) -> Result<Vec<f64>> {
    let mut values = Vec::new();
    for frame in frames {
        if frame.column(column).is_err() {
            continue;
        }
        values.extend(valid_values(float_values(frame, column)?));
    }
    Ok(values)
}

pub fn id_values(frame: &DataFrame) -> Result<Vec<Option<i64>>> {
    Ok(frame
        .column(identity::PLAYER_ID)?
        .i64()?
        .into_iter()
        .collect())
}

pub fn string_values(frame: &DataFrame, column: &str) -> Result<Vec<Option<String>>> {
    Ok(frame
        .column(column)?
        .str()?
        .into_iter()
        .map(|v| v.map(|s| s.to_string()))
        .collect())
}

// ── Season data store ───────────────────────────────────────────────────────

/// Loads season tables once and shares them.
///
/// Tables are built completely before they are published, and a published
/// table is never mutated: `reload` swaps in a new `Arc`, so readers holding
/// the old one keep a consistent view.
pub struct SeasonDataStore {
    source: Box<dyn SeasonSource>,
    tables: RwLock<HashMap<String, Arc<SeasonTable>>>,
}

impl SeasonDataStore {
    pub fn new(source: impl SeasonSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            tables: RwLock::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &DataConfig) -> Self {
        Self::new(CsvDirectorySource::from_config(config))
    }

    /// Cached table for `season`, loading it on first use.
    pub fn load(&self, season: &str) -> Result<Arc<SeasonTable>> {
        if let Some(table) = self.tables.read().get(season) {
            debug!(season, "season cache hit");
            return Ok(Arc::clone(table));
        }

        let table = Arc::new(self.build(season)?);
        let mut tables = self.tables.write();
        // A concurrent load may have published first; both are equivalent.
        let published = tables
            .entry(season.to_string())
            .or_insert_with(|| Arc::clone(&table));
        Ok(Arc::clone(published))
    }

    /// Re-read `season` and replace the cached table.
    pub fn reload(&self, season: &str) -> Result<Arc<SeasonTable>> {
        let table = Arc::new(self.build(season)?);
        self.tables
            .write()
            .insert(season.to_string(), Arc::clone(&table));
        info!(season, rows = table.height(), "season reloaded");
        Ok(table)
    }

    /// Load every season in `seasons`, failing on the first that cannot load.
    pub fn load_many(&self, seasons: &[String]) -> Result<Vec<Arc<SeasonTable>>> {
        seasons.iter().map(|s| self.load(s)).collect()
    }

    /// Group rows of every requested season, optionally above a matches floor.
    pub fn position_frames(
        &self,
        group: PositionGroup,
        seasons: &[String],
        min_matches: Option<u32>,
    ) -> Result<Vec<DataFrame>> {
        let frames = self
            .load_many(seasons)?
            .iter()
            .map(|table| table.position_rows(group, min_matches))
            .collect::<Result<Vec<_>>>()?;
        debug!(
            group = %group,
            seasons = seasons.len(),
            rows = frames.iter().map(DataFrame::height).sum::<usize>(),
            ?min_matches,
            "position rows selected"
        );
        Ok(frames)
    }

    /// Seasons the source can serve, most recent first.
    pub fn available_seasons(&self) -> Result<Vec<String>> {
        let mut seasons = self.source.seasons()?;
        seasons.sort_unstable_by(|a, b| b.cmp(a));
        seasons.dedup();
        Ok(seasons)
    }

    pub fn cached_seasons(&self) -> Vec<String> {
        let mut seasons: Vec<String> = self.tables.read().keys().cloned().collect();
        seasons.sort_unstable_by(|a, b| b.cmp(a));
        seasons
    }

    pub fn clear_cache(&self) {
        self.tables.write().clear();
        info!("season cache cleared");
    }

    /// The player's row in `season`, or `PlayerNotFound`.
    pub fn player_record(&self, player_id: i64, season: &str) -> Result<PlayerRecord> {
        self.load(season)?
            .player_record(player_id)?
            .ok_or_else(|| EfficiencyError::PlayerNotFound {
                player_id,
                season: season.to_string(),
            })
    }

    fn build(&self, season: &str) -> Result<SeasonTable> {
        let raw = self.source.read(season)?;
        let table = SeasonTable::from_raw(season, raw)?;
        info!(season, rows = table.height(), "season loaded");
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{write_season, PlayerRow};

    fn store_with(rows: &[PlayerRow]) -> (tempfile::TempDir, SeasonDataStore) {
        let dir = tempfile::tempdir().unwrap();
        write_season(dir.path(), "2024-25", rows);
        let store = SeasonDataStore::new(CsvDirectorySource::new(dir.path(), "processed_"));
        (dir, store)
    }

    #[test]
    fn load_types_columns_and_caches() {
        let rows = vec![PlayerRow::new(1, "CF", "Alpha FC").goals(0.5)];
        let (_dir, store) = store_with(&rows);

        let first = store.load("2024-25").unwrap();
        assert_eq!(first.height(), 1);
        assert_eq!(
            float_values(first.frame(), crate::schema::metrics::GOALS_PER_90).unwrap(),
            vec![Some(0.5)]
        );
        let second = store.load("2024-25").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn missing_season_is_data_not_found() {
        let (_dir, store) = store_with(&[]);
        let err = store.load("1999-00").unwrap_err();
        assert!(matches!(err, EfficiencyError::DataNotFound { .. }));
    }

    #[test]
    fn missing_required_column_is_schema_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("processed_2024-25.csv"),
            "Wyscout id,Team,Goals per 90\n1,Alpha FC,0.3\n",
        )
        .unwrap();
        let store = SeasonDataStore::new(CsvDirectorySource::new(dir.path(), "processed_"));
        match store.load("2024-25").unwrap_err() {
            EfficiencyError::Schema { missing, .. } => {
                assert_eq!(missing, vec![identity::PRIMARY_POSITION.to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(store.cached_seasons().is_empty());
    }

    #[test]
    fn no_performance_column_is_schema_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("processed_2024-25.csv"),
            "Wyscout id,Team,Primary position,Matches played\n1,Alpha FC,CF,10\n",
        )
        .unwrap();
        let store = SeasonDataStore::new(CsvDirectorySource::new(dir.path(), "processed_"));
        assert!(matches!(
            store.load("2024-25").unwrap_err(),
            EfficiencyError::Schema { .. }
        ));
    }

    #[test]
    fn reload_swaps_without_touching_old_snapshot() {
        let (dir, store) = store_with(&[PlayerRow::new(1, "CF", "Alpha FC")]);
        let before = store.load("2024-25").unwrap();

        write_season(
            dir.path(),
            "2024-25",
            &[PlayerRow::new(1, "CF", "Alpha FC"), PlayerRow::new(2, "CB", "Beta FC")],
        );
        let after = store.reload("2024-25").unwrap();

        assert_eq!(before.height(), 1);
        assert_eq!(after.height(), 2);
        assert!(Arc::ptr_eq(&after, &store.load("2024-25").unwrap()));
    }

    #[test]
    fn available_seasons_are_most_recent_first() {
        let dir = tempfile::tempdir().unwrap();
        for season in ["2022-23", "2024-25", "2023-24", "complete"] {
            write_season(dir.path(), season, &[PlayerRow::new(1, "CF", "Alpha FC")]);
        }
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        let store = SeasonDataStore::new(CsvDirectorySource::new(dir.path(), "processed_"));
        assert_eq!(
            store.available_seasons().unwrap(),
            vec!["2024-25", "2023-24", "2022-23"]
        );
    }

    #[test]
    fn position_rows_filter_by_group_and_matches() {
        let rows = vec![
            PlayerRow::new(1, "LCB", "Alpha FC").matches(12.0),
            PlayerRow::new(2, "rcb3", "Alpha FC").matches(3.0),
            PlayerRow::new(3, "CF", "Alpha FC").matches(20.0),
        ];
        let (_dir, store) = store_with(&rows);
        let table = store.load("2024-25").unwrap();

        assert_eq!(table.position_rows(PositionGroup::CB, None).unwrap().height(), 2);
        assert_eq!(table.position_rows(PositionGroup::CB, Some(10)).unwrap().height(), 1);
        assert_eq!(table.team_rows("Alpha FC", PositionGroup::CF).unwrap().height(), 1);
        assert_eq!(table.team_rows("alpha fc", PositionGroup::CF).unwrap().height(), 0);
    }

    #[test]
    fn unmapped_codes_join_the_fallback_group() {
        let rows = vec![
            PlayerRow::new(1, "CF", "Alpha FC"),
            PlayerRow::new(2, "SS", "Alpha FC"),
            PlayerRow::new(3, "", "Alpha FC"),
            PlayerRow::new(4, "LW", "Alpha FC"),
        ];
        let (_dir, store) = store_with(&rows);
        let table = store.load("2024-25").unwrap();

        let cf = table.position_rows(PositionGroup::CF, None).unwrap();
        assert_eq!(id_values(&cf).unwrap(), vec![Some(1), Some(2), Some(3)]);
        assert_eq!(table.position_rows(PositionGroup::W, None).unwrap().height(), 1);
        assert_eq!(table.group_player_rows(PositionGroup::CF, 2).unwrap().height(), 1);
    }

    #[test]
    fn player_record_maps_position() {
        let (_dir, store) = store_with(&[PlayerRow::new(7, "LWF", "Gamma FC").minutes(900.0)]);
        let record = store.player_record(7, "2024-25").unwrap();
        assert_eq!(record.group, PositionGroup::W);
        assert_eq!(record.team, "Gamma FC");
        assert_eq!(record.minutes_played, Some(900.0));
        assert!(matches!(
            store.player_record(8, "2024-25").unwrap_err(),
            EfficiencyError::PlayerNotFound { .. }
        ));
    }

    #[test]
    fn memory_source_serves_registered_frames() {
        let dir = tempfile::tempdir().unwrap();
        write_season(dir.path(), "2023-24", &[PlayerRow::new(3, "GK", "Delta FC")]);
        let frame = CsvDirectorySource::new(dir.path(), "processed_")
            .read("2023-24")
            .unwrap();

        let source = MemorySource::new();
        source.insert("2023-24", frame);
        let store = SeasonDataStore::new(source);
        assert_eq!(store.available_seasons().unwrap(), vec!["2023-24"]);
        assert_eq!(store.load("2023-24").unwrap().height(), 1);
        assert!(matches!(
            store.load("2024-25").unwrap_err(),
            EfficiencyError::DataNotFound { .. }
        ));
    }
}
