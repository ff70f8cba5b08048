//! CSV fixtures for tests. Std-only so integration tests can include it too.

use std::collections::BTreeMap;
use std::path::Path;

/// One row of a synthetic season export.
#[derive(Debug, Clone)]
pub struct PlayerRow {
    pub id: i64,
    pub name: String,
    pub team: String,
    pub position: String,
    pub values: BTreeMap<&'static str, f64>,
}

const BASE_COLUMNS: [&str; 5] = [
    "Wyscout id",
    "Full name",
    "Team",
    "Primary position",
    "Matches played",
];

impl PlayerRow {
    /// A regular starter: 20 matches, 1500 minutes, middling numbers.
    pub fn new(id: i64, position: &str, team: &str) -> Self {
        let mut values = BTreeMap::new();
        values.insert("Matches played", 20.0);
        values.insert("Minutes played", 1500.0);
        values.insert("Goals per 90", 0.2);
        values.insert("Assists per 90", 0.1);
        values.insert("Accurate passes, %", 75.0);
        values.insert("Duels won, %", 50.0);
        values.insert("Shots per 90", 1.5);
        values.insert("Interceptions per 90", 1.0);
        values.insert("Sliding tackles per 90", 0.5);
        values.insert("Aerial duels per 90", 2.0);
        values.insert("Aerial duels won, %", 45.0);
        Self {
            id,
            name: format!("Player {id}"),
            team: team.to_string(),
            position: position.to_string(),
            values,
        }
    }

    pub fn set(mut self, column: &'static str, value: f64) -> Self {
        self.values.insert(column, value);
        self
    }

    pub fn clear(mut self, column: &'static str) -> Self {
        self.values.remove(column);
        self
    }

    pub fn matches(self, value: f64) -> Self {
        self.set("Matches played", value)
    }

    pub fn minutes(self, value: f64) -> Self {
        self.set("Minutes played", value)
    }

    pub fn goals(self, value: f64) -> Self {
        self.set("Goals per 90", value)
    }

    pub fn assists(self, value: f64) -> Self {
        self.set("Assists per 90", value)
    }

    pub fn shots(self, value: f64) -> Self {
        self.set("Shots per 90", value)
    }
}

/// Write `processed_<season>.csv` under `dir`. Cells absent from a row are
/// left empty.
pub fn write_season(dir: &Path, season: &str, rows: &[PlayerRow]) {
    let mut value_columns: Vec<&'static str> = rows
        .iter()
        .flat_map(|r| r.values.keys().copied())
        .filter(|c| *c != "Matches played")
        .collect();
    value_columns.sort_unstable();
    value_columns.dedup();

    let header: Vec<String> = BASE_COLUMNS
        .iter()
        .chain(value_columns.iter())
        .map(|c| format!("\"{c}\""))
        .collect();

    let mut out = header.join(",");
    out.push('\n');
    for row in rows {
        let mut cells = vec![
            row.id.to_string(),
            format!("\"{}\"", row.name),
            format!("\"{}\"", row.team),
            row.position.clone(),
            cell(row, "Matches played"),
        ];
        cells.extend(value_columns.iter().map(|c| cell(row, c)));
        out.push_str(&cells.join(","));
        out.push('\n');
    }

    std::fs::write(dir.join(format!("processed_{season}.csv")), out)
        .unwrap_or_else(|e| panic!("cannot write fixture for {season}: {e}"));
}

fn cell(row: &PlayerRow, column: &str) -> String {
    row.values
        .get(column)
        .map(|v| v.to_string())
        .unwrap_or_default()
}

/// `count` players of one raw position on rotating teams, with goals and
/// shots spread so the population has real variance.
pub fn spread_population(first_id: i64, count: usize, position: &str) -> Vec<PlayerRow> {
    (0..count)
        .map(|i| {
            let step = i as f64;
            PlayerRow::new(first_id + i as i64, position, &format!("Team {}", i % 6))
                .goals(0.05 + step * 0.02)
                .assists(0.02 + (i % 7) as f64 * 0.04)
                .shots(0.5 + (i % 11) as f64 * 0.3)
                .minutes(600.0 + (i % 13) as f64 * 150.0)
                .set("Accurate passes, %", 65.0 + (i % 9) as f64 * 3.0)
                .set("Duels won, %", 40.0 + (i % 5) as f64 * 5.0)
                .set("Interceptions per 90", 0.3 + (i % 4) as f64 * 0.5)
        })
        .collect()
}
