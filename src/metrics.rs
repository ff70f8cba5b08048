//! Metric catalog: metric keys, their raw export columns, and the per-group
//! primary/secondary sets with display names and "good" ranges.

use serde::Serialize;

use crate::position::PositionGroup;
use crate::schema::metrics as col;

/// Metric key → raw export column. Keys are the stable API names.
pub const METRIC_COLUMNS: [(&str, &str); 38] = [
    ("goals_per_90", col::GOALS_PER_90),
    ("assists_per_90", col::ASSISTS_PER_90),
    ("pass_accuracy_pct", col::ACCURATE_PASSES_PCT),
    ("shots_per_90", col::SHOTS_PER_90),
    ("shots_on_target_pct", col::SHOTS_ON_TARGET_PCT),
    ("goal_conversion_pct", col::GOAL_CONVERSION_PCT),
    ("duels_won_pct", col::DUELS_WON_PCT),
    ("defensive_actions_per_90", col::DEFENSIVE_ACTIONS_PER_90),
    ("defensive_duels_won_pct", col::DEFENSIVE_DUELS_WON_PCT),
    ("aerial_duels_won_pct", col::AERIAL_DUELS_WON_PCT),
    ("interceptions_per_90", col::INTERCEPTIONS_PER_90),
    ("tackles_per_90", col::SLIDING_TACKLES_PER_90),
    ("sliding_tackles_per_90", col::SLIDING_TACKLES_PER_90),
    ("fouls_per_90", col::FOULS_PER_90),
    ("progressive_passes_per_90", col::PROGRESSIVE_PASSES_PER_90),
    ("key_passes_per_90", col::KEY_PASSES_PER_90),
    ("ball_recoveries_per_90", col::DEFENSIVE_ACTIONS_PER_90),
    ("dribbles_success_pct", col::SUCCESSFUL_DRIBBLES_PCT),
    ("crosses_per_90", col::CROSSES_PER_90),
    ("cross_accuracy_pct", col::ACCURATE_CROSSES_PCT),
    ("touches_in_box_per_90", col::TOUCHES_IN_BOX_PER_90),
    ("shot_assists_per_90", col::SHOT_ASSISTS_PER_90),
    ("passes_per_90", col::PASSES_PER_90),
    ("accurate_passes_per_90", col::ACCURATE_PASSES_PER_90),
    ("long_passes_per_90", col::LONG_PASSES_PER_90),
    ("accurate_long_passes_per_90", col::ACCURATE_LONG_PASSES_PER_90),
    ("long_passes_accuracy_pct", col::ACCURATE_LONG_PASSES_PCT),
    ("forward_passes_per_90", col::FORWARD_PASSES_PER_90),
    ("passes_to_final_third_per_90", col::PASSES_TO_FINAL_THIRD_PER_90),
    ("passes_to_penalty_area_per_90", col::PASSES_TO_PENALTY_AREA_PER_90),
    ("received_passes_per_90", col::RECEIVED_PASSES_PER_90),
    ("dribbles_per_90", col::DRIBBLES_PER_90),
    ("successful_dribbles_per_90", col::SUCCESSFUL_DRIBBLES_PER_90),
    ("offensive_duels_per_90", col::OFFENSIVE_DUELS_PER_90),
    ("touches_per_90", col::TOUCHES_PER_90),
    ("save_percentage", col::SAVE_RATE_PCT),
    ("goals_conceded_per_90", col::CONCEDED_GOALS_PER_90),
    ("clean_sheets", col::CLEAN_SHEETS),
];

/// Raw export column behind a metric key.
pub fn raw_column(metric_key: &str) -> Option<&'static str> {
    METRIC_COLUMNS
        .iter()
        .find(|(key, _)| *key == metric_key)
        .map(|(_, column)| *column)
}

/// Every metric key with a raw column, in catalog order.
pub fn metric_keys() -> impl Iterator<Item = &'static str> {
    METRIC_COLUMNS.iter().map(|(key, _)| *key)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricDefinition {
    pub key: &'static str,
    pub display_name: String,
    pub raw_column: Option<&'static str>,
    pub good_range: Option<(f64, f64)>,
}

impl MetricDefinition {
    /// Where `value` sits inside the good range, 0-100 and clamped.
    pub fn good_range_position(&self, value: f64) -> Option<f64> {
        let (low, high) = self.good_range?;
        if high <= low {
            return None;
        }
        Some(((value - low) / (high - low) * 100.0).clamp(0.0, 100.0))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PositionMetrics {
    pub group: PositionGroup,
    pub primary: Vec<MetricDefinition>,
    pub secondary: Vec<MetricDefinition>,
}

impl PositionMetrics {
    pub fn get(&self, metric_key: &str) -> Option<&MetricDefinition> {
        self.primary
            .iter()
            .chain(self.secondary.iter())
            .find(|m| m.key == metric_key)
    }
}

struct GroupTable {
    primary: &'static [&'static str],
    secondary: &'static [&'static str],
    display_names: &'static [(&'static str, &'static str)],
    good_ranges: &'static [(&'static str, f64, f64)],
}

/// Metric definitions for a group.
pub fn metrics_for(group: PositionGroup) -> PositionMetrics {
    let table = group_table(group);
    let define = |key: &'static str| MetricDefinition {
        key,
        display_name: display_name(group, key),
        raw_column: raw_column(key),
        good_range: table
            .good_ranges
            .iter()
            .find(|(k, _, _)| *k == key)
            .map(|(_, low, high)| (*low, *high)),
    };

    PositionMetrics {
        group,
        primary: table.primary.iter().map(|k| define(k)).collect(),
        secondary: table.secondary.iter().map(|k| define(k)).collect(),
    }
}

/// Group-specific display name, or the key in title case.
pub fn display_name(group: PositionGroup, metric_key: &str) -> String {
    group_table(group)
        .display_names
        .iter()
        .find(|(k, _)| *k == metric_key)
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| title_case(metric_key))
}

fn title_case(key: &str) -> String {
    key.split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn group_table(group: PositionGroup) -> &'static GroupTable {
    match group {
        PositionGroup::GK => &GK,
        PositionGroup::CB => &CB,
        PositionGroup::FB => &FB,
        PositionGroup::DMF => &DMF,
        PositionGroup::CMF => &CMF,
        PositionGroup::AMF => &AMF,
        PositionGroup::W => &W,
        PositionGroup::CF => &CF,
    }
}

// ── Group tables ────────────────────────────────────────────────────────────

static GK: GroupTable = GroupTable {
    primary: &[
        "defensive_actions_per_90",
        "aerial_duels_won_pct",
        "pass_accuracy_pct",
        "progressive_passes_per_90",
        "long_passes_accuracy_pct",
        "fouls_per_90",
    ],
    secondary: &[
        "save_percentage",
        "goals_conceded_per_90",
        "crosses_per_90",
        "key_passes_per_90",
        "assists_per_90",
        "goals_per_90",
        "shots_on_target_pct",
        "dribbles_success_pct",
    ],
    display_names: &[
        ("defensive_actions_per_90", "Saves & Stops/90"),
        ("aerial_duels_won_pct", "Aerial Command %"),
        ("pass_accuracy_pct", "Distribution %"),
        ("progressive_passes_per_90", "Progressive Passes/90"),
        ("long_passes_accuracy_pct", "Long Pass Accuracy %"),
        ("fouls_per_90", "Fouls Conceded/90"),
        ("save_percentage", "Save Rate %"),
        ("goals_conceded_per_90", "Goals Conceded/90"),
        ("crosses_per_90", "Long Passes/90"),
        ("key_passes_per_90", "Key Passes/90"),
        ("assists_per_90", "Assists/90"),
        ("goals_per_90", "Goals/90"),
        ("shots_on_target_pct", "Shots on Target %"),
        ("dribbles_success_pct", "Dribbles %"),
    ],
    good_ranges: &[
        ("save_percentage", 70.0, 100.0),
        ("goals_conceded_per_90", 0.0, 1.0),
        ("pass_accuracy_pct", 60.0, 100.0),
        ("aerial_duels_won_pct", 50.0, 100.0),
        ("clean_sheets", 8.0, 20.0),
        ("defensive_actions_per_90", 5.0, 15.0),
        ("progressive_passes_per_90", 3.0, 12.0),
        ("crosses_per_90", 5.0, 15.0),
        ("key_passes_per_90", 0.1, 2.0),
        ("assists_per_90", 0.0, 0.3),
        ("goals_per_90", 0.0, 0.1),
        ("shots_on_target_pct", 30.0, 80.0),
        ("dribbles_success_pct", 40.0, 80.0),
    ],
};

static CB: GroupTable = GroupTable {
    primary: &[
        "aerial_duels_won_pct",
        "defensive_duels_won_pct",
        "interceptions_per_90",
        "sliding_tackles_per_90",
        "pass_accuracy_pct",
        "progressive_passes_per_90",
    ],
    secondary: &[
        "defensive_actions_per_90",
        "tackles_per_90",
        "ball_recoveries_per_90",
        "key_passes_per_90",
        "assists_per_90",
        "goals_per_90",
        "crosses_per_90",
        "dribbles_success_pct",
    ],
    display_names: &[
        ("aerial_duels_won_pct", "Aerial Dominance %"),
        ("defensive_duels_won_pct", "Defensive Duels %"),
        ("interceptions_per_90", "Interceptions/90"),
        ("sliding_tackles_per_90", "Tackles/90"),
        ("pass_accuracy_pct", "Pass Accuracy %"),
        ("progressive_passes_per_90", "Progressive Passes/90"),
        ("defensive_actions_per_90", "Defensive Actions/90"),
        ("tackles_per_90", "Tackles/90"),
        ("ball_recoveries_per_90", "Ball Recoveries/90"),
        ("key_passes_per_90", "Key Passes/90"),
        ("assists_per_90", "Assists/90"),
        ("goals_per_90", "Goals/90"),
        ("crosses_per_90", "Long Balls/90"),
        ("dribbles_success_pct", "Dribbles %"),
    ],
    good_ranges: &[
        ("aerial_duels_won_pct", 55.0, 100.0),
        ("interceptions_per_90", 1.5, 6.0),
        ("defensive_duels_won_pct", 60.0, 100.0),
        ("pass_accuracy_pct", 80.0, 100.0),
        ("progressive_passes_per_90", 3.0, 10.0),
        ("defensive_actions_per_90", 8.0, 20.0),
        ("tackles_per_90", 1.0, 4.0),
        ("ball_recoveries_per_90", 5.0, 15.0),
        ("key_passes_per_90", 0.1, 1.5),
        ("assists_per_90", 0.0, 0.2),
        ("goals_per_90", 0.0, 0.3),
        ("crosses_per_90", 2.0, 8.0),
        ("dribbles_success_pct", 50.0, 85.0),
    ],
};

static FB: GroupTable = GroupTable {
    primary: &[
        "long_passes_per_90",
        "assists_per_90",
        "defensive_duels_won_pct",
        "dribbles_success_pct",
        "key_passes_per_90",
        "sliding_tackles_per_90",
    ],
    secondary: &[
        "cross_accuracy_pct",
        "tackles_per_90",
        "pass_accuracy_pct",
        "goals_per_90",
        "progressive_passes_per_90",
        "aerial_duels_won_pct",
        "interceptions_per_90",
        "ball_recoveries_per_90",
    ],
    display_names: &[
        ("long_passes_per_90", "Crosses & Long Balls/90"),
        ("assists_per_90", "Assists/90"),
        ("defensive_duels_won_pct", "Defensive Duels %"),
        ("dribbles_success_pct", "Dribbles Success %"),
        ("key_passes_per_90", "Key Passes/90"),
        ("sliding_tackles_per_90", "Tackles/90"),
        ("pass_accuracy_pct", "Pass Accuracy %"),
        ("cross_accuracy_pct", "Cross Accuracy %"),
        ("tackles_per_90", "Tackles/90"),
        ("goals_per_90", "Goals/90"),
        ("progressive_passes_per_90", "Progressive Passes/90"),
        ("aerial_duels_won_pct", "Aerial Duels %"),
        ("interceptions_per_90", "Interceptions/90"),
        ("ball_recoveries_per_90", "Ball Recoveries/90"),
    ],
    good_ranges: &[
        ("crosses_per_90", 2.0, 8.0),
        ("assists_per_90", 0.1, 0.6),
        ("defensive_duels_won_pct", 50.0, 80.0),
        ("progressive_passes_per_90", 4.0, 12.0),
        ("pass_accuracy_pct", 75.0, 95.0),
        ("cross_accuracy_pct", 25.0, 50.0),
        ("tackles_per_90", 1.5, 4.0),
        ("key_passes_per_90", 0.3, 2.0),
        ("goals_per_90", 0.0, 0.3),
        ("dribbles_success_pct", 55.0, 85.0),
        ("aerial_duels_won_pct", 40.0, 75.0),
        ("interceptions_per_90", 1.0, 4.0),
        ("ball_recoveries_per_90", 4.0, 10.0),
    ],
};

static DMF: GroupTable = GroupTable {
    primary: &[
        "defensive_actions_per_90",
        "interceptions_per_90",
        "sliding_tackles_per_90",
        "pass_accuracy_pct",
        "progressive_passes_per_90",
        "defensive_duels_won_pct",
    ],
    secondary: &[
        "tackles_per_90",
        "key_passes_per_90",
        "assists_per_90",
        "goals_per_90",
        "aerial_duels_won_pct",
        "dribbles_success_pct",
        "crosses_per_90",
        "shots_on_target_pct",
    ],
    display_names: &[
        ("defensive_actions_per_90", "Defensive Actions/90"),
        ("interceptions_per_90", "Interceptions/90"),
        ("sliding_tackles_per_90", "Tackles/90"),
        ("pass_accuracy_pct", "Pass Accuracy %"),
        ("progressive_passes_per_90", "Progressive Passes/90"),
        ("defensive_duels_won_pct", "Defensive Duels %"),
        ("tackles_per_90", "Tackles/90"),
        ("key_passes_per_90", "Key Passes/90"),
        ("assists_per_90", "Assists/90"),
        ("goals_per_90", "Goals/90"),
        ("aerial_duels_won_pct", "Aerial Duels %"),
        ("dribbles_success_pct", "Dribbles %"),
        ("crosses_per_90", "Long Passes/90"),
        ("shots_on_target_pct", "Shots on Target %"),
    ],
    good_ranges: &[
        ("pass_accuracy_pct", 85.0, 100.0),
        ("ball_recoveries_per_90", 5.0, 12.0),
        ("interceptions_per_90", 1.0, 4.0),
        ("progressive_passes_per_90", 8.0, 20.0),
        ("defensive_duels_won_pct", 55.0, 85.0),
        ("tackles_per_90", 2.0, 5.0),
        ("key_passes_per_90", 0.5, 3.0),
        ("assists_per_90", 0.0, 0.4),
        ("goals_per_90", 0.0, 0.3),
        ("aerial_duels_won_pct", 45.0, 80.0),
        ("dribbles_success_pct", 60.0, 90.0),
        ("crosses_per_90", 3.0, 10.0),
        ("shots_on_target_pct", 30.0, 70.0),
    ],
};

static CMF: GroupTable = GroupTable {
    primary: &[
        "pass_accuracy_pct",
        "key_passes_per_90",
        "progressive_passes_per_90",
        "assists_per_90",
        "dribbles_success_pct",
        "goals_per_90",
    ],
    secondary: &[
        "ball_recoveries_per_90",
        "tackles_per_90",
        "interceptions_per_90",
        "crosses_per_90",
        "aerial_duels_won_pct",
        "defensive_duels_won_pct",
        "shots_on_target_pct",
        "shot_assists_per_90",
    ],
    display_names: &[
        ("pass_accuracy_pct", "Pass Accuracy %"),
        ("key_passes_per_90", "Key Passes/90"),
        ("progressive_passes_per_90", "Progressive Passes/90"),
        ("assists_per_90", "Assists/90"),
        ("dribbles_success_pct", "Dribbles %"),
        ("goals_per_90", "Goals/90"),
        ("ball_recoveries_per_90", "Ball Recoveries/90"),
        ("tackles_per_90", "Tackles/90"),
        ("interceptions_per_90", "Interceptions/90"),
        ("crosses_per_90", "Long Passes/90"),
        ("aerial_duels_won_pct", "Aerial Duels %"),
        ("defensive_duels_won_pct", "Defensive Duels %"),
        ("shots_on_target_pct", "Shots on Target %"),
    ],
    good_ranges: &[
        ("pass_accuracy_pct", 80.0, 100.0),
        ("key_passes_per_90", 1.0, 4.0),
        ("progressive_passes_per_90", 5.0, 15.0),
        ("assists_per_90", 0.1, 0.8),
        ("dribbles_success_pct", 60.0, 90.0),
        ("goals_per_90", 0.1, 0.5),
        ("ball_recoveries_per_90", 3.0, 8.0),
        ("tackles_per_90", 1.0, 3.5),
        ("interceptions_per_90", 0.5, 3.0),
        ("crosses_per_90", 2.0, 8.0),
        ("aerial_duels_won_pct", 40.0, 75.0),
        ("defensive_duels_won_pct", 50.0, 80.0),
        ("shots_on_target_pct", 35.0, 70.0),
    ],
};

static AMF: GroupTable = GroupTable {
    primary: &[
        "key_passes_per_90",
        "assists_per_90",
        "goals_per_90",
        "dribbles_success_pct",
        "shots_on_target_pct",
        "touches_in_box_per_90",
    ],
    secondary: &[
        "shot_assists_per_90",
        "progressive_passes_per_90",
        "pass_accuracy_pct",
        "crosses_per_90",
        "ball_recoveries_per_90",
        "tackles_per_90",
        "aerial_duels_won_pct",
        "shots_per_90",
    ],
    display_names: &[
        ("key_passes_per_90", "Key Passes/90"),
        ("assists_per_90", "Assists/90"),
        ("goals_per_90", "Goals/90"),
        ("dribbles_success_pct", "Dribbles %"),
        ("progressive_passes_per_90", "Progressive Passes/90"),
        ("shot_assists_per_90", "Shot Assists/90"),
        ("shots_on_target_pct", "Shots on Target %"),
        ("pass_accuracy_pct", "Pass Accuracy %"),
        ("crosses_per_90", "Through Balls/90"),
        ("ball_recoveries_per_90", "Ball Recoveries/90"),
        ("tackles_per_90", "Tackles/90"),
        ("aerial_duels_won_pct", "Aerial Duels %"),
        ("touches_in_box_per_90", "Box Touches/90"),
    ],
    good_ranges: &[
        ("key_passes_per_90", 1.5, 5.0),
        ("assists_per_90", 0.2, 1.0),
        ("goals_per_90", 0.2, 0.8),
        ("dribbles_success_pct", 60.0, 90.0),
        ("progressive_passes_per_90", 4.0, 12.0),
        ("shot_assists_per_90", 1.0, 4.0),
        ("shots_on_target_pct", 40.0, 75.0),
        ("pass_accuracy_pct", 75.0, 95.0),
        ("crosses_per_90", 1.0, 5.0),
        ("ball_recoveries_per_90", 2.0, 6.0),
        ("tackles_per_90", 0.5, 2.5),
        ("aerial_duels_won_pct", 35.0, 70.0),
        ("touches_in_box_per_90", 2.0, 6.0),
    ],
};

static W: GroupTable = GroupTable {
    primary: &[
        "goals_per_90",
        "assists_per_90",
        "dribbles_success_pct",
        "long_passes_per_90",
        "shots_on_target_pct",
        "touches_in_box_per_90",
    ],
    secondary: &[
        "key_passes_per_90",
        "progressive_passes_per_90",
        "pass_accuracy_pct",
        "crosses_per_90",
        "shot_assists_per_90",
        "ball_recoveries_per_90",
        "tackles_per_90",
        "aerial_duels_won_pct",
    ],
    display_names: &[
        ("goals_per_90", "Goals/90"),
        ("assists_per_90", "Assists/90"),
        ("dribbles_success_pct", "Dribbles Success %"),
        ("long_passes_per_90", "Crosses & Wide Passes/90"),
        ("shots_on_target_pct", "Shots on Target %"),
        ("touches_in_box_per_90", "Box Touches/90"),
        ("key_passes_per_90", "Key Passes/90"),
        ("progressive_passes_per_90", "Progressive Passes/90"),
        ("pass_accuracy_pct", "Pass Accuracy %"),
        ("crosses_per_90", "Crosses/90"),
        ("shot_assists_per_90", "Shot Assists/90"),
        ("ball_recoveries_per_90", "Ball Recoveries/90"),
        ("tackles_per_90", "Tackles/90"),
        ("aerial_duels_won_pct", "Aerial Duels %"),
    ],
    good_ranges: &[
        ("goals_per_90", 0.2, 1.0),
        ("assists_per_90", 0.1, 0.8),
        ("dribbles_success_pct", 60.0, 90.0),
        ("key_passes_per_90", 0.8, 3.5),
        ("crosses_per_90", 2.0, 6.0),
        ("shots_on_target_pct", 30.0, 60.0),
        ("progressive_passes_per_90", 3.0, 9.0),
        ("pass_accuracy_pct", 70.0, 90.0),
        ("touches_in_box_per_90", 2.0, 7.0),
        ("shot_assists_per_90", 0.5, 3.0),
        ("ball_recoveries_per_90", 2.0, 6.0),
        ("tackles_per_90", 0.5, 2.5),
        ("aerial_duels_won_pct", 30.0, 65.0),
    ],
};

static CF: GroupTable = GroupTable {
    primary: &[
        "goals_per_90",
        "shots_on_target_pct",
        "aerial_duels_won_pct",
        "touches_in_box_per_90",
        "goal_conversion_pct",
        "assists_per_90",
    ],
    secondary: &[
        "key_passes_per_90",
        "dribbles_success_pct",
        "progressive_passes_per_90",
        "pass_accuracy_pct",
        "shot_assists_per_90",
        "crosses_per_90",
        "ball_recoveries_per_90",
        "tackles_per_90",
    ],
    display_names: &[
        ("goals_per_90", "Goals/90"),
        ("shots_on_target_pct", "Shots on Target %"),
        ("aerial_duels_won_pct", "Aerial Duels %"),
        ("touches_in_box_per_90", "Box Touches/90"),
        ("goal_conversion_pct", "Goal Conversion %"),
        ("assists_per_90", "Assists/90"),
        ("key_passes_per_90", "Key Passes/90"),
        ("dribbles_success_pct", "Dribbles %"),
        ("progressive_passes_per_90", "Progressive Passes/90"),
        ("pass_accuracy_pct", "Pass Accuracy %"),
        ("shot_assists_per_90", "Shot Assists/90"),
        ("crosses_per_90", "Hold-up Play/90"),
        ("ball_recoveries_per_90", "Ball Recoveries/90"),
        ("tackles_per_90", "Pressing/90"),
    ],
    good_ranges: &[
        ("goals_per_90", 0.4, 1.5),
        ("shots_on_target_pct", 40.0, 70.0),
        ("touches_in_box_per_90", 3.0, 8.0),
        ("aerial_duels_won_pct", 45.0, 80.0),
        ("goal_conversion_pct", 10.0, 30.0),
        ("assists_per_90", 0.1, 0.5),
        ("key_passes_per_90", 0.5, 2.5),
        ("dribbles_success_pct", 55.0, 85.0),
        ("progressive_passes_per_90", 2.0, 7.0),
        ("pass_accuracy_pct", 65.0, 85.0),
        ("shot_assists_per_90", 0.3, 2.0),
        ("crosses_per_90", 1.0, 4.0),
        ("ball_recoveries_per_90", 1.5, 5.0),
        ("tackles_per_90", 0.5, 2.0),
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_group_has_a_primary_metric_with_a_raw_column() {
        for group in PositionGroup::ALL {
            let metrics = metrics_for(group);
            assert!(
                metrics.primary.iter().any(|m| m.raw_column.is_some()),
                "{group} has no loadable primary metric"
            );
        }
    }

    #[test]
    fn every_group_metric_is_in_the_catalog() {
        for group in PositionGroup::ALL {
            let metrics = metrics_for(group);
            for m in metrics.primary.iter().chain(metrics.secondary.iter()) {
                assert!(m.raw_column.is_some(), "{group}: {} has no column", m.key);
            }
        }
    }

    #[test]
    fn catalog_keys_are_unique() {
        let mut keys: Vec<_> = metric_keys().collect();
        let total = keys.len();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), total);
    }

    #[test]
    fn same_key_can_differ_between_groups() {
        let cb = metrics_for(PositionGroup::CB);
        let cf = metrics_for(PositionGroup::CF);
        let cb_pass = cb.get("pass_accuracy_pct").unwrap();
        let cf_pass = cf.get("pass_accuracy_pct").unwrap();
        assert_eq!(cb_pass.raw_column, cf_pass.raw_column);
        assert_ne!(cb_pass.good_range, cf_pass.good_range);
    }

    #[test]
    fn display_name_falls_back_to_title_case() {
        assert_eq!(display_name(PositionGroup::GK, "touches_per_90"), "Touches Per 90");
        assert_eq!(display_name(PositionGroup::CF, "goals_per_90"), "Goals/90");
    }

    #[test]
    fn good_range_position_is_clamped() {
        let cf = metrics_for(PositionGroup::CF);
        let goals = cf.get("goals_per_90").unwrap();
        assert_eq!(goals.good_range_position(0.0), Some(0.0));
        assert_eq!(goals.good_range_position(3.0), Some(100.0));
        let mid = goals.good_range_position(0.95).unwrap();
        assert!((mid - 50.0).abs() < 1e-9);
    }
}
