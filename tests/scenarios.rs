#[allow(dead_code)]
#[path = "../src/testing.rs"]
mod testing;

use position_efficiency::{EfficiencyError, EngineConfig, PositionEfficiency, PositionGroup};
use tempfile::TempDir;
use testing::{spread_population, write_season, PlayerRow};

const SEASON: &str = "2023-24";

fn engine_with(rows: &[PlayerRow]) -> (TempDir, PositionEfficiency) {
    let dir = tempfile::tempdir().unwrap();
    write_season(dir.path(), SEASON, rows);
    let engine = PositionEfficiency::new(EngineConfig::with_base_path(dir.path()));
    (dir, engine)
}

fn seasons() -> Vec<String> {
    vec![SEASON.to_string()]
}

/// 120 strikers whose goals per 90 run 0, 1, ..., 119.
fn graded_strikers() -> Vec<PlayerRow> {
    (0..120)
        .map(|i| PlayerRow::new(1000 + i, "CF", &format!("Team {}", i % 8)).goals(i as f64))
        .collect()
}

#[test]
fn team_without_group_players_gets_league_average() {
    let mut rows = spread_population(1, 30, "CF");
    rows.push(PlayerRow::new(500, "GK", "Keepers FC"));
    let (_dir, engine) = engine_with(&rows);

    let team = engine
        .team_average("Keepers FC", PositionGroup::CF, &seasons(), None)
        .unwrap();
    let league = engine
        .league_average(PositionGroup::CF, &seasons(), None, None)
        .unwrap();

    assert_eq!(team, league);
    assert_eq!(team.players_analyzed, 30);
}

#[test]
fn repeated_queries_are_identical() {
    let (_dir, engine) = engine_with(&spread_population(1, 40, "LCMF"));
    let keys = ["goals_per_90", "pass_accuracy_pct"];

    let first = engine
        .league_average(PositionGroup::CMF, &seasons(), Some(5), Some(&keys))
        .unwrap();
    let second = engine
        .league_average(PositionGroup::CMF, &seasons(), Some(5), Some(&keys))
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(first.metrics.len(), 2);
}

#[test]
fn top_quartile_keeps_a_quarter_of_the_sample() {
    let (_dir, engine) = engine_with(&graded_strikers());

    let result = engine
        .top_quartile_average(PositionGroup::CF, &seasons(), Some(&["goals_per_90"]))
        .unwrap();
    let goals = &result.metrics["goals_per_90"];
    let detail = goals.top_quartile.as_ref().unwrap();

    assert_eq!(detail.total_sample_size, 120);
    assert_eq!(detail.top25_sample_size, 30);
    assert!((detail.p75_threshold - 89.25).abs() < 1e-9);
    assert!((goals.value - 104.5).abs() < 1e-9);
}

#[test]
fn striker_between_p75_and_p90_ranks_between_them() {
    let (_dir, engine) = engine_with(&graded_strikers());

    let dist = engine
        .distribution(PositionGroup::CF, &seasons(), "goals_per_90", Some(95.5), None)
        .unwrap()
        .unwrap();

    assert_eq!(dist.sample_size, 120);
    assert!(dist.p75 < 95.5 && 95.5 < dist.p90);
    let pct = dist.player_percentile.unwrap();
    assert!(pct > 75.0 && pct < 90.0, "percentile {pct}");
}

#[test]
fn exact_percentile_is_monotonic_in_value() {
    let (_dir, engine) = engine_with(&graded_strikers());
    let distribution: Vec<f64> = (0..50).map(|i| (i * 3 % 17) as f64).collect();

    let ranks: Vec<f64> = (-2..20)
        .map(|v| engine.exact_percentile(v as f64, &distribution))
        .collect();

    assert!(ranks.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn clustering_is_deterministic_across_engines() {
    let rows = spread_population(1, 36, "LW");
    let (_a, first) = engine_with(&rows);
    let (_b, second) = engine_with(&rows);

    let left = first.position_benchmarks(PositionGroup::W, SEASON, None).unwrap();
    let right = second.position_benchmarks(PositionGroup::W, SEASON, None).unwrap();

    assert_eq!(left.iep_scores(), right.iep_scores());
    assert_eq!(left.cluster_distribution, right.cluster_distribution);
}

#[test]
fn low_match_player_is_clustered_only_when_requested() {
    let mut rows = spread_population(1, 30, "CF");
    rows.push(
        PlayerRow::new(999, "CF", "Team 0")
            .matches(2.0)
            .minutes(180.0)
            .goals(1.1),
    );
    let (_dir, engine) = engine_with(&rows);
    let before = engine
        .league_average(PositionGroup::CF, &seasons(), None, None)
        .unwrap();

    let regular = engine.position_benchmarks(PositionGroup::CF, SEASON, None).unwrap();
    let forced = engine
        .position_benchmarks(PositionGroup::CF, SEASON, Some(999))
        .unwrap();
    assert_eq!(forced.players.len(), regular.players.len() + 1);
    assert!(regular.player(999).is_none());
    assert!(forced.player(999).is_some());

    let tier = engine.player_tier(999, SEASON).unwrap();
    assert_eq!(tier.position, PositionGroup::CF);
    assert_eq!(tier.population_size, forced.players.len());

    let after = engine
        .league_average(PositionGroup::CF, &seasons(), None, None)
        .unwrap();
    assert_eq!(before, after);
}

#[test]
fn unmapped_position_code_is_treated_as_striker() {
    let mut rows = spread_population(1, 20, "CF");
    rows.push(PlayerRow::new(900, "SS", "Team 2").minutes(2500.0).goals(0.6));
    let (_dir, engine) = engine_with(&rows);

    let tier = engine.player_tier(900, SEASON).unwrap();
    assert_eq!(tier.position, PositionGroup::CF);
    assert_eq!(tier.population_size, 21);

    let league = engine
        .league_average(PositionGroup::CF, &seasons(), None, None)
        .unwrap();
    assert_eq!(league.players_analyzed, 21);
}

#[test]
fn seven_players_are_too_few_to_cluster() {
    let (_dir, engine) = engine_with(&spread_population(1, 7, "RCB"));

    let err = engine
        .position_benchmarks(PositionGroup::CB, SEASON, None)
        .unwrap_err();

    assert!(matches!(
        err,
        EfficiencyError::InsufficientData { player_count: 7, .. }
    ));
}

#[test]
fn engine_reads_settings_from_toml() {
    let dir = tempfile::tempdir().unwrap();
    write_season(dir.path(), SEASON, &spread_population(1, 12, "GK"));
    let config_path = dir.path().join("engine.toml");
    std::fs::write(
        &config_path,
        format!(
            "[data]\nbase_path = {:?}\n\n[aggregation]\nmin_matches = 25\n",
            dir.path().display().to_string()
        ),
    )
    .unwrap();

    let config = EngineConfig::load_from_file(&config_path).unwrap();
    assert_eq!(config.aggregation.min_matches, 25);
    assert_eq!(config.clustering.min_population, 10);

    let engine = PositionEfficiency::new(config);
    assert_eq!(engine.available_seasons().unwrap(), vec![SEASON.to_string()]);
    // Every fixture player has 20 matches, under the configured floor.
    let result = engine
        .league_average(PositionGroup::GK, &seasons(), None, None)
        .unwrap();
    assert!(result.is_empty());
}
