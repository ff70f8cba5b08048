/// Column-name constants for the season statistical export.
/// Single source of truth - exported to Python via PyO3.

// ── Identity columns ────────────────────────────────────────────────────────
pub mod identity {
    pub const PLAYER_ID: &str = "Wyscout id";
    pub const FULL_NAME: &str = "Full name";
    pub const PLAYER: &str = "Player";
    pub const TEAM: &str = "Team";
    pub const PRIMARY_POSITION: &str = "Primary position";

    /// Columns every season export must carry.
    pub const REQUIRED: [&str; 3] = [PLAYER_ID, TEAM, PRIMARY_POSITION];
}

// ── Playing time columns ────────────────────────────────────────────────────
pub mod playing_time {
    pub const MATCHES_PLAYED: &str = "Matches played";
    pub const MINUTES_PLAYED: &str = "Minutes played";
}

// ── Raw performance columns ─────────────────────────────────────────────────
pub mod metrics {
    pub const GOALS_PER_90: &str = "Goals per 90";
    pub const ASSISTS_PER_90: &str = "Assists per 90";
    pub const ACCURATE_PASSES_PCT: &str = "Accurate passes, %";
    pub const SHOTS_PER_90: &str = "Shots per 90";
    pub const SHOTS_ON_TARGET_PCT: &str = "Shots on target, %";
    pub const GOAL_CONVERSION_PCT: &str = "Goal conversion, %";
    pub const DUELS_WON_PCT: &str = "Duels won, %";
    pub const DEFENSIVE_ACTIONS_PER_90: &str = "Successful defensive actions per 90";
    pub const DEFENSIVE_DUELS_WON_PCT: &str = "Defensive duels won, %";
    pub const AERIAL_DUELS_PER_90: &str = "Aerial duels per 90";
    pub const AERIAL_DUELS_WON_PCT: &str = "Aerial duels won, %";
    pub const INTERCEPTIONS_PER_90: &str = "Interceptions per 90";
    pub const SLIDING_TACKLES_PER_90: &str = "Sliding tackles per 90";
    pub const FOULS_PER_90: &str = "Fouls per 90";
    pub const PROGRESSIVE_PASSES_PER_90: &str = "Progressive passes per 90";
    pub const KEY_PASSES_PER_90: &str = "Key passes per 90";
    pub const SUCCESSFUL_DRIBBLES_PCT: &str = "Successful dribbles, %";
    pub const CROSSES_PER_90: &str = "Crosses per 90";
    pub const ACCURATE_CROSSES_PCT: &str = "Accurate crosses, %";
    pub const TOUCHES_IN_BOX_PER_90: &str = "Touches in box per 90";
    pub const SHOT_ASSISTS_PER_90: &str = "Shot assists per 90";
    pub const PASSES_PER_90: &str = "Passes per 90";
    pub const ACCURATE_PASSES_PER_90: &str = "Accurate passes per 90";
    pub const LONG_PASSES_PER_90: &str = "Long passes per 90";
    pub const ACCURATE_LONG_PASSES_PER_90: &str = "Accurate long passes per 90";
    pub const ACCURATE_LONG_PASSES_PCT: &str = "Accurate long passes, %";
    pub const FORWARD_PASSES_PER_90: &str = "Forward passes per 90";
    pub const PASSES_TO_FINAL_THIRD_PER_90: &str = "Passes to final third per 90";
    pub const PASSES_TO_PENALTY_AREA_PER_90: &str = "Passes to penalty area per 90";
    pub const RECEIVED_PASSES_PER_90: &str = "Received passes per 90";
    pub const DRIBBLES_PER_90: &str = "Dribbles per 90";
    pub const SUCCESSFUL_DRIBBLES_PER_90: &str = "Successful dribbles per 90";
    pub const OFFENSIVE_DUELS_PER_90: &str = "Offensive duels per 90";
    pub const TOUCHES_PER_90: &str = "Touches per 90";
    pub const LOST_BALLS_PER_90: &str = "Lost balls per 90";
    pub const FOULS_SUFFERED_PER_90: &str = "Fouls suffered per 90";
    pub const OFFSIDES_PER_90: &str = "Offsides per 90";
    pub const SAVE_RATE_PCT: &str = "Save rate, %";
    pub const CONCEDED_GOALS_PER_90: &str = "Conceded goals per 90";
    pub const CLEAN_SHEETS: &str = "Clean sheets";
}

// ── Clustering feature names ────────────────────────────────────────────────
pub mod features {
    pub const GOALS_PER_90: &str = "goals_per_90";
    pub const ASSISTS_PER_90: &str = "assists_per_90";
    pub const PASS_ACCURACY_PCT: &str = "pass_accuracy_pct";
    pub const DUELS_WON_PCT: &str = "duels_won_pct";
    pub const SHOTS_PER_90: &str = "shots_per_90";
    pub const INTERCEPTIONS_PER_90: &str = "interceptions_per_90";
    pub const TACKLES_PER_90: &str = "tackles_per_90";
    pub const CLEARANCES_PER_90: &str = "clearances_per_90";
    pub const MINUTES_PLAYED: &str = "minutes_played";

    /// Feature order of every clustering matrix.
    pub const ALL: [&str; 9] = [
        GOALS_PER_90,
        ASSISTS_PER_90,
        PASS_ACCURACY_PCT,
        DUELS_WON_PCT,
        SHOTS_PER_90,
        INTERCEPTIONS_PER_90,
        TACKLES_PER_90,
        CLEARANCES_PER_90,
        MINUTES_PLAYED,
    ];
}

// ── Player result columns ───────────────────────────────────────────────────
pub mod results {
    pub const PLAYER_ID: &str = "player_id";
    pub const PLAYER_NAME: &str = "player_name";
    pub const TEAM: &str = "team";
    pub const CLUSTER_ID: &str = "cluster_id";
    pub const TIER_RANK: &str = "tier_rank";
    pub const TIER_LABEL: &str = "tier_label";
    pub const IEP_SCORE: &str = "iep_score";
    pub const PCA_1: &str = "pca_1";
    pub const PCA_2: &str = "pca_2";
}

/// Every column cast to Float64 on load (when present).
pub const NUMERIC_COLUMNS: &[&str] = &[
    playing_time::MATCHES_PLAYED,
    playing_time::MINUTES_PLAYED,
    metrics::GOALS_PER_90,
    metrics::ASSISTS_PER_90,
    metrics::ACCURATE_PASSES_PCT,
    metrics::SHOTS_PER_90,
    metrics::SHOTS_ON_TARGET_PCT,
    metrics::GOAL_CONVERSION_PCT,
    metrics::DUELS_WON_PCT,
    metrics::DEFENSIVE_ACTIONS_PER_90,
    metrics::DEFENSIVE_DUELS_WON_PCT,
    metrics::AERIAL_DUELS_PER_90,
    metrics::AERIAL_DUELS_WON_PCT,
    metrics::INTERCEPTIONS_PER_90,
    metrics::SLIDING_TACKLES_PER_90,
    metrics::FOULS_PER_90,
    metrics::PROGRESSIVE_PASSES_PER_90,
    metrics::KEY_PASSES_PER_90,
    metrics::SUCCESSFUL_DRIBBLES_PCT,
    metrics::CROSSES_PER_90,
    metrics::ACCURATE_CROSSES_PCT,
    metrics::TOUCHES_IN_BOX_PER_90,
    metrics::SHOT_ASSISTS_PER_90,
    metrics::PASSES_PER_90,
    metrics::ACCURATE_PASSES_PER_90,
    metrics::LONG_PASSES_PER_90,
    metrics::ACCURATE_LONG_PASSES_PER_90,
    metrics::ACCURATE_LONG_PASSES_PCT,
    metrics::FORWARD_PASSES_PER_90,
    metrics::PASSES_TO_FINAL_THIRD_PER_90,
    metrics::PASSES_TO_PENALTY_AREA_PER_90,
    metrics::RECEIVED_PASSES_PER_90,
    metrics::DRIBBLES_PER_90,
    metrics::SUCCESSFUL_DRIBBLES_PER_90,
    metrics::OFFENSIVE_DUELS_PER_90,
    metrics::TOUCHES_PER_90,
    metrics::LOST_BALLS_PER_90,
    metrics::FOULS_SUFFERED_PER_90,
    metrics::OFFSIDES_PER_90,
    metrics::SAVE_RATE_PCT,
    metrics::CONCEDED_GOALS_PER_90,
    metrics::CLEAN_SHEETS,
];
