//! Tuning constants for the handball simulation.
//!
//! These are compiled constants, not runtime configuration: together with the
//! seed they define the engine's reproducible behaviour.

/// Skill normalization helpers
pub mod skills {
    /// Maximum attribute rating
    pub const MAX_SKILL: f32 = 100.0;

    /// 0-100 rating -> 0.0-1.0
    #[inline]
    pub fn normalize(value: u8) -> f32 {
        (value as f32 / MAX_SKILL).clamp(0.0, 1.0)
    }

    /// Linear map of a 0..1 value into `[min, max]`.
    #[inline]
    pub fn lerp(min: f32, max: f32, t: f32) -> f32 {
        min + (max - min) * t.clamp(0.0, 1.0)
    }
}

/// Court dimensions (meters)
pub mod court {
    pub const LENGTH_M: f32 = 40.0;
    pub const WIDTH_M: f32 = 20.0;
    pub const HALFWAY_X: f32 = LENGTH_M / 2.0;
    pub const CENTER_Y: f32 = WIDTH_M / 2.0;
    /// Goal line x of the goal defended by home in the first half
    pub const LEFT_GOAL_X: f32 = 0.0;
    pub const RIGHT_GOAL_X: f32 = LENGTH_M;
    pub const GOAL_WIDTH_M: f32 = 3.0;
    pub const GOAL_HEIGHT_M: f32 = 2.0;
    /// Goal area: every point within this distance of the goal mouth
    pub const GOAL_AREA_RADIUS_M: f32 = 6.0;
    /// Free-throw (dashed) line distance from the goal mouth
    pub const FREE_THROW_LINE_M: f32 = 9.0;
    pub const PENALTY_MARK_M: f32 = 7.0;
    /// Minimum distance defenders keep from the thrower at restarts
    pub const RESTART_CLEARANCE_M: f32 = 3.0;
    /// Shots from wider than this angle off the goal normal are "wide angle"
    pub const WIDE_ANGLE_DEG: f32 = 50.0;
}

/// Clock and phase timing (seconds)
pub mod timing {
    /// Fixed simulation step
    pub const TICK_DT: f32 = 0.1;
    /// Whistle delay before a free throw / throw-in / goal throw is taken
    pub const RESTART_DELAY_S: f32 = 1.0;
    pub const KICKOFF_DELAY_S: f32 = 1.0;
    pub const PENALTY_DELAY_S: f32 = 1.5;
    /// Counter-attack transition ends when the ball crosses halfway or after this
    pub const TRANSITION_MAX_S: f32 = 5.0;
    /// Stamina restored to every player at half time
    pub const HALF_TIME_STAMINA_RECOVERY: f32 = 0.25;
    /// Window during which a pass receiver counts as "just received"
    pub const RECEIVED_PASS_WINDOW_S: f32 = 1.5;
}

/// Player movement
pub mod movement {
    pub const MAX_SPEED_MPS: f32 = 7.5;
    /// Pace scales max speed into [MIN_PACE_FACTOR, 1.0]
    pub const MIN_PACE_FACTOR: f32 = 0.7;
    pub const BALL_CARRIER_SPEED_FACTOR: f32 = 0.9;
    pub const GOALKEEPER_SPEED_FACTOR: f32 = 0.8;
    pub const MIN_ACCEL_MPS2: f32 = 5.0;
    pub const MAX_ACCEL_MPS2: f32 = 9.0;
    pub const ARRIVE_RADIUS_M: f32 = 0.3;
    /// Slow down inside this radius of the target
    pub const SLOWDOWN_RADIUS_M: f32 = 2.0;
    /// Distance covered per step while holding the ball
    pub const STEP_LENGTH_M: f32 = 0.9;
    pub const MAX_STEPS: u8 = 3;
    pub const MAX_HOLDING_TIME_S: f32 = 3.0;
    pub const JUMP_AIRTIME_S: f32 = 0.6;
    pub const LANDING_TIME_S: f32 = 0.3;
    pub const FALLEN_TIME_S: f32 = 1.0;
    /// Keep field players this far outside the goal area line
    pub const GOAL_AREA_MARGIN_M: f32 = 0.15;
}

/// Stamina model (0.0 exhausted ..= 1.0 fresh)
pub mod stamina {
    /// Drain per second at full speed for an average stamina rating
    pub const DRAIN_PER_S: f32 = 0.004;
    pub const RECOVERY_PER_S: f32 = 0.002;
    pub const BENCH_RECOVERY_PER_S: f32 = 0.006;
    /// Below this speed ratio a player counts as resting
    pub const REST_SPEED_RATIO: f32 = 0.25;
    /// Minimum speed factor when exhausted
    pub const EXHAUSTED_SPEED_FACTOR: f32 = 0.75;
}

/// Pass calculator
pub mod pass {
    pub const BASE_ACCURACY: f32 = 0.92;
    pub const DISTANCE_PENALTY_PER_M: f32 = 0.012;
    pub const DISTANCE_PENALTY_CAP: f32 = 0.35;
    pub const PRESSURE_RADIUS_M: f32 = 3.0;
    pub const MAX_PRESSURE_PENALTY: f32 = 0.25;
    /// Composure removes up to this share of the pressure penalty
    pub const COMPOSURE_DAMPING: f32 = 0.6;
    pub const SKILL_MULT_MIN: f32 = 0.75;
    pub const SKILL_MULT_MAX: f32 = 1.15;
    pub const FATIGUE_PENALTY: f32 = 0.1;
    pub const MIN_ACCURACY: f32 = 0.05;
    pub const MAX_ACCURACY: f32 = 0.99;
    pub const ACCURATE_CONE_DEG: f32 = 3.0;
    pub const INACCURATE_CONE_MIN_DEG: f32 = 8.0;
    pub const INACCURATE_CONE_MAX_DEG: f32 = 20.0;
    pub const INACCURATE_SPEED_FACTOR: f32 = 0.75;
    pub const BASE_SPEED_MPS: f32 = 8.0;
    pub const SPEED_PER_M: f32 = 0.9;
    pub const MIN_SPEED_MPS: f32 = 9.0;
    pub const MAX_SPEED_MPS: f32 = 20.0;
    pub const RELEASE_HEIGHT_M: f32 = 1.6;
    pub const CATCH_HEIGHT_M: f32 = 1.3;
    pub const BASE_PREP_S: f32 = 0.4;
    /// Technique shortens preparation by up to this much
    pub const PREP_TECHNIQUE_REDUCTION_S: f32 = 0.2;
    /// Opponents this close to the pass line can steal before release
    pub const PRE_RELEASE_RADIUS_M: f32 = 1.2;
    pub const PRE_RELEASE_FACTOR: f32 = 0.5;
    pub const CATCH_RADIUS_M: f32 = 1.2;
    pub const CATCH_BASE: f32 = 0.9;
    pub const CATCH_TECHNIQUE_BONUS: f32 = 0.09;
    pub const CATCH_SPEED_PENALTY_PER_MPS: f32 = 0.01;
}

/// Shot calculator and goalkeeper saves
pub mod shot {
    pub const BASE_PREP_S: f32 = 0.5;
    pub const JUMP_PREP_S: f32 = 0.6;
    pub const PENALTY_PREP_S: f32 = 0.6;
    pub const RELEASE_HEIGHT_GROUND_M: f32 = 1.8;
    pub const RELEASE_HEIGHT_JUMP_M: f32 = 2.4;
    pub const MIN_SPEED_MPS: f32 = 17.0;
    pub const MAX_SPEED_MPS: f32 = 29.0;
    pub const MAX_BASE_DEVIATION_DEG: f32 = 9.0;
    pub const MIN_BASE_DEVIATION_DEG: f32 = 2.0;
    pub const PRESSURE_DEVIATION_DEG: f32 = 6.0;
    pub const PRESSURE_RADIUS_M: f32 = 2.0;
    pub const COMPOSURE_PRESSURE_DAMPING: f32 = 0.5;
    /// Game-state risk adds up to this many degrees of deviation
    pub const RISK_DEVIATION_DEG: f32 = 2.0;
    /// Zone error (illegal grounded shot inside the goal area) chance range
    pub const ZONE_ERROR_MIN: f32 = 0.01;
    pub const ZONE_ERROR_MAX: f32 = 0.25;
    pub const CLOSE_RANGE_M: f32 = 6.0;
    pub const LONG_RANGE_M: f32 = 9.0;
    pub const BASE_SAVE_DIFFICULTY: f32 = 0.45;
    pub const CLOSE_DIFFICULTY_BONUS: f32 = 0.2;
    pub const LONG_DIFFICULTY_PENALTY: f32 = 0.15;
    pub const SKILL_DIFFICULTY_WEIGHT: f32 = 0.2;
    pub const PENALTY_DIFFICULTY_BONUS: f32 = 0.1;
    /// Aim this far inside the posts
    pub const AIM_INSET_M: f32 = 0.25;
    pub const MIN_AIM_HEIGHT_M: f32 = 0.2;
    pub const MAX_AIM_HEIGHT_M: f32 = 1.75;
    // Saves
    pub const SAVE_BASE: f32 = 0.12;
    pub const SAVE_SKILL_WEIGHT: f32 = 0.7;
    pub const SAVE_DIFFICULTY_WEIGHT: f32 = 0.5;
    pub const SAVE_REACH_M: f32 = 1.0;
    pub const SAVE_REACH_PENALTY_PER_M: f32 = 0.25;
    pub const SAVE_SPEED_REF_MPS: f32 = 20.0;
    pub const SAVE_SPEED_PENALTY_PER_MPS: f32 = 0.01;
    pub const SAVE_MIN: f32 = 0.02;
    pub const SAVE_MAX: f32 = 0.85;
    /// Chance that a saved ball is held rather than parried loose
    pub const SAVE_HOLD_CHANCE: f32 = 0.55;
}

/// Tackle calculator
pub mod tackle {
    pub const BASE_SUCCESS: f32 = 0.35;
    pub const SKILL_RATIO_SCALE: f32 = 0.35;
    pub const RATIO_TERM_CAP: f32 = 0.3;
    pub const FATIGUE_PENALTY: f32 = 0.15;
    pub const MIN_SUCCESS: f32 = 0.05;
    pub const MAX_SUCCESS: f32 = 0.85;
    pub const BASE_FOUL: f32 = 0.12;
    pub const FROM_BEHIND_FOUL: f32 = 0.25;
    pub const HIGH_SPEED_FOUL: f32 = 0.12;
    pub const CLOSING_SPEED_FOUL_PER_MPS: f32 = 0.02;
    pub const AGGRESSION_FOUL_WEIGHT: f32 = 0.15;
    pub const CLEAR_CHANCE_FOUL_MULT: f32 = 1.3;
    pub const MIN_FOUL: f32 = 0.02;
    pub const MAX_FOUL: f32 = 0.9;
    /// Target speed above this share of max speed counts as "high speed"
    pub const HIGH_SPEED_RATIO: f32 = 0.6;
    /// cos(angle) below this between target facing and target->tackler = from behind
    pub const FROM_BEHIND_COS: f32 = -0.5;
    pub const PREP_S: f32 = 0.3;
    /// Tackle whiffs if the target escaped beyond this range before resolution
    pub const REACH_M: f32 = 1.4;
}

/// Interception calculator
pub mod interception {
    pub const BASE_CHANCE: f32 = 0.45;
    pub const RADIUS_M: f32 = 1.0;
    pub const SKILL_MULT_MIN: f32 = 0.5;
    pub const SKILL_MULT_MAX: f32 = 1.3;
    pub const APPROACH_WEIGHT: f32 = 0.3;
    /// Reference closing speed for the approach term
    pub const APPROACH_REF_MPS: f32 = 5.0;
    pub const MAX_FATIGUE_PENALTY: f32 = 0.35;
    pub const UNAWARE_FACTOR: f32 = 0.6;
    pub const MAX_CHANCE: f32 = 0.9;
    pub const MAX_BALL_HEIGHT_M: f32 = 2.3;
}

/// Block calculator
pub mod block {
    pub const RADIUS_M: f32 = 1.0;
    pub const BASE_CHANCE: f32 = 0.2;
    pub const ACTIVE_BLOCK_BONUS: f32 = 0.25;
    pub const SKILL_WEIGHT: f32 = 0.35;
    pub const MAX_CHANCE: f32 = 0.75;
    pub const MAX_BALL_HEIGHT_M: f32 = 2.5;
    /// Share of successful blocks where the blocker secures the ball
    pub const CATCH_SHARE: f32 = 0.2;
    /// Share of successful blocks deflected over the goal line
    pub const OUT_SHARE: f32 = 0.2;
    pub const REBOUND_SPEED_MPS: f32 = 6.0;
}

/// Foul severity tiers
pub mod foul {
    pub const BASE_SEVERITY: f32 = 0.2;
    pub const FROM_BEHIND_SEVERITY: f32 = 0.25;
    pub const HIGH_SPEED_SEVERITY: f32 = 0.15;
    pub const AGGRESSION_SEVERITY_WEIGHT: f32 = 0.2;
    pub const CLEAR_CHANCE_SEVERITY: f32 = 0.3;
    pub const YELLOW_THRESHOLD: f32 = 0.35;
    pub const PENALTY_THRESHOLD: f32 = 0.5;
    pub const TWO_MINUTE_THRESHOLD: f32 = 0.7;
    pub const RED_THRESHOLD: f32 = 0.95;
    /// Scores within this band of a threshold are decided by a roll
    pub const BOUNDARY_BAND: f32 = 0.05;
}

/// Suspensions and cards
pub mod suspension {
    pub const TWO_MINUTES_S: f32 = 120.0;
    /// Team plays short-handed this long after a red card
    pub const RED_CARD_SHORT_HANDED_S: f32 = 120.0;
    /// The n-th two-minute suspension becomes a red card
    pub const TWO_MINUTES_FOR_RED: u8 = 3;
    pub const MAX_PLAYER_YELLOWS: u8 = 1;
    pub const MAX_TEAM_YELLOWS: u8 = 3;
}

/// Passive play
pub mod passive_play {
    pub const INTENT_LIMIT_S: f32 = 20.0;
    pub const ABSOLUTE_LIMIT_S: f32 = 40.0;
    pub const MAX_PASSES_AFTER_WARNING: u8 = 5;
    /// Holder closer than this to the goal mouth counts as threatening
    pub const THREAT_DISTANCE_M: f32 = 9.5;
}

/// Level-of-detail AI scheduling
pub mod lod {
    pub const HIGH_RADIUS_M: f32 = 4.0;
    pub const MEDIUM_RADIUS_M: f32 = 10.0;
    pub const HIGH_INTERVAL_S: f32 = 1.0 / 3.0;
    pub const MEDIUM_INTERVAL_S: f32 = 0.5;
    pub const LOW_INTERVAL_S: f32 = 1.0;
}

/// AI decision thresholds
pub mod ai {
    /// Pass utility = PASS_SCORE_OFFSET - distance to goal + bonuses
    pub const PASS_SCORE_OFFSET: f32 = 40.0;
    pub const TEAMWORK_BONUS: f32 = 2.0;
    pub const ANTICIPATION_BONUS: f32 = 0.5;
    pub const DEFENDER_PROXIMITY_RADIUS_M: f32 = 3.0;
    pub const DEFENDER_PROXIMITY_PENALTY: f32 = 2.0;
    pub const LANE_RADIUS_M: f32 = 1.0;
    pub const LANE_PENALTY: f32 = 4.0;
    pub const PASSING_SKILL_BONUS: f32 = 1.5;
    pub const MAX_PASS_DISTANCE_M: f32 = 25.0;
    pub const MIN_PASS_SCORE: f32 = 24.0;
    pub const SHOOT_THRESHOLD: f32 = 0.55;
    pub const DRIBBLE_THRESHOLD: f32 = 0.5;
    pub const HOLD_BEFORE_FORCED_S: f32 = 2.0;
    pub const STEPS_BEFORE_FORCED: u8 = 2;
    pub const NEARBY_OPPONENT_RADIUS_M: f32 = 2.0;
    pub const SCREEN_SEARCH_RADIUS_M: f32 = 5.0;
    pub const SCREEN_MARK_RADIUS_M: f32 = 1.5;
    pub const SCREEN_LINE_TOLERANCE_M: f32 = 1.5;
    pub const SCREEN_OFFSET_M: f32 = 0.7;
    pub const MARK_DISTANCE_M: f32 = 1.0;
    pub const GK_CLOSE_SHOT_RANGE_M: f32 = 12.0;
    pub const GK_LINE_OFFSET_M: f32 = 0.8;
    pub const GK_ATTACK_OFFSET_M: f32 = 2.5;
    pub const WING_SHOT_RANGE_M: f32 = 8.5;
    pub const BACK_MIN_SHOT_RANGE_M: f32 = 7.0;
    pub const BACK_MAX_SHOT_RANGE_M: f32 = 12.5;
    pub const PIVOT_LINE_TOLERANCE_M: f32 = 1.2;
    pub const FAST_BREAK_RANGE_M: f32 = 9.0;
}

/// Rolling substitutions
pub mod substitution {
    pub const CHECK_INTERVAL_S: f32 = 20.0;
    pub const FATIGUE_THRESHOLD: f32 = 0.45;
    pub const MIN_BENCH_STAMINA: f32 = 0.8;
}

/// Team timeouts (coach AI)
pub mod timeout {
    pub const UNANSWERED_GOALS_TRIGGER: u8 = 3;
    pub const CLOSE_GAME_WINDOW_S: f32 = 120.0;
    pub const CLOSE_GAME_MARGIN: i32 = 1;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_and_lerp() {
        assert_eq!(skills::normalize(100), 1.0);
        assert_eq!(skills::normalize(0), 0.0);
        assert!((skills::lerp(0.75, 1.15, 0.5) - 0.95).abs() < 1e-6);
        assert_eq!(skills::lerp(1.0, 2.0, 3.0), 2.0);
    }

    #[test]
    fn test_foul_thresholds_are_ordered() {
        assert!(foul::YELLOW_THRESHOLD < foul::PENALTY_THRESHOLD);
        assert!(foul::PENALTY_THRESHOLD < foul::TWO_MINUTE_THRESHOLD);
        assert!(foul::TWO_MINUTE_THRESHOLD < foul::RED_THRESHOLD);
    }

    #[test]
    fn test_lod_intervals() {
        // ~3Hz / 2Hz / 1Hz
        assert!(lod::HIGH_INTERVAL_S < lod::MEDIUM_INTERVAL_S);
        assert!(lod::MEDIUM_INTERVAL_S < lod::LOW_INTERVAL_S);
        assert!(lod::HIGH_RADIUS_M < lod::MEDIUM_RADIUS_M);
    }
}
