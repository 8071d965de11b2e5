//! Foul severity tiers.
//!
//! Each aggravating factor adds to a severity score which is compared with
//! tiered thresholds. Scores close to a threshold are settled by a roll, so
//! the same foul is not always punished the same way.

use nalgebra::Vector2;

use crate::engine::action_result::{FoulDetails, FoulSeverity};
use crate::engine::physics_constants::foul;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FoulContext {
    pub from_behind: bool,
    pub high_speed: bool,
    /// Fouler aggression in 0..1 (already scaled by team aggression)
    pub aggression: f32,
    pub denies_clear_chance: bool,
    /// Foul happened between the goal area and the 9 m line
    pub inside_free_throw_line: bool,
    pub position: Vector2<f32>,
}

pub fn severity_score(ctx: &FoulContext) -> f32 {
    foul::BASE_SEVERITY
        + if ctx.from_behind { foul::FROM_BEHIND_SEVERITY } else { 0.0 }
        + if ctx.high_speed { foul::HIGH_SPEED_SEVERITY } else { 0.0 }
        + ctx.aggression.clamp(0.0, 1.0) * foul::AGGRESSION_SEVERITY_WEIGHT
        + if ctx.denies_clear_chance { foul::CLEAR_CHANCE_SEVERITY } else { 0.0 }
}

/// Probability that `score` counts as crossing `threshold`: 0 / 1 away from
/// it, linear inside the boundary band.
fn crossing_probability(score: f32, threshold: f32) -> f32 {
    ((score - threshold) / (2.0 * foul::BOUNDARY_BAND) + 0.5).clamp(0.0, 1.0)
}

/// Classifies a foul. `roll` is uniform in [0, 1).
pub fn classify(score: f32, roll: f32) -> FoulSeverity {
    if roll < crossing_probability(score, foul::RED_THRESHOLD) {
        FoulSeverity::RedCard
    } else if roll < crossing_probability(score, foul::TWO_MINUTE_THRESHOLD) {
        FoulSeverity::TwoMinuteSuspension
    } else if roll < crossing_probability(score, foul::PENALTY_THRESHOLD) {
        FoulSeverity::PenaltyThrow
    } else {
        FoulSeverity::FreeThrow
    }
}

/// Full assessment: tier, caution, and whether a 7 m throw is awarded.
pub fn assess_foul(ctx: &FoulContext, roll: f32) -> FoulDetails {
    let score = severity_score(ctx);
    let mut severity = classify(score, roll);

    // A 7m throw needs a destroyed chance or a foul inside the 9m line
    let penalty_eligible = ctx.denies_clear_chance || ctx.inside_free_throw_line;
    if severity == FoulSeverity::PenaltyThrow && !penalty_eligible {
        severity = FoulSeverity::FreeThrow;
    }
    let penalty_throw = severity >= FoulSeverity::PenaltyThrow && penalty_eligible;
    let yellow_worthy =
        score >= foul::YELLOW_THRESHOLD && severity < FoulSeverity::TwoMinuteSuspension;

    FoulDetails { severity, yellow_worthy, penalty_throw, position: ctx.position }
}
