//! In-flight pass interception.

use nalgebra::Vector2;

use crate::engine::physics_constants::{interception, skills};
use crate::models::PlayerAttributes;

#[derive(Debug, Clone)]
pub struct InterceptionInput<'a> {
    pub defender: &'a PlayerAttributes,
    pub defender_pos: Vector2<f32>,
    pub defender_vel: Vector2<f32>,
    /// Unit heading of the defender
    pub facing: Vector2<f32>,
    /// Closest point of the ball's path this tick
    pub ball_pos: Vector2<f32>,
    pub fatigue: f32,
}

/// anticipation 60% / agility 20% / positioning 20%
pub fn interception_skill(attrs: &PlayerAttributes) -> f32 {
    skills::normalize(attrs.anticipation) * 0.6
        + skills::normalize(attrs.agility) * 0.2
        + skills::normalize(attrs.positioning) * 0.2
}

pub fn interception_probability(input: &InterceptionInput) -> f32 {
    let to_ball = input.ball_pos - input.defender_pos;
    let dist = to_ball.norm();
    if dist > interception::RADIUS_M {
        return 0.0;
    }
    let dir = if dist > 1e-4 { to_ball / dist } else { input.facing };

    let skill = skills::lerp(
        interception::SKILL_MULT_MIN,
        interception::SKILL_MULT_MAX,
        interception_skill(input.defender),
    );
    // Moving toward the pass line helps, moving away hurts
    let closing = (input.defender_vel.dot(&dir) / interception::APPROACH_REF_MPS).clamp(-1.0, 1.0);
    let approach = 1.0 + interception::APPROACH_WEIGHT * closing;
    let fatigue = 1.0 - interception::MAX_FATIGUE_PENALTY * input.fatigue.clamp(0.0, 1.0);
    let awareness = if input.facing.dot(&dir) < 0.0 { interception::UNAWARE_FACTOR } else { 1.0 };
    let proximity = 1.0 - 0.5 * dist / interception::RADIUS_M;

    (interception::BASE_CHANCE * skill * approach * fatigue * awareness * proximity)
        .clamp(0.0, interception::MAX_CHANCE)
}
