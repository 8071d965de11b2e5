//! Shot blocking by field defenders.

use nalgebra::{Vector2, Vector3};

use crate::engine::action_result::BlockKind;
use crate::engine::geometry;
use crate::engine::physics_constants::{block, skills};
use crate::models::PlayerAttributes;

#[derive(Debug, Clone)]
pub struct BlockInput<'a> {
    pub blocker: &'a PlayerAttributes,
    /// Distance from the blocker to the ball's path this tick
    pub path_distance_m: f32,
    /// Defender was already set in a blocking stance
    pub active_block: bool,
    pub fatigue: f32,
}

pub fn block_probability(input: &BlockInput) -> f32 {
    if input.path_distance_m > block::RADIUS_M {
        return 0.0;
    }
    let skill = skills::normalize(input.blocker.blocking) * 0.5
        + skills::normalize(input.blocker.anticipation) * 0.3
        + skills::normalize(input.blocker.positioning) * 0.2;
    let stance = if input.active_block { block::ACTIVE_BLOCK_BONUS } else { 0.0 };
    let proximity = 1.0 - 0.5 * input.path_distance_m / block::RADIUS_M;
    let fatigue = 1.0 - 0.2 * input.fatigue.clamp(0.0, 1.0);
    let raw = (block::BASE_CHANCE + stance + block::SKILL_WEIGHT * skill) * proximity * fatigue;
    raw.clamp(0.0, block::MAX_CHANCE)
}

pub fn block_kind(roll: f32) -> BlockKind {
    if roll < block::CATCH_SHARE {
        BlockKind::Caught
    } else if roll < block::CATCH_SHARE + block::OUT_SHARE {
        BlockKind::OverGoalLine
    } else {
        BlockKind::Deflected
    }
}

/// Rebound off a block: back toward the shooter with a spread of up to ±60°.
pub fn rebound_velocity(shot_velocity: &Vector3<f32>, spread_roll: f32) -> Vector3<f32> {
    let flat = Vector2::new(-shot_velocity.x, -shot_velocity.y);
    let dir = if flat.norm() > 1e-4 { flat / flat.norm() } else { Vector2::new(1.0, 0.0) };
    let dir = geometry::rotate(&dir, (spread_roll.clamp(0.0, 1.0) * 2.0 - 1.0) * 60.0);
    Vector3::new(dir.x * block::REBOUND_SPEED_MPS, dir.y * block::REBOUND_SPEED_MPS, 1.0)
}
