//! Level-of-detail scheduling for AI re-evaluation.
//!
//! Movement and physics still run every tick; only decision making is
//! throttled.

use nalgebra::Vector2;

use crate::engine::physics_constants::lod;

/// Decision frequency tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LodTier {
    /// ~1 Hz - everyone else
    Low,
    /// ~2 Hz - within the medium radius of the ball
    Medium,
    /// ~3 Hz - ball carrier, pass target, close to the ball
    High,
}

impl LodTier {
    pub fn interval_secs(&self) -> f32 {
        match self {
            LodTier::High => lod::HIGH_INTERVAL_S,
            LodTier::Medium => lod::MEDIUM_INTERVAL_S,
            LodTier::Low => lod::LOW_INTERVAL_S,
        }
    }
}

/// Tier for one player given the ball context.
#[inline]
pub fn lod_tier(
    player_idx: usize,
    player_pos: &Vector2<f32>,
    ball_pos: &Vector2<f32>,
    ball_holder: Option<usize>,
    pass_target: Option<usize>,
) -> LodTier {
    if ball_holder == Some(player_idx) || pass_target == Some(player_idx) {
        return LodTier::High;
    }
    let dist_sq = (player_pos - ball_pos).norm_squared();
    if dist_sq <= lod::HIGH_RADIUS_M * lod::HIGH_RADIUS_M {
        LodTier::High
    } else if dist_sq <= lod::MEDIUM_RADIUS_M * lod::MEDIUM_RADIUS_M {
        LodTier::Medium
    } else {
        LodTier::Low
    }
}

/// Whether a player scheduled for `next_at` should decide at `now`.
#[inline]
pub fn is_due(now: f32, next_at: f32) -> bool {
    // Half-tick slack absorbs float drift in the accumulated clock
    now + 0.05 >= next_at
}

#[inline]
pub fn next_decision_at(now: f32, tier: LodTier) -> f32 {
    now + tier.interval_secs()
}
