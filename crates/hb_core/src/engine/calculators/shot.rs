//! Shot execution, the goal-area zone rule and goalkeeper saves.

use nalgebra::{Vector2, Vector3};

use crate::engine::geometry;
use crate::engine::physics_constants::{court, shot, skills};
use crate::models::PlayerAttributes;

const GRAVITY_MPS2: f32 = 9.81;
/// Normal jitter is clamped to this many standard deviations
const MAX_SIGMA: f32 = 2.5;

// ============================================================================
// Inputs
// ============================================================================

#[derive(Debug, Clone)]
pub struct ShotInput<'a> {
    pub shooter: &'a PlayerAttributes,
    pub shooter_pos: Vector2<f32>,
    pub goal_x: f32,
    /// Opponents within `shot::PRESSURE_RADIUS_M`
    pub defenders_close: usize,
    pub nearest_defender_m: f32,
    pub fatigue: f32,
    /// Product of risk modifiers (1.0 = neutral)
    pub risk: f32,
    pub jump: bool,
    pub is_penalty: bool,
}

/// Pre-drawn rolls. `jitter_*` are standard-normal samples.
#[derive(Debug, Clone, Copy)]
pub struct ShotRolls {
    pub aim_y: f32,
    pub aim_z: f32,
    pub jitter_y: f32,
    pub jitter_z: f32,
    pub power: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShotExecution {
    pub accuracy: f32,
    pub deviation_deg: f32,
    pub speed: f32,
    pub release: Vector3<f32>,
    /// Point in the goal plane the shot would reach without deviation
    pub aim: Vector3<f32>,
    pub velocity: Vector3<f32>,
    pub save_difficulty: f32,
}

// ============================================================================
// Zone rule
// ============================================================================

/// Attribute-driven chance (agility + decision) that a grounded shot from
/// inside the goal area is let go.
pub fn zone_error_chance(attrs: &PlayerAttributes) -> f32 {
    let t = (attrs.agility as f32 + attrs.decision_making as f32) / 200.0;
    skills::lerp(shot::ZONE_ERROR_MIN, shot::ZONE_ERROR_MAX, t)
}

/// Grounded shots from inside the goal area are disallowed unless the zone
/// error roll succeeds. Jump shots and shots from outside are always allowed.
pub fn shot_allowed(
    pos: &Vector2<f32>,
    goal_x: f32,
    grounded: bool,
    attrs: &PlayerAttributes,
    zone_roll: f32,
) -> bool {
    if !grounded || !geometry::is_in_goal_area(pos, goal_x) {
        return true;
    }
    zone_roll < zone_error_chance(attrs)
}

// ============================================================================
// Accuracy and deviation
// ============================================================================

pub fn shot_accuracy(attrs: &PlayerAttributes) -> f32 {
    skills::normalize(attrs.finishing) * 0.30
        + skills::normalize(attrs.composure) * 0.15
        + skills::normalize(attrs.decision_making) * 0.15
        + skills::normalize(attrs.power) * 0.15
        + skills::normalize(attrs.determination) * 0.10
        + skills::normalize(attrs.bravery) * 0.10
        + skills::normalize(attrs.aggression) * 0.05
}

/// Standard deviation (degrees) of the release angle.
pub fn deviation_deg(input: &ShotInput) -> f32 {
    let accuracy = shot_accuracy(input.shooter);
    let base = skills::lerp(shot::MAX_BASE_DEVIATION_DEG, shot::MIN_BASE_DEVIATION_DEG, accuracy);

    let proximity = if input.nearest_defender_m < shot::PRESSURE_RADIUS_M {
        1.0 - input.nearest_defender_m / shot::PRESSURE_RADIUS_M
    } else {
        0.0
    };
    let crowd = (input.defenders_close as f32 * 0.5).min(1.0);
    let pressure = proximity.max(crowd);
    let damping =
        1.0 - shot::COMPOSURE_PRESSURE_DAMPING * skills::normalize(input.shooter.composure);
    let pressure_dev = shot::PRESSURE_DEVIATION_DEG * pressure * damping;

    let risk_dev = (input.risk - 1.0).max(0.0) * shot::RISK_DEVIATION_DEG * 4.0;
    let fatigue_dev = input.fatigue.clamp(0.0, 1.0) * 2.0;
    base + pressure_dev + risk_dev.min(shot::RISK_DEVIATION_DEG) + fatigue_dev
}

/// How hard the shot is for the keeper (0..1). Close shots are harder to
/// save, long shots easier.
pub fn save_difficulty(distance_m: f32, accuracy: f32, is_penalty: bool) -> f32 {
    let mut d = shot::BASE_SAVE_DIFFICULTY + shot::SKILL_DIFFICULTY_WEIGHT * (accuracy - 0.5);
    if distance_m < shot::CLOSE_RANGE_M {
        d += shot::CLOSE_DIFFICULTY_BONUS;
    } else if distance_m >= shot::LONG_RANGE_M {
        d -= shot::LONG_DIFFICULTY_PENALTY;
    }
    if is_penalty {
        d += shot::PENALTY_DIFFICULTY_BONUS;
    }
    d.clamp(0.05, 0.95)
}

pub fn prep_time(jump: bool, is_penalty: bool) -> f32 {
    if is_penalty {
        shot::PENALTY_PREP_S
    } else if jump {
        shot::JUMP_PREP_S
    } else {
        shot::BASE_PREP_S
    }
}

// ============================================================================
// Execution
// ============================================================================

pub fn resolve_shot(input: &ShotInput, rolls: &ShotRolls) -> ShotExecution {
    let accuracy = shot_accuracy(input.shooter);
    let deviation = deviation_deg(input);

    let half = court::GOAL_WIDTH_M / 2.0 - shot::AIM_INSET_M;
    let aim = Vector3::new(
        input.goal_x,
        court::CENTER_Y - half + 2.0 * half * rolls.aim_y.clamp(0.0, 1.0),
        skills::lerp(shot::MIN_AIM_HEIGHT_M, shot::MAX_AIM_HEIGHT_M, rolls.aim_z),
    );

    let release_z =
        if input.jump { shot::RELEASE_HEIGHT_JUMP_M } else { shot::RELEASE_HEIGHT_GROUND_M };
    let release = Vector3::new(input.shooter_pos.x, input.shooter_pos.y, release_z);

    let to_aim = Vector2::new(aim.x - release.x, aim.y - release.y);
    let distance = to_aim.norm().max(0.5);

    let jy = rolls.jitter_y.clamp(-MAX_SIGMA, MAX_SIGMA);
    let jz = rolls.jitter_z.clamp(-MAX_SIGMA, MAX_SIGMA);
    let dir = geometry::rotate(&(to_aim / distance), deviation * jy);
    let target_z = aim.z + distance * (deviation * 0.6 * jz).to_radians().tan();

    let power = skills::normalize(input.shooter.power) * 0.7
        + skills::normalize(input.shooter.technique) * 0.3;
    let speed = skills::lerp(shot::MIN_SPEED_MPS, shot::MAX_SPEED_MPS, power)
        * (0.9 + 0.1 * rolls.power.clamp(0.0, 1.0))
        * (1.0 - 0.15 * input.fatigue.clamp(0.0, 1.0));

    let t = distance / speed;
    let vz = (target_z - release_z + 0.5 * GRAVITY_MPS2 * t * t) / t;
    let flat = dir * speed;

    let shooter_distance = geometry::distance_to_goal_mouth(&input.shooter_pos, input.goal_x);
    ShotExecution {
        accuracy,
        deviation_deg: deviation,
        speed,
        release,
        aim,
        velocity: Vector3::new(flat.x, flat.y, vz),
        save_difficulty: save_difficulty(shooter_distance, accuracy, input.is_penalty),
    }
}

// ============================================================================
// Saves
// ============================================================================

#[derive(Debug, Clone)]
pub struct SaveInput<'a> {
    pub keeper: &'a PlayerAttributes,
    pub keeper_pos: Vector2<f32>,
    /// Where the ball crosses the goal line (x is the goal line)
    pub crossing: Vector3<f32>,
    pub shot_speed: f32,
    pub save_difficulty: f32,
    pub keeper_fatigue: f32,
}

pub fn save_probability(input: &SaveInput) -> f32 {
    let skill = input.keeper.goalkeeping();
    let lateral = (input.keeper_pos.y - input.crossing.y).abs();
    let vertical = (input.crossing.z - 1.0).max(0.0);
    let reach = (lateral * lateral + vertical * vertical).sqrt();
    let reach_penalty = (reach - shot::SAVE_REACH_M).max(0.0) * shot::SAVE_REACH_PENALTY_PER_M;
    let speed_penalty = (input.shot_speed - shot::SAVE_SPEED_REF_MPS).max(0.0)
        * shot::SAVE_SPEED_PENALTY_PER_MPS;
    let fatigue = 1.0 - 0.2 * input.keeper_fatigue.clamp(0.0, 1.0);

    let difficulty = 1.0 - shot::SAVE_DIFFICULTY_WEIGHT * input.save_difficulty;
    let p = shot::SAVE_BASE
        + shot::SAVE_SKILL_WEIGHT * skill * difficulty * fatigue
        - reach_penalty
        - speed_penalty;
    p.clamp(shot::SAVE_MIN, shot::SAVE_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn neutral_rolls() -> ShotRolls {
        ShotRolls { aim_y: 0.5, aim_z: 0.5, jitter_y: 0.0, jitter_z: 0.0, power: 0.5 }
    }

    fn input(attrs: &PlayerAttributes, pos: Vector2<f32>) -> ShotInput<'_> {
        ShotInput {
            shooter: attrs,
            shooter_pos: pos,
            goal_x: 40.0,
            defenders_close: 0,
            nearest_defender_m: 10.0,
            fatigue: 0.0,
            risk: 1.0,
            jump: true,
            is_penalty: false,
        }
    }

    #[test]
    fn test_zone_error_chance_range() {
        let low = zone_error_chance(&PlayerAttributes::uniform(0));
        let high = zone_error_chance(&PlayerAttributes::uniform(100));
        assert!((low - shot::ZONE_ERROR_MIN).abs() < 1e-6);
        assert!((high - shot::ZONE_ERROR_MAX).abs() < 1e-6);
    }

    #[test]
    fn test_grounded_shot_inside_area_needs_zone_error() {
        let attrs = PlayerAttributes::uniform(50);
        let inside = Vector2::new(36.0, 10.0);
        assert!(!shot_allowed(&inside, 40.0, true, &attrs, 0.9));
        assert!(shot_allowed(&inside, 40.0, true, &attrs, 0.0));
        // Jump shot over the area is fine
        assert!(shot_allowed(&inside, 40.0, false, &attrs, 0.9));
        // Outside the area always fine
        assert!(shot_allowed(&Vector2::new(30.0, 10.0), 40.0, true, &attrs, 0.9));
    }

    #[test]
    fn test_pressure_increases_deviation_less_for_composed() {
        let calm = PlayerAttributes { composure: 95, ..PlayerAttributes::uniform(60) };
        let nervous = PlayerAttributes { composure: 5, ..PlayerAttributes::uniform(60) };
        let mut a = input(&calm, Vector2::new(30.0, 10.0));
        let free = deviation_deg(&a);
        a.nearest_defender_m = 0.5;
        let calm_pressed = deviation_deg(&a);
        let mut b = input(&nervous, Vector2::new(30.0, 10.0));
        b.nearest_defender_m = 0.5;
        let nervous_pressed = deviation_deg(&b);
        assert!(calm_pressed > free);
        assert!(nervous_pressed - deviation_deg(&input(&nervous, Vector2::new(30.0, 10.0)))
            > calm_pressed - free);
    }

    #[test]
    fn test_close_shots_harder_to_save_than_long() {
        let close = save_difficulty(4.0, 0.6, false);
        let mid = save_difficulty(7.0, 0.6, false);
        let long = save_difficulty(11.0, 0.6, false);
        assert!(close > mid && mid > long);
    }

    #[test]
    fn test_undeviated_shot_reaches_aim_point() {
        let attrs = PlayerAttributes::uniform(70);
        let exec = resolve_shot(&input(&attrs, Vector2::new(30.0, 10.0)), &neutral_rolls());
        let t = (exec.aim.x - exec.release.x) / exec.velocity.x;
        let y = exec.release.y + exec.velocity.y * t;
        let z = exec.release.z + exec.velocity.z * t - 0.5 * GRAVITY_MPS2 * t * t;
        assert!((y - exec.aim.y).abs() < 0.01);
        assert!((z - exec.aim.z).abs() < 0.05);
        assert!(geometry::is_in_goal_mouth(y, z));
        assert!(exec.speed >= shot::MIN_SPEED_MPS * 0.85 && exec.speed <= shot::MAX_SPEED_MPS);
    }

    #[test]
    fn test_save_probability_drops_with_reach() {
        let keeper = PlayerAttributes::uniform(70);
        let base = SaveInput {
            keeper: &keeper,
            keeper_pos: Vector2::new(39.2, 10.0),
            crossing: Vector3::new(40.0, 10.2, 1.0),
            shot_speed: 20.0,
            save_difficulty: 0.45,
            keeper_fatigue: 0.0,
        };
        let near = save_probability(&base);
        let wide = SaveInput { crossing: Vector3::new(40.0, 11.3, 1.8), ..base.clone() };
        let far = save_probability(&wide);
        assert!(near > far);
        assert!(near <= shot::SAVE_MAX && far >= shot::SAVE_MIN);
    }
}
