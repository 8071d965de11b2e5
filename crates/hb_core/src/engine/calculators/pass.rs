//! Pass accuracy and execution.

use nalgebra::{Vector2, Vector3};

use crate::engine::geometry;
use crate::engine::physics_constants::{interception, pass, skills};
use crate::models::PlayerAttributes;

const GRAVITY_MPS2: f32 = 9.81;

// ============================================================================
// Inputs
// ============================================================================

#[derive(Debug, Clone)]
pub struct PassInput<'a> {
    pub passer: &'a PlayerAttributes,
    pub passer_pos: Vector2<f32>,
    pub target_pos: Vector2<f32>,
    pub target_velocity: Vector2<f32>,
    /// Distance to the nearest opponent of the passer
    pub nearest_defender_m: f32,
    pub fatigue: f32,
}

/// Pre-drawn uniform rolls in [0, 1).
#[derive(Debug, Clone, Copy)]
pub struct PassRolls {
    pub accuracy: f32,
    /// Position inside the cone (0.5 = dead centre)
    pub angle: f32,
    /// Width of the inaccurate cone
    pub cone: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PassExecution {
    pub accurate: bool,
    pub accuracy: f32,
    pub angle_offset_deg: f32,
    pub speed: f32,
    pub release: Vector3<f32>,
    pub velocity: Vector3<f32>,
}

// ============================================================================
// Accuracy
// ============================================================================

/// Linear distance penalty, capped.
pub fn distance_penalty(distance_m: f32) -> f32 {
    (distance_m * pass::DISTANCE_PENALTY_PER_M).min(pass::DISTANCE_PENALTY_CAP)
}

/// Nearest-defender pressure, dampened by composure.
pub fn pressure_penalty(nearest_defender_m: f32, composure: u8) -> f32 {
    if nearest_defender_m >= pass::PRESSURE_RADIUS_M {
        return 0.0;
    }
    let closeness = 1.0 - (nearest_defender_m / pass::PRESSURE_RADIUS_M).max(0.0);
    let damping = 1.0 - pass::COMPOSURE_DAMPING * skills::normalize(composure);
    pass::MAX_PRESSURE_PENALTY * closeness * damping
}

/// passing 60% / decision 20% / technique 20%, mapped to [min, max].
pub fn skill_multiplier(attrs: &PlayerAttributes) -> f32 {
    let composite = skills::normalize(attrs.passing) * 0.6
        + skills::normalize(attrs.decision_making) * 0.2
        + skills::normalize(attrs.technique) * 0.2;
    skills::lerp(pass::SKILL_MULT_MIN, pass::SKILL_MULT_MAX, composite)
}

pub fn pass_accuracy(input: &PassInput) -> f32 {
    let distance = (input.target_pos - input.passer_pos).norm();
    let base = pass::BASE_ACCURACY
        - distance_penalty(distance)
        - pressure_penalty(input.nearest_defender_m, input.passer.composure);
    let fatigue = 1.0 - pass::FATIGUE_PENALTY * input.fatigue.clamp(0.0, 1.0);
    (base * skill_multiplier(input.passer) * fatigue).clamp(pass::MIN_ACCURACY, pass::MAX_ACCURACY)
}

/// Wind-up time before release.
pub fn prep_time(attrs: &PlayerAttributes) -> f32 {
    pass::BASE_PREP_S - pass::PREP_TECHNIQUE_REDUCTION_S * skills::normalize(attrs.technique)
}

pub fn pass_speed(distance_m: f32) -> f32 {
    (pass::BASE_SPEED_MPS + pass::SPEED_PER_M * distance_m)
        .clamp(pass::MIN_SPEED_MPS, pass::MAX_SPEED_MPS)
}

// ============================================================================
// Execution
// ============================================================================

/// Turns accuracy and rolls into a launch: small cone when accurate, wide
/// cone and a weaker throw otherwise. The passer leads a moving target.
pub fn resolve_pass(input: &PassInput, rolls: &PassRolls) -> PassExecution {
    let accuracy = pass_accuracy(input);
    let accurate = rolls.accuracy < accuracy;

    let distance = (input.target_pos - input.passer_pos).norm().max(0.5);
    let mut speed = pass_speed(distance);
    let lead = input.target_velocity * (distance / speed);
    let aim = input.target_pos + lead;
    let to_aim = aim - input.passer_pos;
    let aim_distance = to_aim.norm().max(0.5);
    let dir = if to_aim.norm() > 1e-4 { to_aim / to_aim.norm() } else { Vector2::new(1.0, 0.0) };

    let cone = if accurate {
        pass::ACCURATE_CONE_DEG
    } else {
        skills::lerp(pass::INACCURATE_CONE_MIN_DEG, pass::INACCURATE_CONE_MAX_DEG, rolls.cone)
    };
    let angle_offset_deg = (rolls.angle.clamp(0.0, 1.0) * 2.0 - 1.0) * cone;
    if !accurate {
        speed *= pass::INACCURATE_SPEED_FACTOR;
    }

    let flat = geometry::rotate(&dir, angle_offset_deg) * speed;
    let flight_time = aim_distance / speed;
    let drop = 0.5 * GRAVITY_MPS2 * flight_time * flight_time;
    let vz = (pass::CATCH_HEIGHT_M - pass::RELEASE_HEIGHT_M + drop) / flight_time;

    PassExecution {
        accurate,
        accuracy,
        angle_offset_deg,
        speed,
        release: Vector3::new(input.passer_pos.x, input.passer_pos.y, pass::RELEASE_HEIGHT_M),
        velocity: Vector3::new(flat.x, flat.y, vz),
    }
}

// ============================================================================
// Pre-release interception and catching
// ============================================================================

/// Chance that an opponent `lane_distance_m` from the pass line steals the
/// ball before it leaves the passer's hand.
pub fn pre_release_interception_chance(
    lane_distance_m: f32,
    defender: &PlayerAttributes,
    defender_fatigue: f32,
) -> f32 {
    if lane_distance_m > pass::PRE_RELEASE_RADIUS_M {
        return 0.0;
    }
    let skill = skills::normalize(defender.anticipation) * 0.6
        + skills::normalize(defender.agility) * 0.2
        + skills::normalize(defender.positioning) * 0.2;
    let skill_mult =
        skills::lerp(interception::SKILL_MULT_MIN, interception::SKILL_MULT_MAX, skill);
    let proximity = 1.0 - lane_distance_m / pass::PRE_RELEASE_RADIUS_M;
    let fatigue = 1.0 - interception::MAX_FATIGUE_PENALTY * defender_fatigue.clamp(0.0, 1.0);
    (interception::BASE_CHANCE * skill_mult * proximity * fatigue * pass::PRE_RELEASE_FACTOR)
        .clamp(0.0, interception::MAX_CHANCE)
}

/// Chance that a receiver holds on to an arriving ball.
pub fn catch_probability(receiver: &PlayerAttributes, ball_speed: f32) -> f32 {
    let technique =
        skills::normalize(receiver.technique) * 0.7 + skills::normalize(receiver.handling) * 0.3;
    let speed_excess = (ball_speed - pass::MIN_SPEED_MPS).max(0.0);
    (pass::CATCH_BASE + pass::CATCH_TECHNIQUE_BONUS * technique
        - pass::CATCH_SPEED_PENALTY_PER_MPS * speed_excess)
        .clamp(0.5, 0.99)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(attrs: &PlayerAttributes, distance: f32, pressure: f32) -> PassInput<'_> {
        PassInput {
            passer: attrs,
            passer_pos: Vector2::new(10.0, 10.0),
            target_pos: Vector2::new(10.0 + distance, 10.0),
            target_velocity: Vector2::zeros(),
            nearest_defender_m: pressure,
            fatigue: 0.0,
        }
    }

    #[test]
    fn test_short_clean_pass_is_accurate_and_narrow() {
        let attrs = PlayerAttributes::uniform(70);
        let inp = input(&attrs, 5.0, 10.0);
        let acc = pass_accuracy(&inp);
        assert!(acc > 0.85, "accuracy {acc}");

        let exec = resolve_pass(&inp, &PassRolls { accuracy: 0.5, angle: 0.9, cone: 0.9 });
        assert!(exec.accurate);
        assert!(exec.angle_offset_deg.abs() <= pass::ACCURATE_CONE_DEG);
        assert!(exec.velocity.x > 0.0);
    }

    #[test]
    fn test_inaccurate_pass_has_wide_cone_and_less_speed() {
        let attrs = PlayerAttributes::uniform(70);
        let inp = input(&attrs, 5.0, 10.0);
        let good = resolve_pass(&inp, &PassRolls { accuracy: 0.0, angle: 1.0, cone: 0.0 });
        let bad = resolve_pass(&inp, &PassRolls { accuracy: 0.999, angle: 1.0, cone: 0.0 });
        assert!(!bad.accurate);
        assert!(bad.angle_offset_deg >= pass::INACCURATE_CONE_MIN_DEG);
        assert!(bad.speed < good.speed);
    }

    #[test]
    fn test_distance_penalty_is_capped() {
        assert!((distance_penalty(10.0) - 0.12).abs() < 1e-6);
        assert_eq!(distance_penalty(100.0), pass::DISTANCE_PENALTY_CAP);
    }

    #[test]
    fn test_pressure_dampened_by_composure() {
        assert_eq!(pressure_penalty(5.0, 50), 0.0);
        let calm = pressure_penalty(1.0, 100);
        let nervous = pressure_penalty(1.0, 0);
        assert!(calm < nervous);
        assert!(nervous <= pass::MAX_PRESSURE_PENALTY);
    }

    #[test]
    fn test_skill_multiplier_range() {
        let lo = skill_multiplier(&PlayerAttributes::uniform(0));
        let hi = skill_multiplier(&PlayerAttributes::uniform(100));
        assert!((lo - pass::SKILL_MULT_MIN).abs() < 1e-6);
        assert!((hi - pass::SKILL_MULT_MAX).abs() < 1e-6);
    }

    #[test]
    fn test_pre_release_only_near_lane() {
        let d = PlayerAttributes::uniform(80);
        assert_eq!(pre_release_interception_chance(2.0, &d, 0.0), 0.0);
        let near = pre_release_interception_chance(0.1, &d, 0.0);
        let far = pre_release_interception_chance(1.0, &d, 0.0);
        assert!(near > far && far > 0.0);
        assert!(pre_release_interception_chance(0.1, &d, 1.0) < near);
    }

    #[test]
    fn test_ball_arrives_near_catch_height() {
        let attrs = PlayerAttributes::uniform(70);
        let inp = input(&attrs, 8.0, 10.0);
        let exec = resolve_pass(&inp, &PassRolls { accuracy: 0.0, angle: 0.5, cone: 0.5 });
        let t = 8.0 / exec.speed;
        let z = exec.release.z + exec.velocity.z * t - 0.5 * GRAVITY_MPS2 * t * t;
        assert!((z - pass::CATCH_HEIGHT_M).abs() < 0.05);
    }
}
