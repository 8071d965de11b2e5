//! Tackle success and foul probabilities, computed jointly.

use nalgebra::Vector2;

use crate::engine::physics_constants::{skills, tackle};
use crate::models::PlayerAttributes;

#[derive(Debug, Clone)]
pub struct TackleInput<'a> {
    pub tackler: &'a PlayerAttributes,
    pub target: &'a PlayerAttributes,
    pub tackler_pos: Vector2<f32>,
    pub tackler_vel: Vector2<f32>,
    pub target_pos: Vector2<f32>,
    pub target_vel: Vector2<f32>,
    /// Unit heading of the target
    pub target_facing: Vector2<f32>,
    pub target_max_speed: f32,
    pub tackler_fatigue: f32,
    /// Target had a clear run at goal
    pub denies_clear_chance: bool,
    /// Team aggression modifier (1.0 = neutral)
    pub aggression_modifier: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TackleProbabilities {
    pub success: f32,
    pub foul: f32,
    pub from_behind: bool,
    pub high_speed: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct TackleRolls {
    pub success: f32,
    pub foul: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TackleVerdict {
    Won,
    Evaded,
    Foul,
}

/// tackling 50% / strength 30% / anticipation 20%
pub fn tackler_composite(attrs: &PlayerAttributes) -> f32 {
    skills::normalize(attrs.tackling) * 0.5
        + skills::normalize(attrs.strength) * 0.3
        + skills::normalize(attrs.anticipation) * 0.2
}

/// dribbling 40% / agility 30% / strength 20% / composure 10%
pub fn target_composite(attrs: &PlayerAttributes) -> f32 {
    skills::normalize(attrs.dribbling) * 0.4
        + skills::normalize(attrs.agility) * 0.3
        + skills::normalize(attrs.strength) * 0.2
        + skills::normalize(attrs.composure) * 0.1
}

/// Skill-ratio term in [-cap, cap]: positive when the tackler is stronger.
pub fn skill_ratio_term(tackler: f32, target: f32) -> f32 {
    let ratio = (tackler.max(0.05)) / (target.max(0.05));
    ((ratio - 1.0) * tackle::SKILL_RATIO_SCALE)
        .clamp(-tackle::RATIO_TERM_CAP, tackle::RATIO_TERM_CAP)
}

pub fn is_from_behind(input: &TackleInput) -> bool {
    let to_tackler = input.tackler_pos - input.target_pos;
    let dist = to_tackler.norm();
    if dist < 1e-4 {
        return false;
    }
    input.target_facing.dot(&(to_tackler / dist)) < tackle::FROM_BEHIND_COS
}

/// Speed at which the tackler closes on the target (m/s, >= 0).
pub fn closing_speed(input: &TackleInput) -> f32 {
    let to_target = input.target_pos - input.tackler_pos;
    let dist = to_target.norm();
    if dist < 1e-4 {
        return 0.0;
    }
    let rel = input.tackler_vel - input.target_vel;
    rel.dot(&(to_target / dist)).max(0.0)
}

pub fn tackle_probabilities(input: &TackleInput) -> TackleProbabilities {
    let ratio_term =
        skill_ratio_term(tackler_composite(input.tackler), target_composite(input.target));
    let fatigue = 1.0 - tackle::FATIGUE_PENALTY * input.tackler_fatigue.clamp(0.0, 1.0);
    let success = ((tackle::BASE_SUCCESS + ratio_term) * fatigue)
        .clamp(tackle::MIN_SUCCESS, tackle::MAX_SUCCESS);

    let from_behind = is_from_behind(input);
    let high_speed = input.target_vel.norm() > tackle::HIGH_SPEED_RATIO * input.target_max_speed;
    let aggression = skills::normalize(input.tackler.aggression) * input.aggression_modifier;

    let mut foul = tackle::BASE_FOUL
        + if from_behind { tackle::FROM_BEHIND_FOUL } else { 0.0 }
        + if high_speed { tackle::HIGH_SPEED_FOUL } else { 0.0 }
        + closing_speed(input) * tackle::CLOSING_SPEED_FOUL_PER_MPS
        + aggression * tackle::AGGRESSION_FOUL_WEIGHT
        - ratio_term * 0.2;
    if input.denies_clear_chance {
        foul *= tackle::CLEAR_CHANCE_FOUL_MULT;
    }

    TackleProbabilities {
        success,
        foul: foul.clamp(tackle::MIN_FOUL, tackle::MAX_FOUL),
        from_behind,
        high_speed,
    }
}

/// Foul is checked first: a foul stops play regardless of the ball.
pub fn resolve_tackle(probs: &TackleProbabilities, rolls: &TackleRolls) -> TackleVerdict {
    if rolls.foul < probs.foul {
        TackleVerdict::Foul
    } else if rolls.success < probs.success {
        TackleVerdict::Won
    } else {
        TackleVerdict::Evaded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base<'a>(tackler: &'a PlayerAttributes, target: &'a PlayerAttributes) -> TackleInput<'a> {
        TackleInput {
            tackler,
            target,
            tackler_pos: Vector2::new(11.0, 10.0),
            tackler_vel: Vector2::zeros(),
            target_pos: Vector2::new(10.0, 10.0),
            target_vel: Vector2::zeros(),
            // target faces the tackler
            target_facing: Vector2::new(1.0, 0.0),
            target_max_speed: 7.0,
            tackler_fatigue: 0.0,
            denies_clear_chance: false,
            aggression_modifier: 1.0,
        }
    }

    #[test]
    fn test_from_behind_high_speed_fouls_more() {
        let a = PlayerAttributes::uniform(60);
        let frontal = base(&a, &a);
        let mut behind = base(&a, &a);
        // Target runs away from the tackler at 90% max speed
        behind.target_facing = Vector2::new(-1.0, 0.0);
        behind.target_vel = Vector2::new(-6.3, 0.0);

        let pf = tackle_probabilities(&frontal);
        let pb = tackle_probabilities(&behind);
        assert!(pb.from_behind && pb.high_speed);
        assert!(!pf.from_behind && !pf.high_speed);
        assert!(pb.foul > pf.foul);
    }

    #[test]
    fn test_clear_chance_amplifies_foul() {
        let a = PlayerAttributes::uniform(60);
        let plain = tackle_probabilities(&base(&a, &a));
        let mut chance = base(&a, &a);
        chance.denies_clear_chance = true;
        assert!(tackle_probabilities(&chance).foul > plain.foul);
    }

    #[test]
    fn test_skill_ratio_moves_success() {
        let strong = PlayerAttributes::uniform(90);
        let weak = PlayerAttributes::uniform(30);
        let good = tackle_probabilities(&base(&strong, &weak));
        let bad = tackle_probabilities(&base(&weak, &strong));
        assert!(good.success > tackle::BASE_SUCCESS);
        assert!(bad.success < tackle::BASE_SUCCESS);
        assert!(good.foul < bad.foul);
    }

    #[test]
    fn test_resolve_order() {
        let p =
            TackleProbabilities { success: 0.5, foul: 0.2, from_behind: false, high_speed: false };
        let verdict = |success, foul| resolve_tackle(&p, &TackleRolls { success, foul });
        assert_eq!(verdict(0.1, 0.1), TackleVerdict::Foul);
        assert_eq!(verdict(0.1, 0.5), TackleVerdict::Won);
        assert_eq!(verdict(0.9, 0.5), TackleVerdict::Evaded);
    }

    #[test]
    fn test_closing_speed() {
        let a = PlayerAttributes::uniform(60);
        let mut inp = base(&a, &a);
        inp.tackler_vel = Vector2::new(-3.0, 0.0);
        assert!((closing_speed(&inp) - 3.0).abs() < 1e-6);
        inp.tackler_vel = Vector2::new(3.0, 0.0);
        assert_eq!(closing_speed(&inp), 0.0);
    }
}
