//! Player personality -> tendency modifier.

use super::DecisionKind;
use crate::engine::physics_constants::skills::normalize;
use crate::models::PlayerAttributes;

pub struct PersonalityEvaluator;

impl PersonalityEvaluator {
    pub fn modifier(attrs: &PlayerAttributes, kind: DecisionKind) -> f32 {
        let t = match kind {
            DecisionKind::Pass => {
                normalize(attrs.teamwork) * 0.6
                    + normalize(attrs.decision_making) * 0.2
                    + (1.0 - normalize(attrs.flair)) * 0.2
            }
            DecisionKind::Shot => {
                normalize(attrs.flair) * 0.3
                    + normalize(attrs.bravery) * 0.3
                    + normalize(attrs.determination) * 0.2
                    + normalize(attrs.aggression) * 0.2
            }
            DecisionKind::Dribble => {
                normalize(attrs.flair) * 0.6 + normalize(attrs.bravery) * 0.4
            }
            DecisionKind::Tackle => {
                normalize(attrs.aggression) * 0.6 + normalize(attrs.bravery) * 0.4
            }
        };
        0.85 + 0.3 * t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range() {
        let kinds =
            [DecisionKind::Pass, DecisionKind::Shot, DecisionKind::Dribble, DecisionKind::Tackle];
        for kind in kinds {
            let lo = PersonalityEvaluator::modifier(&PlayerAttributes::uniform(0), kind);
            let hi = PersonalityEvaluator::modifier(&PlayerAttributes::uniform(100), kind);
            assert!(lo >= 0.85 - 1e-6 && hi <= 1.15 + 1e-6);
        }
    }

    #[test]
    fn test_team_player_passes_more() {
        let team_player =
            PlayerAttributes { teamwork: 95, flair: 20, ..PlayerAttributes::uniform(50) };
        let soloist = PlayerAttributes { teamwork: 20, flair: 95, ..PlayerAttributes::uniform(50) };
        assert!(
            PersonalityEvaluator::modifier(&team_player, DecisionKind::Pass)
                > PersonalityEvaluator::modifier(&soloist, DecisionKind::Pass)
        );
        assert!(
            PersonalityEvaluator::modifier(&soloist, DecisionKind::Dribble)
                > PersonalityEvaluator::modifier(&team_player, DecisionKind::Dribble)
        );
    }
}
