//! Context evaluators producing risk/aggression multipliers.
//!
//! The three modifiers are multiplied together and applied to decision
//! utilities and, where relevant, to calculator inputs.

pub mod game_state;
pub mod personality;
pub mod tactical;

pub use game_state::GameStateEvaluator;
pub use personality::PersonalityEvaluator;
pub use tactical::TacticalEvaluator;

use crate::engine::match_state::MatchState;
use crate::engine::sim_player::SimPlayer;

/// Which decision the modifiers are computed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionKind {
    Pass,
    Shot,
    Dribble,
    Tackle,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskModifiers {
    pub tactical: f32,
    pub personality: f32,
    pub game_state: f32,
}

impl Default for RiskModifiers {
    fn default() -> Self {
        Self { tactical: 1.0, personality: 1.0, game_state: 1.0 }
    }
}

impl RiskModifiers {
    pub fn product(&self) -> f32 {
        self.tactical * self.personality * self.game_state
    }

    /// All three evaluators for `player` making a `kind` decision.
    pub fn for_decision(state: &MatchState, player: &SimPlayer, kind: DecisionKind) -> Self {
        let tactic = &state.team(player.side).tactic;
        Self {
            tactical: TacticalEvaluator::modifier(tactic, kind),
            personality: PersonalityEvaluator::modifier(&player.attributes, kind),
            game_state: GameStateEvaluator::modifier(
                state.goal_difference(player.side),
                state.remaining(),
                state.config.total_secs(),
                state.passive.warning_active() && state.passive.team() == Some(player.side),
                kind,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_of_neutral_is_one() {
        assert_eq!(RiskModifiers::default().product(), 1.0);
        let m = RiskModifiers { tactical: 1.2, personality: 0.5, game_state: 2.0 };
        assert!((m.product() - 1.2).abs() < 1e-6);
    }
}
