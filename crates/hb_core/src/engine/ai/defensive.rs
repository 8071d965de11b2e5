//! Defensive controller: maps the layered defensive choice onto an action.

use super::AiCommand;
use crate::engine::decision::{DefensiveChoice, DefensiveDecisions, LayeredDefense};
use crate::engine::match_state::MatchState;
use crate::engine::physics_constants::tackle;
use crate::engine::sim_player::PlayerAction;

pub fn command(state: &MatchState, idx: usize) -> AiCommand {
    match LayeredDefense.decide(state, idx) {
        DefensiveChoice::Idle => AiCommand::idle(),
        DefensiveChoice::Mark { target, spot } => {
            AiCommand::move_to(PlayerAction::MarkingPlayer, spot).on(target)
        }
        DefensiveChoice::Tackle { target } => AiCommand::new(PlayerAction::Tackling)
            .on(target)
            .toward(state.players[target].position)
            .timed(tackle::PREP_S),
        DefensiveChoice::Block { spot } => AiCommand::move_to(PlayerAction::Blocking, spot),
        DefensiveChoice::ChaseBall => {
            AiCommand::move_to(PlayerAction::ChasingBall, state.ball.ground_position())
        }
        DefensiveChoice::Position { spot } => {
            AiCommand::move_to(PlayerAction::MovingToPosition, spot)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::geometry;
    use crate::engine::test_fixtures::{clear_side, fixture_state, place, player_with_role};
    use crate::models::{PlayerRole, TeamSide};
    use nalgebra::Vector2;

    #[test]
    fn test_tackle_command_is_timed() {
        let mut state = fixture_state(5);
        clear_side(&mut state, TeamSide::Home);
        let goal_x = state.defended_goal_x(TeamSide::Away);
        let dir = geometry::into_court(goal_x);
        let holder = player_with_role(&state, TeamSide::Home, PlayerRole::CentreBack);
        let defender = player_with_role(&state, TeamSide::Away, PlayerRole::CentreBack);
        place(&mut state, holder, Vector2::new(goal_x + dir * 9.5, 10.0));
        place(&mut state, defender, Vector2::new(goal_x + dir * 8.8, 10.0));
        state.give_ball_to(holder);

        let cmd = command(&state, defender);
        assert_eq!(cmd.action, PlayerAction::Tackling);
        assert_eq!(cmd.target_player, Some(holder));
        assert_eq!(cmd.timer, Some(tackle::PREP_S));
    }

    #[test]
    fn test_far_defender_returns_to_formation() {
        let mut state = fixture_state(5);
        clear_side(&mut state, TeamSide::Home);
        let holder = player_with_role(&state, TeamSide::Home, PlayerRole::CentreBack);
        place(&mut state, holder, Vector2::new(20.0, 10.0));
        state.give_ball_to(holder);
        let wing = player_with_role(&state, TeamSide::Away, PlayerRole::LeftWing);
        place(&mut state, wing, Vector2::new(35.0, 16.0));
        let cmd = command(&state, wing);
        assert!(matches!(cmd.action, PlayerAction::MovingToPosition | PlayerAction::Idle));
    }
}
