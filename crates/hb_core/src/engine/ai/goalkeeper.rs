//! Goalkeeper controller.

use super::AiCommand;
use crate::engine::calculators::pass;
use crate::engine::decision::{GoalkeeperDecisions, KeeperChoice, PositionalKeeper};
use crate::engine::geometry;
use crate::engine::match_state::MatchState;
use crate::engine::physics_constants::court;
use crate::engine::sim_player::PlayerAction;

pub fn command(state: &MatchState, idx: usize) -> AiCommand {
    let keeper = &state.players[idx];
    match PositionalKeeper.keeper_choice(state, idx) {
        KeeperChoice::Hold => AiCommand::idle(),
        KeeperChoice::Distribute(candidate) => AiCommand::new(PlayerAction::PreparingPass)
            .on(candidate.target)
            .timed(pass::prep_time(&keeper.attributes)),
        KeeperChoice::Save => {
            // Step toward the shooter's line on the goal mouth
            let goal_x = state.defended_goal_x(keeper.side);
            let ball = state.ball.ground_position();
            let half = court::GOAL_WIDTH_M / 2.0;
            let y = ball.y.clamp(court::CENTER_Y - half, court::CENTER_Y + half);
            let spot = nalgebra::Vector2::new(goal_x + geometry::into_court(goal_x) * 0.6, y);
            AiCommand::move_to(PlayerAction::GoalkeeperSaving, spot)
        }
        KeeperChoice::Position { spot } => {
            AiCommand::move_to(PlayerAction::GoalkeeperPositioning, spot)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_fixtures::fixture_state;
    use crate::models::TeamSide;

    #[test]
    fn test_keeper_stays_in_goal_area_when_positioning() {
        let state = fixture_state(2);
        let gk = state.goalkeeper(TeamSide::Home).unwrap();
        let cmd = command(&state, gk);
        assert_eq!(cmd.action, PlayerAction::GoalkeeperPositioning);
        let spot = cmd.target_position.unwrap();
        assert!(geometry::is_in_goal_area(&spot, state.defended_goal_x(TeamSide::Home)));
    }
}
