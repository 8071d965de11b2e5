//! Goalkeeper state selection.

use super::{GoalkeeperDecisions, KeeperChoice, OffensiveDecisions, RoleAwareOffense};
use crate::engine::ai::positioning;
use crate::engine::geometry;
use crate::engine::match_state::MatchState;
use crate::engine::physics_constants::ai;
use crate::engine::sim_player::PlayerAction;

/// Seconds a keeper holds the ball before distributing.
const DISTRIBUTE_AFTER_S: f32 = 0.6;

#[derive(Debug, Clone, Copy, Default)]
pub struct PositionalKeeper;

impl PositionalKeeper {
    /// Shot in flight toward this keeper's goal, or an opponent close to goal
    /// that is approaching or winding up.
    fn threat(state: &MatchState, keeper: usize) -> bool {
        let k = &state.players[keeper];
        let goal_x = state.defended_goal_x(k.side);
        if let Some(shot) = &state.ball.shot {
            let at_us = shot.team != k.side && (shot.goal_x - goal_x).abs() < 1e-3;
            if state.ball.is_in_flight() && at_us {
                return true;
            }
        }
        let Some(h) = state.holder() else {
            return false;
        };
        let holder = &state.players[h];
        if holder.side == k.side {
            return false;
        }
        let goal = geometry::goal_center(goal_x);
        if (holder.position - goal).norm() > ai::GK_CLOSE_SHOT_RANGE_M {
            return false;
        }
        let to_goal = goal - holder.position;
        let approaching = to_goal.norm() > 1e-4 && holder.velocity.dot(&to_goal) > 0.0;
        approaching || matches!(holder.action, PlayerAction::PreparingShot | PlayerAction::Shooting)
    }
}

impl GoalkeeperDecisions for PositionalKeeper {
    fn keeper_choice(&self, state: &MatchState, keeper: usize) -> KeeperChoice {
        let k = &state.players[keeper];
        if k.has_ball {
            if k.holding_time < DISTRIBUTE_AFTER_S {
                return KeeperChoice::Hold;
            }
            return match RoleAwareOffense.best_pass(state, keeper) {
                Some(candidate) => KeeperChoice::Distribute(candidate),
                None => KeeperChoice::Hold,
            };
        }
        if Self::threat(state, keeper) {
            return KeeperChoice::Save;
        }
        KeeperChoice::Position { spot: positioning::goalkeeper_spot(state, k.side) }
    }
}
