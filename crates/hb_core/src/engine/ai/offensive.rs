//! Offensive controller: the ball holder's pass/shoot/dribble choice and
//! off-ball movement for the attacking team.

use nalgebra::Vector2;

use super::{positioning, AiCommand, DribbleIntent};
use crate::engine::calculators::{pass, shot};
use crate::engine::decision::{OffensiveDecisions, RoleAwareOffense};
use crate::engine::geometry;
use crate::engine::match_state::MatchState;
use crate::engine::physics_constants::{ai, movement};
use crate::engine::sim_player::PlayerAction;

/// Carry this far toward goal per decision when driving with the ball.
const DRIVE_STEP_M: f32 = 2.5;
/// Dribble ends when an opponent gets this close.
const DRIBBLE_PRESSURE_M: f32 = 1.0;

pub fn command(state: &MatchState, idx: usize) -> AiCommand {
    let player = &state.players[idx];
    if player.has_ball {
        return holder_command(state, idx);
    }

    // Receiver of a pass in flight runs onto the ball
    if let Some(ctx) = &state.ball.pass {
        if ctx.target == idx && state.ball.is_in_flight() {
            let meet = state.ball.ground_position() + state.ball.ground_velocity() * 0.3;
            let spot = geometry::clamp_to_court(meet);
            return AiCommand::move_to(PlayerAction::ReceivingPass, spot);
        }
    }

    if state.ball.is_loose() || state.ball.is_rolling() {
        let ball = state.ball.ground_position();
        if state.nearest_active(player.side, &ball, state.goalkeeper(player.side)) == Some(idx) {
            return AiCommand::move_to(PlayerAction::ChasingBall, ball);
        }
    }

    if player.role.is_pivot() {
        if let Some(screen) = RoleAwareOffense.screen_opportunity(state, idx) {
            return AiCommand::move_to(PlayerAction::SettingScreen, screen.anchor)
                .on(screen.defender);
        }
    }

    AiCommand::move_to(PlayerAction::MovingToPosition, positioning::attack_spot(state, player))
}

fn holder_command(state: &MatchState, idx: usize) -> AiCommand {
    let offense = RoleAwareOffense;
    let h = &state.players[idx];

    let shot_choice = offense.shot_decision(state, idx);
    if shot_choice.shoot {
        return shoot(shot_choice.jump);
    }

    let forced = h.holding_time >= ai::HOLD_BEFORE_FORCED_S
        || (!h.is_dribbling && h.steps >= ai::STEPS_BEFORE_FORCED)
        || (state.passive.warning_active() && h.holding_time >= 1.0);
    let best = offense.best_pass(state, idx);

    if let Some(candidate) = best {
        if candidate.score >= ai::MIN_PASS_SCORE || forced {
            if forced && shot_choice.eligible && shot_choice.confidence > 0.45 {
                return shoot(shot_choice.jump);
            }
            return AiCommand::new(PlayerAction::PreparingPass)
                .on(candidate.target)
                .timed(pass::prep_time(&h.attributes));
        }
    }
    if forced && shot_choice.eligible {
        return shoot(shot_choice.jump);
    }

    let goal_x = state.attacked_goal_x(h.side);
    let drive = drive_target(h.position, goal_x);

    if h.is_dribbling {
        let pressed = state.nearest_distance(h.side.opponent(), &h.position) < DRIBBLE_PRESSURE_M;
        let arrived = (drive - h.position).norm() < 0.5;
        if pressed || arrived {
            return AiCommand::new(PlayerAction::MovingWithBall).dribbling(DribbleIntent::Stop);
        }
        return AiCommand::move_to(PlayerAction::Dribbling, drive);
    }

    if offense.dribble_decision(state, idx).dribble {
        return AiCommand::move_to(PlayerAction::Dribbling, drive).dribbling(DribbleIntent::Start);
    }

    // No good option: carry toward the formation spot and let the step count
    // force a decision
    AiCommand::move_to(PlayerAction::MovingWithBall, positioning::attack_spot(state, h))
}

fn shoot(jump: bool) -> AiCommand {
    let cmd = AiCommand::new(PlayerAction::PreparingShot).timed(shot::prep_time(jump, false));
    if jump {
        cmd.jumping()
    } else {
        cmd
    }
}

/// A point a few metres toward goal, kept out of the goal area.
fn drive_target(from: Vector2<f32>, goal_x: f32) -> Vector2<f32> {
    let goal = geometry::goal_center(goal_x);
    let to_goal = goal - from;
    let step = if to_goal.norm() > 1e-4 {
        to_goal / to_goal.norm() * DRIVE_STEP_M
    } else {
        Vector2::zeros()
    };
    let spot = geometry::clamp_to_court(from + step);
    geometry::push_outside_goal_area(spot, goal_x, movement::GOAL_AREA_MARGIN_M + 0.3)
}
