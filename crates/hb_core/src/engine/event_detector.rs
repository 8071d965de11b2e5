//! Tick-level event detection not tied to a player's timer.
//!
//! Reactive checks (interception, block, pickup) run first and stop at the
//! first event; passive checks (goal line, sideline, carry violations) run
//! afterwards and also stop at the first event.

use log::debug;
use nalgebra::{Vector2, Vector3};

use super::action_result::{ActionResult, BlockKind, Outcome, ReasonTag};
use super::calculators::{
    block_kind, block_probability, catch_probability, interception_probability, rebound_velocity,
    save_probability, BlockInput, InterceptionInput, SaveInput,
};
use super::geometry;
use super::match_state::MatchState;
use super::physics_constants::{block, court, interception, pass, shot};
use crate::models::TeamSide;

/// Players pick up a free ball within this distance.
const PICKUP_RADIUS_M: f32 = 1.0;
const PICKUP_MAX_HEIGHT_M: f32 = 1.5;
/// Parried balls bounce back into play at this speed.
const PARRY_SPEED_MPS: f32 = 5.0;
const FUMBLE_SPEED_MPS: f32 = 2.0;

// ====== Reactive ======

pub fn detect_reactive(state: &mut MatchState) -> Option<ActionResult> {
    check_interception(state)
        .or_else(|| check_block(state))
        .or_else(|| check_pickup(state))
}

/// Ground segment the ball travelled this tick.
fn ball_path(state: &MatchState) -> (Vector2<f32>, Vector2<f32>) {
    let prev = state.ball.previous_position;
    (Vector2::new(prev.x, prev.y), state.ball.ground_position())
}

fn check_interception(state: &mut MatchState) -> Option<ActionResult> {
    let ctx = state.ball.pass.clone()?;
    if !state.ball.is_in_flight() || state.ball.position.z > interception::MAX_BALL_HEIGHT_M {
        return None;
    }
    let (a, b) = ball_path(state);
    let candidates: Vec<(usize, f32)> = state
        .on_court(ctx.team.opponent())
        .filter(|d| d.can_act() && !d.is_goalkeeper())
        .filter_map(|d| {
            let closest = geometry::closest_point_on_segment(&d.position, &a, &b);
            let chance = interception_probability(&InterceptionInput {
                defender: &d.attributes,
                defender_pos: d.position,
                defender_vel: d.velocity,
                facing: d.facing(),
                ball_pos: closest,
                fatigue: d.fatigue(),
            });
            (chance > 0.0).then_some((d.idx, chance))
        })
        .collect();

    for (d, chance) in candidates {
        if state.roll() < chance {
            let at = state.players[d].position;
            return Some(
                ActionResult::new(Outcome::Intercepted, ReasonTag::PassIntercepted)
                    .with_primary(d)
                    .with_secondary(ctx.passer)
                    .with_holder(d)
                    .at(at),
            );
        }
    }
    None
}

fn check_block(state: &mut MatchState) -> Option<ActionResult> {
    let ctx = state.ball.shot.clone()?;
    if !state.ball.is_in_flight()
        || state.ball.position.z > block::MAX_BALL_HEIGHT_M
        || ctx.is_penalty
    {
        return None;
    }
    let (a, b) = ball_path(state);
    let candidates: Vec<(usize, f32)> = state
        .on_court(ctx.team.opponent())
        .filter(|d| d.is_active() && !d.is_goalkeeper())
        .filter_map(|d| {
            let path_distance_m = geometry::distance_point_to_segment(&d.position, &a, &b);
            let chance = block_probability(&BlockInput {
                blocker: &d.attributes,
                path_distance_m,
                active_block: d.action == super::sim_player::PlayerAction::Blocking,
                fatigue: d.fatigue(),
            });
            (chance > 0.0).then_some((d.idx, chance))
        })
        .collect();

    for (d, chance) in candidates {
        if state.roll() >= chance {
            continue;
        }
        let kind = block_kind(state.roll());
        let at = state.players[d].position;
        let mut result = ActionResult::new(Outcome::Blocked(kind), ReasonTag::ShotBlocked)
            .with_primary(d)
            .with_secondary(ctx.shooter)
            .at(at);
        result = match kind {
            BlockKind::Caught => result.with_holder(d),
            BlockKind::Deflected => {
                let spread_roll = state.roll();
                result.with_velocity(rebound_velocity(&state.ball.velocity, spread_roll))
            }
            BlockKind::OverGoalLine => result.with_restart_team(ctx.team),
        };
        return Some(result);
    }
    None
}

fn check_pickup(state: &mut MatchState) -> Option<ActionResult> {
    if state.ball.is_held() {
        return None;
    }

    // Intended receiver of a pass in flight
    if let Some(ctx) = state.ball.pass.clone() {
        if state.ball.is_in_flight() {
            let r = &state.players[ctx.target];
            let (a, b) = ball_path(state);
            let reach = geometry::distance_point_to_segment(&r.position, &a, &b);
            let catchable = state.ball.position.z <= interception::MAX_BALL_HEIGHT_M;
            if r.can_act() && reach <= pass::CATCH_RADIUS_M && catchable {
                let chance = catch_probability(&r.attributes, state.ball.velocity.norm());
                let at = r.position;
                if state.roll() < chance {
                    return Some(
                        ActionResult::success(ReasonTag::PassReceived, ctx.target)
                            .with_secondary(ctx.passer)
                            .with_holder(ctx.target)
                            .at(at),
                    );
                }
                let v = state.ball.ground_velocity();
                let spill = if v.norm() > 1e-4 {
                    v / v.norm() * FUMBLE_SPEED_MPS
                } else {
                    Vector2::zeros()
                };
                return Some(
                    ActionResult::new(Outcome::Failure, ReasonTag::PassFumbled)
                        .with_primary(ctx.target)
                        .with_secondary(ctx.passer)
                        .with_velocity(Vector3::new(spill.x, spill.y, 0.0))
                        .at(at),
                );
            }
        }
    }

    if state.ball.is_in_flight() || state.ball.position.z > PICKUP_MAX_HEIGHT_M {
        return None;
    }
    let ball = state.ball.ground_position();
    // Inside a goal area only its keeper may pick the ball up
    let keeper_only = [court::LEFT_GOAL_X, court::RIGHT_GOAL_X]
        .into_iter()
        .find(|&gx| geometry::is_in_goal_area(&ball, gx));

    let mut best: Option<(usize, f32)> = None;
    for p in state.active_players() {
        if !p.can_act() {
            continue;
        }
        if let Some(gx) = keeper_only {
            if !(p.is_goalkeeper() && (state.defended_goal_x(p.side) - gx).abs() < 1e-3) {
                continue;
            }
        }
        let d = (p.position - ball).norm();
        if d <= PICKUP_RADIUS_M && best.map_or(true, |(_, bd)| d < bd) {
            best = Some((p.idx, d));
        }
    }
    best.map(|(idx, _)| {
        ActionResult::success(ReasonTag::LooseBallPickup, idx).with_holder(idx).at(ball)
    })
}

// ====== Passive ======

pub fn detect_passive(state: &mut MatchState) -> Option<ActionResult> {
    check_goal_line(state)
        .or_else(|| check_sideline(state))
        .or_else(|| check_carry_violations(state))
}

/// Side that defends the goal at `goal_x` right now.
fn defender_of(state: &MatchState, goal_x: f32) -> TeamSide {
    if (state.defended_goal_x(TeamSide::Home) - goal_x).abs() < 1e-3 {
        TeamSide::Home
    } else {
        TeamSide::Away
    }
}

fn check_goal_line(state: &mut MatchState) -> Option<ActionResult> {
    if state.ball.is_held() {
        return None;
    }
    let prev = state.ball.previous_position;
    let curr = state.ball.position;
    let (goal_x, crossing) = [court::LEFT_GOAL_X, court::RIGHT_GOAL_X]
        .into_iter()
        .find_map(|gx| geometry::goal_line_crossing(&prev, &curr, gx).map(|c| (gx, c)))?;
    let defending = defender_of(state, goal_x);
    let at = Vector2::new(crossing.x, crossing.y);

    if let Some(ctx) = state.ball.shot.clone() {
        if ctx.team != defending {
            if !geometry::is_in_goal_mouth(crossing.y, crossing.z) {
                return Some(
                    ActionResult::new(Outcome::Miss, ReasonTag::ShotMissed)
                        .with_primary(ctx.shooter)
                        .with_restart_team(defending)
                        .at(at),
                );
            }
            let keeper = state.goalkeeper(defending).filter(|&k| state.players[k].is_active());
            if let Some(keeper) = keeper {
                let k = &state.players[keeper];
                let chance = save_probability(&SaveInput {
                    keeper: &k.attributes,
                    keeper_pos: k.position,
                    crossing,
                    shot_speed: ctx.speed,
                    save_difficulty: ctx.save_difficulty,
                    keeper_fatigue: k.fatigue(),
                });
                let keeper_pos = k.position;
                if state.roll() < chance {
                    let saved = ActionResult::new(Outcome::Saved, ReasonTag::ShotSaved)
                        .with_primary(keeper)
                        .with_secondary(ctx.shooter)
                        .at(keeper_pos);
                    if state.roll() < shot::SAVE_HOLD_CHANCE {
                        return Some(saved.with_holder(keeper));
                    }
                    let out = geometry::into_court(goal_x);
                    let spread = state.roll_range(-1.0, 1.0);
                    let parry = Vector3::new(out * PARRY_SPEED_MPS, spread * PARRY_SPEED_MPS, 1.5);
                    return Some(saved.with_velocity(parry));
                }
            }
            debug!("goal: crossing at y={:.2} z={:.2}", crossing.y, crossing.z);
            let mut goal = ActionResult::new(Outcome::Goal, ReasonTag::GoalScored)
                .with_primary(ctx.shooter)
                .at(at);
            if let Some((passer, receiver)) = state.last_pass {
                if receiver == ctx.shooter && passer != ctx.shooter {
                    goal = goal.with_secondary(passer);
                }
            }
            return Some(goal);
        }
    }

    // Non-shot over the goal line: a defending field player's touch gives
    // the attack a throw-in, otherwise the keeper restarts
    let toucher = state.ball.last_touch_player;
    let defender_touched = state.ball.last_touch_team == Some(defending)
        && toucher.map_or(false, |t| !state.players[t].is_goalkeeper());
    let restart_team = if defender_touched { defending.opponent() } else { defending };
    Some(
        ActionResult::new(Outcome::OutOfBounds, ReasonTag::GoalLine)
            .with_restart_team(restart_team)
            .at(geometry::clamp_to_court(at)),
    )
}

fn check_sideline(state: &mut MatchState) -> Option<ActionResult> {
    if state.ball.is_held() {
        return None;
    }
    let p = state.ball.position;
    if (0.0..=court::WIDTH_M).contains(&p.y) {
        return None;
    }
    let restart_team = match state.ball.last_touch_team {
        Some(team) => team.opponent(),
        None => state.possession.team().map(|t| t.opponent()).unwrap_or(TeamSide::Home),
    };
    let at = Vector2::new(p.x.clamp(0.0, court::LENGTH_M), p.y.clamp(0.0, court::WIDTH_M));
    Some(
        ActionResult::new(Outcome::OutOfBounds, ReasonTag::Sideline)
            .with_restart_team(restart_team)
            .at(at),
    )
}

fn check_carry_violations(state: &mut MatchState) -> Option<ActionResult> {
    let h = state.holder()?;
    let p = &state.players[h];
    let reason = if p.steps_violated() {
        ReasonTag::StepsViolation
    } else if p.holding_violated() {
        ReasonTag::HoldingViolation
    } else {
        return None;
    };
    Some(
        ActionResult::new(Outcome::Turnover, reason)
            .with_primary(h)
            .with_restart_team(p.side.opponent())
            .at(p.position),
    )
}
