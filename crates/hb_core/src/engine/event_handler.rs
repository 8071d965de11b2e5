//! Applies resolved outcomes to the match.
//!
//! This is the only place that changes score, possession, statistics and
//! discipline. Phase changes are requested through `MatchState::request_phase`
//! and applied once per tick by the orchestrator.

use log::{debug, info, warn};
use nalgebra::{Vector2, Vector3};

use super::action_result::{ActionResult, BlockKind, FoulDetails, FoulSeverity, Outcome, ReasonTag};
use super::ball::PassContext;
use super::geometry;
use super::match_state::{MatchState, Possession, Restart, RestartKind};
use super::messages::SimMessage;
use super::phase::MatchPhase;
use super::physics_constants::{court, movement, pass, shot, suspension};
use crate::error::{Result, SimError};
use crate::models::{EventKind, TeamSide};

/// Goal throws are taken from inside the goal area, this far off the line.
const GOAL_THROW_DEPTH_M: f32 = 3.0;

pub fn apply(state: &mut MatchState, result: ActionResult) -> Result<()> {
    debug!("outcome {:?} ({})", result.outcome, result.reason.as_str());
    match result.reason {
        ReasonTag::PassReleased => on_pass_released(state, &result)?,
        ReasonTag::PassReceived => on_pass_received(state, &result)?,
        ReasonTag::PassFumbled => on_pass_fumbled(state, &result),
        ReasonTag::PassIntercepted | ReasonTag::PassInterceptedBeforeRelease => {
            on_interception(state, &result)?
        }
        ReasonTag::ShotTaken | ReasonTag::PenaltyShot => on_shot_taken(state, &result)?,
        ReasonTag::ShotZoneViolation => {
            debug!("shot cancelled by the goal-area rule");
        }
        ReasonTag::ShotSaved => on_save(state, &result)?,
        ReasonTag::ShotBlocked => on_block(state, &result)?,
        ReasonTag::GoalScored => on_goal(state, &result)?,
        ReasonTag::ShotMissed => on_miss(state, &result)?,
        ReasonTag::TackleWon => on_tackle_won(state, &result)?,
        ReasonTag::TackleEvaded => {
            let tackler = primary(&result)?;
            state.stats_mut(tackler).tackles_attempted += 1;
            state.players[tackler].fall();
        }
        ReasonTag::TackleOutOfRange => {}
        ReasonTag::TackleFoul => on_foul(state, &result)?,
        ReasonTag::LooseBallPickup => on_pickup(state, &result)?,
        ReasonTag::GoalLine | ReasonTag::Sideline => on_out_of_bounds(state, &result)?,
        ReasonTag::StepsViolation | ReasonTag::HoldingViolation => {
            on_technical_fault(state, &result)?
        }
        ReasonTag::PassivePlay => on_passive_play(state, &result)?,
        ReasonTag::UnhandledPreparedAction => {
            warn!("prepared action without a resolver (player {:?})", result.primary);
        }
    }
    Ok(())
}

/// Hands queued messages to the managers that listen for them.
pub fn drain_messages(state: &mut MatchState) {
    while let Some(msg) = state.messages.pop_front() {
        state.passive.on_message(&msg);
    }
}

fn primary(result: &ActionResult) -> Result<usize> {
    result
        .primary
        .ok_or_else(|| {
            SimError::Runtime(format!("{} without an acting player", result.reason.as_str()))
        })
}

fn secondary(result: &ActionResult) -> Result<usize> {
    result
        .secondary
        .ok_or_else(|| {
            SimError::Runtime(format!("{} without a second player", result.reason.as_str()))
        })
}

fn impact(state: &MatchState, result: &ActionResult) -> Vector2<f32> {
    result.impact_position.unwrap_or_else(|| state.ball.ground_position())
}

// ====== Passing ======

fn on_pass_released(state: &mut MatchState, result: &ActionResult) -> Result<()> {
    let passer = primary(result)?;
    let target = secondary(result)?;
    let velocity = result
        .ball_velocity
        .ok_or_else(|| SimError::Runtime("pass released without a launch velocity".into()))?;
    let side = state.players[passer].side;
    let origin = impact(state, result);

    state.players[passer].release_ball();
    state.ball.launch_pass(
        PassContext { passer, target, team: side, origin },
        Vector3::new(origin.x, origin.y, pass::RELEASE_HEIGHT_M),
        velocity,
    );
    state.stats_mut(passer).passes_attempted += 1;
    state.team_stats_mut(side).passes_attempted += 1;
    Ok(())
}

fn on_pass_received(state: &mut MatchState, result: &ActionResult) -> Result<()> {
    let receiver = primary(result)?;
    let passer = secondary(result)?;
    let side = state.players[receiver].side;

    state.give_ball_to(receiver);
    state.players[receiver].since_pass_received = Some(0.0);
    state.players[receiver].reset_action();
    state.last_pass = Some((passer, receiver));
    state.stats_mut(passer).passes_completed += 1;
    state.team_stats_mut(side).passes_completed += 1;
    state.messages.push_back(SimMessage::PassCompleted { team: side, passer, receiver });
    Ok(())
}

fn on_pass_fumbled(state: &mut MatchState, result: &ActionResult) {
    let at = state.ball.position;
    let velocity = result.ball_velocity.unwrap_or_else(Vector3::zeros);
    state.ball.make_loose(Vector3::new(at.x, at.y, 0.0), velocity);
    if let Some(receiver) = result.primary {
        state.players[receiver].reset_action();
    }
    state.set_possession(Possession::Contested);
    state.request_phase(MatchPhase::ContestedBall);
}

fn on_interception(state: &mut MatchState, result: &ActionResult) -> Result<()> {
    let defender = primary(result)?;
    let passer = secondary(result)?;
    let side = state.players[defender].side;

    state.players[passer].reset_action();
    state.give_ball_to(defender);
    state.players[defender].reset_action();
    state.stats_mut(defender).interceptions += 1;
    state.team_stats_mut(side).interceptions += 1;
    state.stats_mut(passer).turnovers += 1;
    state.team_stats_mut(side.opponent()).turnovers += 1;
    let desc = format!(
        "{} intercepts the pass from {}",
        state.players[defender].name, state.players[passer].name
    );
    state.log_event(EventKind::Interception, desc, Some(side), Some(defender));
    state.request_phase(MatchPhase::transition_for(side));
    Ok(())
}

// ====== Shooting ======

fn on_shot_taken(state: &mut MatchState, result: &ActionResult) -> Result<()> {
    let shooter = primary(result)?;
    let ctx = result
        .shot
        .clone()
        .ok_or_else(|| SimError::Runtime("shot released without a shot context".into()))?;
    let velocity = result
        .ball_velocity
        .ok_or_else(|| SimError::Runtime("shot released without a launch velocity".into()))?;
    let jump = state.players[shooter].is_airborne() || state.players[shooter].jump_shot;
    let height = if jump { shot::RELEASE_HEIGHT_JUMP_M } else { shot::RELEASE_HEIGHT_GROUND_M };
    let team = ctx.team;
    let is_penalty = ctx.is_penalty;
    let origin = ctx.origin;

    state.players[shooter].release_ball();
    state.ball.launch_shot(ctx, Vector3::new(origin.x, origin.y, height), velocity);
    state.stats_mut(shooter).shots += 1;
    state.team_stats_mut(team).shots += 1;
    if is_penalty {
        state.team_stats_mut(team).seven_meter_attempts += 1;
        state.request_phase(MatchPhase::attack_for(team));
    }
    state.messages.push_back(SimMessage::ShotTaken { team, shooter });
    let desc = if is_penalty {
        format!("{} takes the 7m throw", state.players[shooter].name)
    } else {
        let distance = geometry::distance_to_goal_mouth(&origin, state.attacked_goal_x(team));
        format!("{} shoots from {:.1}m", state.players[shooter].name, distance)
    };
    state.log_event(EventKind::Shot, desc, Some(team), Some(shooter));
    Ok(())
}

fn count_on_target(state: &mut MatchState, shooter: usize) {
    let side = state.players[shooter].side;
    state.stats_mut(shooter).shots_on_target += 1;
    state.team_stats_mut(side).shots_on_target += 1;
}

fn on_save(state: &mut MatchState, result: &ActionResult) -> Result<()> {
    let keeper = primary(result)?;
    let shooter = secondary(result)?;
    let side = state.players[keeper].side;
    count_on_target(state, shooter);
    state.stats_mut(keeper).saves += 1;
    state.team_stats_mut(side).saves += 1;
    let desc = format!("{} saves from {}", state.players[keeper].name, state.players[shooter].name);
    state.log_event(EventKind::Save, desc, Some(side), Some(keeper));

    if result.possession_holder == Some(keeper) {
        state.give_ball_to(keeper);
        state.players[keeper].reset_action();
        state.request_phase(MatchPhase::transition_for(side));
    } else {
        let at = state.players[keeper].position;
        let velocity = result.ball_velocity.unwrap_or_else(Vector3::zeros);
        state.ball.make_loose(Vector3::new(at.x, at.y, 0.5), velocity);
        state.ball.last_touch_team = Some(side);
        state.ball.last_touch_player = Some(keeper);
        state.set_possession(Possession::Contested);
        state.request_phase(MatchPhase::ContestedBall);
    }
    Ok(())
}

fn on_block(state: &mut MatchState, result: &ActionResult) -> Result<()> {
    let blocker = primary(result)?;
    let shooter = secondary(result)?;
    let side = state.players[blocker].side;
    let Outcome::Blocked(kind) = result.outcome else {
        return Err(SimError::Runtime(format!("block reason with outcome {:?}", result.outcome)));
    };
    state.stats_mut(blocker).blocks += 1;
    state.team_stats_mut(side).blocks += 1;
    let desc = format!(
        "{} blocks the shot of {}",
        state.players[blocker].name, state.players[shooter].name
    );
    state.log_event(EventKind::Block, desc, Some(side), Some(blocker));

    match kind {
        BlockKind::Caught => {
            state.give_ball_to(blocker);
            state.players[blocker].reset_action();
            state.request_phase(MatchPhase::transition_for(side));
        }
        BlockKind::Deflected => {
            let at = state.ball.position;
            let velocity = result.ball_velocity.unwrap_or_else(Vector3::zeros);
            state.ball.make_loose(at, velocity);
            state.ball.last_touch_team = Some(side);
            state.ball.last_touch_player = Some(blocker);
            state.set_possession(Possession::Contested);
            state.request_phase(MatchPhase::ContestedBall);
        }
        BlockKind::OverGoalLine => {
            let attack = result.restart_team.unwrap_or_else(|| side.opponent());
            let goal_x = state.defended_goal_x(side);
            let at = impact(state, result);
            award_restart(state, RestartKind::ThrowIn, attack, corner_spot(goal_x, at.y));
        }
    }
    Ok(())
}

fn on_goal(state: &mut MatchState, result: &ActionResult) -> Result<()> {
    let shooter = primary(result)?;
    let team = state.players[shooter].side;
    let conceding = team.opponent();
    let is_penalty = state.ball.shot.as_ref().map_or(false, |s| s.is_penalty);

    state.scores[team.index()] += 1;
    count_on_target(state, shooter);
    state.stats_mut(shooter).goals += 1;
    state.team_stats_mut(team).goals += 1;
    if is_penalty {
        state.team_stats_mut(team).seven_meter_goals += 1;
    }
    if let Some(assist) = result.secondary {
        state.stats_mut(assist).assists += 1;
    }
    state.team_mut(team).unanswered_goals_against = 0;
    let against = &mut state.team_mut(conceding).unanswered_goals_against;
    *against = against.saturating_add(1);
    state.last_goal_team = Some(team);
    state.messages.push_back(SimMessage::GoalScored { team });

    let desc = format!(
        "GOAL! {} scores ({}-{})",
        state.players[shooter].name,
        state.score(TeamSide::Home),
        state.score(TeamSide::Away)
    );
    info!("{}", desc);
    state.log_event(EventKind::Goal, desc, Some(team), Some(shooter));

    reset_players(state);
    award_restart(state, RestartKind::KickOff, conceding, geometry::center_spot());
    Ok(())
}

fn on_miss(state: &mut MatchState, result: &ActionResult) -> Result<()> {
    let shooter = primary(result)?;
    let team = state.players[shooter].side;
    let defending = result.restart_team.unwrap_or_else(|| team.opponent());
    let desc = format!("{} misses the target", state.players[shooter].name);
    state.log_event(EventKind::Miss, desc, Some(team), Some(shooter));
    award_goal_throw(state, defending);
    Ok(())
}

// ====== Duels ======

fn on_tackle_won(state: &mut MatchState, result: &ActionResult) -> Result<()> {
    let tackler = primary(result)?;
    let victim = secondary(result)?;
    let side = state.players[tackler].side;

    state.players[victim].reset_action();
    state.give_ball_to(tackler);
    state.players[tackler].reset_action();
    let stats = state.stats_mut(tackler);
    stats.tackles_attempted += 1;
    stats.tackles_won += 1;
    state.team_stats_mut(side).tackles_won += 1;
    state.stats_mut(victim).turnovers += 1;
    state.team_stats_mut(side.opponent()).turnovers += 1;
    let desc = format!(
        "{} steals the ball from {}",
        state.players[tackler].name, state.players[victim].name
    );
    state.log_event(EventKind::Turnover, desc, Some(side), Some(tackler));
    state.request_phase(MatchPhase::transition_for(side));
    Ok(())
}

fn on_foul(state: &mut MatchState, result: &ActionResult) -> Result<()> {
    let offender = primary(result)?;
    let victim = secondary(result)?;
    let details = result
        .foul
        .ok_or_else(|| SimError::Runtime("foul without details".into()))?;
    let side = state.players[offender].side;
    let fouled = side.opponent();

    state.stats_mut(offender).tackles_attempted += 1;
    state.stats_mut(offender).fouls_committed += 1;
    state.team_stats_mut(side).fouls += 1;
    let desc = format!(
        "{} fouls {} ({})",
        state.players[offender].name,
        state.players[victim].name,
        details.severity.label()
    );
    state.log_event(EventKind::Foul, desc, Some(side), Some(offender));

    punish(state, offender, &details);

    state.players[victim].reset_action();
    if details.penalty_throw {
        let mark = geometry::penalty_mark(state.attacked_goal_x(fouled));
        award_restart(state, RestartKind::SevenMeter, fouled, mark);
    } else {
        let spot = free_throw_spot(state, fouled, details.position);
        award_restart(state, RestartKind::FreeThrow, fouled, spot);
    }
    Ok(())
}

/// Progressive punishment: yellow (while the player and team limits allow),
/// then two minutes, with the third two-minute suspension turning red.
fn punish(state: &mut MatchState, offender: usize, details: &FoulDetails) {
    let side = state.players[offender].side;
    let mut severity = details.severity;

    if severity < FoulSeverity::TwoMinuteSuspension && details.yellow_worthy {
        let player_yellows = state.players[offender].yellow_cards;
        let team_yellows = state.team(side).yellow_cards;
        if player_yellows < suspension::MAX_PLAYER_YELLOWS
            && team_yellows < suspension::MAX_TEAM_YELLOWS
        {
            state.players[offender].yellow_cards += 1;
            state.team_mut(side).yellow_cards += 1;
            state.stats_mut(offender).yellow_cards += 1;
            state.team_stats_mut(side).yellow_cards += 1;
            let desc = format!("Yellow card for {}", state.players[offender].name);
            info!("{}", desc);
            state.log_event(EventKind::YellowCard, desc, Some(side), Some(offender));
            return;
        }
        debug!("yellow limit reached for {}: two minutes instead", state.players[offender].name);
        severity = FoulSeverity::TwoMinuteSuspension;
    }

    match severity {
        FoulSeverity::TwoMinuteSuspension => suspend(state, offender),
        FoulSeverity::RedCard => send_off(state, offender, "Red card"),
        FoulSeverity::FreeThrow | FoulSeverity::PenaltyThrow => {}
    }
}

fn suspend(state: &mut MatchState, offender: usize) {
    let side = state.players[offender].side;
    let count = state.players[offender].two_minute_suspensions.saturating_add(1);
    state.players[offender].two_minute_suspensions = count;
    state.stats_mut(offender).two_minute_suspensions += 1;
    state.team_stats_mut(side).two_minute_suspensions += 1;

    if count >= suspension::TWO_MINUTES_FOR_RED {
        send_off(state, offender, "Third two-minute suspension: red card");
        return;
    }

    state.players[offender].suspension_timer = suspension::TWO_MINUTES_S;
    state.remove_from_court(offender, false);
    let desc = format!("Two minutes for {}", state.players[offender].name);
    info!("{}", desc);
    state.log_event(EventKind::TwoMinuteSuspension, desc, Some(side), Some(offender));
    state.messages.push_back(SimMessage::DefenderSuspended { team: side, player: offender });
}

fn send_off(state: &mut MatchState, offender: usize, reason: &str) {
    let side = state.players[offender].side;
    state.players[offender].red_carded = true;
    state.players[offender].suspension_timer = 0.0;
    state.remove_from_court(offender, true);
    state.team_mut(side).short_handed.push(suspension::RED_CARD_SHORT_HANDED_S);
    state.stats_mut(offender).red_card = true;
    state.team_stats_mut(side).red_cards += 1;
    let desc = format!("{} for {}", reason, state.players[offender].name);
    info!("{}", desc);
    state.log_event(EventKind::RedCard, desc, Some(side), Some(offender));
    state.messages.push_back(SimMessage::DefenderSuspended { team: side, player: offender });
}

// ====== Loose ball / dead ball ======

fn on_pickup(state: &mut MatchState, result: &ActionResult) -> Result<()> {
    let picker = primary(result)?;
    let side = state.players[picker].side;
    let previous = state.possession.team().or(state.ball.last_touch_team);

    state.give_ball_to(picker);
    state.players[picker].reset_action();
    state.players[picker].since_pass_received = None;
    if previous == Some(side) {
        state.request_phase(MatchPhase::attack_for(side));
    } else {
        state.request_phase(MatchPhase::transition_for(side));
    }
    Ok(())
}

fn on_out_of_bounds(state: &mut MatchState, result: &ActionResult) -> Result<()> {
    let team = result
        .restart_team
        .ok_or_else(|| SimError::Runtime("out of bounds without a restart team".into()))?;
    let at = impact(state, result);
    if result.reason == ReasonTag::Sideline {
        award_restart(state, RestartKind::ThrowIn, team, geometry::clamp_to_court(at));
        return Ok(());
    }
    let goal_x = nearest_goal_x(at.x);
    if (state.defended_goal_x(team) - goal_x).abs() < 1e-3 {
        award_goal_throw(state, team);
    } else {
        award_restart(state, RestartKind::ThrowIn, team, corner_spot(goal_x, at.y));
    }
    Ok(())
}

fn on_technical_fault(state: &mut MatchState, result: &ActionResult) -> Result<()> {
    let holder = primary(result)?;
    let side = state.players[holder].side;
    let team = result.restart_team.unwrap_or_else(|| side.opponent());
    state.stats_mut(holder).turnovers += 1;
    state.team_stats_mut(side).turnovers += 1;
    state.team_stats_mut(side).technical_faults += 1;
    let rule = if result.reason == ReasonTag::StepsViolation { "steps" } else { "holding" };
    let desc = format!("Technical fault ({}) by {}", rule, state.players[holder].name);
    state.log_event(EventKind::TechnicalFault, desc, Some(side), Some(holder));

    let at = impact(state, result);
    let spot = free_throw_spot(state, team, at);
    award_restart(state, RestartKind::FreeThrow, team, spot);
    Ok(())
}

fn on_passive_play(state: &mut MatchState, result: &ActionResult) -> Result<()> {
    let team = result
        .restart_team
        .ok_or_else(|| SimError::Runtime("passive play without a restart team".into()))?;
    let offender = team.opponent();
    state.team_stats_mut(offender).turnovers += 1;
    if let Some(holder) = result.primary {
        state.stats_mut(holder).turnovers += 1;
    }
    let desc = format!("Passive play: {} lose the ball", state.team(offender).name);
    state.log_event(EventKind::PassivePlay, desc, Some(offender), result.primary);

    let at = impact(state, result);
    let spot = free_throw_spot(state, team, at);
    award_restart(state, RestartKind::FreeThrow, team, spot);
    Ok(())
}

// ====== Restarts ======

fn nearest_goal_x(x: f32) -> f32 {
    if x < court::HALFWAY_X {
        court::LEFT_GOAL_X
    } else {
        court::RIGHT_GOAL_X
    }
}

/// Corner throw-in next to the goal at `goal_x`.
fn corner_spot(goal_x: f32, y: f32) -> Vector2<f32> {
    let side_y = if y < court::CENTER_Y { 0.0 } else { court::WIDTH_M };
    Vector2::new(goal_x, side_y)
}

/// Free throws are taken where the foul happened, but never inside either
/// goal area or the attacked 9 m zone.
pub(crate) fn free_throw_spot(
    state: &MatchState,
    team: TeamSide,
    at: Vector2<f32>,
) -> Vector2<f32> {
    let attacked = state.attacked_goal_x(team);
    let defended = state.defended_goal_x(team);
    let spot = geometry::push_outside_free_throw_line(geometry::clamp_to_court(at), attacked);
    geometry::push_outside_goal_area(spot, defended, movement::GOAL_AREA_MARGIN_M)
}

fn award_goal_throw(state: &mut MatchState, team: TeamSide) {
    let goal_x = state.defended_goal_x(team);
    let depth = geometry::into_court(goal_x) * GOAL_THROW_DEPTH_M;
    let spot = geometry::goal_center(goal_x) + Vector2::new(depth, 0.0);
    award_restart(state, RestartKind::GoalThrow, team, spot);
}

/// Kills the ball and queues a dead-ball restart for `team`.
pub(crate) fn award_restart(
    state: &mut MatchState,
    kind: RestartKind,
    team: TeamSide,
    position: Vector2<f32>,
) {
    state.strip_holder();
    state.ball.place(position);
    state.restart = Some(Restart { kind, team, position, thrower: None });
    state.set_possession(Possession::Team(team));
    let phase = match kind {
        RestartKind::KickOff => MatchPhase::PreKickOff,
        RestartKind::SevenMeter => MatchPhase::penalty_for(team),
        RestartKind::FreeThrow
        | RestartKind::ThrowIn
        | RestartKind::GoalThrow
        | RestartKind::TimeoutResume => {
            MatchPhase::set_piece_for(team)
        }
    };
    state.request_phase(phase);
}

/// Clears every on-court player's action, ball and sub-state.
fn reset_players(state: &mut MatchState) {
    for p in state.players.iter_mut().filter(|p| p.on_court) {
        p.reset_for_restart();
    }
}
