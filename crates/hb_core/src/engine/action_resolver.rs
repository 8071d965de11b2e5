//! Resolves timed player actions when their countdown elapses.
//!
//! The resolver owns each player's micro state machine (preparing -> acting
//! -> idle) but never touches score, possession or the ball: it hands the
//! outcome to the event handler as an `ActionResult`.

use log::debug;
use rand::Rng;
use rand_distr::StandardNormal;

use super::action_result::{ActionResult, Outcome, ReasonTag};
use super::ball::ShotContext;
use super::calculators::{
    assess_foul, pre_release_interception_chance, resolve_pass, resolve_shot, resolve_tackle,
    shot_allowed, tackle_probabilities, FoulContext, PassInput, PassRolls, ShotInput, ShotRolls,
    TackleInput, TackleRolls, TackleVerdict,
};
use super::evaluators::{DecisionKind, RiskModifiers};
use super::geometry;
use super::match_state::MatchState;
use super::physics_constants::{court, shot, tackle};
use super::sim_player::PlayerAction;

/// Follow-through after a release.
const FOLLOW_THROUGH_S: f32 = 0.2;
const TIMER_EPS: f32 = 1e-4;
/// Another defender this close to the attacker means no clear chance.
const COVER_RADIUS_M: f32 = 2.0;

/// Counts down every timed action and resolves the ones that elapsed, in
/// player index order. Once one result has changed who owns the ball, the
/// remaining ball actions wait a tick so they see the new owner.
pub fn resolve_actions(state: &mut MatchState, dt: f32) -> Vec<ActionResult> {
    let mut results = Vec::new();
    let mut ball_settled = false;

    for idx in 0..state.players.len() {
        let Some(timer) = state.players[idx].action_timer else {
            continue;
        };
        if !state.players[idx].is_active() {
            state.players[idx].reset_action();
            continue;
        }
        let remaining = timer - dt;
        if remaining > TIMER_EPS {
            state.players[idx].action_timer = Some(remaining);
            continue;
        }

        let action = state.players[idx].action;
        let touches_ball = matches!(
            action,
            PlayerAction::PreparingPass | PlayerAction::PreparingShot | PlayerAction::Tackling
        );
        if touches_ball && ball_settled {
            state.players[idx].action_timer = Some(0.0);
            continue;
        }

        let result = match action {
            PlayerAction::PreparingPass => resolve_prepared_pass(state, idx),
            PlayerAction::PreparingShot => {
                let zone_roll = state.roll();
                resolve_prepared_shot(state, idx, zone_roll)
            }
            PlayerAction::Tackling => resolve_prepared_tackle(state, idx),
            PlayerAction::Passing | PlayerAction::Shooting => {
                state.players[idx].reset_action();
                None
            }
            other => {
                debug!("{}: no resolver for {}", state.players[idx].name, other.label());
                state.players[idx].reset_action();
                Some(ActionResult::failure(ReasonTag::UnhandledPreparedAction, idx))
            }
        };

        if let Some(r) = result {
            if r.possession_holder.is_some()
                || matches!(
                    r.reason,
                    ReasonTag::PassReleased | ReasonTag::ShotTaken | ReasonTag::PenaltyShot
                )
                || r.outcome == Outcome::Foul
            {
                ball_settled = true;
            }
            results.push(r);
        }
    }
    results
}

// ====== Pass ======

pub(crate) fn resolve_prepared_pass(state: &mut MatchState, idx: usize) -> Option<ActionResult> {
    let passer = &state.players[idx];
    let target = passer.target_player.filter(|&t| {
        let r = &state.players[t];
        r.is_active() && r.side == passer.side && t != idx
    });
    let Some(target) = target else {
        state.players[idx].reset_action();
        return None;
    };
    if !passer.has_ball {
        state.players[idx].reset_action();
        return None;
    }

    let side = passer.side;
    let from = passer.position;
    let to = state.players[target].position;

    // Opponents lurking on the line can strip the ball before release
    let lurkers: Vec<(usize, f32)> = state
        .on_court(side.opponent())
        .filter(|d| d.can_act() && !d.is_goalkeeper())
        .map(|d| (d.idx, geometry::distance_point_to_segment(&d.position, &from, &to)))
        .collect();
    for (d, lane) in lurkers {
        let chance = {
            let def = &state.players[d];
            pre_release_interception_chance(lane, &def.attributes, def.fatigue())
        };
        if chance > 0.0 && state.roll() < chance {
            state.players[idx].reset_action();
            return Some(
                ActionResult::new(Outcome::Intercepted, ReasonTag::PassInterceptedBeforeRelease)
                    .with_primary(d)
                    .with_secondary(idx)
                    .with_holder(d)
                    .at(from),
            );
        }
    }

    let rolls = PassRolls { accuracy: state.roll(), angle: state.roll(), cone: state.roll() };
    let passer = &state.players[idx];
    let receiver = &state.players[target];
    let input = PassInput {
        passer: &passer.attributes,
        passer_pos: from,
        target_pos: to,
        target_velocity: receiver.velocity,
        nearest_defender_m: state.nearest_distance(side.opponent(), &from),
        fatigue: passer.fatigue(),
    };
    let exec = resolve_pass(&input, &rolls);
    debug!(
        "{} passes to {} (accuracy {:.2}, offset {:.1} deg)",
        passer.name, receiver.name, exec.accuracy, exec.angle_offset_deg
    );

    state.players[idx].set_action(PlayerAction::Passing, Some(FOLLOW_THROUGH_S));
    state.players[idx].target_player = Some(target);
    Some(
        ActionResult::success(ReasonTag::PassReleased, idx)
            .with_secondary(target)
            .with_velocity(exec.velocity)
            .at(from),
    )
}

// ====== Shot ======

pub(crate) fn resolve_prepared_shot(
    state: &mut MatchState,
    idx: usize,
    zone_roll: f32,
) -> Option<ActionResult> {
    let p = &state.players[idx];
    if !p.has_ball {
        state.players[idx].reset_action();
        return None;
    }
    let side = p.side;
    let goal_x = state.attacked_goal_x(side);
    let grounded = !(p.is_airborne() || p.jump_shot);
    if !shot_allowed(&p.position, goal_x, grounded, &p.attributes, zone_roll) {
        debug!("{} grounded shot inside the goal area disallowed", p.name);
        let at = p.position;
        state.players[idx].reset_action();
        return Some(ActionResult::failure(ReasonTag::ShotZoneViolation, idx).at(at));
    }

    let is_penalty = state.phase.penalty_team() == Some(side);
    let rolls = ShotRolls {
        aim_y: state.roll(),
        aim_z: state.roll(),
        jitter_y: state.rng.sample(StandardNormal),
        jitter_z: state.rng.sample(StandardNormal),
        power: state.roll(),
    };
    let p = &state.players[idx];
    let risk = RiskModifiers::for_decision(state, p, DecisionKind::Shot).game_state;
    let input = ShotInput {
        shooter: &p.attributes,
        shooter_pos: p.position,
        goal_x,
        defenders_close: state.count_within(side.opponent(), &p.position, shot::PRESSURE_RADIUS_M),
        nearest_defender_m: state.nearest_distance(side.opponent(), &p.position),
        fatigue: p.fatigue(),
        risk,
        jump: p.jump_shot,
        is_penalty,
    };
    let exec = resolve_shot(&input, &rolls);
    debug!("{} shoots at {:.1} m/s (deviation {:.1} deg)", p.name, exec.speed, exec.deviation_deg);

    let ctx = ShotContext {
        shooter: idx,
        team: side,
        origin: p.position,
        goal_x,
        save_difficulty: exec.save_difficulty,
        speed: exec.speed,
        is_penalty,
    };
    let origin = p.position;
    state.players[idx].set_action(PlayerAction::Shooting, Some(FOLLOW_THROUGH_S));
    let reason = if is_penalty { ReasonTag::PenaltyShot } else { ReasonTag::ShotTaken };
    Some(ActionResult::success(reason, idx).with_velocity(exec.velocity).with_shot(ctx).at(origin))
}

// ====== Tackle ======

/// Whether `attacker` has a clear run at goal: inside 9 m with no covering
/// defender besides the tackler and the keeper.
fn denies_clear_chance(state: &MatchState, tackler: usize, attacker: usize) -> bool {
    let a = &state.players[attacker];
    let goal_x = state.attacked_goal_x(a.side);
    if geometry::distance_to_goal_mouth(&a.position, goal_x) > court::FREE_THROW_LINE_M {
        return false;
    }
    !state.on_court(a.side.opponent()).any(|d| {
        d.idx != tackler
            && d.is_active()
            && !d.is_goalkeeper()
            && (d.position - a.position).norm() < COVER_RADIUS_M
    })
}

pub(crate) fn resolve_prepared_tackle(state: &mut MatchState, idx: usize) -> Option<ActionResult> {
    let target = state.players[idx].target_player.filter(|&t| {
        let p = &state.players[t];
        p.is_active() && p.has_ball
    });
    let Some(target) = target else {
        state.players[idx].reset_action();
        return None;
    };
    let t = &state.players[idx];
    let v = &state.players[target];
    if (v.position - t.position).norm() > tackle::REACH_M {
        state.players[idx].reset_action();
        return Some(ActionResult::failure(ReasonTag::TackleOutOfRange, idx).with_secondary(target));
    }

    let clear_chance = denies_clear_chance(state, idx, target);
    let aggression_modifier = 0.5 + state.team(t.side).tactic.aggression;
    let input = TackleInput {
        tackler: &t.attributes,
        target: &v.attributes,
        tackler_pos: t.position,
        tackler_vel: t.velocity,
        target_pos: v.position,
        target_vel: v.velocity,
        target_facing: v.facing(),
        target_max_speed: v.max_speed(),
        tackler_fatigue: t.fatigue(),
        denies_clear_chance: clear_chance,
        aggression_modifier,
    };
    let probs = tackle_probabilities(&input);
    let tackler_aggression = t.attributes.aggression as f32 / 100.0 * aggression_modifier;
    let defended_goal_x = state.defended_goal_x(t.side);
    let foul_position = v.position;
    let rolls = TackleRolls { success: state.roll(), foul: state.roll() };
    let verdict = resolve_tackle(&probs, &rolls);
    state.players[idx].reset_action();

    Some(match verdict {
        TackleVerdict::Won => ActionResult::success(ReasonTag::TackleWon, idx)
            .with_secondary(target)
            .with_holder(idx)
            .at(foul_position),
        TackleVerdict::Evaded => {
            ActionResult::failure(ReasonTag::TackleEvaded, idx).with_secondary(target)
        }
        TackleVerdict::Foul => {
            let ctx = FoulContext {
                from_behind: probs.from_behind,
                high_speed: probs.high_speed,
                aggression: tackler_aggression.clamp(0.0, 1.0),
                denies_clear_chance: clear_chance,
                inside_free_throw_line: !geometry::is_beyond_free_throw_line(
                    &foul_position,
                    defended_goal_x,
                ),
                position: foul_position,
            };
            let details = assess_foul(&ctx, state.roll());
            ActionResult::new(Outcome::Foul, ReasonTag::TackleFoul)
                .with_primary(idx)
                .with_secondary(target)
                .with_foul(details)
                .at(foul_position)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_fixtures::{clear_side, fixture_state, place, player_with_role};
    use crate::models::{PlayerAttributes, PlayerRole, TeamSide};
    use nalgebra::Vector2;

    #[test]
    fn test_open_pass_is_released() {
        let mut state = fixture_state(31);
        clear_side(&mut state, TeamSide::Away);
        let passer = player_with_role(&state, TeamSide::Home, PlayerRole::CentreBack);
        let target = player_with_role(&state, TeamSide::Home, PlayerRole::LeftBack);
        place(&mut state, passer, Vector2::new(15.0, 10.0));
        place(&mut state, target, Vector2::new(15.0, 15.0));
        state.players[passer].attributes = PlayerAttributes::uniform(70);
        state.give_ball_to(passer);
        state.players[passer].set_action(PlayerAction::PreparingPass, Some(0.1));
        state.players[passer].target_player = Some(target);

        let results = resolve_actions(&mut state, 0.1);
        assert_eq!(results.len(), 1);
        let r = &results[0];
        assert_eq!(r.outcome, Outcome::Success);
        assert_eq!(r.reason.as_str(), "Pass Released");
        assert_eq!(r.secondary, Some(target));
        let v = r.ball_velocity.unwrap();
        // Launched roughly at the receiver
        assert!(v.y > 0.0 && v.y.abs() > v.x.abs());
        assert_eq!(state.players[passer].action, PlayerAction::Passing);
    }

    #[test]
    fn test_grounded_shot_in_goal_area_is_not_dispatched() {
        let mut state = fixture_state(31);
        let shooter = player_with_role(&state, TeamSide::Home, PlayerRole::Pivot);
        let goal_x = state.attacked_goal_x(TeamSide::Home);
        place(&mut state, shooter, Vector2::new(goal_x + geometry::into_court(goal_x) * 4.0, 10.0));
        state.give_ball_to(shooter);
        state.players[shooter].set_action(PlayerAction::PreparingShot, Some(0.0));

        let r = resolve_prepared_shot(&mut state, shooter, 0.99).unwrap();
        assert_eq!(r.outcome, Outcome::Failure);
        assert_eq!(r.reason, ReasonTag::ShotZoneViolation);
        assert!(r.shot.is_none());
        assert!(state.players[shooter].has_ball);
        assert_eq!(state.players[shooter].action, PlayerAction::Idle);
    }

    #[test]
    fn test_jump_shot_from_outside_is_taken() {
        let mut state = fixture_state(31);
        let shooter = player_with_role(&state, TeamSide::Home, PlayerRole::LeftBack);
        let goal_x = state.attacked_goal_x(TeamSide::Home);
        place(&mut state, shooter, Vector2::new(goal_x + geometry::into_court(goal_x) * 9.0, 10.0));
        state.give_ball_to(shooter);
        state.players[shooter].set_action(PlayerAction::PreparingShot, Some(0.05));
        state.players[shooter].jump_shot = true;

        let results = resolve_actions(&mut state, 0.1);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].reason, ReasonTag::ShotTaken);
        let ctx = results[0].shot.as_ref().unwrap();
        assert_eq!(ctx.goal_x, goal_x);
        assert!(!ctx.is_penalty);
    }

    #[test]
    fn test_tackle_out_of_reach_whiffs() {
        let mut state = fixture_state(31);
        let holder = player_with_role(&state, TeamSide::Home, PlayerRole::CentreBack);
        let tackler = player_with_role(&state, TeamSide::Away, PlayerRole::CentreBack);
        place(&mut state, holder, Vector2::new(20.0, 10.0));
        place(&mut state, tackler, Vector2::new(25.0, 10.0));
        state.give_ball_to(holder);
        state.players[tackler].set_action(PlayerAction::Tackling, Some(0.1));
        state.players[tackler].target_player = Some(holder);

        let results = resolve_actions(&mut state, 0.1);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].reason, ReasonTag::TackleOutOfRange);
        assert_eq!(state.players[tackler].action, PlayerAction::Idle);
    }

    #[test]
    fn test_tackle_in_reach_resolves_to_duel_outcome() {
        let mut state = fixture_state(31);
        let holder = player_with_role(&state, TeamSide::Home, PlayerRole::CentreBack);
        let tackler = player_with_role(&state, TeamSide::Away, PlayerRole::CentreBack);
        place(&mut state, holder, Vector2::new(20.0, 10.0));
        place(&mut state, tackler, Vector2::new(20.8, 10.0));
        state.give_ball_to(holder);
        state.players[tackler].set_action(PlayerAction::Tackling, Some(0.1));
        state.players[tackler].target_player = Some(holder);

        let results = resolve_actions(&mut state, 0.1);
        assert_eq!(results.len(), 1);
        assert!(matches!(
            results[0].reason,
            ReasonTag::TackleWon | ReasonTag::TackleEvaded | ReasonTag::TackleFoul
        ));
        if results[0].reason == ReasonTag::TackleFoul {
            assert!(results[0].foul.is_some());
        }
    }

    #[test]
    fn test_unhandled_timed_action_fails_and_resets() {
        let mut state = fixture_state(31);
        let idx = player_with_role(&state, TeamSide::Home, PlayerRole::LeftWing);
        state.players[idx].set_action(PlayerAction::Blocking, Some(0.05));

        let results = resolve_actions(&mut state, 0.1);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].outcome, Outcome::Failure);
        assert_eq!(results[0].reason.as_str(), "Unhandled Prepared Action");
        assert_eq!(state.players[idx].action, PlayerAction::Idle);
        assert!(state.players[idx].action_timer.is_none());
    }

    #[test]
    fn test_timer_counts_down_before_resolution() {
        let mut state = fixture_state(31);
        let passer = player_with_role(&state, TeamSide::Home, PlayerRole::CentreBack);
        let target = player_with_role(&state, TeamSide::Home, PlayerRole::LeftBack);
        state.give_ball_to(passer);
        state.players[passer].set_action(PlayerAction::PreparingPass, Some(0.35));
        state.players[passer].target_player = Some(target);

        assert!(resolve_actions(&mut state, 0.1).is_empty());
        let left = state.players[passer].action_timer.unwrap();
        assert!((left - 0.25).abs() < 1e-5);
    }
}
