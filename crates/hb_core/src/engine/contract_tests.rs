//! Whole-engine contract tests: properties that must hold across modules.

use nalgebra::{Vector2, Vector3};
use proptest::prelude::*;

use super::action_result::{ActionResult, FoulDetails, FoulSeverity, Outcome, ReasonTag};
use super::ball::BallState;
use super::calculators::pass::{resolve_pass, PassInput, PassRolls};
use super::calculators::tackle::{tackle_probabilities, TackleInput};
use super::config::MatchConfig;
use super::event_detector::detect_reactive;
use super::event_handler::{self, drain_messages};
use super::messages::SimMessage;
use super::orchestrator::MatchSimulator;
use super::passive_play::PassiveVerdict;
use super::physics_constants::{passive_play as pp, pass};
use super::substitutions;
use super::test_fixtures::{fixture_setup, fixture_state, place, player_with_role};
use crate::models::{EventKind, PlayerAttributes, PlayerRole, TeamSide};

fn quick(seed: u64, half_secs: f32) -> MatchSimulator {
    let setup = fixture_setup(seed).with_config(MatchConfig::quick(half_secs));
    MatchSimulator::new(&setup).expect("valid setup")
}

// =============================================================================
// Determinism
// =============================================================================

#[test]
fn test_same_seed_same_match() {
    let a = quick(2024, 120.0).run();
    let b = quick(2024, 120.0).run();
    assert_eq!(a.home_score, b.home_score);
    assert_eq!(a.away_score, b.away_score);
    assert_eq!(
        serde_json::to_string(&a.events).unwrap(),
        serde_json::to_string(&b.events).unwrap()
    );
    assert_eq!(a.player_stats, b.player_stats);
}

#[test]
fn test_score_matches_goal_events() {
    let result = quick(7, 180.0).run();
    let goals = |side: TeamSide| {
        result
            .events
            .iter()
            .filter(|e| e.kind == EventKind::Goal && e.team == Some(side))
            .count() as u16
    };
    assert_eq!(result.home_score, goals(TeamSide::Home));
    assert_eq!(result.away_score, goals(TeamSide::Away));
    assert_eq!(result.home_stats.goals, result.home_score);
}

// =============================================================================
// Per-tick invariants over random seeds
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(6))]

    #[test]
    fn prop_ball_and_roster_invariants_hold(seed in any::<u64>()) {
        let mut sim = quick(seed, 45.0);
        let mut last = [0u16; 2];
        while sim.step() {
            let state = sim.state();
            let carriers = state.players.iter().filter(|p| p.has_ball).count();
            prop_assert!(carriers <= 1);
            if let BallState::Held(h) = state.ball.state {
                prop_assert!(state.players[h].has_ball);
                prop_assert!(state.ball.pass.is_none() && state.ball.shot.is_none());
            } else {
                prop_assert_eq!(carriers, 0);
            }
            for team in &state.teams {
                prop_assert_eq!(team.on_court.len(), team.expected_on_court());
                for d in &team.disqualified {
                    prop_assert!(!team.on_court.contains(d) && !team.bench.contains(d));
                }
            }
            for side in [TeamSide::Home, TeamSide::Away] {
                let score = state.score(side);
                prop_assert!(score >= last[side.index()]);
                prop_assert!(score - last[side.index()] <= 1);
                last[side.index()] = score;
            }
            let goal_events = state.events.iter().filter(|e| e.kind == EventKind::Goal).count();
            prop_assert_eq!(goal_events, (state.scores[0] + state.scores[1]) as usize);
        }
        let result = sim.into_result();
        prop_assert!(result.is_ok(), "{:?}", result.error);
    }
}

// =============================================================================
// Suspension escalation
// =============================================================================

#[test]
fn test_third_suspension_is_permanent_red() {
    let mut state = fixture_state(404);
    let offender = player_with_role(&state, TeamSide::Away, PlayerRole::LeftBack);
    let victim = player_with_role(&state, TeamSide::Home, PlayerRole::CentreBack);
    state.players[offender].two_minute_suspensions = 2;
    state.give_ball_to(victim);

    let foul = FoulDetails {
        severity: FoulSeverity::TwoMinuteSuspension,
        yellow_worthy: false,
        penalty_throw: false,
        position: Vector2::new(20.0, 10.0),
    };
    let result = ActionResult::new(Outcome::Foul, ReasonTag::TackleFoul)
        .with_primary(offender)
        .with_secondary(victim)
        .with_foul(foul);
    event_handler::apply(&mut state, result).unwrap();

    assert!(state.players[offender].red_carded);
    let red = state.events.iter().find(|e| e.kind == EventKind::RedCard).unwrap();
    let foul_event = state.events.iter().find(|e| e.kind == EventKind::Foul).unwrap();
    assert_eq!(red.timestamp, foul_event.timestamp);
    assert!(!state.events.iter().any(|e| e.kind == EventKind::TwoMinuteSuspension));

    // Long after the short-handed window the player is still gone
    for _ in 0..1500 {
        substitutions::tick_suspensions(&mut state, 0.1);
    }
    let team = state.team(TeamSide::Away);
    assert!(!team.on_court.contains(&offender));
    assert!(!team.bench.contains(&offender));
    assert_eq!(team.on_court.len(), 7);
    assert!(state.check_invariants().is_ok());
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_scenario_a_short_open_pass() {
    let attrs = PlayerAttributes::uniform(70);
    let input = PassInput {
        passer: &attrs,
        passer_pos: Vector2::new(10.0, 10.0),
        target_pos: Vector2::new(15.0, 10.0),
        target_velocity: Vector2::zeros(),
        nearest_defender_m: f32::INFINITY,
        fatigue: 0.0,
    };
    let exec = resolve_pass(&input, &PassRolls { accuracy: 0.3, angle: 0.9, cone: 0.5 });
    assert!(exec.accurate);
    assert!(exec.angle_offset_deg.abs() <= pass::ACCURATE_CONE_DEG);
    assert_eq!(ReasonTag::PassReleased.as_str(), "Pass Released");
}

#[test]
fn test_scenario_c_tackle_from_behind_fouls_more() {
    let tackler = PlayerAttributes::uniform(60);
    let target = PlayerAttributes::uniform(60);
    let max_speed = 7.0;
    let behind = TackleInput {
        tackler: &tackler,
        target: &target,
        tackler_pos: Vector2::new(9.2, 10.0),
        tackler_vel: Vector2::new(5.0, 0.0),
        target_pos: Vector2::new(10.0, 10.0),
        target_vel: Vector2::new(0.7 * max_speed, 0.0),
        target_facing: Vector2::new(1.0, 0.0),
        target_max_speed: max_speed,
        tackler_fatigue: 0.0,
        denies_clear_chance: false,
        aggression_modifier: 1.0,
    };
    let frontal = TackleInput {
        tackler_pos: Vector2::new(10.8, 10.0),
        tackler_vel: Vector2::zeros(),
        target_vel: Vector2::new(0.5, 0.0),
        ..behind.clone()
    };
    let p_behind = tackle_probabilities(&behind);
    let p_front = tackle_probabilities(&frontal);
    assert!(p_behind.from_behind && p_behind.high_speed);
    assert!(!p_front.from_behind && !p_front.high_speed);
    assert!(p_behind.foul > p_front.foul);
}

#[test]
fn test_scenario_d_loose_ball_goes_to_nearest() {
    let mut state = fixture_state(505);
    let near = player_with_role(&state, TeamSide::Home, PlayerRole::CentreBack);
    let far = player_with_role(&state, TeamSide::Away, PlayerRole::CentreBack);
    let spot = Vector2::new(20.0, 10.0);
    let everyone: Vec<usize> = state
        .team(TeamSide::Home)
        .on_court
        .iter()
        .chain(state.team(TeamSide::Away).on_court.iter())
        .copied()
        .collect();
    for p in everyone {
        place(&mut state, p, Vector2::new(20.0, 1.0));
    }
    place(&mut state, near, spot + Vector2::new(0.4, 0.0));
    place(&mut state, far, spot + Vector2::new(-0.8, 0.0));

    state.ball.make_loose(Vector3::new(spot.x, spot.y, 0.0), Vector3::zeros());
    assert!(state.ball.is_loose());
    assert_eq!(state.holder(), None);

    let result = detect_reactive(&mut state).unwrap();
    assert_eq!(result.reason, ReasonTag::LooseBallPickup);
    assert_eq!(result.possession_holder, Some(near));
    event_handler::apply(&mut state, result).unwrap();
    assert_eq!(state.holder(), Some(near));
}

#[test]
fn test_scenario_e_passive_warning_then_turnover() {
    let mut state = fixture_state(606);
    let holder = player_with_role(&state, TeamSide::Home, PlayerRole::CentreBack);
    let mate = player_with_role(&state, TeamSide::Home, PlayerRole::LeftBack);
    state.give_ball_to(holder);
    drain_messages(&mut state);

    let mut warnings = 0;
    let ticks = (pp::INTENT_LIMIT_S / 0.1) as usize + 10;
    for _ in 0..ticks {
        let verdict = state.passive.tick(0.1, Some(TeamSide::Home), false);
        if let PassiveVerdict::Warning(team) = verdict {
            assert_eq!(team, TeamSide::Home);
            warnings += 1;
        }
    }
    assert_eq!(warnings, 1);

    for _ in 0..pp::MAX_PASSES_AFTER_WARNING {
        state.messages.push_back(SimMessage::PassCompleted {
            team: TeamSide::Home,
            passer: holder,
            receiver: mate,
        });
    }
    drain_messages(&mut state);
    assert_eq!(state.passive.passes_since_warning(), pp::MAX_PASSES_AFTER_WARNING);
    assert_eq!(
        state.passive.tick(0.1, Some(TeamSide::Home), false),
        PassiveVerdict::Violation(TeamSide::Home)
    );
}
