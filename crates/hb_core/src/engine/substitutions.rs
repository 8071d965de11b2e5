//! Suspension clocks and rolling substitutions.
//!
//! - `tick_suspensions`: two-minute clocks and red-card short-handed windows
//! - `process_substitutions`: fatigue-driven swaps every check interval
//! - `find_substitution_candidate`: freshest compatible bench player
//!
//! Sent-off players never return and cannot be replaced until their team's
//! short-handed window has run out.

use log::info;
use nalgebra::Vector2;

use super::match_state::MatchState;
use super::physics_constants::{court, substitution};
use crate::models::{EventKind, TeamSide};

/// Entry point on the substitution line at the halfway mark.
fn substitution_zone(side: TeamSide) -> Vector2<f32> {
    let offset = if side.is_home() { -1.0 } else { 1.0 };
    Vector2::new(court::HALFWAY_X + offset, 0.5)
}

pub fn update(state: &mut MatchState, dt: f32) {
    tick_suspensions(state, dt);
    if !state.config.substitutions_enabled {
        return;
    }
    state.substitution_timer += dt;
    if state.substitution_timer >= substitution::CHECK_INTERVAL_S {
        state.substitution_timer = 0.0;
        process_substitutions(state);
    }
}

/// Runs suspension timers down and returns players whose time is up.
pub fn tick_suspensions(state: &mut MatchState, dt: f32) {
    for side in [TeamSide::Home, TeamSide::Away] {
        let suspended = state.team(side).suspended.clone();
        for idx in suspended {
            let p = &mut state.players[idx];
            p.suspension_timer = (p.suspension_timer - dt).max(0.0);
            if p.suspension_timer > 0.0 || p.red_carded {
                continue;
            }
            state.return_from_suspension(idx);
            state.players[idx].position = substitution_zone(side);
            let desc = format!("{} returns after the suspension", state.players[idx].name);
            info!("{}", desc);
            state.log_event(EventKind::SuspensionEnded, desc, Some(side), Some(idx));
        }

        let team = state.team_mut(side);
        let mut expired = 0;
        for window in team.short_handed.iter_mut() {
            *window -= dt;
            if *window <= 0.0 {
                expired += 1;
            }
        }
        team.short_handed.retain(|w| *w > 0.0);
        for _ in 0..expired {
            replace_sent_off(state, side);
        }
    }
}

/// After a red-card window a bench player completes the team again.
fn replace_sent_off(state: &mut MatchState, side: TeamSide) {
    let field = freshest_bench(state, side, |idx| !state.players[idx].is_goalkeeper());
    let Some(inn) = field.or_else(|| freshest_bench(state, side, |_| true)) else {
        return;
    };
    let team = state.team_mut(side);
    team.bench.retain(|&p| p != inn);
    team.on_court.push(inn);
    team.on_court.sort_unstable();
    let p = &mut state.players[inn];
    p.on_court = true;
    p.reset_for_restart();
    p.position = substitution_zone(side);
    let desc = format!("{} completes the team after the red card", state.players[inn].name);
    info!("{}", desc);
    state.log_event(EventKind::Substitution, desc, Some(side), Some(inn));
}

/// Bench player with the highest stamina passing `filter`; ties go to the
/// lowest index.
fn freshest_bench(
    state: &MatchState,
    side: TeamSide,
    filter: impl Fn(usize) -> bool,
) -> Option<usize> {
    state
        .team(side)
        .bench
        .iter()
        .copied()
        .filter(|&idx| filter(idx))
        .map(|idx| (idx, state.players[idx].stamina))
        .fold(None, |best: Option<(usize, f32)>, (idx, stamina)| match best {
            Some((b, s)) if s > stamina || (s == stamina && b < idx) => best,
            _ => Some((idx, stamina)),
        })
        .map(|(idx, _)| idx)
}

/// One fatigue swap per team per check.
pub fn process_substitutions(state: &mut MatchState) {
    for side in [TeamSide::Home, TeamSide::Away] {
        if let Some((out, inn)) = find_substitution_candidate(state, side) {
            execute_substitution(state, out, inn);
        }
    }
}

/// Most tired eligible field player and the freshest compatible bench player.
pub fn find_substitution_candidate(state: &MatchState, side: TeamSide) -> Option<(usize, usize)> {
    let tired = state
        .on_court(side)
        .filter(|p| {
            p.can_act()
                && !p.is_goalkeeper()
                && !p.has_ball
                && p.action_timer.is_none()
                && p.stamina < substitution::FATIGUE_THRESHOLD
        })
        .fold(None, |best: Option<(usize, f32)>, p| match best {
            Some((_, s)) if s <= p.stamina => best,
            _ => Some((p.idx, p.stamina)),
        })
        .map(|(idx, _)| idx)?;

    let role = state.players[tired].role;
    let inn = freshest_bench(state, side, |idx| {
        let b = &state.players[idx];
        !b.is_goalkeeper()
            && b.role.compatible_with(role)
            && b.stamina >= substitution::MIN_BENCH_STAMINA
    })?;
    Some((tired, inn))
}

pub fn execute_substitution(state: &mut MatchState, out: usize, inn: usize) {
    let side = state.players[out].side;
    state.substitute(out, inn);
    let desc = format!("{} replaces {}", state.players[inn].name, state.players[out].name);
    info!("{}", desc);
    state.log_event(EventKind::Substitution, desc, Some(side), Some(inn));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_fixtures::{fixture_state, player_with_role};
    use crate::models::PlayerRole;

    #[test]
    fn test_suspension_expires_and_player_returns() {
        let mut state = fixture_state(21);
        let idx = player_with_role(&state, TeamSide::Home, PlayerRole::LeftBack);
        state.players[idx].suspension_timer = 0.25;
        state.remove_from_court(idx, false);
        assert!(state.check_invariants().is_ok());

        tick_suspensions(&mut state, 0.1);
        assert!(!state.players[idx].on_court);
        tick_suspensions(&mut state, 0.1);
        tick_suspensions(&mut state, 0.1);
        assert!(state.players[idx].on_court);
        assert!(state.players[idx].is_active());
        assert_eq!(state.team(TeamSide::Home).on_court.len(), 7);
        assert_eq!(state.events.last().map(|e| e.kind), Some(EventKind::SuspensionEnded));
        assert!(state.check_invariants().is_ok());
    }

    #[test]
    fn test_red_card_window_brings_replacement() {
        let mut state = fixture_state(22);
        let idx = player_with_role(&state, TeamSide::Away, PlayerRole::Pivot);
        state.players[idx].red_carded = true;
        state.remove_from_court(idx, true);
        state.team_mut(TeamSide::Away).short_handed.push(0.15);
        assert_eq!(state.team(TeamSide::Away).on_court.len(), 6);
        assert!(state.check_invariants().is_ok());

        tick_suspensions(&mut state, 0.1);
        assert_eq!(state.team(TeamSide::Away).on_court.len(), 6);
        tick_suspensions(&mut state, 0.1);
        assert_eq!(state.team(TeamSide::Away).on_court.len(), 7);
        assert!(!state.team(TeamSide::Away).on_court.contains(&idx));
        assert!(state.check_invariants().is_ok());
    }

    #[test]
    fn test_tired_player_swapped_for_fresh_compatible() {
        let mut state = fixture_state(23);
        let tired = player_with_role(&state, TeamSide::Home, PlayerRole::RightWing);
        state.players[tired].stamina = 0.3;
        let (out, inn) = find_substitution_candidate(&state, TeamSide::Home).unwrap();
        assert_eq!(out, tired);
        assert!(state.players[inn].role.compatible_with(PlayerRole::RightWing));
        assert!(!state.players[inn].is_goalkeeper());

        execute_substitution(&mut state, out, inn);
        assert!(state.team(TeamSide::Home).on_court.contains(&inn));
        assert!(state.team(TeamSide::Home).bench.contains(&out));
        assert!(state.check_invariants().is_ok());
    }

    #[test]
    fn test_ball_carrier_is_not_substituted() {
        let mut state = fixture_state(24);
        let tired = player_with_role(&state, TeamSide::Home, PlayerRole::RightWing);
        state.players[tired].stamina = 0.3;
        state.give_ball_to(tired);
        assert_eq!(find_substitution_candidate(&state, TeamSide::Home), None);
    }

    #[test]
    fn test_update_waits_for_interval() {
        let mut state = fixture_state(25);
        let tired = player_with_role(&state, TeamSide::Home, PlayerRole::LeftWing);
        state.players[tired].stamina = 0.2;
        update(&mut state, 1.0);
        assert!(state.players[tired].on_court);
        for _ in 0..20 {
            update(&mut state, 1.0);
        }
        assert!(!state.players[tired].on_court);
    }
}
