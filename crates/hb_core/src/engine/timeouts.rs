//! Team timeouts: limits, the coach's decision rule and the frozen countdown.

use log::info;

use super::event_handler::{award_restart, free_throw_spot};
use super::match_state::{MatchState, RestartKind, TimeoutState};
use super::phase::{MatchPhase, PhaseManager};
use super::physics_constants::timeout;
use crate::error::Result;
use crate::models::{EventKind, TeamSide};

/// Only one timeout may be called inside the final five minutes.
const LATE_WINDOW_S: f32 = 300.0;
const MAX_LATE_TIMEOUTS: u8 = 1;

/// Whether `side` may call a timeout right now.
pub fn can_call_timeout(state: &MatchState, side: TeamSide) -> bool {
    if !state.config.team_timeouts_enabled || state.timeout.is_some() || state.restart.is_some() {
        return false;
    }
    if state.phase.attacking_team() != Some(side) || state.holder_side() != Some(side) {
        return false;
    }
    let team = state.team(side);
    if team.timeouts_used >= state.config.max_timeouts_per_match
        || team.timeouts_this_half >= state.config.max_timeouts_per_half
    {
        return false;
    }
    !(state.remaining() <= LATE_WINDOW_S && team.late_timeouts >= MAX_LATE_TIMEOUTS)
}

/// Coach rule: react to a run of conceded goals, or protect a tight score late on.
pub fn coach_wants_timeout(state: &MatchState, side: TeamSide) -> bool {
    let team = state.team(side);
    if team.unanswered_goals_against >= timeout::UNANSWERED_GOALS_TRIGGER {
        return true;
    }
    state.remaining() <= timeout::CLOSE_GAME_WINDOW_S
        && state.goal_difference(side).abs() <= timeout::CLOSE_GAME_MARGIN
}

/// Calls a timeout for `side` if allowed. The phase change is applied by
/// the orchestrator at the end of the tick.
pub fn call_timeout(state: &mut MatchState, side: TeamSide) -> bool {
    if !can_call_timeout(state, side) {
        return false;
    }
    let late = state.remaining() <= LATE_WINDOW_S;
    let team = state.team_mut(side);
    team.timeouts_used += 1;
    team.timeouts_this_half += 1;
    if late {
        team.late_timeouts += 1;
    }
    team.unanswered_goals_against = 0;
    state.team_stats_mut(side).timeouts_used += 1;
    state.timeout = Some(TimeoutState {
        team: side,
        remaining: state.config.timeout_length_secs,
        resume_team: side,
    });
    let desc = format!("Timeout {}", state.team(side).name);
    info!("{}", desc);
    state.log_event(EventKind::Timeout, desc, Some(side), None);
    state.request_phase(MatchPhase::Timeout);
    true
}

/// Coach AI pass for both teams; home is asked first.
pub fn consider_timeouts(state: &mut MatchState) {
    for side in [TeamSide::Home, TeamSide::Away] {
        if coach_wants_timeout(state, side) && call_timeout(state, side) {
            return;
        }
    }
}

/// The timeout carve-out of the tick: only this countdown advances. On
/// expiry play resumes with a free throw for the team that called it.
pub fn tick_timeout(state: &mut MatchState, dt: f32) -> Result<()> {
    let Some(t) = state.timeout.as_mut() else {
        return Ok(());
    };
    t.remaining -= dt;
    if t.remaining > 1e-4 {
        return Ok(());
    }
    let team = t.resume_team;
    state.timeout = None;
    let desc = format!("Timeout over, {} to resume", state.team(team).name);
    state.log_event(EventKind::TimeoutEnded, desc, Some(team), None);

    let position = free_throw_spot(state, team, state.ball.ground_position());
    award_restart(state, RestartKind::TimeoutResume, team, position);
    PhaseManager::apply_pending(state)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_fixtures::{fixture_state, player_with_role};
    use crate::models::PlayerRole;

    fn home_in_possession(seed: u64) -> MatchState {
        let mut state = fixture_state(seed);
        let cb = player_with_role(&state, TeamSide::Home, PlayerRole::CentreBack);
        state.give_ball_to(cb);
        state
    }

    #[test]
    fn test_only_possessing_team_may_call() {
        let state = home_in_possession(31);
        assert!(can_call_timeout(&state, TeamSide::Home));
        assert!(!can_call_timeout(&state, TeamSide::Away));
    }

    #[test]
    fn test_half_limit() {
        let mut state = home_in_possession(32);
        state.team_mut(TeamSide::Home).timeouts_this_half = state.config.max_timeouts_per_half;
        assert!(!can_call_timeout(&state, TeamSide::Home));
    }

    #[test]
    fn test_unanswered_goals_trigger_and_countdown() {
        let mut state = home_in_possession(33);
        state.team_mut(TeamSide::Home).unanswered_goals_against = 3;
        consider_timeouts(&mut state);
        assert!(state.timeout.is_some());
        assert_eq!(state.team(TeamSide::Home).timeouts_used, 1);
        assert_eq!(state.team(TeamSide::Home).unanswered_goals_against, 0);
        PhaseManager::apply_pending(&mut state).unwrap();
        assert_eq!(state.phase, MatchPhase::Timeout);
        assert_eq!(state.holder(), None);

        let ticks = (state.config.timeout_length_secs / 0.1).round() as usize;
        for _ in 0..ticks + 5 {
            tick_timeout(&mut state, 0.1).unwrap();
        }
        assert!(state.timeout.is_none());
        assert_eq!(state.phase, MatchPhase::HomeSetPiece);
        assert_eq!(state.restart.as_ref().map(|r| r.kind), Some(RestartKind::TimeoutResume));
        assert!(state.events.iter().any(|e| e.kind == EventKind::TimeoutEnded));
    }

    #[test]
    fn test_no_call_without_trigger() {
        let mut state = home_in_possession(34);
        consider_timeouts(&mut state);
        assert!(state.timeout.is_none());
    }
}
