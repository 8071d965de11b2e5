//! Match orchestrator: the owned fixed-timestep loop.
//!
//! Tick order:
//! 1. Clock (frozen during timeouts; only the timeout countdown advances)
//! 2. Half-time / full-time checks
//! 3. Phase upkeep (restart countdowns, phase exits)
//! 4. AI, movement, action resolution (skipped while a restart is pending)
//! 5. Reactive then passive event detection
//! 6. Message drain, passive play, substitutions, coach timeouts
//! 7. Pending phase change, stat accumulation, invariant check
//!
//! A tick that fails aborts the match: the error is logged as a critical
//! event, the phase is forced to Finished and the result is flagged.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use log::{error, info, warn};

use super::action_resolver::resolve_actions;
use super::action_result::{ActionResult, Outcome, ReasonTag};
use super::ai::run_ai;
use super::event_detector::{detect_passive, detect_reactive};
use super::event_handler::{self, award_restart, drain_messages};
use super::geometry;
use super::match_state::{MatchState, RestartKind};
use super::movement::update_movement;
use super::passive_play::PassiveVerdict;
use super::phase::{MatchPhase, PhaseManager};
use super::physics_constants::{passive_play as pp, timing};
use super::sim_player::PlayerAction;
use super::{snapshot, substitutions, timeouts};
use crate::error::{Result, SimError};
use crate::models::{EventKind, MatchResult, MatchSetup, TeamSide};

/// Hard stop for runaway matches, as a multiple of the regulation tick count.
const TICK_BUDGET_FACTOR: u64 = 4;

/// Cooperative cancellation flag, checked once per tick.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

pub struct MatchSimulator {
    state: MatchState,
    match_id: String,
    match_date: Option<NaiveDate>,
    aborted: bool,
    cancelled: bool,
    error: Option<String>,
}

impl MatchSimulator {
    /// Validates the setup and prepares the opening throw-off.
    pub fn new(setup: &MatchSetup) -> Result<Self> {
        let mut state = MatchState::new(setup)?;
        let team = state.opening_kickoff;
        info!(
            "{} vs {} (seed {}), {} throw off",
            setup.home.name,
            setup.away.name,
            setup.seed,
            state.team(team).name
        );
        award_restart(&mut state, RestartKind::KickOff, team, geometry::center_spot());
        PhaseManager::apply_pending(&mut state)?;
        Ok(Self {
            state,
            match_id: uuid::Uuid::new_v4().to_string(),
            match_date: setup.match_date,
            aborted: false,
            cancelled: false,
            error: None,
        })
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.phase == MatchPhase::Finished
    }

    /// Advances one fixed tick. Returns false once the match is over.
    pub fn step(&mut self) -> bool {
        if self.is_finished() {
            return false;
        }
        if let Err(err) = self.tick() {
            self.abort(err);
        }
        !self.is_finished()
    }

    /// Runs to the final whistle.
    pub fn run(mut self) -> MatchResult {
        while self.step() {}
        self.into_result()
    }

    /// Runs to the final whistle or until `cancel` is set, whichever comes first.
    pub fn run_with_cancel(mut self, cancel: &CancelToken) -> MatchResult {
        loop {
            if cancel.is_cancelled() {
                self.cancel();
                break;
            }
            if !self.step() {
                break;
            }
        }
        self.into_result()
    }

    /// Stops the match gracefully. Partial-tick mutations are kept.
    pub fn cancel(&mut self) {
        if self.is_finished() {
            return;
        }
        info!("match cancelled at {:.1}s", self.state.elapsed());
        self.state.log_event(EventKind::Cancelled, "Match cancelled", None, None);
        self.cancelled = true;
        self.force_finish();
    }

    pub fn into_result(self) -> MatchResult {
        let final_state =
            self.state.config.record_final_snapshot.then(|| snapshot::capture(&self.state));
        let MatchState { teams, scores, events, player_stats, team_stats, .. } = self.state;
        let [home, away] = teams;
        let [home_stats, away_stats] = team_stats;
        MatchResult {
            match_id: self.match_id,
            home_team: home.name,
            away_team: away.name,
            home_score: scores[0],
            away_score: scores[1],
            match_date: self.match_date,
            events,
            home_stats,
            away_stats,
            player_stats,
            final_state,
            aborted: self.aborted,
            cancelled: self.cancelled,
            error: self.error,
        }
    }

    // ====== Tick ======

    fn tick(&mut self) -> Result<()> {
        let dt = timing::TICK_DT;
        let state = &mut self.state;
        state.tick += 1;
        if state.tick > tick_budget(state) {
            return Err(SimError::Runtime(format!("tick budget exceeded at tick {}", state.tick)));
        }

        if state.phase == MatchPhase::Timeout {
            return timeouts::tick_timeout(state, dt);
        }

        let clock_ran = state.phase.clock_runs();
        if clock_ran {
            state.clock_ticks += 1;
        }
        if check_clock(state)? {
            return Ok(());
        }

        PhaseManager::update(state, dt)?;
        PhaseManager::apply_pending(state)?;

        if !PhaseManager::restart_pending(state) {
            play(state, dt)?;
        }

        drain_messages(state);
        passive_play(state, dt)?;
        substitutions::update(state, dt);
        timeouts::consider_timeouts(state);
        PhaseManager::apply_pending(state)?;

        if clock_ran {
            accumulate_stats(state, dt);
        }
        state.check_invariants()
    }

    fn abort(&mut self, err: SimError) {
        error!("match aborted at {:.1}s: {}", self.state.elapsed(), err);
        self.state.log_event(EventKind::Critical, err.to_string(), None, None);
        self.aborted = true;
        self.error = Some(err.to_string());
        self.force_finish();
    }

    fn force_finish(&mut self) {
        self.state.pending_phase = None;
        let forced =
            PhaseManager::transition_to_phase(&mut self.state, MatchPhase::Finished, false);
        if let Err(err) = forced {
            warn!("forcing Finished: {}", err);
            self.state.phase = MatchPhase::Finished;
        }
    }
}

fn tick_budget(state: &MatchState) -> u64 {
    let regulation = (state.config.total_secs() / timing::TICK_DT).ceil() as u64;
    let timeouts = u64::from(state.config.max_timeouts_per_match) * 2;
    let timeout_ticks = (state.config.timeout_length_secs / timing::TICK_DT).ceil() as u64;
    (regulation + timeouts * timeout_ticks) * TICK_BUDGET_FACTOR + 100
}

/// Half time after the first half's last tick, full time after the second's.
/// Returns true when the tick should stop here.
fn check_clock(state: &mut MatchState) -> Result<bool> {
    let half_ticks = (state.config.half_length_secs / timing::TICK_DT).round() as u64;
    if state.half == 1 && state.clock_ticks >= half_ticks {
        state.pending_phase = None;
        PhaseManager::transition_to_phase(state, MatchPhase::HalfTime, false)?;
        return Ok(true);
    }
    if state.half >= 2 && state.clock_ticks >= half_ticks * 2 {
        let desc = format!(
            "Full time: {} {}-{} {}",
            state.team(TeamSide::Home).name,
            state.score(TeamSide::Home),
            state.score(TeamSide::Away),
            state.team(TeamSide::Away).name
        );
        info!("{}", desc);
        state.log_event(EventKind::FullTime, desc, None, None);
        state.pending_phase = None;
        PhaseManager::transition_to_phase(state, MatchPhase::Finished, false)?;
        return Ok(true);
    }
    Ok(false)
}

/// Open-play body of the tick. Stops as soon as an outcome kills the ball.
fn play(state: &mut MatchState, dt: f32) -> Result<()> {
    // A 7 m throw is a duel between the shooter and the keeper
    if state.phase.penalty_team().is_none() {
        run_ai(state);
    }
    update_movement(state, dt);

    for result in resolve_actions(state, dt) {
        event_handler::apply(state, result)?;
        if state.restart.is_some() {
            return Ok(());
        }
    }
    if let Some(result) = detect_reactive(state) {
        event_handler::apply(state, result)?;
        if state.restart.is_some() {
            return Ok(());
        }
    }
    if let Some(result) = detect_passive(state) {
        event_handler::apply(state, result)?;
    }
    Ok(())
}

/// The holder is close to goal or a shot is on its way.
fn is_threatening(state: &MatchState, team: TeamSide) -> bool {
    if state.ball.shot.as_ref().map_or(false, |s| s.team == team) {
        return true;
    }
    let goal_x = state.attacked_goal_x(team);
    state.on_court(team).any(|p| {
        p.action == PlayerAction::PreparingShot
            || (p.has_ball
                && geometry::distance_to_goal_mouth(&p.position, goal_x) <= pp::THREAT_DISTANCE_M)
    })
}

fn passive_play(state: &mut MatchState, dt: f32) -> Result<()> {
    if state.restart.is_some() || !state.phase.is_open_play() {
        return Ok(());
    }
    let attacking = state.possession.team();
    let threatening = attacking.map_or(false, |team| is_threatening(state, team));
    match state.passive.tick(dt, attacking, threatening) {
        PassiveVerdict::Clear => Ok(()),
        PassiveVerdict::Warning(team) => {
            state.team_stats_mut(team).passive_play_warnings += 1;
            let desc = format!("Passive play warning against {}", state.team(team).name);
            info!("{}", desc);
            state.log_event(EventKind::PassivePlayWarning, desc, Some(team), state.holder());
            Ok(())
        }
        PassiveVerdict::Violation(team) => {
            let mut result = ActionResult::new(Outcome::Turnover, ReasonTag::PassivePlay)
                .with_restart_team(team.opponent())
                .at(state.ball.ground_position());
            if let Some(holder) = state.holder().filter(|&h| state.players[h].side == team) {
                result = result.with_primary(holder);
            }
            event_handler::apply(state, result)
        }
    }
}

fn accumulate_stats(state: &mut MatchState, dt: f32) {
    let active: Vec<usize> = state.active_players().map(|p| p.idx).collect();
    for idx in active {
        state.stats_mut(idx).seconds_on_court += dt;
    }
    if let Some(team) = state.possession.team() {
        state.team_stats_mut(team).possession_secs += dt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::MatchConfig;
    use crate::engine::test_fixtures::fixture_setup;

    fn quick_setup(seed: u64, half_secs: f32) -> MatchSetup {
        fixture_setup(seed).with_config(MatchConfig::quick(half_secs))
    }

    #[test]
    fn test_new_prepares_throw_off() {
        let sim = MatchSimulator::new(&fixture_setup(71)).unwrap();
        let state = sim.state();
        assert_eq!(state.phase, MatchPhase::PreKickOff);
        let restart = state.restart.as_ref().unwrap();
        assert_eq!(restart.kind, RestartKind::KickOff);
        assert_eq!(restart.team, state.opening_kickoff);
        assert!(restart.thrower.is_some());
    }

    #[test]
    fn test_invalid_setup_rejected() {
        let mut setup = fixture_setup(72);
        setup.away.players.truncate(3);
        assert!(matches!(MatchSimulator::new(&setup), Err(SimError::Validation(_))));
    }

    #[test]
    fn test_short_match_runs_to_full_time() {
        let result = MatchSimulator::new(&quick_setup(73, 60.0)).unwrap().run();
        assert!(result.is_ok(), "{:?}", result.error);
        assert!(!result.cancelled);
        let kinds: Vec<EventKind> = result.events.iter().map(|e| e.kind).collect();
        assert!(kinds.contains(&EventKind::HalfTime));
        assert_eq!(kinds.last(), Some(&EventKind::FullTime));
        assert!(kinds.iter().filter(|k| **k == EventKind::KickOff).count() >= 2);
        let snapshot = result.final_state.unwrap();
        assert_eq!(snapshot.phase, MatchPhase::Finished.label());
    }

    #[test]
    fn test_events_are_time_ordered() {
        let result = MatchSimulator::new(&quick_setup(74, 90.0)).unwrap().run();
        assert!(result.events.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }

    #[test]
    fn test_cancel_before_start() {
        let token = CancelToken::new();
        token.cancel();
        let result = MatchSimulator::new(&quick_setup(75, 60.0)).unwrap().run_with_cancel(&token);
        assert!(result.cancelled);
        assert!(!result.aborted);
        assert_eq!(result.events.last().map(|e| e.kind), Some(EventKind::Cancelled));
    }

    #[test]
    fn test_timeout_freezes_clock() {
        let mut sim = MatchSimulator::new(&quick_setup(76, 600.0)).unwrap();
        for _ in 0..30 {
            sim.step();
        }
        let state = &mut sim.state;
        let holder = state.team(TeamSide::Home).on_court[3];
        state.restart = None;
        state.phase = MatchPhase::HomeAttack;
        state.give_ball_to(holder);
        assert!(timeouts::call_timeout(state, TeamSide::Home));
        PhaseManager::apply_pending(state).unwrap();

        let clock = sim.state.clock_ticks;
        for _ in 0..100 {
            sim.step();
        }
        assert_eq!(sim.state.clock_ticks, clock);
        assert_eq!(sim.state.phase, MatchPhase::Timeout);
    }

    #[test]
    fn test_setup_error_aborts_match() {
        let mut sim = MatchSimulator::new(&quick_setup(77, 60.0)).unwrap();
        let gone = sim.state.team(TeamSide::Away).on_court[2];
        sim.state.team_mut(TeamSide::Away).on_court.retain(|&p| p != gone);
        let result = sim.run();
        assert!(result.aborted);
        assert!(result.error.is_some());
        assert_eq!(result.events.last().map(|e| e.kind), Some(EventKind::Critical));
    }
}
