//! Match phase state machine.
//!
//! Phases that restart play (throw-off, set pieces, 7 m throws, half time,
//! timeouts) run a one-shot setup that places players and ball. The setup
//! runs when the phase is entered, never again while it stays active.

use log::info;
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use super::ai::positioning;
use super::calculators::shot as shot_calc;
use super::geometry;
use super::match_state::{MatchState, Possession, Restart, RestartKind};
use super::physics_constants::{ai, court, timing};
use super::sim_player::{BodyState, PlayerAction};
use crate::error::{Result, SimError};
use crate::models::{EventKind, PlayerRole, TeamSide};

/// A penalty phase with no shot after this long reopens play.
const PENALTY_STALL_S: f32 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchPhase {
    PreKickOff,
    HomeAttack,
    AwayAttack,
    TransitionToHomeAttack,
    TransitionToAwayAttack,
    ContestedBall,
    HomeSetPiece,
    AwaySetPiece,
    HomePenalty,
    AwayPenalty,
    Timeout,
    HalfTime,
    Finished,
}

impl MatchPhase {
    pub fn attack_for(side: TeamSide) -> Self {
        match side {
            TeamSide::Home => MatchPhase::HomeAttack,
            TeamSide::Away => MatchPhase::AwayAttack,
        }
    }

    pub fn transition_for(side: TeamSide) -> Self {
        match side {
            TeamSide::Home => MatchPhase::TransitionToHomeAttack,
            TeamSide::Away => MatchPhase::TransitionToAwayAttack,
        }
    }

    pub fn set_piece_for(side: TeamSide) -> Self {
        match side {
            TeamSide::Home => MatchPhase::HomeSetPiece,
            TeamSide::Away => MatchPhase::AwaySetPiece,
        }
    }

    pub fn penalty_for(side: TeamSide) -> Self {
        match side {
            TeamSide::Home => MatchPhase::HomePenalty,
            TeamSide::Away => MatchPhase::AwayPenalty,
        }
    }

    /// Team taking the 7 m throw, if this is a penalty phase.
    pub fn penalty_team(&self) -> Option<TeamSide> {
        match self {
            MatchPhase::HomePenalty => Some(TeamSide::Home),
            MatchPhase::AwayPenalty => Some(TeamSide::Away),
            _ => None,
        }
    }

    pub fn set_piece_team(&self) -> Option<TeamSide> {
        match self {
            MatchPhase::HomeSetPiece => Some(TeamSide::Home),
            MatchPhase::AwaySetPiece => Some(TeamSide::Away),
            _ => None,
        }
    }

    /// Team going forward in attack or transition phases.
    pub fn attacking_team(&self) -> Option<TeamSide> {
        match self {
            MatchPhase::HomeAttack | MatchPhase::TransitionToHomeAttack => Some(TeamSide::Home),
            MatchPhase::AwayAttack | MatchPhase::TransitionToAwayAttack => Some(TeamSide::Away),
            _ => None,
        }
    }

    pub fn is_transition(&self) -> bool {
        matches!(self, MatchPhase::TransitionToHomeAttack | MatchPhase::TransitionToAwayAttack)
    }

    /// Open play: the ball is live and the AI runs.
    pub fn is_open_play(&self) -> bool {
        self.attacking_team().is_some() || *self == MatchPhase::ContestedBall
    }

    /// Phases whose entry repositions players and ball.
    pub fn requires_setup(&self) -> bool {
        matches!(
            self,
            MatchPhase::PreKickOff
                | MatchPhase::HomeSetPiece
                | MatchPhase::AwaySetPiece
                | MatchPhase::HomePenalty
                | MatchPhase::AwayPenalty
                | MatchPhase::HalfTime
                | MatchPhase::Timeout
                | MatchPhase::Finished
        )
    }

    /// The match clock runs in every phase but these.
    pub fn clock_runs(&self) -> bool {
        !matches!(self, MatchPhase::Timeout | MatchPhase::HalfTime | MatchPhase::Finished)
    }

    pub fn label(&self) -> &'static str {
        match self {
            MatchPhase::PreKickOff => "Pre Kick Off",
            MatchPhase::HomeAttack => "Home Attack",
            MatchPhase::AwayAttack => "Away Attack",
            MatchPhase::TransitionToHomeAttack => "Transition To Home Attack",
            MatchPhase::TransitionToAwayAttack => "Transition To Away Attack",
            MatchPhase::ContestedBall => "Contested Ball",
            MatchPhase::HomeSetPiece => "Home Set Piece",
            MatchPhase::AwaySetPiece => "Away Set Piece",
            MatchPhase::HomePenalty => "Home Penalty",
            MatchPhase::AwayPenalty => "Away Penalty",
            MatchPhase::Timeout => "Timeout",
            MatchPhase::HalfTime => "Half Time",
            MatchPhase::Finished => "Finished",
        }
    }
}

pub struct PhaseManager;

impl PhaseManager {
    /// Moves the match into `phase`. Setup runs when the phase changes, or
    /// when `force_setup` asks for it (a new restart inside the same phase).
    /// Returns whether a transition happened.
    pub fn transition_to_phase(
        state: &mut MatchState,
        phase: MatchPhase,
        force_setup: bool,
    ) -> Result<bool> {
        if state.phase == phase && !force_setup {
            return Ok(false);
        }
        if state.phase == MatchPhase::Finished && phase != MatchPhase::Finished {
            return Err(SimError::Runtime(format!("cannot leave Finished for {:?}", phase)));
        }
        if phase.requires_setup() {
            Self::setup(state, phase)?;
        }
        if state.phase != phase {
            info!("phase {} -> {}", state.phase.label(), phase.label());
        }
        state.phase = phase;
        state.phase_time = 0.0;
        Ok(true)
    }

    /// Applies the phase requested during this tick, if any.
    pub fn apply_pending(state: &mut MatchState) -> Result<bool> {
        let Some(phase) = state.pending_phase.take() else {
            return Ok(false);
        };
        if state.phase == MatchPhase::Finished {
            return Ok(false);
        }
        let fresh_restart = state.restart.as_ref().map_or(false, |r| r.thrower.is_none());
        let force = phase.requires_setup() && fresh_restart;
        Self::transition_to_phase(state, phase, force)
    }

    /// Per-tick phase upkeep: restart countdown and phase exits.
    pub fn update(state: &mut MatchState, dt: f32) -> Result<()> {
        state.phase_time += dt;

        if state.restart.as_ref().map_or(false, |r| r.thrower.is_some()) {
            state.restart_delay -= dt;
            if state.restart_delay <= 1e-4 {
                Self::take_restart(state)?;
            }
            return Ok(());
        }

        match state.phase {
            MatchPhase::TransitionToHomeAttack | MatchPhase::TransitionToAwayAttack => {
                let Some(team) = state.phase.attacking_team() else {
                    return Ok(());
                };
                let goal_x = state.attacked_goal_x(team);
                let crossed = (state.ball.position.x - goal_x).abs() < court::HALFWAY_X;
                if crossed || state.phase_time >= timing::TRANSITION_MAX_S {
                    state.request_phase(MatchPhase::attack_for(team));
                }
            }
            MatchPhase::ContestedBall => {
                if let Some(side) = state.holder_side() {
                    state.request_phase(MatchPhase::attack_for(side));
                }
            }
            MatchPhase::HomePenalty | MatchPhase::AwayPenalty => {
                let shot_pending =
                    state.players.iter().any(|p| p.action == PlayerAction::PreparingShot);
                if !shot_pending && state.phase_time >= PENALTY_STALL_S {
                    if let Some(team) = state.phase.penalty_team() {
                        state.request_phase(MatchPhase::attack_for(team));
                    }
                }
            }
            MatchPhase::HalfTime => state.request_phase(MatchPhase::PreKickOff),
            _ => {}
        }
        Ok(())
    }

    /// True while players wait for a restart to be taken.
    pub fn restart_pending(state: &MatchState) -> bool {
        state.restart.is_some()
    }

    // ====== Setup ======

    fn setup(state: &mut MatchState, phase: MatchPhase) -> Result<()> {
        match phase {
            MatchPhase::PreKickOff => {
                check_rosters(state, phase)?;
                setup_kickoff(state, phase)
            }
            MatchPhase::HomeSetPiece | MatchPhase::AwaySetPiece => {
                check_rosters(state, phase)?;
                setup_set_piece(state, phase)
            }
            MatchPhase::HomePenalty | MatchPhase::AwayPenalty => {
                check_rosters(state, phase)?;
                setup_penalty(state, phase)
            }
            MatchPhase::HalfTime => setup_half_time(state),
            MatchPhase::Timeout => setup_timeout(state),
            MatchPhase::Finished => {
                for p in state.players.iter_mut() {
                    p.reset_action();
                    p.velocity = Vector2::zeros();
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Hands the ball to the thrower and reopens play.
    fn take_restart(state: &mut MatchState) -> Result<()> {
        let Some(restart) = state.restart.take() else {
            return Ok(());
        };
        let thrower = restart
            .thrower
            .filter(|&t| state.players[t].is_active())
            .or_else(|| choose_thrower(state, restart.kind, restart.team, &restart.position))
            .ok_or_else(|| SimError::Setup {
                phase: state.phase,
                reason: format!("no thrower available for {}", state.team(restart.team).name),
            })?;

        state.players[thrower].position = restart.position;
        state.give_ball_to(thrower);
        for p in state.players.iter_mut() {
            p.next_decision_at = 0.0;
        }
        let desc = match restart.kind {
            RestartKind::KickOff => format!("Throw-off by {}", state.players[thrower].name),
            RestartKind::FreeThrow => format!("Free throw by {}", state.players[thrower].name),
            RestartKind::TimeoutResume => {
                format!("{} resume with a free throw", state.team(restart.team).name)
            }
            RestartKind::ThrowIn => format!("Throw-in by {}", state.players[thrower].name),
            RestartKind::GoalThrow => format!("Goal throw by {}", state.players[thrower].name),
            RestartKind::SevenMeter => format!("7m throw by {}", state.players[thrower].name),
        };
        state.log_event(restart.kind.event_kind(), desc, Some(restart.team), Some(thrower));

        if restart.kind == RestartKind::SevenMeter {
            let p = &mut state.players[thrower];
            p.jump_shot = false;
            p.set_action(PlayerAction::PreparingShot, Some(shot_calc::prep_time(false, true)));
        } else {
            state.request_phase(MatchPhase::attack_for(restart.team));
        }
        Ok(())
    }
}

/// Every team must field exactly its expected number of players.
fn check_rosters(state: &MatchState, phase: MatchPhase) -> Result<()> {
    for team in &state.teams {
        let expected = team.expected_on_court();
        if team.on_court.len() != expected {
            return Err(SimError::Setup {
                phase,
                reason: format!(
                    "{} has {} on court, expected {}",
                    team.name,
                    team.on_court.len(),
                    expected
                ),
            });
        }
    }
    Ok(())
}

fn pending_restart(
    state: &MatchState,
    phase: MatchPhase,
    kinds: &[RestartKind],
) -> Result<(RestartKind, TeamSide, Vector2<f32>)> {
    match state.restart.as_ref() {
        Some(r) if kinds.contains(&r.kind) => Ok((r.kind, r.team, r.position)),
        Some(r) => Err(SimError::Setup {
            phase,
            reason: format!("unexpected restart {:?}", r.kind),
        }),
        None => Err(SimError::Setup { phase, reason: "no restart pending".into() }),
    }
}

/// Picks who takes a restart. Ties go to the lowest index.
pub fn choose_thrower(
    state: &MatchState,
    kind: RestartKind,
    team: TeamSide,
    position: &Vector2<f32>,
) -> Option<usize> {
    let field = || state.on_court(team).filter(|p| p.is_active() && !p.is_goalkeeper());
    let nearest_field = || {
        field()
            .map(|p| (p.idx, (p.position - position).norm()))
            .fold(None, |best: Option<(usize, f32)>, (idx, d)| match best {
                Some((_, bd)) if bd <= d => best,
                _ => Some((idx, d)),
            })
            .map(|(idx, _)| idx)
    };
    let chosen = match kind {
        RestartKind::GoalThrow => state
            .goalkeeper(team)
            .filter(|&k| state.players[k].is_active())
            .or_else(nearest_field),
        RestartKind::SevenMeter => field()
            .fold(None, |best: Option<(usize, u8)>, p| match best {
                Some((_, f)) if f >= p.attributes.finishing => best,
                _ => Some((p.idx, p.attributes.finishing)),
            })
            .map(|(idx, _)| idx),
        RestartKind::KickOff => field()
            .find(|p| p.role == PlayerRole::CentreBack)
            .map(|p| p.idx)
            .or_else(nearest_field),
        RestartKind::FreeThrow | RestartKind::ThrowIn | RestartKind::TimeoutResume => {
            nearest_field()
        }
    };
    chosen.or_else(|| state.nearest_active(team, position, None))
}

fn reset_on_court(state: &mut MatchState) {
    state.strip_holder();
    for p in state.players.iter_mut().filter(|p| p.on_court) {
        p.reset_for_restart();
    }
}

fn setup_kickoff(state: &mut MatchState, phase: MatchPhase) -> Result<()> {
    let (_, team, position) = pending_restart(state, phase, &[RestartKind::KickOff])?;
    reset_on_court(state);
    let spots: Vec<(usize, Vector2<f32>)> = state
        .active_players()
        .map(|p| (p.idx, positioning::kickoff_spot(state, p)))
        .collect();
    for (idx, spot) in spots {
        state.players[idx].position = spot;
    }
    let thrower = choose_thrower(state, RestartKind::KickOff, team, &position)
        .ok_or_else(|| SimError::Setup { phase, reason: "no throw-off taker".into() })?;
    state.players[thrower].position = position;
    state.ball.place(position);
    if let Some(r) = state.restart.as_mut() {
        r.thrower = Some(thrower);
    }
    state.restart_delay = timing::KICKOFF_DELAY_S;
    Ok(())
}

fn setup_set_piece(state: &mut MatchState, phase: MatchPhase) -> Result<()> {
    let kinds = [
        RestartKind::FreeThrow,
        RestartKind::ThrowIn,
        RestartKind::GoalThrow,
        RestartKind::TimeoutResume,
    ];
    let (kind, team, position) = pending_restart(state, phase, &kinds)?;
    if phase.set_piece_team() != Some(team) {
        return Err(SimError::Setup {
            phase,
            reason: format!("restart belongs to {}", team.label()),
        });
    }
    state.strip_holder();
    state.ball.place(position);
    for p in state.players.iter_mut().filter(|p| p.on_court) {
        p.reset_action();
        p.velocity = Vector2::zeros();
    }

    let thrower = choose_thrower(state, kind, team, &position)
        .ok_or_else(|| SimError::Setup { phase, reason: "no thrower available".into() })?;
    let attacked = state.attacked_goal_x(team);
    let spots: Vec<(usize, Vector2<f32>)> = state
        .active_players()
        .filter(|p| p.idx != thrower)
        .map(|p| {
            let spot = if p.side == team {
                if p.is_goalkeeper() {
                    p.position
                } else {
                    geometry::push_outside_free_throw_line(p.position, attacked)
                }
            } else if p.is_goalkeeper() {
                positioning::goalkeeper_spot(state, p.side)
            } else {
                positioning::restart_defense_spot(state, p, &position)
            };
            (p.idx, spot)
        })
        .collect();
    for (idx, spot) in spots {
        state.players[idx].position = spot;
    }
    state.players[thrower].position = position;
    if let Some(r) = state.restart.as_mut() {
        r.thrower = Some(thrower);
    }
    state.restart_delay = timing::RESTART_DELAY_S;
    Ok(())
}

fn setup_penalty(state: &mut MatchState, phase: MatchPhase) -> Result<()> {
    let (_, team, position) = pending_restart(state, phase, &[RestartKind::SevenMeter])?;
    if phase.penalty_team() != Some(team) {
        return Err(SimError::Setup {
            phase,
            reason: format!("7m throw belongs to {}", team.label()),
        });
    }
    state.strip_holder();
    state.ball.place(position);
    let goal_x = state.attacked_goal_x(team);
    let keeper = state.goalkeeper(team.opponent());
    let shooter = choose_thrower(state, RestartKind::SevenMeter, team, &position)
        .ok_or_else(|| SimError::Setup { phase, reason: "no 7m taker".into() })?;

    let on_line = Vector2::new(
        goal_x + geometry::into_court(goal_x) * ai::GK_LINE_OFFSET_M,
        court::CENTER_Y,
    );
    let spots: Vec<(usize, Vector2<f32>)> = state
        .active_players()
        .filter(|p| p.idx != shooter)
        .map(|p| {
            let spot = if Some(p.idx) == keeper {
                on_line
            } else if p.is_goalkeeper() {
                p.position
            } else {
                geometry::push_outside_free_throw_line(p.position, goal_x)
            };
            (p.idx, spot)
        })
        .collect();
    for (idx, spot) in spots {
        let p = &mut state.players[idx];
        p.reset_action();
        p.velocity = Vector2::zeros();
        p.position = spot;
    }
    let p = &mut state.players[shooter];
    p.reset_action();
    p.velocity = Vector2::zeros();
    p.position = position;
    if let Some(r) = state.restart.as_mut() {
        r.thrower = Some(shooter);
    }
    state.restart_delay = timing::PENALTY_DELAY_S;
    Ok(())
}

fn setup_half_time(state: &mut MatchState) -> Result<()> {
    state.log_event(
        EventKind::HalfTime,
        format!(
            "Half time: {} {}-{} {}",
            state.team(TeamSide::Home).name,
            state.score(TeamSide::Home),
            state.score(TeamSide::Away),
            state.team(TeamSide::Away).name
        ),
        None,
        None,
    );
    state.half = 2;
    reset_on_court(state);
    for p in state.players.iter_mut() {
        p.stamina = (p.stamina + timing::HALF_TIME_STAMINA_RECOVERY).min(1.0);
    }
    for team in state.teams.iter_mut() {
        team.timeouts_this_half = 0;
    }
    state.timeout = None;
    state.passive.reset(None);
    state.ball.place(geometry::center_spot());
    // Second half: the other team throws off
    let team = state.opening_kickoff.opponent();
    state.restart = Some(Restart {
        kind: RestartKind::KickOff,
        team,
        position: geometry::center_spot(),
        thrower: None,
    });
    state.set_possession(Possession::Team(team));
    Ok(())
}

fn setup_timeout(state: &mut MatchState) -> Result<()> {
    if state.timeout.is_none() {
        return Err(SimError::Setup {
            phase: MatchPhase::Timeout,
            reason: "no timeout called".into(),
        });
    }
    let at = state.ball.ground_position();
    state.strip_holder();
    state.ball.place(geometry::clamp_to_court(at));
    for p in state.players.iter_mut().filter(|p| p.on_court) {
        p.reset_action();
        p.velocity = Vector2::zeros();
        if p.is_airborne() || p.is_fallen() {
            p.body = BodyState::Grounded;
        }
    }
    Ok(())
}
