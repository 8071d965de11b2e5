//! The single mutable root of a running match.

use std::collections::{BTreeMap, VecDeque};

use log::debug;
use nalgebra::Vector2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::ball::SimBall;
use super::config::MatchConfig;
use super::geometry;
use super::messages::SimMessage;
use super::passive_play::PassivePlayTracker;
use super::phase::MatchPhase;
use super::physics_constants::timing;
use super::sim_player::SimPlayer;
use crate::error::{Result, SimError};
use crate::models::{
    EventKind, MatchEvent, MatchSetup, PlayerMatchStats, Tactic, Team, TeamMatchStats, TeamSide,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Possession {
    Team(TeamSide),
    Contested,
}

impl Possession {
    pub fn team(&self) -> Option<TeamSide> {
        match self {
            Possession::Team(side) => Some(*side),
            Possession::Contested => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartKind {
    KickOff,
    FreeThrow,
    ThrowIn,
    GoalThrow,
    SevenMeter,
    TimeoutResume,
}

impl RestartKind {
    pub fn event_kind(&self) -> EventKind {
        match self {
            RestartKind::KickOff => EventKind::KickOff,
            RestartKind::FreeThrow | RestartKind::TimeoutResume => EventKind::FreeThrow,
            RestartKind::ThrowIn => EventKind::ThrowIn,
            RestartKind::GoalThrow => EventKind::GoalThrow,
            RestartKind::SevenMeter => EventKind::SevenMeterThrow,
        }
    }
}

/// Pending dead-ball restart.
#[derive(Debug, Clone, PartialEq)]
pub struct Restart {
    pub kind: RestartKind,
    pub team: TeamSide,
    pub position: Vector2<f32>,
    pub thrower: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct TimeoutState {
    pub team: TeamSide,
    pub remaining: f32,
    /// Phase to resume into when the timeout ends
    pub resume_team: TeamSide,
}

/// Per-team runtime bookkeeping.
#[derive(Debug, Clone)]
pub struct TeamRuntime {
    pub name: String,
    pub side: TeamSide,
    pub tactic: Tactic,
    pub on_court: Vec<usize>,
    pub bench: Vec<usize>,
    /// Serving a two-minute suspension
    pub suspended: Vec<usize>,
    /// Red-carded: gone for good
    pub disqualified: Vec<usize>,
    /// Remaining seconds of each red-card short-handed window
    pub short_handed: Vec<f32>,
    pub timeouts_used: u8,
    pub timeouts_this_half: u8,
    /// Timeouts called inside the last five minutes
    pub late_timeouts: u8,
    pub yellow_cards: u8,
    pub unanswered_goals_against: u8,
}

impl TeamRuntime {
    /// Players that must be on court right now.
    pub fn expected_on_court(&self) -> usize {
        let allowed = Team::ON_COURT.saturating_sub(self.suspended.len() + self.short_handed.len());
        allowed.min(self.on_court.len() + self.bench.len())
    }
}

pub struct MatchState {
    pub config: MatchConfig,
    pub teams: [TeamRuntime; 2],
    pub players: Vec<SimPlayer>,
    pub ball: SimBall,
    pub phase: MatchPhase,
    pub possession: Possession,
    pub half: u8,
    /// Running clock in ticks (frozen during timeouts and breaks)
    pub clock_ticks: u64,
    /// Every tick processed, frozen or not
    pub tick: u64,
    pub scores: [u16; 2],
    pub events: Vec<MatchEvent>,
    pub player_stats: BTreeMap<usize, PlayerMatchStats>,
    pub team_stats: [TeamMatchStats; 2],
    pub rng: ChaCha8Rng,
    pub restart: Option<Restart>,
    /// Seconds left before a pending restart is taken
    pub restart_delay: f32,
    /// Seconds spent in the current phase
    pub phase_time: f32,
    pub timeout: Option<TimeoutState>,
    /// Team that took the opening throw-off
    pub opening_kickoff: TeamSide,
    pub messages: VecDeque<SimMessage>,
    pub passive: PassivePlayTracker,
    pub substitution_timer: f32,
    pub last_goal_team: Option<TeamSide>,
    /// Phase change requested by the event handler, applied once per tick
    pub pending_phase: Option<MatchPhase>,
    /// Last completed pass (passer, receiver) for assist credit
    pub last_pass: Option<(usize, usize)>,
}

impl MatchState {
    pub fn new(setup: &MatchSetup) -> Result<Self> {
        setup.validate().map_err(SimError::Validation)?;

        let mut players = Vec::with_capacity(setup.home.players.len() + setup.away.players.len());
        let home_tactic = Tactic::from_config(&setup.home_tactic);
        let away_tactic = Tactic::from_config(&setup.away_tactic);
        let home = Self::build_team(TeamSide::Home, &setup.home, &home_tactic, &mut players);
        let away = Self::build_team(TeamSide::Away, &setup.away, &away_tactic, &mut players);

        let player_stats = players.iter().map(|p| (p.idx, PlayerMatchStats::default())).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(setup.seed);
        let opening_kickoff = if rng.gen_bool(0.5) { TeamSide::Home } else { TeamSide::Away };

        Ok(Self {
            config: setup.config.clone(),
            teams: [home, away],
            players,
            ball: SimBall::new(),
            phase: MatchPhase::PreKickOff,
            possession: Possession::Contested,
            half: 1,
            clock_ticks: 0,
            tick: 0,
            scores: [0, 0],
            events: Vec::new(),
            player_stats,
            team_stats: [TeamMatchStats::default(), TeamMatchStats::default()],
            rng,
            restart: None,
            restart_delay: 0.0,
            phase_time: 0.0,
            timeout: None,
            opening_kickoff,
            messages: VecDeque::new(),
            passive: PassivePlayTracker::new(),
            substitution_timer: 0.0,
            last_goal_team: None,
            pending_phase: None,
            last_pass: None,
        })
    }

    fn build_team(
        side: TeamSide,
        team: &Team,
        tactic: &Tactic,
        players: &mut Vec<SimPlayer>,
    ) -> TeamRuntime {
        let mut on_court = Vec::new();
        let mut bench = Vec::new();
        let mut taken = vec![false; tactic.offensive_slots.len()];

        for (i, p) in team.players.iter().enumerate() {
            let idx = players.len();
            let starter = i < Team::ON_COURT;
            let slot = if starter {
                tactic
                    .offensive_slots
                    .iter()
                    .enumerate()
                    .position(|(s, role)| *role == p.role && !taken[s])
            } else {
                None
            };
            if let Some(s) = slot {
                taken[s] = true;
            }
            let mut sim = SimPlayer::new(idx, side, p, slot);
            sim.on_court = starter;
            players.push(sim);
            if starter {
                on_court.push(idx);
            } else {
                bench.push(idx);
            }
        }

        TeamRuntime {
            name: team.name.clone(),
            side,
            tactic: tactic.clone(),
            on_court,
            bench,
            suspended: Vec::new(),
            disqualified: Vec::new(),
            short_handed: Vec::new(),
            timeouts_used: 0,
            timeouts_this_half: 0,
            late_timeouts: 0,
            yellow_cards: 0,
            unanswered_goals_against: 0,
        }
    }

    // ---------------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------------

    pub fn team(&self, side: TeamSide) -> &TeamRuntime {
        &self.teams[side.index()]
    }

    pub fn team_mut(&mut self, side: TeamSide) -> &mut TeamRuntime {
        &mut self.teams[side.index()]
    }

    pub fn elapsed(&self) -> f32 {
        self.clock_ticks as f32 * timing::TICK_DT
    }

    /// Seconds played in the current half.
    pub fn half_elapsed(&self) -> f32 {
        let offset = if self.half >= 2 { self.config.half_length_secs } else { 0.0 };
        self.elapsed() - offset
    }

    /// Seconds left in the match.
    pub fn remaining(&self) -> f32 {
        (self.config.total_secs() - self.elapsed()).max(0.0)
    }

    pub fn score(&self, side: TeamSide) -> u16 {
        self.scores[side.index()]
    }

    /// Own score minus opponent score.
    pub fn goal_difference(&self, side: TeamSide) -> i32 {
        self.score(side) as i32 - self.score(side.opponent()) as i32
    }

    pub fn attacked_goal_x(&self, side: TeamSide) -> f32 {
        geometry::attacked_goal_x(side, self.half)
    }

    pub fn defended_goal_x(&self, side: TeamSide) -> f32 {
        geometry::defended_goal_x(side, self.half)
    }

    pub fn holder(&self) -> Option<usize> {
        self.ball.holder()
    }

    pub fn holder_side(&self) -> Option<TeamSide> {
        self.holder().map(|idx| self.players[idx].side)
    }

    pub fn on_court(&self, side: TeamSide) -> impl Iterator<Item = &SimPlayer> {
        self.team(side).on_court.iter().map(move |&idx| &self.players[idx])
    }

    /// Active players (on court, not suspended) of both teams.
    pub fn active_players(&self) -> impl Iterator<Item = &SimPlayer> {
        self.players.iter().filter(|p| p.is_active())
    }

    pub fn goalkeeper(&self, side: TeamSide) -> Option<usize> {
        self.on_court(side).find(|p| p.is_goalkeeper()).map(|p| p.idx)
    }

    /// Nearest active player of `side` to `pos`; ties go to the lowest index.
    pub fn nearest_active(
        &self,
        side: TeamSide,
        pos: &Vector2<f32>,
        exclude: Option<usize>,
    ) -> Option<usize> {
        self.on_court(side)
            .filter(|p| p.is_active() && Some(p.idx) != exclude)
            .map(|p| (p.idx, (p.position - pos).norm()))
            .fold(None, |best: Option<(usize, f32)>, (idx, d)| match best {
                Some((_, bd)) if bd <= d => best,
                _ => Some((idx, d)),
            })
            .map(|(idx, _)| idx)
    }

    /// Active players of `side` within `radius` of `pos`.
    pub fn count_within(&self, side: TeamSide, pos: &Vector2<f32>, radius: f32) -> usize {
        self.on_court(side)
            .filter(|p| p.is_active() && (p.position - pos).norm() <= radius)
            .count()
    }

    /// Distance from `pos` to the nearest active player of `side`.
    pub fn nearest_distance(&self, side: TeamSide, pos: &Vector2<f32>) -> f32 {
        self.on_court(side)
            .filter(|p| p.is_active())
            .map(|p| (p.position - pos).norm())
            .fold(f32::INFINITY, f32::min)
    }

    // ---------------------------------------------------------------------
    // Randomness
    // ---------------------------------------------------------------------

    /// Uniform roll in [0, 1).
    pub fn roll(&mut self) -> f32 {
        self.rng.gen::<f32>()
    }

    pub fn roll_range(&mut self, lo: f32, hi: f32) -> f32 {
        if hi <= lo {
            return lo;
        }
        self.rng.gen_range(lo..hi)
    }

    // ---------------------------------------------------------------------
    // Mutation helpers (called from the event handler and phase setup)
    // ---------------------------------------------------------------------

    pub fn log_event(
        &mut self,
        kind: EventKind,
        description: impl Into<String>,
        team: Option<TeamSide>,
        player: Option<usize>,
    ) {
        let mut event = MatchEvent::new(self.elapsed() as f64, kind, description);
        if let Some(team) = team {
            event = event.with_team(team);
        }
        if let Some(player) = player {
            event = event.with_player(player);
        }
        debug!("[{}] {:?}: {}", event.clock(), event.kind, event.description);
        self.events.push(event);
    }

    pub fn stats_mut(&mut self, idx: usize) -> &mut PlayerMatchStats {
        self.player_stats.entry(idx).or_default()
    }

    pub fn team_stats_mut(&mut self, side: TeamSide) -> &mut TeamMatchStats {
        &mut self.team_stats[side.index()]
    }

    /// Hands the ball to `idx`, clearing every other possession flag.
    pub fn give_ball_to(&mut self, idx: usize) {
        for p in self.players.iter_mut() {
            if p.has_ball && p.idx != idx {
                p.release_ball();
            }
        }
        let (side, pos) = {
            let p = &mut self.players[idx];
            p.start_possession();
            (p.side, p.position)
        };
        self.ball.take_possession(idx, side, pos);
        self.set_possession(Possession::Team(side));
    }

    /// Asks for a phase change; the latest request in a tick wins.
    pub fn request_phase(&mut self, phase: MatchPhase) {
        if let Some(prev) = self.pending_phase {
            if prev != phase {
                debug!("phase request {:?} replaces {:?}", phase, prev);
            }
        }
        self.pending_phase = Some(phase);
    }

    pub fn set_possession(&mut self, possession: Possession) {
        if self.possession != possession {
            if possession.team() != self.possession.team() {
                self.last_pass = None;
            }
            self.possession = possession;
            self.messages.push_back(SimMessage::PossessionChanged { team: possession.team() });
        }
    }

    /// Clears the holder's flag; the ball itself is repositioned by the caller.
    pub fn strip_holder(&mut self) {
        if let Some(idx) = self.holder() {
            self.players[idx].release_ball();
        }
        for p in self.players.iter_mut().filter(|p| p.has_ball) {
            p.release_ball();
        }
    }

    /// Takes `idx` off the court into the suspended or disqualified list.
    pub fn remove_from_court(&mut self, idx: usize, disqualify: bool) {
        if self.holder() == Some(idx) {
            let pos = self.players[idx].position;
            self.strip_holder();
            self.ball.place(pos);
        }
        let side = self.players[idx].side;
        let team = self.team_mut(side);
        team.on_court.retain(|&p| p != idx);
        team.bench.retain(|&p| p != idx);
        if disqualify {
            team.suspended.retain(|&p| p != idx);
            if !team.disqualified.contains(&idx) {
                team.disqualified.push(idx);
            }
        } else if !team.suspended.contains(&idx) {
            team.suspended.push(idx);
        }
        let p = &mut self.players[idx];
        p.on_court = false;
        p.reset_action();
        p.velocity = Vector2::zeros();
    }

    /// Swaps `out` (on court) for `inn` (bench). The incoming player inherits
    /// the tactical slot.
    pub fn substitute(&mut self, out: usize, inn: usize) {
        let side = self.players[out].side;
        let slot = self.players[out].tactical_slot;
        let pos = self.players[out].position;
        let team = self.team_mut(side);
        team.on_court.retain(|&p| p != out);
        team.bench.retain(|&p| p != inn);
        team.on_court.push(inn);
        team.bench.push(out);
        team.on_court.sort_unstable();
        team.bench.sort_unstable();

        let p_out = &mut self.players[out];
        p_out.on_court = false;
        p_out.reset_action();
        p_out.velocity = Vector2::zeros();
        p_out.tactical_slot = None;

        let p_in = &mut self.players[inn];
        p_in.on_court = true;
        p_in.tactical_slot = slot;
        p_in.position = pos;
        p_in.reset_for_restart();
    }

    /// Returns a suspended player to the court.
    pub fn return_from_suspension(&mut self, idx: usize) {
        let side = self.players[idx].side;
        let team = self.team_mut(side);
        team.suspended.retain(|&p| p != idx);
        if !team.on_court.contains(&idx) {
            team.on_court.push(idx);
            team.on_court.sort_unstable();
        }
        let p = &mut self.players[idx];
        p.on_court = true;
        p.suspension_timer = 0.0;
        p.reset_for_restart();
    }

    // ---------------------------------------------------------------------
    // Invariants
    // ---------------------------------------------------------------------

    /// Ball exclusivity and roster size.
    pub fn check_invariants(&self) -> Result<()> {
        let flagged: Vec<usize> =
            self.players.iter().filter(|p| p.has_ball).map(|p| p.idx).collect();
        if flagged.len() > 1 {
            return Err(SimError::Runtime(format!("multiple ball carriers: {:?}", flagged)));
        }
        match (self.holder(), flagged.first()) {
            (Some(h), Some(&f)) if h == f => {}
            (None, None) => {}
            (h, f) => {
                return Err(SimError::Runtime(format!(
                    "ball holder {:?} disagrees with carrier flag {:?}",
                    h, f
                )));
            }
        }
        if let Some(h) = self.holder() {
            if !self.players[h].is_active() {
                return Err(SimError::Runtime(format!("inactive player {} holds the ball", h)));
            }
        }
        for team in &self.teams {
            if team.on_court.len() != team.expected_on_court() {
                return Err(SimError::Runtime(format!(
                    "{} has {} on court, expected {}",
                    team.name,
                    team.on_court.len(),
                    team.expected_on_court()
                )));
            }
            let fielded = |d: &usize| team.on_court.contains(d) || team.bench.contains(d);
            if team.disqualified.iter().any(fielded) {
                return Err(SimError::Runtime(format!(
                    "{} fields a disqualified player",
                    team.name
                )));
            }
        }
        Ok(())
    }
}
