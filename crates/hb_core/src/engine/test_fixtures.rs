//! Test Fixtures Module
//!
//! Shared builders for engine tests.
//!
//! ## Usage
//! ```rust
//! #[cfg(test)]
//! use crate::engine::test_fixtures::{fixture_state, player_with_role};
//! ```

use nalgebra::Vector2;

use super::ai::positioning;
use super::match_state::MatchState;
use super::phase::MatchPhase;
use crate::models::{MatchSetup, Player, PlayerAttributes, PlayerRole, TacticConfig, Team, TeamSide};

// =============================================================================
// Roster Helpers
// =============================================================================

const STARTERS: [PlayerRole; 7] = [
    PlayerRole::Goalkeeper,
    PlayerRole::LeftWing,
    PlayerRole::LeftBack,
    PlayerRole::CentreBack,
    PlayerRole::RightBack,
    PlayerRole::RightWing,
    PlayerRole::Pivot,
];

const BENCH: [PlayerRole; 6] = [
    PlayerRole::Goalkeeper,
    PlayerRole::LeftWing,
    PlayerRole::RightWing,
    PlayerRole::LeftBack,
    PlayerRole::RightBack,
    PlayerRole::Pivot,
];

/// Seven starters plus a six-player bench, every attribute at 60.
pub fn fixture_team(name: &str) -> Team {
    let players = STARTERS
        .iter()
        .chain(BENCH.iter())
        .enumerate()
        .map(|(i, &role)| {
            let name = format!("{} {} {}", name, role.code(), i + 1);
            Player::new(name, role, PlayerAttributes::uniform(60))
        })
        .collect();
    Team::new(name, players)
}

pub fn fixture_setup(seed: u64) -> MatchSetup {
    MatchSetup::new(fixture_team("Home"), fixture_team("Away"), seed)
}

// =============================================================================
// State Helpers
// =============================================================================

/// Open-play state: throw-off formation, loose ball on the centre spot,
/// home attacking.
pub fn fixture_state(seed: u64) -> MatchState {
    build(fixture_setup(seed))
}

/// Same as `fixture_state`, with both teams defending in `formation`.
pub fn fixture_state_with(seed: u64, formation: &str) -> MatchState {
    let tactic =
        TacticConfig { defensive_formation: formation.to_string(), ..TacticConfig::default() };
    build(fixture_setup(seed).with_tactics(tactic.clone(), tactic))
}

fn build(setup: MatchSetup) -> MatchState {
    let mut state = MatchState::new(&setup).expect("fixture setup is valid");
    let spots: Vec<(usize, Vector2<f32>)> = state
        .active_players()
        .map(|p| (p.idx, positioning::kickoff_spot(&state, p)))
        .collect();
    for (idx, spot) in spots {
        state.players[idx].position = spot;
    }
    state.ball.place(Vector2::new(20.0, 10.0));
    state.phase = MatchPhase::HomeAttack;
    state
}

/// First on-court player of `side` with `role`.
pub fn player_with_role(state: &MatchState, side: TeamSide, role: PlayerRole) -> usize {
    state
        .on_court(side)
        .find(|p| p.role == role)
        .map(|p| p.idx)
        .expect("fixture fields every role")
}

/// Moves a player (and the ball, if carried) to `at`.
pub fn place(state: &mut MatchState, idx: usize, at: Vector2<f32>) {
    state.players[idx].position = at;
    state.players[idx].velocity = Vector2::zeros();
    if state.holder() == Some(idx) {
        state.ball.follow_holder(at);
    }
}

/// Parks every on-court field player of `side` on the halfway line at the
/// sideline, out of the way of a scenario.
pub fn clear_side(state: &mut MatchState, side: TeamSide) {
    let idxs: Vec<usize> =
        state.on_court(side).filter(|p| !p.is_goalkeeper()).map(|p| p.idx).collect();
    for idx in idxs {
        place(state, idx, Vector2::new(20.0, 0.5));
    }
}
