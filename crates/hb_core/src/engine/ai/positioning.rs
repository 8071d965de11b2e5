//! Formation spots for attack, defence and restarts.
//!
//! Attack spots are expressed in the attacker's frame: depth from the attacked
//! goal line and lateral distance from the attacker's left touchline.

use nalgebra::Vector2;

use crate::engine::geometry;
use crate::engine::match_state::MatchState;
use crate::engine::physics_constants::{ai, court, movement};
use crate::engine::sim_player::SimPlayer;
use crate::models::{DefensiveSystem, DefensiveTier, PlayerRole, TeamSide};

/// Deep-line radius of zone systems
pub const DEEP_LINE_M: f32 = 6.8;
pub const MID_LINE_M: f32 = 8.5;
pub const HIGH_LINE_M: f32 = 10.5;
pub const POINT_LINE_M: f32 = 9.5;

/// (depth, lateral) of each role in the attacking formation.
pub fn attack_frame(role: PlayerRole) -> (f32, f32) {
    match role {
        PlayerRole::LeftWing => (1.2, 1.5),
        PlayerRole::LeftBack => (9.5, 5.5),
        PlayerRole::CentreBack => (10.0, 10.0),
        PlayerRole::RightBack => (9.5, 14.5),
        PlayerRole::RightWing => (1.2, 18.5),
        PlayerRole::Pivot => (6.6, 10.0),
        PlayerRole::Goalkeeper => (0.8, 10.0),
    }
}

/// Converts an attacker-frame point for `goal_x` into court coordinates.
pub fn to_court(goal_x: f32, depth: f32, lateral: f32) -> Vector2<f32> {
    let y = if goal_x > court::HALFWAY_X { court::WIDTH_M - lateral } else { lateral };
    Vector2::new(goal_x + geometry::into_court(goal_x) * depth, y)
}

/// Role the player fills in the attack: the tactic slot if any, else own role.
pub fn attacking_role(state: &MatchState, player: &SimPlayer) -> PlayerRole {
    player
        .tactical_slot
        .and_then(|s| state.team(player.side).tactic.offensive_slots.get(s).copied())
        .unwrap_or(player.role)
}

pub fn attack_spot(state: &MatchState, player: &SimPlayer) -> Vector2<f32> {
    if player.is_goalkeeper() {
        return goalkeeper_spot(state, player.side);
    }
    let goal_x = state.attacked_goal_x(player.side);
    let role = attacking_role(state, player);
    let (depth, lateral) = attack_frame(role);
    let mut spot = to_court(goal_x, depth, lateral);
    if !role.is_wing() {
        spot.y += (state.ball.position.y - spot.y) * 0.25;
    }
    let spot = geometry::push_outside_goal_area(spot, goal_x, movement::GOAL_AREA_MARGIN_M);
    geometry::clamp_to_court(spot)
}

/// Signed angle (degrees) of `p` off the normal of the goal at `goal_x`.
pub fn signed_angle_deg(p: &Vector2<f32>, goal_x: f32) -> f32 {
    let rel = p - geometry::goal_center(goal_x);
    let depth = (rel.x * geometry::into_court(goal_x)).max(0.5);
    rel.y.atan2(depth).to_degrees()
}

fn spread(i: usize, n: usize, lo: f32, hi: f32) -> f32 {
    if n <= 1 {
        (lo + hi) / 2.0
    } else {
        lo + (hi - lo) * i as f32 / (n - 1) as f32
    }
}

/// Field defenders of `side` in lateral order (ties by index).
pub fn ordered_defenders(state: &MatchState, side: TeamSide) -> Vec<usize> {
    let mut ids: Vec<usize> = state
        .on_court(side)
        .filter(|p| p.is_active() && !p.is_goalkeeper())
        .map(|p| p.idx)
        .collect();
    ids.sort_by_key(|&i| (state.players[i].role.lateral_order(), i));
    ids
}

/// The advanced defender of a 5-1: high tier first, then the centre back,
/// then the middle of the line.
pub fn point_defender(state: &MatchState, side: TeamSide) -> Option<usize> {
    let ids = ordered_defenders(state, side);
    let tactic = &state.team(side).tactic;
    let is_high = |i: usize| {
        let p = &state.players[i];
        tactic.tier_for(p.tactical_slot, p.role) == DefensiveTier::High
    };
    ids.iter()
        .copied()
        .find(|&i| is_high(i))
        .or_else(|| ids.iter().copied().find(|&i| state.players[i].role == PlayerRole::CentreBack))
        .or_else(|| ids.get(ids.len() / 2).copied())
}

pub fn defense_spot(state: &MatchState, player: &SimPlayer) -> Vector2<f32> {
    if player.is_goalkeeper() {
        return goalkeeper_spot(state, player.side);
    }
    let side = player.side;
    let goal_x = state.defended_goal_x(side);
    let tactic = &state.team(side).tactic;
    let line = DEEP_LINE_M + tactic.defensive_line_height * 1.5;
    let ball_angle = signed_angle_deg(&state.ball.ground_position(), goal_x).clamp(-70.0, 70.0);
    let shift = ball_angle * 0.2;
    let ids = ordered_defenders(state, side);

    let spot = match tactic.defensive_system {
        Some(DefensiveSystem::FiveOne) => {
            let point = point_defender(state, side);
            if point == Some(player.idx) {
                let radius = POINT_LINE_M + tactic.defensive_line_height;
                geometry::arc_point(goal_x, radius, ball_angle * 0.8)
            } else {
                let line_ids: Vec<usize> =
                    ids.iter().copied().filter(|&i| Some(i) != point).collect();
                let i = line_ids.iter().position(|&x| x == player.idx).unwrap_or(0);
                geometry::arc_point(goal_x, line, spread(i, line_ids.len(), -62.0, 62.0) + shift)
            }
        }
        Some(DefensiveSystem::ThreeTwoOne) => {
            let tier = tactic.tier_for(player.tactical_slot, player.role);
            let same: Vec<usize> = ids
                .iter()
                .copied()
                .filter(|&i| {
                    let p = &state.players[i];
                    tactic.tier_for(p.tactical_slot, p.role) == tier
                })
                .collect();
            let i = same.iter().position(|&x| x == player.idx).unwrap_or(0);
            let (radius, lo, hi) = match tier {
                DefensiveTier::Deep => (DEEP_LINE_M, -55.0, 55.0),
                DefensiveTier::Mid => (MID_LINE_M, -32.0, 32.0),
                DefensiveTier::High => (HIGH_LINE_M, -12.0, 12.0),
            };
            let sway = if tier == DefensiveTier::High { ball_angle * 0.7 } else { shift };
            let angle = spread(i, same.len(), lo, hi) + sway;
            geometry::arc_point(goal_x, radius, angle)
        }
        // 6-0 and role-based defence share the flat line; backs step out
        // slightly without a named system.
        system => {
            let i = ids.iter().position(|&x| x == player.idx).unwrap_or(0);
            let step_out = if system.is_none() && player.role.is_back() { 1.0 } else { 0.0 };
            geometry::arc_point(goal_x, line + step_out, spread(i, ids.len(), -65.0, 65.0) + shift)
        }
    };
    geometry::push_outside_goal_area(spot, goal_x, movement::GOAL_AREA_MARGIN_M)
}

/// Keeper spot: just off the line, following the ball across the mouth.
pub fn goalkeeper_spot(state: &MatchState, side: TeamSide) -> Vector2<f32> {
    let goal_x = state.defended_goal_x(side);
    let ball = state.ball.ground_position();
    let attacking = state.possession.team() == Some(side);
    let offset = if attacking { ai::GK_ATTACK_OFFSET_M } else { ai::GK_LINE_OFFSET_M };
    let y = court::CENTER_Y + ((ball.y - court::CENTER_Y) * 0.3).clamp(-1.2, 1.2);
    Vector2::new(goal_x + geometry::into_court(goal_x) * offset, y)
}

/// Point between a marked opponent and the defended goal.
pub fn marking_spot(state: &MatchState, defender: &SimPlayer, target: &SimPlayer) -> Vector2<f32> {
    let goal = geometry::goal_center(state.defended_goal_x(defender.side));
    let to_goal = goal - target.position;
    let dir = if to_goal.norm() > 1e-4 { to_goal / to_goal.norm() } else { Vector2::zeros() };
    let spot = target.position + dir * ai::MARK_DISTANCE_M;
    let goal_x = state.defended_goal_x(defender.side);
    geometry::push_outside_goal_area(spot, goal_x, movement::GOAL_AREA_MARGIN_M)
}

/// Throw-off formation: everyone in their own half.
pub fn kickoff_spot(state: &MatchState, player: &SimPlayer) -> Vector2<f32> {
    let own_goal = state.defended_goal_x(player.side);
    let (depth, lateral) = match player.role {
        PlayerRole::Goalkeeper => (0.8, 10.0),
        PlayerRole::LeftWing => (15.0, 2.0),
        PlayerRole::LeftBack => (12.0, 6.0),
        PlayerRole::CentreBack => (17.0, 10.0),
        PlayerRole::RightBack => (12.0, 14.0),
        PlayerRole::RightWing => (15.0, 18.0),
        PlayerRole::Pivot => (14.0, 10.0),
    };
    // Own half, seen from the own goal: mirror the lateral axis
    let y = if own_goal > court::HALFWAY_X { lateral } else { court::WIDTH_M - lateral };
    let x = own_goal + geometry::into_court(own_goal) * depth;
    Vector2::new(x, y)
}

/// Defenders at restarts: formation spot, at least the clearance away from
/// the ball.
pub fn restart_defense_spot(
    state: &MatchState,
    player: &SimPlayer,
    ball: &Vector2<f32>,
) -> Vector2<f32> {
    let spot = defense_spot(state, player);
    if player.is_goalkeeper() {
        return spot;
    }
    let offset = spot - ball;
    let dist = offset.norm();
    if dist >= court::RESTART_CLEARANCE_M {
        return spot;
    }
    let goal_x = state.defended_goal_x(player.side);
    let dir = if dist > 1e-4 {
        offset / dist
    } else {
        let away = ball - geometry::goal_center(goal_x);
        if away.norm() > 1e-4 {
            away / away.norm()
        } else {
            Vector2::new(geometry::into_court(goal_x), 0.0)
        }
    };
    let moved = geometry::clamp_to_court(ball + dir * court::RESTART_CLEARANCE_M);
    geometry::push_outside_goal_area(moved, goal_x, movement::GOAL_AREA_MARGIN_M)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_fixtures::fixture_state;
    use crate::models::{Tactic, TacticConfig};

    #[test]
    fn test_attack_frame_mirrors_by_direction() {
        // Attacking x=40 (facing +x): left touchline is high y
        assert_eq!(to_court(40.0, 1.2, 1.5), Vector2::new(38.8, 18.5));
        assert_eq!(to_court(0.0, 1.2, 1.5), Vector2::new(1.2, 1.5));
    }

    #[test]
    fn test_attack_spots_outside_goal_area() {
        let state = fixture_state(5);
        for p in state.on_court(TeamSide::Home).filter(|p| !p.is_goalkeeper()) {
            let spot = attack_spot(&state, p);
            assert!(!geometry::is_in_goal_area(&spot, state.attacked_goal_x(TeamSide::Home)));
            assert!(geometry::is_on_court(&spot));
        }
    }

    #[test]
    fn test_six_zero_line_is_on_the_arc() {
        let state = fixture_state(5);
        let goal_x = state.defended_goal_x(TeamSide::Away);
        for p in state.on_court(TeamSide::Away).filter(|p| !p.is_goalkeeper()) {
            let spot = defense_spot(&state, p);
            let r = (spot - geometry::goal_center(goal_x)).norm();
            assert!(r > 6.0 && r < 9.0, "radius {r}");
        }
    }

    #[test]
    fn test_five_one_point_is_advanced() {
        let mut state = fixture_state(5);
        let config = TacticConfig { defensive_formation: "5-1".into(), ..TacticConfig::default() };
        state.team_mut(TeamSide::Away).tactic = Tactic::from_config(&config);
        let point = point_defender(&state, TeamSide::Away).unwrap();
        let goal = geometry::goal_center(state.defended_goal_x(TeamSide::Away));
        let point_r = (defense_spot(&state, &state.players[point]) - goal).norm();
        assert!(point_r >= POINT_LINE_M - 0.01);
        for p in state.on_court(TeamSide::Away).filter(|p| !p.is_goalkeeper() && p.idx != point) {
            assert!((defense_spot(&state, p) - goal).norm() < point_r);
        }
    }

    #[test]
    fn test_kickoff_spots_in_own_half() {
        let state = fixture_state(5);
        for p in state.players.iter().filter(|p| p.on_court) {
            let spot = kickoff_spot(&state, p);
            let own = state.defended_goal_x(p.side);
            assert!((spot.x - own).abs() <= court::HALFWAY_X);
        }
    }

    #[test]
    fn test_restart_clearance() {
        let state = fixture_state(5);
        let p = state.on_court(TeamSide::Away).find(|p| !p.is_goalkeeper()).unwrap();
        let ball = defense_spot(&state, p);
        let spot = restart_defense_spot(&state, p, &ball);
        assert!((spot - ball).norm() >= court::RESTART_CLEARANCE_M - 0.5);
    }
}
