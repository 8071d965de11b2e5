//! Layered defensive decisions: team system, then role, then a generic
//! attribute-driven fallback.

use nalgebra::Vector2;

use super::{DefensiveChoice, DefensiveDecisions};
use crate::engine::ai::positioning;
use crate::engine::calculators::tackle;
use crate::engine::evaluators::{DecisionKind, RiskModifiers};
use crate::engine::geometry;
use crate::engine::match_state::MatchState;
use crate::engine::physics_constants::court;
use crate::engine::sim_player::{PlayerAction, SimPlayer};
use crate::models::{DefensiveSystem, DefensiveTier, PlayerRole};

/// Defender within this distance of the shot line can go for a block.
const BLOCK_LANE_M: f32 = 1.5;
const BLOCK_MAX_DISTANCE_M: f32 = 4.0;

#[derive(Debug, Clone, Copy, Default)]
pub struct LayeredDefense;

impl LayeredDefense {
    /// Tackle reach scaled by the tactic's aggression and the game-state
    /// risk modifier.
    fn tackle_range(state: &MatchState, d: &SimPlayer, base: f32) -> f32 {
        let aggression = state.team(d.side).tactic.aggression;
        let risk = RiskModifiers::for_decision(state, d, DecisionKind::Tackle).product();
        base * (0.8 + 0.4 * aggression) * risk.clamp(0.8, 1.25)
    }

    fn can_tackle(state: &MatchState, d: &SimPlayer, holder: &SimPlayer, range: f32) -> bool {
        let goal_x = state.defended_goal_x(d.side);
        !holder.is_goalkeeper()
            && !geometry::is_in_goal_area(&holder.position, goal_x)
            && (holder.position - d.position).norm() <= range
    }

    /// Step into the shot line when the holder is winding up.
    fn try_block(state: &MatchState, d: &SimPlayer, holder: &SimPlayer) -> Option<DefensiveChoice> {
        if holder.action != PlayerAction::PreparingShot {
            return None;
        }
        let goal = geometry::goal_center(state.defended_goal_x(d.side));
        let lane = geometry::distance_point_to_segment(&d.position, &holder.position, &goal);
        let gap = (d.position - holder.position).norm();
        if lane > BLOCK_LANE_M || gap > BLOCK_MAX_DISTANCE_M {
            return None;
        }
        let spot = geometry::closest_point_on_segment(&d.position, &holder.position, &goal);
        Some(DefensiveChoice::Block { spot })
    }

    /// Nearest active opponent field player to `pos` matching `filter`;
    /// ties go to the lowest index.
    fn nearest_threat(
        state: &MatchState,
        d: &SimPlayer,
        pos: &Vector2<f32>,
        radius: f32,
        filter: impl Fn(&SimPlayer) -> bool,
    ) -> Option<usize> {
        let mut best: Option<(usize, f32)> = None;
        for o in state.on_court(d.side.opponent()) {
            if !o.is_active() || o.is_goalkeeper() || !filter(o) {
                continue;
            }
            let dist = (o.position - pos).norm();
            if dist <= radius && best.map_or(true, |(_, bd)| dist < bd) {
                best = Some((o.idx, dist));
            }
        }
        best.map(|(idx, _)| idx)
    }

    fn mark(state: &MatchState, d: &SimPlayer, target: usize) -> DefensiveChoice {
        let spot = positioning::marking_spot(state, d, &state.players[target]);
        DefensiveChoice::Mark { target, spot }
    }

    // ====== Layer 1: team system ======

    fn system_choice(
        state: &MatchState,
        d: &SimPlayer,
        holder: &SimPlayer,
    ) -> Option<DefensiveChoice> {
        let tactic = &state.team(d.side).tactic;
        let system = tactic.defensive_system?;
        let home_spot = positioning::defense_spot(state, d);

        let (tackle_base, mark_radius) = match system {
            // Packed line: short reach, marks whatever steps into its zone
            DefensiveSystem::SixZero => (1.0, 3.0),
            DefensiveSystem::FiveOne => {
                if positioning::point_defender(state, d.side) == Some(d.idx) {
                    let goal_x = state.defended_goal_x(d.side);
                    let near_arc = geometry::distance_to_goal_mouth(&holder.position, goal_x)
                        <= court::FREE_THROW_LINE_M + 2.0;
                    if near_arc { (1.5, 5.0) } else { (1.0, 4.0) }
                } else {
                    (1.2, 3.0)
                }
            }
            DefensiveSystem::ThreeTwoOne => match tactic.tier_for(d.tactical_slot, d.role) {
                DefensiveTier::Deep => (1.0, 3.0),
                DefensiveTier::Mid => (1.5, 4.0),
                DefensiveTier::High => (2.0, 5.0),
            },
        };

        if let Some(block) = Self::try_block(state, d, holder) {
            return Some(block);
        }
        if Self::can_tackle(state, d, holder, Self::tackle_range(state, d, tackle_base)) {
            return Some(DefensiveChoice::Tackle { target: holder.idx });
        }
        // Threats are measured from the defender's zone, not the player
        Self::nearest_threat(state, d, &home_spot, mark_radius, |_| true)
            .map(|t| Self::mark(state, d, t))
    }

    // ====== Layer 2: role ======

    fn role_choice(
        state: &MatchState,
        d: &SimPlayer,
        holder: &SimPlayer,
    ) -> Option<DefensiveChoice> {
        let goal_x = state.defended_goal_x(d.side);
        if let Some(block) = Self::try_block(state, d, holder) {
            return Some(block);
        }
        match d.role {
            PlayerRole::Pivot => {
                // Guards the 6m zone
                let zone = court::GOAL_AREA_RADIUS_M + 2.0;
                Self::nearest_threat(state, d, &d.position, 4.0, |o| {
                    geometry::distance_to_goal_mouth(&o.position, goal_x) <= zone
                })
                .map(|t| Self::mark(state, d, t))
            }
            r if r.is_back() => {
                let base = if r == PlayerRole::CentreBack { 1.4 } else { 1.2 };
                if Self::can_tackle(state, d, holder, Self::tackle_range(state, d, base)) {
                    return Some(DefensiveChoice::Tackle { target: holder.idx });
                }
                Self::nearest_threat(state, d, &d.position, 4.0, |o| {
                    let dist = geometry::distance_to_goal_mouth(&o.position, goal_x);
                    let band = court::GOAL_AREA_RADIUS_M + 1.5..=court::FREE_THROW_LINE_M + 4.0;
                    band.contains(&dist)
                })
                .map(|t| Self::mark(state, d, t))
            }
            r if r.is_wing() => Self::nearest_threat(state, d, &d.position, 4.0, |o| {
                geometry::is_wide_angle(&o.position, goal_x)
            })
            .map(|t| Self::mark(state, d, t)),
            _ => None,
        }
    }

    // ====== Layer 3: generic ======

    fn generic_choice(state: &MatchState, d: &SimPlayer, holder: &SimPlayer) -> DefensiveChoice {
        let gap = (holder.position - d.position).norm();
        if gap <= 2.0 {
            let shielding = holder.attributes.shielding();
            let reach = Self::tackle_range(state, d, 1.2);
            if shielding < 0.5
                && tackle::tackler_composite(&d.attributes) >= 0.45
                && Self::can_tackle(state, d, holder, reach)
            {
                return DefensiveChoice::Tackle { target: holder.idx };
            }
            return Self::mark(state, d, holder.idx);
        }
        if let Some(t) = Self::nearest_threat(state, d, &d.position, 5.0, |_| true) {
            return Self::mark(state, d, t);
        }
        let spot = positioning::defense_spot(state, d);
        if (spot - d.position).norm() < 0.3 {
            DefensiveChoice::Idle
        } else {
            DefensiveChoice::Position { spot }
        }
    }
}

impl DefensiveDecisions for LayeredDefense {
    fn decide(&self, state: &MatchState, defender: usize) -> DefensiveChoice {
        let d = &state.players[defender];
        if !d.can_act() {
            return DefensiveChoice::Idle;
        }
        if d.is_goalkeeper() {
            return DefensiveChoice::Position { spot: positioning::goalkeeper_spot(state, d.side) };
        }

        let Some(holder_idx) = state.holder() else {
            // Loose or rolling: the nearest defender chases, the rest set up
            if state.ball.is_loose() || state.ball.is_rolling() {
                let ball = state.ball.ground_position();
                if state.nearest_active(d.side, &ball, state.goalkeeper(d.side)) == Some(defender) {
                    return DefensiveChoice::ChaseBall;
                }
            }
            return DefensiveChoice::Position { spot: positioning::defense_spot(state, d) };
        };
        let holder = &state.players[holder_idx];
        if holder.side == d.side {
            return DefensiveChoice::Idle;
        }

        Self::system_choice(state, d, holder)
            .or_else(|| Self::role_choice(state, d, holder))
            .unwrap_or_else(|| Self::generic_choice(state, d, holder))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_fixtures::{
        clear_side, fixture_state, fixture_state_with, place, player_with_role,
    };
    use crate::models::TeamSide;

    /// Away defends; returns (goal_x, direction into the court).
    fn away_defends(state: &MatchState) -> (f32, f32) {
        let goal_x = state.defended_goal_x(TeamSide::Away);
        (goal_x, geometry::into_court(goal_x))
    }

    #[test]
    fn test_tackles_holder_in_reach() {
        let mut state = fixture_state(5);
        clear_side(&mut state, TeamSide::Home);
        let (goal_x, dir) = away_defends(&state);
        let holder = player_with_role(&state, TeamSide::Home, PlayerRole::CentreBack);
        let defender = player_with_role(&state, TeamSide::Away, PlayerRole::CentreBack);
        place(&mut state, holder, Vector2::new(goal_x + dir * 9.5, 10.0));
        place(&mut state, defender, Vector2::new(goal_x + dir * 8.8, 10.0));
        state.give_ball_to(holder);

        let choice = LayeredDefense.decide(&state, defender);
        assert_eq!(choice, DefensiveChoice::Tackle { target: holder });
    }

    #[test]
    fn test_no_tackle_inside_goal_area() {
        let mut state = fixture_state(5);
        clear_side(&mut state, TeamSide::Home);
        let (goal_x, dir) = away_defends(&state);
        let holder = player_with_role(&state, TeamSide::Home, PlayerRole::Pivot);
        let defender = player_with_role(&state, TeamSide::Away, PlayerRole::CentreBack);
        place(&mut state, holder, Vector2::new(goal_x + dir * 5.0, 10.0));
        place(&mut state, defender, Vector2::new(goal_x + dir * 6.3, 10.0));
        state.give_ball_to(holder);

        assert!(!matches!(LayeredDefense.decide(&state, defender), DefensiveChoice::Tackle { .. }));
    }

    #[test]
    fn test_blocks_wind_up_in_lane() {
        let mut state = fixture_state(5);
        clear_side(&mut state, TeamSide::Home);
        let (goal_x, dir) = away_defends(&state);
        let holder = player_with_role(&state, TeamSide::Home, PlayerRole::LeftBack);
        let defender = player_with_role(&state, TeamSide::Away, PlayerRole::LeftBack);
        place(&mut state, holder, Vector2::new(goal_x + dir * 11.0, 10.0));
        place(&mut state, defender, Vector2::new(goal_x + dir * 8.0, 10.3));
        state.give_ball_to(holder);
        state.players[holder].set_action(PlayerAction::PreparingShot, Some(0.3));

        assert!(matches!(LayeredDefense.decide(&state, defender), DefensiveChoice::Block { .. }));
    }

    fn is_tackle(choice: DefensiveChoice) -> bool {
        matches!(choice, DefensiveChoice::Tackle { .. })
    }

    #[test]
    fn test_five_one_point_presses_near_the_arc() {
        let mut state = fixture_state_with(7, "5-1");
        clear_side(&mut state, TeamSide::Home);
        let (goal_x, dir) = away_defends(&state);
        let holder = player_with_role(&state, TeamSide::Home, PlayerRole::CentreBack);
        let point = player_with_role(&state, TeamSide::Away, PlayerRole::CentreBack);
        assert_eq!(positioning::point_defender(&state, TeamSide::Away), Some(point));

        // 1.48 m is out of reach for the line and the role fallback alike
        place(&mut state, holder, Vector2::new(goal_x + dir * 10.5, 10.0));
        place(&mut state, point, Vector2::new(goal_x + dir * 9.02, 10.0));
        state.give_ball_to(holder);
        let choice = LayeredDefense.decide(&state, point);
        assert_eq!(choice, DefensiveChoice::Tackle { target: holder });

        // Out at 14 m the point defender keeps its distance
        place(&mut state, holder, Vector2::new(goal_x + dir * 14.0, 10.0));
        place(&mut state, point, Vector2::new(goal_x + dir * 12.52, 10.0));
        assert!(matches!(
            LayeredDefense.decide(&state, point),
            DefensiveChoice::Mark { target, .. } if target == holder
        ));
    }

    #[test]
    fn test_five_one_line_does_not_press() {
        let mut state = fixture_state_with(7, "5-1");
        clear_side(&mut state, TeamSide::Home);
        let (goal_x, dir) = away_defends(&state);
        let holder = player_with_role(&state, TeamSide::Home, PlayerRole::CentreBack);
        let line = player_with_role(&state, TeamSide::Away, PlayerRole::LeftBack);
        assert_ne!(positioning::point_defender(&state, TeamSide::Away), Some(line));

        place(&mut state, holder, Vector2::new(goal_x + dir * 10.5, 10.0));
        place(&mut state, line, Vector2::new(goal_x + dir * 10.5, 11.48));
        state.give_ball_to(holder);
        assert!(!is_tackle(LayeredDefense.decide(&state, line)));

        place(&mut state, line, Vector2::new(goal_x + dir * 10.5, 11.0));
        assert_eq!(LayeredDefense.decide(&state, line), DefensiveChoice::Tackle { target: holder });
    }

    #[test]
    fn test_three_two_one_reach_grows_with_tier() {
        let mut state = fixture_state_with(8, "3-2-1");
        clear_side(&mut state, TeamSide::Home);
        let (goal_x, dir) = away_defends(&state);
        let holder = player_with_role(&state, TeamSide::Home, PlayerRole::CentreBack);
        let high = player_with_role(&state, TeamSide::Away, PlayerRole::CentreBack);
        let mid = player_with_role(&state, TeamSide::Away, PlayerRole::LeftBack);
        let deep = player_with_role(&state, TeamSide::Away, PlayerRole::Pivot);
        let tactic = &state.team(TeamSide::Away).tactic;
        assert_eq!(tactic.defensive_system, Some(DefensiveSystem::ThreeTwoOne));
        assert_eq!(tactic.tier_for(None, PlayerRole::CentreBack), DefensiveTier::High);
        assert_eq!(tactic.tier_for(None, PlayerRole::LeftBack), DefensiveTier::Mid);
        assert_eq!(tactic.tier_for(None, PlayerRole::Pivot), DefensiveTier::Deep);

        let at = Vector2::new(goal_x + dir * 12.0, 10.0);
        place(&mut state, holder, at);
        state.give_ball_to(holder);

        // 1.9 m: only the high defender reaches
        place(&mut state, high, at - Vector2::new(dir * 1.9, 0.0));
        place(&mut state, mid, at + Vector2::new(0.0, 1.9));
        assert_eq!(LayeredDefense.decide(&state, high), DefensiveChoice::Tackle { target: holder });
        assert!(!is_tackle(LayeredDefense.decide(&state, mid)));

        // 1.4 m: the middle tier steps in, the deep tier stays home
        place(&mut state, mid, at + Vector2::new(0.0, 1.4));
        place(&mut state, deep, at - Vector2::new(0.0, 1.4));
        assert_eq!(LayeredDefense.decide(&state, mid), DefensiveChoice::Tackle { target: holder });
        assert!(!is_tackle(LayeredDefense.decide(&state, deep)));
    }

    #[test]
    fn test_unknown_system_falls_back_to_roles() {
        let mut state = fixture_state_with(5, "zone");
        clear_side(&mut state, TeamSide::Home);
        let (goal_x, dir) = away_defends(&state);
        let holder = player_with_role(&state, TeamSide::Home, PlayerRole::LeftBack);
        let runner = player_with_role(&state, TeamSide::Home, PlayerRole::LeftWing);
        let wing = player_with_role(&state, TeamSide::Away, PlayerRole::RightWing);
        place(&mut state, holder, Vector2::new(goal_x + dir * 14.0, 10.0));
        state.give_ball_to(holder);
        // A wide attacker near the corner
        let corner = Vector2::new(goal_x + dir * 2.0, 1.5);
        place(&mut state, runner, corner);
        place(&mut state, wing, corner + Vector2::new(dir * 2.5, 1.0));

        assert!(state.team(TeamSide::Away).tactic.defensive_system.is_none());
        assert!(matches!(
            LayeredDefense.decide(&state, wing),
            DefensiveChoice::Mark { target, .. } if target == runner
        ));
    }

    #[test]
    fn test_nearest_defender_chases_loose_ball() {
        let mut state = fixture_state(5);
        let defender = player_with_role(&state, TeamSide::Away, PlayerRole::CentreBack);
        let spot = Vector2::new(20.0, 10.0);
        for idx in state.team(TeamSide::Away).on_court.clone() {
            place(&mut state, idx, Vector2::new(30.0, 3.0));
        }
        place(&mut state, defender, spot + Vector2::new(1.0, 0.0));
        let at = nalgebra::Vector3::new(spot.x, spot.y, 0.0);
        state.ball.make_loose(at, nalgebra::Vector3::zeros());

        assert_eq!(LayeredDefense.decide(&state, defender), DefensiveChoice::ChaseBall);
        let other = player_with_role(&state, TeamSide::Away, PlayerRole::LeftBack);
        assert!(matches!(LayeredDefense.decide(&state, other), DefensiveChoice::Position { .. }));
    }

    #[test]
    fn test_idle_when_own_team_has_ball() {
        let mut state = fixture_state(5);
        let holder = player_with_role(&state, TeamSide::Away, PlayerRole::CentreBack);
        state.give_ball_to(holder);
        let mate = player_with_role(&state, TeamSide::Away, PlayerRole::LeftBack);
        assert_eq!(LayeredDefense.decide(&state, mate), DefensiveChoice::Idle);
    }
}
