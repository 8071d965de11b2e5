//! Role-aware offensive scoring: pass, shoot, dribble, screen.

use nalgebra::Vector2;

use super::{DribbleDecision, OffensiveDecisions, PassCandidate, ScreenOpportunity, ShotDecision};
use crate::engine::evaluators::{DecisionKind, RiskModifiers};
use crate::engine::geometry;
use crate::engine::match_state::MatchState;
use crate::engine::physics_constants::{ai, court, skills::normalize, timing};
use crate::engine::sim_player::SimPlayer;
use crate::models::PlayerRole;

#[derive(Debug, Clone, Copy, Default)]
pub struct RoleAwareOffense;

impl RoleAwareOffense {
    /// Additive preference of a passer role for a receiver.
    fn role_term(
        passer: PlayerRole,
        receiver: &SimPlayer,
        receiver_open: bool,
        distance: f32,
    ) -> f32 {
        if passer.is_wing() {
            if receiver.role.is_pivot() {
                3.0
            } else if receiver.role.is_back() {
                2.0
            } else {
                0.0
            }
        } else if passer.is_back() {
            if receiver.role.is_wing() && receiver_open {
                3.0
            } else if receiver.role.is_pivot() {
                2.5
            } else {
                0.5
            }
        } else if passer.is_pivot() {
            let short = if distance < 8.0 { 1.0 } else { 0.0 };
            if receiver.role.is_back() { 3.0 + short } else { short }
        } else {
            // Goalkeeper outlets: the furthest forward open player
            if receiver_open { 2.0 } else { 0.0 }
        }
    }

    /// Utility of passing from `holder` to `receiver` before modifiers.
    pub fn pass_utility(
        state: &MatchState,
        holder: &SimPlayer,
        receiver: &SimPlayer,
    ) -> Option<f32> {
        let distance = (receiver.position - holder.position).norm();
        if distance > ai::MAX_PASS_DISTANCE_M || distance < 1.0 {
            return None;
        }
        let goal_x = state.attacked_goal_x(holder.side);
        let opponent = holder.side.opponent();

        let mut score =
            ai::PASS_SCORE_OFFSET - geometry::distance_to_goal_mouth(&receiver.position, goal_x);
        score += ai::TEAMWORK_BONUS * normalize(holder.attributes.teamwork);

        // Receiver running toward goal
        let to_goal = geometry::goal_center(goal_x) - receiver.position;
        if to_goal.norm() > 1e-4 {
            let run = receiver.velocity.dot(&(to_goal / to_goal.norm())).max(0.0);
            score += ai::ANTICIPATION_BONUS * run * normalize(receiver.attributes.anticipation);
        }

        let mut open = true;
        for d in state.on_court(opponent).filter(|p| p.is_active()) {
            let gap = (d.position - receiver.position).norm();
            if gap < ai::DEFENDER_PROXIMITY_RADIUS_M {
                score -= ai::DEFENDER_PROXIMITY_PENALTY
                    * (1.0 - gap / ai::DEFENDER_PROXIMITY_RADIUS_M);
                if gap < ai::NEARBY_OPPONENT_RADIUS_M {
                    open = false;
                }
            }
            let lane = geometry::distance_point_to_segment(
                &d.position,
                &holder.position,
                &receiver.position,
            );
            if !d.is_goalkeeper() && lane < ai::LANE_RADIUS_M {
                score -= ai::LANE_PENALTY;
            }
        }

        score += Self::role_term(holder.role, receiver, open, distance);
        score += ai::PASSING_SKILL_BONUS * normalize(holder.attributes.passing);
        if state.team(holder.side).tactic.focus_play.favours(receiver.role) {
            score += 2.0;
        }
        Some(score)
    }

    fn wing_confidence(holder: &SimPlayer, distance: f32, close: usize) -> f32 {
        let a = &holder.attributes;
        0.45 + 0.35 * normalize(a.finishing) + 0.1 * normalize(a.agility) - 0.1 * close as f32
            - 0.02 * (distance - 6.0).max(0.0)
    }

    fn back_confidence(holder: &SimPlayer, distance: f32, close: usize) -> f32 {
        let a = &holder.attributes;
        0.3 + 0.4 * normalize(a.power) + 0.3 * normalize(a.finishing) - 0.12 * close as f32
            - 0.03 * (distance - 9.0).max(0.0)
    }

    fn pivot_confidence(holder: &SimPlayer, close: usize) -> f32 {
        let a = &holder.attributes;
        0.5 + 0.3 * normalize(a.finishing) + 0.2 * normalize(a.strength) - 0.1 * close as f32
    }
}

impl OffensiveDecisions for RoleAwareOffense {
    fn best_pass(&self, state: &MatchState, holder: usize) -> Option<PassCandidate> {
        let h = &state.players[holder];
        let modifier = RiskModifiers::for_decision(state, h, DecisionKind::Pass).product();
        let mut best: Option<PassCandidate> = None;
        // on_court is kept sorted, so strict '>' keeps the lowest index on ties
        for r in state.on_court(h.side) {
            if r.idx == holder || !r.can_act() || r.is_goalkeeper() {
                continue;
            }
            let Some(utility) = Self::pass_utility(state, h, r) else {
                continue;
            };
            let score = utility * modifier;
            if best.map_or(true, |b| score > b.score) {
                best = Some(PassCandidate { target: r.idx, score });
            }
        }
        best
    }

    fn shot_decision(&self, state: &MatchState, holder: usize) -> ShotDecision {
        let h = &state.players[holder];
        if h.is_goalkeeper() {
            return ShotDecision::ineligible();
        }
        let goal_x = state.attacked_goal_x(h.side);
        let opponent = h.side.opponent();
        let distance = geometry::distance_to_goal_mouth(&h.position, goal_x);
        let close = state.count_within(opponent, &h.position, ai::NEARBY_OPPONENT_RADIUS_M);
        let nearest = state.nearest_distance(opponent, &h.position);

        let mut jump = true;
        let role_confidence = match h.role {
            r if r.is_wing() => {
                (distance <= ai::WING_SHOT_RANGE_M && geometry::is_wide_angle(&h.position, goal_x))
                    .then(|| Self::wing_confidence(h, distance, close))
            }
            r if r.is_back() => (distance > ai::BACK_MIN_SHOT_RANGE_M
                && distance <= ai::BACK_MAX_SHOT_RANGE_M
                && close <= 2)
                .then(|| Self::back_confidence(h, distance, close)),
            PlayerRole::Pivot => {
                let on_line = distance <= court::GOAL_AREA_RADIUS_M + ai::PIVOT_LINE_TOLERANCE_M;
                let just_received = h
                    .since_pass_received
                    .map_or(false, |t| t <= timing::RECEIVED_PASS_WINDOW_S);
                // Strong pivots turn on the spot
                jump = h.attributes.agility >= h.attributes.strength;
                (on_line && just_received).then(|| Self::pivot_confidence(h, close))
            }
            _ => None,
        };

        // Anyone in the clear close to goal may shoot
        let open_chance = (distance <= ai::FAST_BREAK_RANGE_M && nearest > 3.0)
            .then(|| 0.6 + 0.3 * normalize(h.attributes.finishing));

        let raw = match (role_confidence, open_chance) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
        let Some(raw) = raw else {
            return ShotDecision::ineligible();
        };
        let risk = RiskModifiers::for_decision(state, h, DecisionKind::Shot).product();
        let confidence = (raw * risk).clamp(0.0, 1.0);
        ShotDecision { eligible: true, confidence, shoot: confidence >= ai::SHOOT_THRESHOLD, jump }
    }

    fn dribble_decision(&self, state: &MatchState, holder: usize) -> DribbleDecision {
        let h = &state.players[holder];
        if !h.has_ball || h.dribbled_since_possession || h.is_goalkeeper() {
            return DribbleDecision { score: 0.0, dribble: false };
        }
        let shielding = h.attributes.shielding();
        let mut score = shielding;
        if shielding > 0.6 {
            score *= 1.2;
        } else if shielding < 0.4 {
            score *= 0.6;
        }
        let nearby =
            state.count_within(h.side.opponent(), &h.position, ai::NEARBY_OPPONENT_RADIUS_M);
        score -= 0.15 * nearby as f32;
        score += match h.role {
            r if r.is_back() => 0.1,
            r if r.is_wing() => -0.05,
            PlayerRole::Pivot => -0.2,
            _ => 0.0,
        };
        score *= RiskModifiers::for_decision(state, h, DecisionKind::Dribble).product();
        DribbleDecision { score, dribble: score >= ai::DRIBBLE_THRESHOLD }
    }

    fn screen_opportunity(&self, state: &MatchState, pivot: usize) -> Option<ScreenOpportunity> {
        let pv = &state.players[pivot];
        if !pv.role.is_pivot() {
            return None;
        }
        let goal_x = state.attacked_goal_x(pv.side);
        let opponent = pv.side.opponent();

        let mut best: Option<(f32, ScreenOpportunity)> = None;
        for mate in state.on_court(pv.side) {
            if mate.idx == pivot || !mate.role.is_back() || !mate.is_active() {
                continue;
            }
            let gap = (mate.position - pv.position).norm();
            if gap > ai::SCREEN_SEARCH_RADIUS_M {
                continue;
            }
            let line_gap = (geometry::distance_to_goal_mouth(&mate.position, goal_x)
                - court::FREE_THROW_LINE_M)
                .abs();
            if line_gap > ai::SCREEN_LINE_TOLERANCE_M {
                continue;
            }
            let Some(marker) = state.nearest_active(opponent, &mate.position, None) else {
                continue;
            };
            let d = &state.players[marker];
            if (d.position - mate.position).norm() > ai::SCREEN_MARK_RADIUS_M || d.is_goalkeeper() {
                continue;
            }

            let lateral = if d.position.y < court::CENTER_Y { 1.0 } else { -1.0 };
            let anchor = geometry::clamp_to_court(
                d.position + Vector2::new(0.0, lateral * ai::SCREEN_OFFSET_M),
            );
            let to_def = d.position - mate.position;
            let to_goal = geometry::goal_center(goal_x) - mate.position;
            let effectiveness_deg = if to_def.norm() > 1e-4 && to_goal.norm() > 1e-4 {
                let cos = to_def.dot(&to_goal) / (to_def.norm() * to_goal.norm());
                (90.0 - cos.clamp(-1.0, 1.0).acos().to_degrees()).clamp(0.0, 90.0)
            } else {
                90.0
            };
            let candidate = ScreenOpportunity {
                teammate: mate.idx,
                defender: marker,
                anchor,
                effectiveness_deg,
            };
            if best.as_ref().map_or(true, |(g, _)| gap < *g) {
                best = Some((gap, candidate));
            }
        }
        best.map(|(_, s)| s)
    }
}
