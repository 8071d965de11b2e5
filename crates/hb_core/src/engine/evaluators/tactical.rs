//! Team tactic -> risk modifier.

use super::DecisionKind;
use crate::models::{FocusPlay, Pace, Tactic};

pub struct TacticalEvaluator;

impl TacticalEvaluator {
    pub fn modifier(tactic: &Tactic, kind: DecisionKind) -> f32 {
        let aggression = tactic.aggression.clamp(0.0, 1.0);
        let pace = match tactic.pace {
            Pace::Slow => -0.05,
            Pace::Normal => 0.0,
            Pace::Fast => 0.05,
        };
        let m = match kind {
            // Slow, patient teams pass more; fast teams shoot earlier
            DecisionKind::Pass => 1.05 - pace - 0.1 * (aggression - 0.5),
            DecisionKind::Shot => 0.95 + pace + 0.2 * aggression,
            DecisionKind::Dribble => 0.95 + 0.1 * aggression,
            DecisionKind::Tackle => 0.8 + 0.4 * aggression,
        };
        let fast_break =
            matches!(tactic.focus_play, FocusPlay::FastBreak) && kind == DecisionKind::Shot;
        (m + if fast_break { 0.05 } else { 0.0 }).clamp(0.6, 1.4)
    }
}
