//! Score and clock -> risk modifier.

use super::DecisionKind;

/// Last stretch of the match where the score starts to drive risk
const LATE_GAME_S: f32 = 600.0;

pub struct GameStateEvaluator;

impl GameStateEvaluator {
    /// `goal_difference` is own minus opponent. A passive-play warning
    /// against the team pushes toward shooting.
    pub fn modifier(
        goal_difference: i32,
        remaining_s: f32,
        total_s: f32,
        passive_warning: bool,
        kind: DecisionKind,
    ) -> f32 {
        let late = if total_s > 0.0 {
            (1.0 - remaining_s / LATE_GAME_S.min(total_s)).clamp(0.0, 1.0)
        } else {
            0.0
        };
        // Trailing late: more risk. Leading late: less.
        let urgency = (-(goal_difference as f32) / 3.0).clamp(-1.0, 1.0) * late;

        let m = match kind {
            DecisionKind::Shot => 1.0 + 0.2 * urgency + if passive_warning { 0.25 } else { 0.0 },
            DecisionKind::Pass => 1.0 - 0.1 * urgency - if passive_warning { 0.1 } else { 0.0 },
            DecisionKind::Dribble => 1.0 + 0.1 * urgency,
            DecisionKind::Tackle => 1.0 + 0.25 * urgency,
        };
        m.clamp(0.7, 1.4)
    }
}
