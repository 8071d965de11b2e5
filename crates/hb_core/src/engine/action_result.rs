//! Ephemeral outcome values produced by calculators and the event detector.
//!
//! An `ActionResult` lives for one tick: the event handler consumes it and
//! discards it.

use nalgebra::{Vector2, Vector3};

use super::ball::ShotContext;
use crate::models::TeamSide;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// Ball rebounds loose
    Deflected,
    /// Blocker secures the ball
    Caught,
    /// Deflected over the goal line: throw-in for the attack
    OverGoalLine,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
    Intercepted,
    Saved,
    Blocked(BlockKind),
    Goal,
    Miss,
    Foul,
    OutOfBounds,
    Turnover,
}

/// Escalating foul tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FoulSeverity {
    FreeThrow,
    PenaltyThrow,
    TwoMinuteSuspension,
    RedCard,
}

impl FoulSeverity {
    pub fn label(&self) -> &'static str {
        match self {
            FoulSeverity::FreeThrow => "free throw",
            FoulSeverity::PenaltyThrow => "7m throw",
            FoulSeverity::TwoMinuteSuspension => "2 minutes",
            FoulSeverity::RedCard => "red card",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FoulDetails {
    pub severity: FoulSeverity,
    /// Warrants a yellow card (if the player/team still has one available)
    pub yellow_worthy: bool,
    /// Awards a 7m throw in addition to any personal punishment
    pub penalty_throw: bool,
    pub position: Vector2<f32>,
}

/// Routing tag read by the event handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReasonTag {
    PassReleased,
    PassReceived,
    PassIntercepted,
    PassInterceptedBeforeRelease,
    PassFumbled,
    ShotTaken,
    PenaltyShot,
    ShotSaved,
    ShotBlocked,
    ShotMissed,
    GoalScored,
    ShotZoneViolation,
    TackleWon,
    TackleEvaded,
    TackleFoul,
    TackleOutOfRange,
    LooseBallPickup,
    GoalLine,
    Sideline,
    StepsViolation,
    HoldingViolation,
    PassivePlay,
    UnhandledPreparedAction,
}

impl ReasonTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasonTag::PassReleased => "Pass Released",
            ReasonTag::PassReceived => "Pass Received",
            ReasonTag::PassIntercepted => "Pass Intercepted",
            ReasonTag::PassInterceptedBeforeRelease => "Pass Intercepted Before Release",
            ReasonTag::PassFumbled => "Pass Fumbled",
            ReasonTag::ShotTaken => "Shot Taken",
            ReasonTag::PenaltyShot => "Penalty Shot",
            ReasonTag::ShotSaved => "Shot Saved",
            ReasonTag::ShotBlocked => "Shot Blocked",
            ReasonTag::ShotMissed => "Shot Missed",
            ReasonTag::GoalScored => "Goal Scored",
            ReasonTag::ShotZoneViolation => "Shot Zone Violation",
            ReasonTag::TackleWon => "Tackle Won",
            ReasonTag::TackleEvaded => "Tackle Evaded",
            ReasonTag::TackleFoul => "Tackle Foul",
            ReasonTag::TackleOutOfRange => "Tackle Out Of Range",
            ReasonTag::LooseBallPickup => "Loose Ball Pickup",
            ReasonTag::GoalLine => "Goal Line",
            ReasonTag::Sideline => "Sideline",
            ReasonTag::StepsViolation => "Steps Violation",
            ReasonTag::HoldingViolation => "Holding Violation",
            ReasonTag::PassivePlay => "Passive Play",
            ReasonTag::UnhandledPreparedAction => "Unhandled Prepared Action",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActionResult {
    pub outcome: Outcome,
    pub reason: ReasonTag,
    /// Acting player (passer, shooter, tackler, interceptor, picker)
    pub primary: Option<usize>,
    /// Counterpart (target, keeper, tackled player)
    pub secondary: Option<usize>,
    pub foul: Option<FoulDetails>,
    pub impact_position: Option<Vector2<f32>>,
    /// Player holding the ball once the outcome is applied
    pub possession_holder: Option<usize>,
    /// Team awarded the restart (out of bounds, violations)
    pub restart_team: Option<TeamSide>,
    /// Launch velocity for passes, shots and rebounds
    pub ball_velocity: Option<Vector3<f32>>,
    pub shot: Option<ShotContext>,
}

impl ActionResult {
    pub fn new(outcome: Outcome, reason: ReasonTag) -> Self {
        Self {
            outcome,
            reason,
            primary: None,
            secondary: None,
            foul: None,
            impact_position: None,
            possession_holder: None,
            restart_team: None,
            ball_velocity: None,
            shot: None,
        }
    }

    pub fn success(reason: ReasonTag, primary: usize) -> Self {
        Self::new(Outcome::Success, reason).with_primary(primary)
    }

    pub fn failure(reason: ReasonTag, primary: usize) -> Self {
        Self::new(Outcome::Failure, reason).with_primary(primary)
    }

    pub fn with_primary(mut self, idx: usize) -> Self {
        self.primary = Some(idx);
        self
    }

    pub fn with_secondary(mut self, idx: usize) -> Self {
        self.secondary = Some(idx);
        self
    }

    pub fn at(mut self, position: Vector2<f32>) -> Self {
        self.impact_position = Some(position);
        self
    }

    pub fn with_holder(mut self, idx: usize) -> Self {
        self.possession_holder = Some(idx);
        self
    }

    pub fn with_restart_team(mut self, team: TeamSide) -> Self {
        self.restart_team = Some(team);
        self
    }

    pub fn with_velocity(mut self, velocity: Vector3<f32>) -> Self {
        self.ball_velocity = Some(velocity);
        self
    }

    pub fn with_foul(mut self, foul: FoulDetails) -> Self {
        self.foul = Some(foul);
        self
    }

    pub fn with_shot(mut self, shot: ShotContext) -> Self {
        self.shot = Some(shot);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_tags_are_human_readable() {
        assert_eq!(ReasonTag::PassReleased.as_str(), "Pass Released");
        assert_eq!(ReasonTag::UnhandledPreparedAction.as_str(), "Unhandled Prepared Action");
        assert_eq!(ReasonTag::LooseBallPickup.as_str(), "Loose Ball Pickup");
    }

    #[test]
    fn test_severity_ordering() {
        assert!(FoulSeverity::FreeThrow < FoulSeverity::PenaltyThrow);
        assert!(FoulSeverity::TwoMinuteSuspension < FoulSeverity::RedCard);
    }

    #[test]
    fn test_builder() {
        let r = ActionResult::success(ReasonTag::TackleWon, 3).with_secondary(9).with_holder(3);
        assert_eq!(r.outcome, Outcome::Success);
        assert_eq!(r.primary, Some(3));
        assert_eq!(r.secondary, Some(9));
        assert_eq!(r.possession_holder, Some(3));
    }
}
