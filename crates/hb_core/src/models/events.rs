use serde::{Deserialize, Serialize};

use super::TeamSide;

/// Immutable log entry. Ordered by elapsed match time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchEvent {
    /// Elapsed match time in seconds.
    pub timestamp: f64,
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team: Option<TeamSide>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_id: Option<usize>,
}

impl MatchEvent {
    pub fn new(timestamp: f64, kind: EventKind, description: impl Into<String>) -> Self {
        Self { timestamp, kind, description: description.into(), team: None, player_id: None }
    }

    pub fn with_team(mut self, team: TeamSide) -> Self {
        self.team = Some(team);
        self
    }

    pub fn with_player(mut self, player_id: usize) -> Self {
        self.player_id = Some(player_id);
        self
    }

    /// "mm:ss" clock string for commentary layers.
    pub fn clock(&self) -> String {
        let secs = self.timestamp.max(0.0) as u64;
        format!("{:02}:{:02}", secs / 60, secs % 60)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    KickOff,
    Goal,
    Shot,
    Save,
    Miss,
    Block,
    Interception,
    Turnover,
    TechnicalFault,
    Foul,
    YellowCard,
    TwoMinuteSuspension,
    RedCard,
    SuspensionEnded,
    FreeThrow,
    SevenMeterThrow,
    ThrowIn,
    GoalThrow,
    Timeout,
    TimeoutEnded,
    PassivePlayWarning,
    PassivePlay,
    Substitution,
    HalfTime,
    FullTime,
    Cancelled,
    Critical,
}
