//! Match result and state snapshot DTOs.
//!
//! These structures are the sink of the engine: presentation layers read the
//! event log for commentary and the snapshot for rendering. Positions are in
//! meters on the 40m x 20m court.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::events::MatchEvent;
use super::stats::{PlayerMatchStats, TeamMatchStats};
use super::TeamSide;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    pub match_id: String,
    pub home_team: String,
    pub away_team: String,
    pub home_score: u16,
    pub away_score: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_date: Option<NaiveDate>,
    pub events: Vec<MatchEvent>,
    pub home_stats: TeamMatchStats,
    pub away_stats: TeamMatchStats,
    pub player_stats: BTreeMap<usize, PlayerMatchStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_state: Option<MatchSnapshot>,
    /// Set when a setup/runtime error aborted the match.
    pub aborted: bool,
    /// Set when the caller cancelled the run (graceful, not an error).
    pub cancelled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MatchResult {
    /// Error result for matches rejected before kick-off.
    pub fn rejected(
        home_team: impl Into<String>,
        away_team: impl Into<String>,
        match_date: Option<NaiveDate>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            match_id: uuid::Uuid::new_v4().to_string(),
            home_team: home_team.into(),
            away_team: away_team.into(),
            home_score: 0,
            away_score: 0,
            match_date,
            events: Vec::new(),
            home_stats: TeamMatchStats::default(),
            away_stats: TeamMatchStats::default(),
            player_stats: BTreeMap::new(),
            final_state: None,
            aborted: true,
            cancelled: false,
            error: Some(error.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        !self.aborted && self.error.is_none()
    }

    pub fn winner(&self) -> Option<TeamSide> {
        match self.home_score.cmp(&self.away_score) {
            std::cmp::Ordering::Greater => Some(TeamSide::Home),
            std::cmp::Ordering::Less => Some(TeamSide::Away),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// Serializable snapshot of the whole simulation state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchSnapshot {
    pub elapsed: f64,
    pub half: u8,
    pub phase: String,
    pub home_score: u16,
    pub away_score: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub possession: Option<TeamSide>,
    pub ball: BallSnapshot,
    pub players: Vec<PlayerSnapshot>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BallSnapshot {
    pub position: [f32; 3],
    pub velocity: [f32; 3],
    pub angular_velocity: [f32; 3],
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub holder: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_touch_team: Option<TeamSide>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_touch_player: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerSnapshot {
    pub id: usize,
    pub name: String,
    pub team: TeamSide,
    pub role: String,
    pub on_court: bool,
    pub position: [f32; 2],
    pub velocity: [f32; 2],
    pub orientation: f32,
    pub action: String,
    pub has_ball: bool,
    pub stamina: f32,
    pub suspension_remaining: f32,
    pub stats: PlayerMatchStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_result_is_aborted() {
        let result = MatchResult::rejected("A", "B", None, "roster too small");
        assert!(result.aborted);
        assert!(!result.is_ok());
        assert_eq!(result.winner(), None);
        assert_eq!(result.error.as_deref(), Some("roster too small"));
    }
}
