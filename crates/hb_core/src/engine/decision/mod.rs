//! Utility-scoring decision makers.
//!
//! One capability trait per side of the ball, each with a single
//! role-aware implementation. Candidates are scored independently; on equal
//! scores the lowest player index wins.

pub mod defense;
pub mod goalkeeper;
pub mod offense;

pub use defense::LayeredDefense;
pub use goalkeeper::PositionalKeeper;
pub use offense::RoleAwareOffense;

use nalgebra::Vector2;

use super::match_state::MatchState;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassCandidate {
    pub target: usize,
    pub score: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShotDecision {
    pub eligible: bool,
    pub confidence: f32,
    pub shoot: bool,
    pub jump: bool,
}

impl ShotDecision {
    pub fn ineligible() -> Self {
        Self { eligible: false, confidence: 0.0, shoot: false, jump: false }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DribbleDecision {
    pub score: f32,
    pub dribble: bool,
}

/// A screen the pivot can set for a marked back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenOpportunity {
    pub teammate: usize,
    pub defender: usize,
    pub anchor: Vector2<f32>,
    /// 0..90: how squarely the defender blocks the teammate's lane
    pub effectiveness_deg: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DefensiveChoice {
    Idle,
    Mark { target: usize, spot: Vector2<f32> },
    Tackle { target: usize },
    Block { spot: Vector2<f32> },
    ChaseBall,
    Position { spot: Vector2<f32> },
}

pub trait OffensiveDecisions {
    fn best_pass(&self, state: &MatchState, holder: usize) -> Option<PassCandidate>;
    fn shot_decision(&self, state: &MatchState, holder: usize) -> ShotDecision;
    fn dribble_decision(&self, state: &MatchState, holder: usize) -> DribbleDecision;
    fn screen_opportunity(&self, state: &MatchState, pivot: usize) -> Option<ScreenOpportunity>;
}

pub trait DefensiveDecisions {
    fn decide(&self, state: &MatchState, defender: usize) -> DefensiveChoice;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeeperChoice {
    Hold,
    Distribute(PassCandidate),
    Save,
    Position { spot: Vector2<f32> },
}

pub trait GoalkeeperDecisions {
    fn keeper_choice(&self, state: &MatchState, keeper: usize) -> KeeperChoice;
}
