//! In-tick message queue.
//!
//! The event handler appends messages while applying outcomes and drains them
//! before the tick ends, so auxiliary managers (passive play) observe
//! pass/shot/possession changes in the order they happened.

use crate::models::TeamSide;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimMessage {
    PassCompleted { team: TeamSide, passer: usize, receiver: usize },
    ShotTaken { team: TeamSide, shooter: usize },
    PossessionChanged { team: Option<TeamSide> },
    DefenderSuspended { team: TeamSide, player: usize },
    GoalScored { team: TeamSide },
}
