pub mod events;
pub mod match_result;
pub mod match_setup;
pub mod player;
pub mod stats;
pub mod tactic;
pub mod team;

pub use events::{EventKind, MatchEvent};
pub use match_result::{BallSnapshot, MatchResult, MatchSnapshot, PlayerSnapshot};
pub use match_setup::MatchSetup;
pub use player::{Player, PlayerAttributes, PlayerRole};
pub use stats::{PlayerMatchStats, TeamMatchStats};
pub use tactic::{DefensiveSystem, DefensiveTier, FocusPlay, Pace, Tactic, TacticConfig};
pub use team::Team;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamSide {
    Home,
    Away,
}

impl TeamSide {
    pub fn opponent(self) -> Self {
        match self {
            TeamSide::Home => TeamSide::Away,
            TeamSide::Away => TeamSide::Home,
        }
    }

    pub fn is_home(self) -> bool {
        matches!(self, TeamSide::Home)
    }

    pub fn index(self) -> usize {
        match self {
            TeamSide::Home => 0,
            TeamSide::Away => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TeamSide::Home => "home",
            TeamSide::Away => "away",
        }
    }
}
