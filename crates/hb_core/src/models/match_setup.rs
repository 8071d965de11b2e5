use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::tactic::TacticConfig;
use super::team::Team;
use crate::engine::MatchConfig;

/// Everything the engine needs to start a match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchSetup {
    pub home: Team,
    pub away: Team,
    #[serde(default)]
    pub home_tactic: TacticConfig,
    #[serde(default)]
    pub away_tactic: TacticConfig,
    pub seed: u64,
    /// Passed through to the result, never read by the simulation.
    #[serde(default)]
    pub match_date: Option<NaiveDate>,
    #[serde(default)]
    pub config: MatchConfig,
}

impl MatchSetup {
    pub fn new(home: Team, away: Team, seed: u64) -> Self {
        Self {
            home,
            away,
            home_tactic: TacticConfig::default(),
            away_tactic: TacticConfig::default(),
            seed,
            match_date: None,
            config: MatchConfig::default(),
        }
    }

    pub fn with_tactics(mut self, home: TacticConfig, away: TacticConfig) -> Self {
        self.home_tactic = home;
        self.away_tactic = away;
        self
    }

    pub fn with_config(mut self, config: MatchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.match_date = Some(date);
        self
    }

    /// Validation errors are surfaced before the simulation starts.
    pub fn validate(&self) -> Result<(), String> {
        self.home.validate()?;
        self.away.validate()?;
        self.config.validate()?;
        Ok(())
    }
}
