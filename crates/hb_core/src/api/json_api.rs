use chrono::NaiveDate;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::engine::{CancelToken, MatchConfig, MatchSimulator};
use crate::error::SimError;
use crate::models::{
    MatchResult, MatchSetup, Player, PlayerAttributes, PlayerRole, TacticConfig, Team,
};
use crate::SCHEMA_VERSION;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRequest {
    pub schema_version: u8,
    pub seed: u64,
    pub home_team: TeamData,
    pub away_team: TeamData,
    #[serde(default)]
    pub home_tactic: TacticConfig,
    #[serde(default)]
    pub away_tactic: TacticConfig,
    #[serde(default)]
    pub match_date: Option<NaiveDate>,
    #[serde(default)]
    pub config: Option<MatchConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamData {
    pub name: String,
    /// Starters first (seven), then the bench.
    pub players: Vec<PlayerData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerData {
    pub name: String,
    /// "GK", "LW", "LB", "CB", "RB", "RW" or "PV"
    pub position: String,
    /// Uniform rating used when `attributes` is absent.
    #[serde(default)]
    pub overall: Option<u8>,
    #[serde(default)]
    pub attributes: Option<PlayerAttributes>,
}

impl MatchRequest {
    /// Converts the boundary form into an engine setup.
    pub fn into_setup(self) -> Result<MatchSetup, String> {
        if self.schema_version != SCHEMA_VERSION {
            return Err(format!("Unsupported schema version: {}", self.schema_version));
        }
        let home = convert_team(self.home_team)?;
        let away = convert_team(self.away_team)?;
        let mut setup = MatchSetup::new(home, away, self.seed)
            .with_tactics(self.home_tactic, self.away_tactic);
        if let Some(config) = self.config {
            setup = setup.with_config(config);
        }
        if let Some(date) = self.match_date {
            setup = setup.with_date(date);
        }
        Ok(setup)
    }
}

fn convert_team(data: TeamData) -> Result<Team, String> {
    let players = data.players.into_iter().map(convert_player).collect::<Result<Vec<_>, _>>()?;
    Ok(Team::new(data.name, players))
}

fn convert_player(data: PlayerData) -> Result<Player, String> {
    let role: PlayerRole = data.position.parse()?;
    let attributes = match (data.attributes, data.overall) {
        (Some(attrs), _) => attrs.clamped(),
        (None, Some(overall)) => PlayerAttributes::uniform(overall),
        (None, None) => PlayerAttributes::default(),
    };
    Ok(Player::new(data.name, role, attributes))
}

/// Runs a whole match. Setups rejected before kick-off come back as an
/// aborted result carrying the reason.
pub fn simulate_match(setup: &MatchSetup) -> MatchResult {
    match MatchSimulator::new(setup) {
        Ok(sim) => sim.run(),
        Err(err) => reject(setup, err),
    }
}

/// Like `simulate_match`, stopping early once `cancel` is set.
pub fn simulate_match_with_cancel(setup: &MatchSetup, cancel: &CancelToken) -> MatchResult {
    match MatchSimulator::new(setup) {
        Ok(sim) => sim.run_with_cancel(cancel),
        Err(err) => reject(setup, err),
    }
}

fn reject(setup: &MatchSetup, err: SimError) -> MatchResult {
    warn!("match rejected: {}", err);
    MatchResult::rejected(
        setup.home.name.clone(),
        setup.away.name.clone(),
        setup.match_date,
        err.to_string(),
    )
}

/// JSON in, JSON out. Malformed requests are an `Err`; validation failures
/// are an aborted `MatchResult`.
pub fn simulate_match_json(request_json: &str) -> Result<String, String> {
    let request: MatchRequest =
        serde_json::from_str(request_json).map_err(|e| format!("Invalid JSON request: {}", e))?;
    let setup = request.into_setup()?;
    info!("simulating {} vs {} (seed {})", setup.home.name, setup.away.name, setup.seed);
    let result = simulate_match(&setup);
    serde_json::to_string(&result).map_err(|e| SimError::from(e).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team_json(name: &str, count: usize) -> serde_json::Value {
        let roles = ["GK", "LW", "LB", "CB", "RB", "RW", "PV", "LW", "RB"];
        let players: Vec<serde_json::Value> = roles
            .iter()
            .take(count)
            .enumerate()
            .map(|(i, role)| {
                serde_json::json!({
                    "name": format!("{} {}", name, i),
                    "position": role,
                    "overall": 65
                })
            })
            .collect();
        serde_json::json!({ "name": name, "players": players })
    }

    fn request(home_count: usize) -> String {
        serde_json::json!({
            "schema_version": 1,
            "seed": 99,
            "home_team": team_json("Kiel", home_count),
            "away_team": team_json("Flensburg", 9),
            "home_tactic": { "defensive_formation": "5-1" },
            "match_date": "2026-03-14",
            "config": { "half_length_secs": 30.0 }
        })
        .to_string()
    }

    #[test]
    fn test_json_round_trip_runs_match() {
        let out = simulate_match_json(&request(9)).unwrap();
        let result: MatchResult = serde_json::from_str(&out).unwrap();
        assert!(result.is_ok(), "{:?}", result.error);
        assert_eq!(result.home_team, "Kiel");
        assert_eq!(result.match_date, NaiveDate::from_ymd_opt(2026, 3, 14));
        assert!(!result.events.is_empty());
    }

    #[test]
    fn test_small_roster_is_rejected_result() {
        let out = simulate_match_json(&request(5)).unwrap();
        let result: MatchResult = serde_json::from_str(&out).unwrap();
        assert!(result.aborted);
        assert!(result.error.unwrap().contains("roster too small"));
        assert!(result.events.is_empty());
    }

    #[test]
    fn test_bad_schema_and_bad_json_are_errors() {
        let bad_schema = request(9).replace("\"schema_version\":1", "\"schema_version\":7");
        assert!(simulate_match_json(&bad_schema).unwrap_err().contains("schema version"));
        assert!(simulate_match_json("{ not json").unwrap_err().starts_with("Invalid JSON request"));
    }

    #[test]
    fn test_unknown_position_is_error() {
        let req = request(9).replacen("\"PV\"", "\"XX\"", 1);
        assert!(simulate_match_json(&req).unwrap_err().contains("unknown player role"));
    }
}
