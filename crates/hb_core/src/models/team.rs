use super::player::{Player, PlayerRole};
use serde::{Deserialize, Serialize};

/// Roster: the first seven players start, the rest sit on the bench.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub name: String,
    pub players: Vec<Player>, // 7 starters + up to 9 bench
}

impl Team {
    pub const ON_COURT: usize = 7;
    pub const MAX_ROSTER: usize = 16;

    pub fn new(name: impl Into<String>, players: Vec<Player>) -> Self {
        Self { name: name.into(), players }
    }

    pub fn starters(&self) -> &[Player] {
        &self.players[..self.players.len().min(Self::ON_COURT)]
    }

    pub fn bench(&self) -> &[Player] {
        if self.players.len() > Self::ON_COURT {
            &self.players[Self::ON_COURT..]
        } else {
            &[]
        }
    }

    /// Check roster shape. Returns a human-readable reason on failure.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("team name is empty".to_string());
        }
        if self.players.len() < Self::ON_COURT {
            return Err(format!(
                "{}: roster too small (expected at least {}, found {})",
                self.name,
                Self::ON_COURT,
                self.players.len()
            ));
        }
        if self.players.len() > Self::MAX_ROSTER {
            return Err(format!(
                "{}: roster too large (max {}, found {})",
                self.name,
                Self::MAX_ROSTER,
                self.players.len()
            ));
        }
        let keepers = self.starters().iter().filter(|p| p.role == PlayerRole::Goalkeeper).count();
        if keepers != 1 {
            return Err(format!(
                "{}: starting seven must contain exactly one goalkeeper (found {})",
                self.name, keepers
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::player::PlayerAttributes;

    fn roster(roles: &[PlayerRole]) -> Vec<Player> {
        roles
            .iter()
            .enumerate()
            .map(|(i, &r)| Player::new(format!("P{i}"), r, PlayerAttributes::default()))
            .collect()
    }

    #[test]
    fn test_validate_requires_seven() {
        let team = Team::new("Short", roster(&[PlayerRole::Goalkeeper, PlayerRole::Pivot]));
        let err = team.validate().unwrap_err();
        assert!(err.contains("too small"));
    }

    #[test]
    fn test_validate_requires_goalkeeper() {
        let team = Team::new("NoKeeper", roster(&[PlayerRole::Pivot; 7]));
        assert!(team.validate().unwrap_err().contains("goalkeeper"));
    }

    #[test]
    fn test_bench_split() {
        let mut roles = vec![PlayerRole::Goalkeeper];
        roles.extend(PlayerRole::FIELD_ROLES);
        roles.push(PlayerRole::Pivot);
        let team = Team::new("Full", roster(&roles));
        assert!(team.validate().is_ok());
        assert_eq!(team.starters().len(), 7);
        assert_eq!(team.bench().len(), 1);
    }
}
