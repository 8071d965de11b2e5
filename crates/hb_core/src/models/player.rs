use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Static roster entry handed over by the match setup collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Player {
    pub name: String,
    pub role: PlayerRole,
    #[serde(default)]
    pub attributes: PlayerAttributes,
}

impl Player {
    pub fn new(name: impl Into<String>, role: PlayerRole, attributes: PlayerAttributes) -> Self {
        Self { name: name.into(), role, attributes }
    }
}

/// Court role. Serialized with the short handball abbreviations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PlayerRole {
    #[serde(rename = "GK")]
    Goalkeeper,
    #[serde(rename = "LW")]
    LeftWing,
    #[serde(rename = "LB")]
    LeftBack,
    #[serde(rename = "CB")]
    CentreBack,
    #[serde(rename = "RB")]
    RightBack,
    #[serde(rename = "RW")]
    RightWing,
    #[serde(rename = "PV")]
    Pivot,
}

impl PlayerRole {
    pub const FIELD_ROLES: [PlayerRole; 6] = [
        PlayerRole::LeftWing,
        PlayerRole::LeftBack,
        PlayerRole::CentreBack,
        PlayerRole::RightBack,
        PlayerRole::RightWing,
        PlayerRole::Pivot,
    ];

    pub fn is_goalkeeper(&self) -> bool {
        matches!(self, PlayerRole::Goalkeeper)
    }

    pub fn is_wing(&self) -> bool {
        matches!(self, PlayerRole::LeftWing | PlayerRole::RightWing)
    }

    pub fn is_back(&self) -> bool {
        matches!(self, PlayerRole::LeftBack | PlayerRole::CentreBack | PlayerRole::RightBack)
    }

    pub fn is_pivot(&self) -> bool {
        matches!(self, PlayerRole::Pivot)
    }

    /// Lateral ordering from the left touchline (0) to the right (5) used when
    /// distributing defensive slots. The pivot defends centrally.
    pub fn lateral_order(&self) -> u8 {
        match self {
            PlayerRole::LeftWing => 0,
            PlayerRole::LeftBack => 1,
            PlayerRole::Pivot => 2,
            PlayerRole::CentreBack => 3,
            PlayerRole::RightBack => 4,
            PlayerRole::RightWing => 5,
            PlayerRole::Goalkeeper => 6,
        }
    }

    /// Whether a bench player of role `other` may replace this role.
    pub fn compatible_with(&self, other: PlayerRole) -> bool {
        if self.is_goalkeeper() || other.is_goalkeeper() {
            return *self == other;
        }
        *self == other
            || (self.is_back() && other.is_back())
            || (self.is_wing() && other.is_wing())
    }

    pub fn code(&self) -> &'static str {
        match self {
            PlayerRole::Goalkeeper => "GK",
            PlayerRole::LeftWing => "LW",
            PlayerRole::LeftBack => "LB",
            PlayerRole::CentreBack => "CB",
            PlayerRole::RightBack => "RB",
            PlayerRole::RightWing => "RW",
            PlayerRole::Pivot => "PV",
        }
    }
}

impl fmt::Display for PlayerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for PlayerRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GK" | "GOALKEEPER" => Ok(PlayerRole::Goalkeeper),
            "LW" | "LEFTWING" => Ok(PlayerRole::LeftWing),
            "LB" | "LEFTBACK" => Ok(PlayerRole::LeftBack),
            "CB" | "CENTREBACK" | "CENTERBACK" => Ok(PlayerRole::CentreBack),
            "RB" | "RIGHTBACK" => Ok(PlayerRole::RightBack),
            "RW" | "RIGHTWING" => Ok(PlayerRole::RightWing),
            "PV" | "P" | "PIVOT" | "LINE" => Ok(PlayerRole::Pivot),
            other => Err(format!("unknown player role: {other}")),
        }
    }
}

/// Skill ratings on a 0-100 scale.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlayerAttributes {
    // Technical
    pub passing: u8,
    pub technique: u8,
    pub finishing: u8,
    pub dribbling: u8,
    pub tackling: u8,
    pub blocking: u8,
    // Mental
    pub decision_making: u8,
    pub composure: u8,
    pub bravery: u8,
    pub aggression: u8,
    pub determination: u8,
    pub anticipation: u8,
    pub positioning: u8,
    pub teamwork: u8,
    pub flair: u8,
    // Physical
    pub power: u8,
    pub agility: u8,
    pub strength: u8,
    pub pace: u8,
    pub acceleration: u8,
    pub stamina: u8,
    pub balance: u8,
    // Goalkeeping
    pub reflexes: u8,
    pub handling: u8,
    pub one_on_ones: u8,
}

impl Default for PlayerAttributes {
    fn default() -> Self {
        Self::uniform(50)
    }
}

impl PlayerAttributes {
    /// Every attribute set to the same rating (clamped to 100).
    pub fn uniform(value: u8) -> Self {
        let v = value.min(100);
        Self {
            passing: v,
            technique: v,
            finishing: v,
            dribbling: v,
            tackling: v,
            blocking: v,
            decision_making: v,
            composure: v,
            bravery: v,
            aggression: v,
            determination: v,
            anticipation: v,
            positioning: v,
            teamwork: v,
            flair: v,
            power: v,
            agility: v,
            strength: v,
            pace: v,
            acceleration: v,
            stamina: v,
            balance: v,
            reflexes: v,
            handling: v,
            one_on_ones: v,
        }
    }

    /// Clamp every rating into 0..=100.
    pub fn clamped(mut self) -> Self {
        for v in [
            &mut self.passing,
            &mut self.technique,
            &mut self.finishing,
            &mut self.dribbling,
            &mut self.tackling,
            &mut self.blocking,
            &mut self.decision_making,
            &mut self.composure,
            &mut self.bravery,
            &mut self.aggression,
            &mut self.determination,
            &mut self.anticipation,
            &mut self.positioning,
            &mut self.teamwork,
            &mut self.flair,
            &mut self.power,
            &mut self.agility,
            &mut self.strength,
            &mut self.pace,
            &mut self.acceleration,
            &mut self.stamina,
            &mut self.balance,
            &mut self.reflexes,
            &mut self.handling,
            &mut self.one_on_ones,
        ] {
            *v = (*v).min(100);
        }
        self
    }

    /// Shielding effectiveness: how well a carrier protects the ball (0..1).
    pub fn shielding(&self) -> f32 {
        let s = |v: u8| v as f32 / 100.0;
        s(self.strength) * 0.4
            + s(self.dribbling) * 0.3
            + s(self.balance) * 0.2
            + s(self.composure) * 0.1
    }

    /// Goalkeeping composite (0..1).
    pub fn goalkeeping(&self) -> f32 {
        let s = |v: u8| v as f32 / 100.0;
        s(self.reflexes) * 0.4
            + s(self.handling) * 0.2
            + s(self.one_on_ones) * 0.2
            + s(self.agility) * 0.2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse_is_case_insensitive() {
        assert_eq!("gk".parse::<PlayerRole>().unwrap(), PlayerRole::Goalkeeper);
        assert_eq!(" Pv ".parse::<PlayerRole>().unwrap(), PlayerRole::Pivot);
        assert!("ST".parse::<PlayerRole>().is_err());
    }

    #[test]
    fn test_role_serde_uses_codes() {
        let json = serde_json::to_string(&PlayerRole::RightWing).unwrap();
        assert_eq!(json, "\"RW\"");
        let back: PlayerRole = serde_json::from_str("\"CB\"").unwrap();
        assert_eq!(back, PlayerRole::CentreBack);
    }

    #[test]
    fn test_role_compatibility() {
        assert!(PlayerRole::LeftBack.compatible_with(PlayerRole::RightBack));
        assert!(PlayerRole::LeftWing.compatible_with(PlayerRole::RightWing));
        assert!(!PlayerRole::Goalkeeper.compatible_with(PlayerRole::Pivot));
        assert!(!PlayerRole::Pivot.compatible_with(PlayerRole::LeftWing));
    }

    #[test]
    fn test_shielding_range() {
        assert!((PlayerAttributes::uniform(100).shielding() - 1.0).abs() < 1e-5);
        assert!(PlayerAttributes::uniform(0).shielding().abs() < 1e-5);
    }

    #[test]
    fn test_partial_attributes_default_to_fifty() {
        let attrs: PlayerAttributes = serde_json::from_str(r#"{"passing": 80}"#).unwrap();
        assert_eq!(attrs.passing, 80);
        assert_eq!(attrs.tackling, 50);
    }
}
