//! Team tactics.
//!
//! `TacticConfig` is the string-typed form handed over by the configuration
//! boundary. It is resolved once into a `Tactic` with closed enums before the
//! match starts, so the hot path never compares strings.

use serde::{Deserialize, Serialize};

use super::player::PlayerRole;

/// Named team-defence system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DefensiveSystem {
    /// Packed six-player line on the goal area.
    SixZero,
    /// Five on the line plus one advanced "point" defender.
    FiveOne,
    /// Three tiers: deep / mid / high.
    ThreeTwoOne,
}

impl DefensiveSystem {
    /// Exact match against "6-0", "5-1", "3-2-1", ignoring surrounding
    /// whitespace. Anything else resolves to `None` (role-based defence).
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim() {
            "6-0" => Some(DefensiveSystem::SixZero),
            "5-1" => Some(DefensiveSystem::FiveOne),
            "3-2-1" => Some(DefensiveSystem::ThreeTwoOne),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DefensiveSystem::SixZero => "6-0",
            DefensiveSystem::FiveOne => "5-1",
            DefensiveSystem::ThreeTwoOne => "3-2-1",
        }
    }
}

/// Tier inside a 3-2-1 defence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DefensiveTier {
    Deep,
    Mid,
    High,
}

impl DefensiveTier {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "deep" | "low" => Some(DefensiveTier::Deep),
            "mid" | "middle" => Some(DefensiveTier::Mid),
            "high" | "top" => Some(DefensiveTier::High),
            _ => None,
        }
    }

    /// Fallback tier assignment when the tactic carries no slot table.
    pub fn for_role(role: PlayerRole) -> Self {
        match role {
            PlayerRole::CentreBack => DefensiveTier::High,
            PlayerRole::LeftBack | PlayerRole::RightBack => DefensiveTier::Mid,
            _ => DefensiveTier::Deep,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pace {
    Slow,
    Normal,
    Fast,
}

impl Pace {
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "slow" | "low" => Pace::Slow,
            "fast" | "high" | "quick" => Pace::Fast,
            _ => Pace::Normal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FocusPlay {
    Balanced,
    Wings,
    Backcourt,
    Pivot,
    FastBreak,
}

impl FocusPlay {
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "wings" | "wing" | "wide" => FocusPlay::Wings,
            "backcourt" | "backs" | "back" => FocusPlay::Backcourt,
            "pivot" | "line" => FocusPlay::Pivot,
            "fastbreak" | "fast_break" | "counter" => FocusPlay::FastBreak,
            _ => FocusPlay::Balanced,
        }
    }

    /// Whether this focus favours passes to the given role.
    pub fn favours(&self, role: PlayerRole) -> bool {
        match self {
            FocusPlay::Wings => role.is_wing(),
            FocusPlay::Backcourt => role.is_back(),
            FocusPlay::Pivot => role.is_pivot(),
            FocusPlay::Balanced | FocusPlay::FastBreak => false,
        }
    }
}

/// Configuration-boundary form of a tactic.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TacticConfig {
    pub defensive_formation: String,
    /// Offensive formation slots, one role code per starter ("LW", "LB", ...).
    pub offensive_slots: Vec<String>,
    /// Optional 3-2-1 tier per starting slot ("deep", "mid", "high").
    pub defensive_tiers: Vec<String>,
    pub pace: String,
    pub focus_play: String,
    /// 0.0 (passive) ..= 1.0 (very aggressive)
    pub aggression: f32,
    /// 0.0 (deep, on the goal area) ..= 1.0 (high, out at 9m+)
    pub defensive_line_height: f32,
}

impl Default for TacticConfig {
    fn default() -> Self {
        Self {
            defensive_formation: "6-0".to_string(),
            offensive_slots: Vec::new(),
            defensive_tiers: Vec::new(),
            pace: "normal".to_string(),
            focus_play: "balanced".to_string(),
            aggression: 0.5,
            defensive_line_height: 0.3,
        }
    }
}

/// Resolved tactic used inside the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tactic {
    pub defensive_system: Option<DefensiveSystem>,
    pub offensive_slots: Vec<PlayerRole>,
    pub defensive_tiers: Vec<DefensiveTier>,
    pub pace: Pace,
    pub focus_play: FocusPlay,
    pub aggression: f32,
    pub defensive_line_height: f32,
}

impl Default for Tactic {
    fn default() -> Self {
        Tactic::from_config(&TacticConfig::default())
    }
}

impl Tactic {
    pub fn from_config(config: &TacticConfig) -> Self {
        let defensive_system = DefensiveSystem::parse(&config.defensive_formation);
        if defensive_system.is_none() {
            log::debug!(
                "Unrecognized defensive system '{}', using role-based defence",
                config.defensive_formation
            );
        }
        Self {
            defensive_system,
            offensive_slots: config
                .offensive_slots
                .iter()
                .filter_map(|s| s.parse::<PlayerRole>().ok())
                .collect(),
            defensive_tiers: config
                .defensive_tiers
                .iter()
                .filter_map(|s| DefensiveTier::parse(s))
                .collect(),
            pace: Pace::parse(&config.pace),
            focus_play: FocusPlay::parse(&config.focus_play),
            aggression: config.aggression.clamp(0.0, 1.0),
            defensive_line_height: config.defensive_line_height.clamp(0.0, 1.0),
        }
    }

    /// 3-2-1 tier for a starting slot, falling back to the role table.
    pub fn tier_for(&self, slot: Option<usize>, role: PlayerRole) -> DefensiveTier {
        slot.and_then(|s| self.defensive_tiers.get(s).copied())
            .unwrap_or_else(|| DefensiveTier::for_role(role))
    }
}
