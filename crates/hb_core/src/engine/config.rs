//! Match-structure configuration.
//!
//! Only the shape of the match is configurable (lengths, timeouts, which
//! auxiliary managers run). Probabilities and thresholds live in
//! `physics_constants` and are not runtime-configurable.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MatchConfig {
    pub half_length_secs: f32,
    pub timeout_length_secs: f32,
    pub max_timeouts_per_match: u8,
    pub max_timeouts_per_half: u8,
    pub team_timeouts_enabled: bool,
    pub substitutions_enabled: bool,
    pub record_final_snapshot: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self::regulation()
    }
}

impl MatchConfig {
    /// Two halves of 30 minutes.
    pub fn regulation() -> Self {
        Self {
            half_length_secs: 30.0 * 60.0,
            timeout_length_secs: 60.0,
            max_timeouts_per_match: 3,
            max_timeouts_per_half: 2,
            team_timeouts_enabled: true,
            substitutions_enabled: true,
            record_final_snapshot: true,
        }
    }

    /// Short halves for tests and demos.
    pub fn quick(half_length_secs: f32) -> Self {
        Self { half_length_secs, ..Self::regulation() }
    }

    pub fn total_secs(&self) -> f32 {
        self.half_length_secs * 2.0
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(self.half_length_secs.is_finite() && self.half_length_secs > 0.0) {
            return Err(format!("half length must be positive, got {}", self.half_length_secs));
        }
        if !(self.timeout_length_secs.is_finite() && self.timeout_length_secs >= 0.0) {
            return Err(format!("timeout length must be >= 0, got {}", self.timeout_length_secs));
        }
        if self.max_timeouts_per_half > self.max_timeouts_per_match {
            return Err("timeouts per half exceed timeouts per match".to_string());
        }
        Ok(())
    }
}
