use serde::{Deserialize, Serialize};

/// Per-team accumulators. Only the event handler increments these.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TeamMatchStats {
    pub goals: u16,
    pub shots: u16,
    pub shots_on_target: u16,
    pub saves: u16,
    pub seven_meter_attempts: u16,
    pub seven_meter_goals: u16,
    pub passes_attempted: u16,
    pub passes_completed: u16,
    pub interceptions: u16,
    pub blocks: u16,
    pub tackles_won: u16,
    pub turnovers: u16,
    pub technical_faults: u16,
    pub fouls: u16,
    pub yellow_cards: u8,
    pub two_minute_suspensions: u8,
    pub red_cards: u8,
    pub timeouts_used: u8,
    pub passive_play_warnings: u16,
    pub possession_secs: f32,
}

impl TeamMatchStats {
    pub fn pass_accuracy(&self) -> f32 {
        if self.passes_attempted == 0 {
            0.0
        } else {
            self.passes_completed as f32 / self.passes_attempted as f32
        }
    }

    pub fn shooting_efficiency(&self) -> f32 {
        if self.shots == 0 {
            0.0
        } else {
            self.goals as f32 / self.shots as f32
        }
    }
}

/// Per-player accumulators. Only the event handler increments these.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PlayerMatchStats {
    pub goals: u16,
    pub shots: u16,
    pub shots_on_target: u16,
    pub saves: u16,
    pub passes_attempted: u16,
    pub passes_completed: u16,
    pub assists: u16,
    pub interceptions: u16,
    pub blocks: u16,
    pub tackles_attempted: u16,
    pub tackles_won: u16,
    pub turnovers: u16,
    pub fouls_committed: u16,
    pub yellow_cards: u8,
    pub two_minute_suspensions: u8,
    pub red_card: bool,
    pub seconds_on_court: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratios_handle_zero() {
        let stats = TeamMatchStats::default();
        assert_eq!(stats.pass_accuracy(), 0.0);
        assert_eq!(stats.shooting_efficiency(), 0.0);
    }

    #[test]
    fn test_ratios() {
        let stats = TeamMatchStats {
            shots: 4,
            goals: 3,
            passes_attempted: 10,
            passes_completed: 9,
            ..Default::default()
        };
        assert!((stats.shooting_efficiency() - 0.75).abs() < 1e-6);
        assert!((stats.pass_accuracy() - 0.9).abs() < 1e-6);
    }
}
