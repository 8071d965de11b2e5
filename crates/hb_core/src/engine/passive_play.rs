//! Passive-play tracking.
//!
//! Two timers run while one team keeps uninterrupted possession: an intent
//! timer (time without a threatening position) and an absolute timer. When
//! either hits its limit the referee raises the warning arm once; from then on
//! the warned team has a fixed number of passes before possession is taken
//! away. Shots, possession changes and defensive suspensions reset everything.

use log::debug;

use super::messages::SimMessage;
use super::physics_constants::passive_play as pp;
use crate::models::TeamSide;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassiveVerdict {
    Clear,
    Warning(TeamSide),
    Violation(TeamSide),
}

#[derive(Debug, Clone, Default)]
pub struct PassivePlayTracker {
    team: Option<TeamSide>,
    intent_time: f32,
    possession_time: f32,
    warning_active: bool,
    passes_since_warning: u8,
}

impl PassivePlayTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn team(&self) -> Option<TeamSide> {
        self.team
    }

    pub fn warning_active(&self) -> bool {
        self.warning_active
    }

    pub fn passes_since_warning(&self) -> u8 {
        self.passes_since_warning
    }

    pub fn intent_time(&self) -> f32 {
        self.intent_time
    }

    pub fn reset(&mut self, team: Option<TeamSide>) {
        self.team = team;
        self.intent_time = 0.0;
        self.possession_time = 0.0;
        self.warning_active = false;
        self.passes_since_warning = 0;
    }

    pub fn on_message(&mut self, msg: &SimMessage) {
        match *msg {
            SimMessage::PassCompleted { team, .. } => {
                if self.warning_active && self.team == Some(team) {
                    self.passes_since_warning = self.passes_since_warning.saturating_add(1);
                    debug!("passive play: pass {} after warning", self.passes_since_warning);
                }
            }
            SimMessage::ShotTaken { team, .. } => {
                if self.team == Some(team) {
                    self.reset(Some(team));
                }
            }
            SimMessage::PossessionChanged { team } => {
                if self.team != team {
                    self.reset(team);
                }
            }
            SimMessage::DefenderSuspended { team, .. } => {
                // A suspension against the defence restarts the attack's clock
                if self.team == Some(team.opponent()) {
                    self.reset(self.team);
                }
            }
            SimMessage::GoalScored { .. } => self.reset(None),
        }
    }

    /// Advances the timers for the attacking team.
    pub fn tick(
        &mut self,
        dt: f32,
        attacking: Option<TeamSide>,
        threatening: bool,
    ) -> PassiveVerdict {
        if attacking != self.team {
            self.reset(attacking);
        }
        let Some(team) = self.team else {
            return PassiveVerdict::Clear;
        };

        self.possession_time += dt;
        if threatening {
            self.intent_time = 0.0;
        } else {
            self.intent_time += dt;
        }

        if self.warning_active {
            if self.passes_since_warning >= pp::MAX_PASSES_AFTER_WARNING {
                self.reset(None);
                return PassiveVerdict::Violation(team);
            }
            return PassiveVerdict::Clear;
        }

        if self.intent_time >= pp::INTENT_LIMIT_S || self.possession_time >= pp::ABSOLUTE_LIMIT_S {
            self.warning_active = true;
            self.passes_since_warning = 0;
            return PassiveVerdict::Warning(team);
        }
        PassiveVerdict::Clear
    }
}
